// src/db/journal.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::state::{Change, Object},
};

/// Onde o estado é persistido. O estado em memória é sempre a fonte das leituras.
#[async_trait]
pub trait Journal: Send + Sync {
    async fn load(&self) -> Result<Vec<Object>, AppError>;

    /// Grava todas as mudanças ou nenhuma.
    async fn commit(&self, changes: &[Change]) -> Result<(), AppError>;
}

/// Sem persistência: o estado morre com o processo.
pub struct MemoryJournal;

#[async_trait]
impl Journal for MemoryJournal {
    async fn load(&self) -> Result<Vec<Object>, AppError> {
        Ok(Vec::new())
    }

    async fn commit(&self, _changes: &[Change]) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgJournal {
    pool: PgPool,
}

impl PgJournal {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Journal for PgJournal {
    async fn load(&self) -> Result<Vec<Object>, AppError> {
        let bodies: Vec<serde_json::Value> =
            sqlx::query_scalar("SELECT body FROM iam_objects ORDER BY kind, id")
                .fetch_all(&self.pool)
                .await?;

        let mut objects = Vec::with_capacity(bodies.len());
        for body in bodies {
            let object = serde_json::from_value(body)
                .map_err(|e| anyhow::anyhow!("Objeto inválido no journal: {}", e))?;
            objects.push(object);
        }
        Ok(objects)
    }

    async fn commit(&self, changes: &[Change]) -> Result<(), AppError> {
        // Uma transação por operação: cascatas entram inteiras ou não entram.
        let mut tx = self.pool.begin().await?;

        for change in changes {
            match change {
                Change::Put(object) => {
                    let key = object.key();
                    let body = serde_json::to_value(object)
                        .map_err(|e| anyhow::anyhow!("Falha ao serializar objeto: {}", e))?;
                    sqlx::query(
                        r#"
                        INSERT INTO iam_objects (kind, id, tenant_uuid, body, updated_at)
                        VALUES ($1, $2, $3, $4, NOW())
                        ON CONFLICT (kind, id) DO UPDATE
                        SET tenant_uuid = EXCLUDED.tenant_uuid,
                            body = EXCLUDED.body,
                            updated_at = NOW()
                        "#,
                    )
                    .bind(key.kind())
                    .bind(key.id())
                    .bind(object.tenant_uuid())
                    .bind(body)
                    .execute(&mut *tx)
                    .await?;
                }
                Change::Delete(key) => {
                    sqlx::query("DELETE FROM iam_objects WHERE kind = $1 AND id = $2")
                        .bind(key.kind())
                        .bind(key.id())
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
