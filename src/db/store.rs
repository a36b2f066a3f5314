// src/db/store.rs

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    common::error::AppError,
    db::{
        journal::{Journal, MemoryJournal},
        state::{ChangeSet, IamState},
    },
};

/// Estado compartilhado + journal. Escritas são serializadas pelo lock de escrita.
#[derive(Clone)]
pub struct IamStore {
    state: Arc<RwLock<IamState>>,
    journal: Arc<dyn Journal>,
}

impl IamStore {
    /// Recarrega tudo que o journal tem.
    pub async fn open(journal: Arc<dyn Journal>) -> Result<Self, AppError> {
        let objects = journal.load().await?;
        let count = objects.len();

        let mut state = IamState::default();
        for object in objects {
            state.insert(object);
        }
        tracing::info!("✅ {} objetos carregados do journal", count);

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            journal,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(RwLock::new(IamState::default())),
            journal: Arc::new(MemoryJournal),
        }
    }

    pub async fn read<R>(&self, f: impl FnOnce(&IamState) -> R) -> R {
        let guard = self.state.read().await;
        f(&*guard)
    }

    /// Planeja as mudanças sobre o estado atual, grava no journal e só então aplica em memória.
    pub async fn write<R>(
        &self,
        plan: impl FnOnce(&IamState) -> Result<(R, ChangeSet), AppError>,
    ) -> Result<R, AppError> {
        let mut guard = self.state.write().await;
        let (out, changes) = plan(&*guard)?;

        if !changes.is_empty() {
            self.journal.commit(changes.changes()).await?;
            for change in changes.into_changes() {
                guard.apply(change);
            }
        }
        Ok(out)
    }
}
