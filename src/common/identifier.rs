// src/common/identifier.rs

use std::str::FromStr;

use serde::Deserialize;

use crate::common::error::AppError;

/// Como tratar identificadores numéricos vindos do cliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierPolicy {
    /// Números são aceitos e convertidos para texto.
    #[default]
    Lenient,
    /// Apenas strings JSON.
    Strict,
}

impl FromStr for IdentifierPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(IdentifierPolicy::Lenient),
            "strict" => Ok(IdentifierPolicy::Strict),
            other => Err(anyhow::anyhow!("IDENTIFIER_POLICY inválida: {}", other)),
        }
    }
}

// Arrays, objetos, booleanos e null falham já na desserialização.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdentifierInput {
    Text(String),
    Number(serde_json::Number),
}

impl IdentifierInput {
    pub fn normalize(&self, policy: IdentifierPolicy, field: &str) -> Result<String, AppError> {
        let value = match (self, policy) {
            (IdentifierInput::Text(text), _) => text.clone(),
            (IdentifierInput::Number(number), IdentifierPolicy::Lenient) => number.to_string(),
            (IdentifierInput::Number(_), IdentifierPolicy::Strict) => {
                return Err(AppError::BadRequest(format!(
                    "O campo '{}' deve ser uma string.",
                    field
                )));
            }
        };

        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!(
                "O campo '{}' não pode ser vazio.",
                field
            )));
        }
        Ok(value)
    }
}

/// Campo obrigatório: ausente ou vazio é 400.
pub fn require_identifier(
    input: Option<&IdentifierInput>,
    policy: IdentifierPolicy,
    field: &str,
) -> Result<String, AppError> {
    match input {
        Some(value) => value.normalize(policy, field),
        None => Err(AppError::BadRequest(format!(
            "O campo '{}' é obrigatório.",
            field
        ))),
    }
}
