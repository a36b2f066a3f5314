// src/common/validation.rs
// Validações customizadas usadas pelos payloads (validator `custom`).

use std::str::FromStr;

use ipnetwork::IpNetwork;
use validator::{ValidateEmail, ValidationError};

pub fn validate_cidrs(cidrs: &Vec<String>) -> Result<(), ValidationError> {
    for cidr in cidrs {
        if IpNetwork::from_str(cidr).is_err() {
            let mut err = ValidationError::new("cidr");
            err.message = Some(format!("CIDR inválido: '{}'.", cidr).into());
            return Err(err);
        }
    }
    Ok(())
}

// E-mail vazio equivale a ausente.
pub fn validate_optional_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        return Ok(());
    }
    let mut err = ValidationError::new("email");
    err.message = Some("E-mail inválido.".into());
    Err(err)
}
