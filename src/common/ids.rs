// src/common/ids.rs

use chrono::Utc;
use uuid::Uuid;

use crate::common::error::AppError;

pub fn new_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Carimbo opaco de versão. Trocado a cada atualização bem-sucedida.
pub fn new_resource_version() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Ids de caminho que não são UUID simplesmente não existem.
pub fn parse_path_id(raw: &str, resource: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(resource))
}

pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// Teto de ttl aceito nos payloads: cem anos em segundos.
pub const MAX_TTL: u64 = 100 * 365 * 24 * 60 * 60;

/// Momento de expiração (`agora + ttl`). Nunca transborda nem volta ao passado.
pub fn valid_till(ttl: u64) -> Result<i64, AppError> {
    let out_of_range = || AppError::BadRequest(format!("O campo 'ttl' deve estar entre 1 e {}.", MAX_TTL));
    if ttl == 0 || ttl > MAX_TTL {
        return Err(out_of_range());
    }
    let ttl = i64::try_from(ttl).map_err(|_| out_of_range())?;
    unix_now().checked_add(ttl).ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_unique_and_opaque() {
        let a = new_resource_version();
        let b = new_resource_version();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn malformed_path_id_is_not_found() {
        let err = parse_path_id("no-such", "user").unwrap_err();
        assert!(matches!(err, AppError::NotFound("user")));
        assert!(parse_path_id(&new_uuid().to_string(), "user").is_ok());
    }

    #[test]
    fn valid_till_is_in_the_future_and_bounded() {
        let now = unix_now();
        assert!(valid_till(1).unwrap() > now);
        assert!(valid_till(MAX_TTL).unwrap() > now);
        assert!(matches!(valid_till(0), Err(AppError::BadRequest(_))));
        assert!(matches!(valid_till(MAX_TTL + 1), Err(AppError::BadRequest(_))));
        assert!(matches!(valid_till(i64::MAX as u64), Err(AppError::BadRequest(_))));
        assert!(matches!(valid_till(u64::MAX), Err(AppError::BadRequest(_))));
    }
}
