//! Password hashing backed by bcrypt.

use anyhow::anyhow;
use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

/// Smallest cost bcrypt accepts. Only suitable for tests and demo data.
pub const MIN_COST: u32 = 4;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost).map_err(|e| AppError::internal(anyhow!("Failed to hash password: {}", e)))
}

/// Returns `Ok(false)` for a wrong password and `Err` when `hash` is not a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal(anyhow!("Failed to verify password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_cost_roundtrip() {
        let hash = hash_password_with_cost("maintenance42", MIN_COST).unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("maintenance42", &hash).unwrap());
        assert!(!verify_password("maintenance43", &hash).unwrap());
    }

    #[test]
    fn test_invalid_cost_is_an_error() {
        assert!(hash_password_with_cost("x", 2).is_err());
    }
}
