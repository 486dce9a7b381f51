//! Password hashing via bcrypt.
//!
//! The cost factor is a caller-supplied configuration value, not a constant,
//! so verification latency can be tuned without code changes.

use super::AuthError;

/// Default bcrypt cost factor (verification in the tens of milliseconds).
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Hash a password with bcrypt at the given cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash (constant-time comparison).
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost keeps the test fast; production cost comes from config.
    const TEST_COST: u32 = 4;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("pw1", TEST_COST).unwrap();
        assert!(verify_password("pw1", &hash).unwrap());
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hash = hash_password("pw1", TEST_COST).unwrap();
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("pw1", TEST_COST).unwrap();
        let b = hash_password("pw1", TEST_COST).unwrap();
        assert_ne!(a, b);
    }
}
