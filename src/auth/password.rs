/// Password Hashing and Verification
///
/// bcrypt with a fixed work factor. The encoded hash carries its own salt and
/// cost, so verification needs nothing but the stored string.

use bcrypt::{hash, verify};

use crate::error::AppError;

/// bcrypt work factor used for every new hash
pub const PASSWORD_HASH_COST: u32 = 10;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `AppError::Hashing` if bcrypt fails to produce a hash
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, PASSWORD_HASH_COST)
        .map_err(|e| AppError::Hashing(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
///
/// A wrong password is `Ok(false)`, not an error.
///
/// # Errors
/// Returns `AppError::Hashing` if the stored hash is not a valid bcrypt hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    verify(password, password_hash)
        .map_err(|e| AppError::Hashing(format!("Password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let password = "correct horse battery staple";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2b$10$"));
    }

    #[test]
    fn test_verify_password_of_varying_length() {
        for password in ["04234", "a much longer passphrase with spaces in it"] {
            let hash = hash_password(password).expect("Failed to hash password");
            let is_valid = verify_password(password, &hash).expect("Failed to verify password");
            assert!(is_valid, "password {:?} should verify", password);
        }
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("ValidPassword123").expect("Failed to hash password");

        let is_valid = verify_password("WrongPassword123", &hash).expect("Failed to verify password");
        assert!(!is_valid);

        let is_valid = verify_password("", &hash).expect("Failed to verify password");
        assert!(!is_valid);
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let password = "same-input";
        let first = hash_password(password).expect("Failed to hash password");
        let second = hash_password(password).expect("Failed to hash password");

        assert_ne!(first, second);
        assert!(verify_password(password, &first).unwrap());
        assert!(verify_password(password, &second).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let result = verify_password("whatever", "not-a-bcrypt-hash");
        assert!(matches!(result, Err(AppError::Hashing(_))));
    }
}
