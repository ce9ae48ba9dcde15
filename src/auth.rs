//! Staff credentials
//!
//! Passwords are stored as Argon2id PHC strings with a random salt, never
//! in plain text.

use anyhow::{Result, anyhow};
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use tracing::info;

use crate::db::Database;
use crate::error::ValidationError;
use crate::validate;

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("hashing password: {}", e))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("stored hash unreadable: {}", e))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("verifying password: {}", e)),
    }
}

/// Create an account; a taken username surfaces as `GymError::UsernameTaken`
pub fn register(db: &Database, username: &str, password: &str) -> Result<i64> {
    let username = validate::required("username", username)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN).into());
    }
    let id = db.add_credential(username, &hash_password(password)?)?;
    info!("Registered {}", username);
    Ok(id)
}

/// False for an unknown user or a wrong password
pub fn login(db: &Database, username: &str, password: &str) -> Result<bool> {
    match db.get_password_hash(username.trim())? {
        Some(hash) => verify_password(password, &hash),
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GymError;

    #[test]
    fn test_hash_is_salted_argon2id() {
        let a = hash_password("correct-horse").unwrap();
        let b = hash_password("correct-horse").unwrap();
        assert!(a.starts_with("$argon2id$"));
        assert_ne!(a, b);
        assert!(!a.contains("correct-horse"));
    }

    #[test]
    fn test_register_and_login() {
        let db = Database::open_in_memory().unwrap();
        register(&db, "frontdesk", "s3cret-pass").unwrap();

        assert!(login(&db, "frontdesk", "s3cret-pass").unwrap());
        assert!(!login(&db, "frontdesk", "wrong-pass").unwrap());
        assert!(!login(&db, "nobody", "s3cret-pass").unwrap());
    }

    #[test]
    fn test_register_duplicate() {
        let db = Database::open_in_memory().unwrap();
        register(&db, "frontdesk", "s3cret-pass").unwrap();
        let err = register(&db, "frontdesk", "another-pass").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GymError>(),
            Some(GymError::UsernameTaken(_))
        ));
    }

    #[test]
    fn test_register_validation() {
        let db = Database::open_in_memory().unwrap();
        let err = register(&db, "frontdesk", "short").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::PasswordTooShort(MIN_PASSWORD_LEN))
        );
        assert!(register(&db, "  ", "long-enough").is_err());
    }
}
