use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

use crate::core::errors::{ApiError, ApiResult};

pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Hash(e.to_string()))
}

/// Unparseable hashes verify as false rather than erroring, the same as a
/// wrong password.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Content guard shared by posts and comments: non-blank and bounded.
pub fn validate_content(what: &str, content: &str, max: usize) -> ApiResult<()> {
    if content.trim().is_empty() {
        return Err(ApiError::InvalidContent(format!("{what} must not be blank")));
    }
    validate_len(what, content, max)
}

/// Length-only guard for fields where blank is fine (bio, image urls).
pub fn validate_len(what: &str, value: &str, max: usize) -> ApiResult<()> {
    if value.len() > max {
        return Err(ApiError::InvalidContent(format!("{what} too long (max {max} chars)")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn garbage_hash_verifies_false() {
        assert!(!verify_password("hunter2", "not-a-phc-string"));
        assert!(!verify_password("hunter2", ""));
    }

    #[test]
    fn content_must_not_be_blank() {
        assert!(validate_content("post content", "hello", 100).is_ok());
        let err = validate_content("post content", "   \n\t", 100).unwrap_err();
        assert_eq!(err, ApiError::InvalidContent("post content must not be blank".into()));
    }

    #[test]
    fn content_is_bounded() {
        let long = "x".repeat(101);
        let err = validate_content("comment content", &long, 100).unwrap_err();
        assert_eq!(
            err,
            ApiError::InvalidContent("comment content too long (max 100 chars)".into())
        );
        assert!(validate_len("bio", "", 10).is_ok());
        assert!(validate_len("bio", &long, 100).is_err());
    }
}
