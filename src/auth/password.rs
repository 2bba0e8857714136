//! Password hashing.
//!
//! Hashes are argon2 PHC strings. An account without a usable password holds
//! a value starting with [`UNUSABLE_PREFIX`], which never parses as a PHC
//! string and so never verifies.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::{Rng, distr::Alphanumeric};

pub const UNUSABLE_PREFIX: char = '!';

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| e.to_string())
}

pub fn make_unusable_password() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(40)
        .map(char::from)
        .collect();
    format!("{UNUSABLE_PREFIX}{suffix}")
}

pub fn has_usable_password(password_hash: &str) -> bool {
    !password_hash.starts_with(UNUSABLE_PREFIX)
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    if !has_usable_password(password_hash) {
        return false;
    }

    match PasswordHash::new(password_hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(e) => {
            tracing::warn!("stored password hash is malformed: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("secret123").unwrap();
        assert_ne!(hash, "secret123");
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("secret124", &hash));
    }

    #[test]
    fn unusable_never_verifies() {
        let hash = make_unusable_password();
        assert!(!has_usable_password(&hash));
        assert!(!verify_password("", &hash));
        assert!(!verify_password(&hash, &hash));
    }
}
