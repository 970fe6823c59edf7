//! Secret digests and random tokens.
//!
//! Passwords, remember tokens and reset tokens are all stored as argon2 PHC
//! strings; plaintext never reaches the database.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, rngs::OsRng};

use crate::{EngineError, ResultEngine};

const TOKEN_BYTES: usize = 16;

/// Hash `secret` with a fresh salt.
pub fn digest(secret: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::Digest(err.to_string()))
}

/// `false` on mismatch and on a digest that cannot be parsed.
pub fn verify(digest: &str, secret: &str) -> bool {
    let Ok(hash) = PasswordHash::new(digest) else {
        return false;
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &hash)
        .is_ok()
}

/// URL-safe random token, 22 characters long.
pub fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_verifies_only_the_original_secret() {
        let hashed = digest("best_password").unwrap();
        assert_ne!(hashed, "best_password");
        assert!(verify(&hashed, "best_password"));
        assert!(!verify(&hashed, "best_passwore"));
    }

    #[test]
    fn garbage_digest_never_verifies() {
        assert!(!verify("", ""));
        assert!(!verify("not-a-phc-string", "anything"));
    }

    #[test]
    fn tokens_are_url_safe_and_distinct() {
        let a = new_token();
        let b = new_token();
        assert_eq!(a.len(), 22);
        assert_ne!(a, b);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
