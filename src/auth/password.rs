use anyhow::anyhow;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

/// One-way hash for storage. Every call draws a fresh salt, so the same
/// password yields different encodings that all verify.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("argon2 hash failed: {e}"))
}

/// Check `plain` against a stored PHC string. Argon2 verification runs in
/// time independent of where a mismatch occurs. `Err` only when the stored
/// hash itself is malformed.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(stored).map_err(|e| anyhow!("stored hash is malformed: {e}"))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_salts_every_call() {
        let first = hash_password("abc123").expect("hash");
        let second = hash_password("abc123").expect("hash");
        assert_ne!(first, second);
        assert!(verify_password("abc123", &first).expect("verify"));
        assert!(verify_password("abc123", &second).expect("verify"));
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hash = hash_password("xyz789").expect("hash");
        assert!(!verify_password("xyz788", &hash).expect("verify"));
        assert!(!verify_password("", &hash).expect("verify"));
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        assert!(verify_password("anything", "$argon2id$garbage").is_err());
        assert!(verify_password("anything", "").is_err());
    }
}
