use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Salted Argon2id digest in PHC string form.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("argon2 hash failed: {e}"))?;
    Ok(digest.to_string())
}

/// `Ok(false)` for a wrong password; `Err` only when the stored digest is unreadable.
pub fn verify_password(plain: &str, digest: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(digest).map_err(|e| anyhow::anyhow!("stored digest unreadable: {e}"))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

pub fn is_strong_enough(plain: &str) -> bool {
    plain.chars().count() >= MIN_PASSWORD_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_verifies_and_differs_from_plaintext() {
        let password = "longenough";
        let digest = hash_password(password).expect("hashing should succeed");
        assert_ne!(digest, password);
        assert!(verify_password(password, &digest).expect("verify should succeed"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("longenough").unwrap();
        let b = hash_password("longenough").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_password_is_false_not_error() {
        let digest = hash_password("correct-horse-battery-staple").unwrap();
        assert!(!verify_password("wrong-password", &digest).expect("verify should not error"));
    }

    #[test]
    fn malformed_digest_is_an_error() {
        assert!(verify_password("anything", "not-a-valid-hash").is_err());
    }

    #[test]
    fn length_policy_counts_characters() {
        assert!(!is_strong_enough("short"));
        assert!(!is_strong_enough("1234567"));
        assert!(is_strong_enough("12345678"));
        assert!(is_strong_enough("ééééééé\u{e9}"));
    }
}
