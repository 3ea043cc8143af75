//! Salted password hashing
//!
//! Credentials are stored as `SHA-256(salt || password)` rendered as 64 hex
//! characters, with a per-account random 16-byte salt stored alongside.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Stored form of a password
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: String,
    pub salt: String,
}

/// Generate a random 16-byte salt as 32 hex characters
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash `password` with `salt`
///
/// # Examples
///
/// ```
/// use agro_common::password::hash_password;
///
/// let hash = hash_password("secret", "00ff");
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, hash_password("secret", "00ff"));
/// ```
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Hash a password under a fresh salt
pub fn hash_new_password(password: &str) -> PasswordHash {
    let salt = generate_salt();
    let hash = hash_password(password, &salt);
    PasswordHash { hash, salt }
}

/// Check `password` against a stored hash and salt
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let calculated = hash_password(password, salt);
    constant_time_eq(calculated.as_bytes(), expected_hash.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salts_are_unique() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_password_different_salt_differs() {
        let a = hash_new_password("hunter2");
        let b = hash_new_password("hunter2");
        assert_ne!(a.hash, b.hash);
        assert_ne!(a.hash, "hunter2");
    }

    #[test]
    fn test_verify_password() {
        let stored = hash_new_password("hunter2");
        assert!(verify_password("hunter2", &stored.salt, &stored.hash));
        assert!(!verify_password("hunter3", &stored.salt, &stored.hash));
        assert!(!verify_password("", &stored.salt, &stored.hash));
    }

    #[test]
    fn test_verify_rejects_truncated_hash() {
        let stored = hash_new_password("pw");
        assert!(!verify_password("pw", &stored.salt, &stored.hash[..10]));
    }
}
