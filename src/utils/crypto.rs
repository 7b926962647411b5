//! Cryptographic utilities
//!
//! Opaque tokens (refresh, verification, reset) are random strings handed to
//! the client once; only their SHA-256 hash is stored, so a database leak
//! does not leak usable credentials.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a cryptographically secure random token
pub fn generate_secure_token(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();

    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hash an opaque token with SHA-256 for storage and lookup
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secure_token() {
        let token1 = generate_secure_token(64);
        let token2 = generate_secure_token(64);

        assert_eq!(token1.len(), 64);
        assert_eq!(token2.len(), 64);
        assert_ne!(token1, token2);
        assert!(token1.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_hash_token_is_stable() {
        let hash1 = hash_token("token");
        let hash2 = hash_token("token");
        let hash3 = hash_token("other");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        // SHA-256 hex digest
        assert_eq!(hash1.len(), 64);
    }
}
