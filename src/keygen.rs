//! Random key generation
//!
//! Public keys are drawn from ASCII letters and digits. Secret keys add `-` and
//! `_`, which keeps them safe to embed in a URL path without escaping.
//! Uniqueness is not checked here; see [`crate::service::LinkService::create`].

use rand::{distr::Alphanumeric, Rng};

/// Alphabet for secret keys (letters, digits, and two URL-safe symbols)
const SECRET_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Generates a random public key of `length` alphanumeric characters
pub fn generate_key(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Generates a random secret key of `length` characters from [`SECRET_ALPHABET`]
pub fn generate_secret_key(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(SECRET_ALPHABET[rng.random_range(0..SECRET_ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_has_requested_length() {
        assert_eq!(generate_key(5).len(), 5);
        assert_eq!(generate_key(12).len(), 12);
        assert!(generate_key(0).is_empty());
    }

    #[test]
    fn test_key_is_alphanumeric() {
        let key = generate_key(256);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_secret_key_uses_url_safe_alphabet() {
        let secret = generate_secret_key(512);
        assert_eq!(secret.len(), 512);
        assert!(secret
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_keys_differ_between_calls() {
        // 62^16 possibilities; a repeat here means the generator is broken
        assert_ne!(generate_key(16), generate_key(16));
        assert_ne!(generate_secret_key(16), generate_secret_key(16));
    }
}
