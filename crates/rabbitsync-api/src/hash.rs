// Broker-compatible password hashing.
//
// The management API accepts a pre-computed `password_hash` instead of
// a plaintext password: base64(salt ++ SHA-256(salt ++ password)) with
// a 4-byte salt. Computing the hash client-side lets an update round
// trip a user's settings without ever learning the plaintext.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Algorithm identifier the broker expects alongside a SHA-256 hash.
pub const HASHING_ALGORITHM_SHA256: &str = "rabbit_password_hashing_sha256";

/// Compute a salted SHA-256 password hash with a fresh random salt.
pub fn salted_password_hash_sha256(password: &str) -> String {
    let mut salt = [0u8; 4];
    rand::thread_rng().fill_bytes(&mut salt);
    hash_with_salt(salt, password)
}

fn hash_with_salt(salt: [u8; 4], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    let mut out = Vec::with_capacity(salt.len() + digest.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&digest);
    STANDARD.encode(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    // Worked example from the RabbitMQ passwords documentation.
    #[test]
    fn known_salt_matches_documented_hash() {
        let hash = hash_with_salt([0x90, 0x8d, 0xc6, 0x0a], "test12");
        assert_eq!(hash, "kI3GCqW5JLMJa4iX1lo7X4D6XbYqlLgxIs30+P6tENUV2POR");
    }

    #[test]
    fn hash_has_salt_plus_digest_length() {
        let hash = salted_password_hash_sha256("anything");
        let raw = STANDARD.decode(hash).unwrap();
        assert_eq!(raw.len(), 4 + 32);
    }

    // Same plaintext, different salt: rotation always yields fresh bytes.
    #[test]
    fn repeated_hashing_differs() {
        let a = salted_password_hash_sha256("same");
        let b = salted_password_hash_sha256("same");
        assert_ne!(a, b);
    }
}
