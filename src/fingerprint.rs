//! Content fingerprinting for novelty detection.
//!
//! The fingerprint is a SHA-256 digest of the raw payload bytes, rendered as
//! lowercase hex. It stands in for content equality: two payloads with the
//! same digest are treated as the same publication.

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 digest of `bytes`.
///
/// Pure and deterministic; identical inputs always yield identical digests.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn identical_bytes_yield_identical_digests() {
        let payload = b"%PDF-1.4 fake payload".to_vec();
        assert_eq!(sha256_hex(&payload), sha256_hex(&payload.clone()));
    }

    #[test]
    fn single_byte_change_yields_different_digest() {
        let a = b"%PDF-1.4 payload A".to_vec();
        let mut b = a.clone();
        b[17] ^= 0x01;
        assert_ne!(sha256_hex(&a), sha256_hex(&b));
    }

    #[test]
    fn digest_is_fixed_length_lowercase_hex() {
        let digest = sha256_hex(b"anything");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
