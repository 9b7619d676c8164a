// hasher.rs — Content fingerprints for declared artifacts.
//
// A fingerprint is the lowercase hex SHA-256 of the raw file bytes, cut to a
// fixed number of characters so it stays readable in reports. Deployed-state
// backends must produce fingerprints with the same function to compare equal.

use sha2::{Digest, Sha256};

/// Hash arbitrary bytes, returning a lowercase hex-encoded SHA-256 string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Truncated hash used in drift records. `len` is clamped to the digest length.
pub fn fingerprint(data: &[u8], len: usize) -> String {
    let mut hash = hash_bytes(data);
    hash.truncate(len.clamp(1, 64));
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_known_value() {
        assert_eq!(
            hash_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn fingerprint_is_a_prefix_of_the_full_hash() {
        let full = hash_bytes(b"workflow");
        let short = fingerprint(b"workflow", 16);
        assert_eq!(short.len(), 16);
        assert!(full.starts_with(&short));
    }

    #[test]
    fn fingerprint_length_is_clamped() {
        assert_eq!(fingerprint(b"x", 500).len(), 64);
        assert_eq!(fingerprint(b"x", 0).len(), 1);
    }
}
