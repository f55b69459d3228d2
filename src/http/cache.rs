//! Content fingerprinting module
//!
//! Provides strong `ETag` generation from source bytes.

use sha1::{Digest, Sha1};

/// Lowercase hex SHA-1 digest of `content`
pub fn fingerprint(content: &[u8]) -> String {
    hex::encode(Sha1::digest(content))
}

/// Generate a strong `ETag`
///
/// # Arguments
/// * `content` - Source bytes of the resource
///
/// # Returns
/// Quoted `ETag` string, e.g., `"2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"`
pub fn generate_etag(content: &[u8]) -> String {
    format!("\"{}\"", fingerprint(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_known_value() {
        assert_eq!(
            fingerprint(b"hello world"),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
        assert_eq!(
            fingerprint(b""),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn test_generate_etag() {
        let etag = generate_etag(b"hello world");
        assert_eq!(etag, "\"2aae6c35c94fcfb415dbe95f408b9ce91ee846ed\"");
    }

    #[test]
    fn test_etag_consistency() {
        let etag1 = generate_etag(b"same content");
        let etag2 = generate_etag(b"same content");
        assert_eq!(etag1, etag2);
    }

    #[test]
    fn test_etag_changes_with_any_byte() {
        let base = b"content a".to_vec();
        let original = generate_etag(&base);
        for i in 0..base.len() {
            let mut changed = base.clone();
            changed[i] ^= 0x01;
            assert_ne!(generate_etag(&changed), original, "byte {i}");
        }
    }
}
