//! Cryptographic utilities for webhook verification.
//!
//! Midtrans signs notifications with plain SHA-512 over
//! `order_id + status_code + gross_amount + server_key`, not an HMAC.

use sha2::{Digest, Sha512};

/// Compute SHA-512 and return the hex-encoded digest (128 characters).
#[must_use]
pub fn sha512_hex(message: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(message.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time string comparison to prevent timing attacks.
///
/// This function compares two strings in constant time to prevent timing
/// side-channel attacks when verifying signatures.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha512_produces_correct_length() {
        let result = sha512_hex("The quick brown fox jumps over the lazy dog");
        assert_eq!(result.len(), 128); // SHA512 = 64 bytes = 128 hex chars
    }

    #[test]
    fn sha512_is_deterministic() {
        assert_eq!(sha512_hex("message"), sha512_hex("message"));
        assert_ne!(sha512_hex("message1"), sha512_hex("message2"));
    }

    #[test]
    fn constant_time_eq_equal_strings() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(constant_time_eq("", ""));
        assert!(constant_time_eq("longer string here", "longer string here"));
    }

    #[test]
    fn constant_time_eq_different_strings() {
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "ab"));
        assert!(!constant_time_eq("ab", "abc"));
        assert!(!constant_time_eq("abc", "ABC"));
    }
}
