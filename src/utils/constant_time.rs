//! Timing-independent secret comparison.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Key for the comparison MACs. It does not need to be secret: the MAC only
/// maps both inputs to fixed-length tags that are then compared in constant
/// time.
const COMPARE_KEY: &[u8] = b"podcast-site/secret-compare";

/// Compares two strings without an early exit on the first differing byte.
///
/// Both values are run through HMAC-SHA256 and the tags are checked with
/// [`Mac::verify_slice`]. Inputs of different lengths therefore take the
/// same path as inputs of equal length, and the check reveals neither the
/// position of the first mismatch nor the length of `b`.
///
/// # Examples
///
/// ```
/// use podcast_site::utils::constant_time::constant_time_eq;
///
/// assert!(constant_time_eq("secret", "secret"));
/// assert!(!constant_time_eq("secret", "secreT"));
/// assert!(!constant_time_eq("short", "much longer"));
/// ```
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let expected = tag(b);

    let mut mac = keyed();
    mac.update(a.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

fn keyed() -> HmacSha256 {
    HmacSha256::new_from_slice(COMPARE_KEY).expect("HMAC accepts any key length")
}

fn tag(value: &str) -> Vec<u8> {
    let mut mac = keyed();
    mac.update(value.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal() {
        assert!(constant_time_eq("hunter2", "hunter2"));
        assert!(constant_time_eq("", ""));
    }

    #[test]
    fn test_different_content() {
        assert!(!constant_time_eq("hunter2", "hunter3"));
        assert!(!constant_time_eq("Hunter2", "hunter2"));
    }

    #[test]
    fn test_different_length() {
        assert!(!constant_time_eq("hunter2", "hunter22"));
        assert!(!constant_time_eq("", "x"));
        assert!(!constant_time_eq("x", ""));
    }

    #[test]
    fn test_multibyte() {
        assert!(constant_time_eq("pässwörd", "pässwörd"));
        assert!(!constant_time_eq("pässwörd", "passwörd"));
    }

    #[test]
    fn test_tags_are_fixed_length() {
        assert_eq!(tag("").len(), 32);
        assert_eq!(tag(&"x".repeat(4096)).len(), 32);
    }
}
