//! Email address validation and normalization.

use regex::Regex;
use std::sync::LazyLock;

/// Longest address accepted (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static LOCAL_PART: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._+-]+$").unwrap());

/// Checks an address against a conservative allow-list.
///
/// # Rules
///
/// - At most [`MAX_EMAIL_LENGTH`] bytes
/// - `local@domain.tld` shape with no whitespace and a single `@`
/// - Must not start with a formula leader (`=`, `+`, `-`, `@`, tab, CR)
/// - Local part limited to ASCII letters, digits, `.`, `_`, `+` and `-`
///
/// This is deliberately narrower than RFC 5321; quoted local parts and other
/// exotic forms are rejected.
///
/// # Examples
///
/// ```
/// use podcast_site::utils::email::validate_email;
///
/// assert!(validate_email("a@b.com"));
/// assert!(!validate_email("not-an-email"));
/// ```
pub fn validate_email(email: &str) -> bool {
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH {
        return false;
    }

    if !EMAIL_SHAPE.is_match(email) {
        return false;
    }

    if email.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        return false;
    }

    match email.split('@').next() {
        Some(local) => LOCAL_PART.is_match(local),
        None => false,
    }
}

/// Returns the uniqueness key for an address: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
