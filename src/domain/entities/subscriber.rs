//! Subscriber record entity.

use chrono::{DateTime, Utc};

use crate::utils::email::normalize_email;

/// A stored email signup.
///
/// `email` always holds the normalized form (trimmed, lowercased), which is
/// also the uniqueness key. Records are immutable once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberRecord {
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

impl SubscriberRecord {
    /// Creates a record, normalizing the address.
    pub fn new(email: &str, subscribed_at: DateTime<Utc>) -> Self {
        Self {
            email: normalize_email(email),
            subscribed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_normalizes_email() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let record = SubscriberRecord::new("  Listener@Example.COM ", at);

        assert_eq!(record.email, "listener@example.com");
        assert_eq!(record.subscribed_at, at);
    }
}
