//! Repository trait for subscriber records.

use crate::domain::entities::SubscriberRecord;
use crate::domain::errors::StoreError;
use async_trait::async_trait;

/// Result of storing a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Inserted,
    /// A record with the same normalized email already existed; nothing written.
    AlreadyPresent,
}

/// Storage contract for subscriber records.
///
/// Implementations must make `put` atomic with respect to other `put` calls:
/// the uniqueness check and the write happen as one step, so two concurrent
/// subscribes for the same address store exactly one record.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::CsvSubscriberRepository`] - flat CSV file
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Stores `record` unless its normalized email is already present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the backing storage cannot be read or written.
    async fn put(&self, record: SubscriberRecord) -> Result<PutOutcome, StoreError>;

    /// Checks whether a normalized email is already stored.
    async fn exists_normalized(&self, email: &str) -> Result<bool, StoreError>;

    /// Returns the full export document (header row plus one row per record).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoRecords`] if nothing has ever been stored.
    async fn export_all(&self) -> Result<Vec<u8>, StoreError>;

    /// Returns every stored record in insertion order.
    async fn list(&self) -> Result<Vec<SubscriberRecord>, StoreError>;

    /// Returns true while the store can accept requests.
    fn is_healthy(&self) -> bool;
}
