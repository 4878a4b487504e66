//! Email signup and export service.

use std::sync::Arc;

use crate::application::services::admin_gate::ExportGrant;
use crate::domain::clock::Clock;
use crate::domain::entities::SubscriberRecord;
use crate::domain::errors::{StoreError, SubscribeError};
use crate::domain::repositories::{PutOutcome, SubscriberRepository};
use crate::utils::email::{normalize_email, validate_email};

/// Service for collecting and exporting subscriber emails.
///
/// Subscribing an address that is already stored succeeds exactly like a new
/// signup, so callers cannot probe which addresses are on the list.
pub struct SubscriberService<R: SubscriberRepository> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: SubscriberRepository> SubscriberService<R> {
    /// Creates a new subscriber service.
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Validates and stores an email address.
    ///
    /// The address is checked with [`validate_email`] as received, then
    /// normalized (trimmed, lowercased) before the uniqueness check.
    ///
    /// # Errors
    ///
    /// Returns [`SubscribeError::InvalidEmail`] if validation fails.
    /// Returns [`SubscribeError::Store`] if the record store fails.
    pub async fn subscribe(&self, email: &str) -> Result<(), SubscribeError> {
        if !validate_email(email) {
            metrics::counter!("subscriptions_total", "outcome" => "invalid").increment(1);
            return Err(SubscribeError::InvalidEmail);
        }

        let record = SubscriberRecord::new(email, self.clock.now());

        match self.repository.put(record).await? {
            PutOutcome::Inserted => {
                tracing::info!("New subscriber stored");
                metrics::counter!("subscriptions_total", "outcome" => "created").increment(1);
            }
            PutOutcome::AlreadyPresent => {
                tracing::debug!("Subscriber already present");
                metrics::counter!("subscriptions_total", "outcome" => "duplicate").increment(1);
            }
        }

        Ok(())
    }

    /// Returns the export document. Requires a grant from the admin gate.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoRecords`] if nobody has subscribed yet.
    pub async fn export_all(&self, _grant: ExportGrant) -> Result<Vec<u8>, StoreError> {
        self.repository.export_all().await
    }

    /// Lists stored records. Operator tooling only.
    pub async fn list(&self) -> Result<Vec<SubscriberRecord>, StoreError> {
        self.repository.list().await
    }

    /// Whether `email` (after normalization) is already stored. Operator
    /// tooling only; the HTTP surface never reveals this.
    pub async fn is_subscribed(&self, email: &str) -> Result<bool, StoreError> {
        self.repository
            .exists_normalized(&normalize_email(email))
            .await
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.repository.list().await?.len())
    }

    /// Returns true while the record store accepts requests.
    pub fn is_healthy(&self) -> bool {
        self.repository.is_healthy()
    }
}
