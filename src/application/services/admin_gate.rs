//! Password gate in front of the subscriber export.

use std::sync::Arc;

use chrono::TimeDelta;
use dashmap::DashMap;

use crate::domain::clock::Clock;
use crate::domain::entities::AttemptWindow;
use crate::domain::errors::AuthError;
use crate::utils::constant_time::constant_time_eq;

/// Identities tracked before expired windows are swept.
const PRUNE_THRESHOLD: usize = 1024;

/// Proof that the admin gate accepted a password.
///
/// Only [`AdminGate::authorize`] can create one, and
/// [`crate::application::services::SubscriberService::export_all`] consumes it,
/// so each successful authorization allows exactly one export.
#[derive(Debug)]
#[must_use]
pub struct ExportGrant {
    _private: (),
}

/// Attempt budget for the gate.
#[derive(Debug, Clone, Copy)]
pub struct GateLimits {
    pub max_attempts: u32,
    pub window: TimeDelta,
}

impl Default for GateLimits {
    /// Five attempts per fifteen minutes.
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: TimeDelta::minutes(15),
        }
    }
}

/// Timing-safe password check with a per-client fixed-window attempt limit.
///
/// Every call to [`Self::authorize`] counts as one attempt for the given
/// client identity. Once the count exceeds the limit inside the current
/// window, further calls are rejected without looking at the password. A
/// successful check clears the identity's counter.
///
/// Counters live in memory only; a restart forgets them.
pub struct AdminGate {
    secret: String,
    limits: GateLimits,
    attempts: DashMap<String, AttemptWindow>,
    clock: Arc<dyn Clock>,
}

impl AdminGate {
    /// Creates a gate for `secret`. The secret must come from configuration.
    pub fn new(secret: String, limits: GateLimits, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret,
            limits,
            attempts: DashMap::new(),
            clock,
        }
    }

    /// Checks `provided` against the configured secret for `client`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::RateLimited`] when `client` has used up its
    /// attempts in the current window (the password is not checked).
    /// Returns [`AuthError::InvalidCredentials`] when the password is wrong.
    pub fn authorize(&self, provided: &str, client: &str) -> Result<ExportGrant, AuthError> {
        let now = self.clock.now();

        if self.attempts.len() > PRUNE_THRESHOLD {
            self.prune_expired();
        }

        let window = {
            let mut entry = self
                .attempts
                .entry(client.to_string())
                .or_insert_with(|| AttemptWindow::open(now));

            if entry.is_expired(now, self.limits.window) {
                *entry = AttemptWindow::open(now);
            }
            entry.attempts = entry.attempts.saturating_add(1);
            *entry
        };

        if window.attempts > self.limits.max_attempts {
            let retry_after = window
                .remaining(now, self.limits.window)
                .to_std()
                .unwrap_or_default();

            tracing::warn!(
                client,
                attempts = window.attempts,
                at = %now.to_rfc3339(),
                "Admin auth rate limited"
            );
            metrics::counter!("admin_auth_total", "outcome" => "rate_limited").increment(1);

            return Err(AuthError::RateLimited { retry_after });
        }

        if !constant_time_eq(provided, &self.secret) {
            tracing::warn!(
                client,
                attempts = window.attempts,
                at = %now.to_rfc3339(),
                "Failed admin auth attempt"
            );
            metrics::counter!("admin_auth_total", "outcome" => "denied").increment(1);

            return Err(AuthError::InvalidCredentials);
        }

        self.attempts.remove(client);
        metrics::counter!("admin_auth_total", "outcome" => "granted").increment(1);

        Ok(ExportGrant { _private: () })
    }

    /// Drops windows that have already closed.
    pub fn prune_expired(&self) {
        let now = self.clock.now();
        let window = self.limits.window;
        self.attempts.retain(|_, w| !w.is_expired(now, window));
    }

    /// Number of identities currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.attempts.len()
    }
}
