//! DTOs for the newsletter signup endpoint.

use serde::{Deserialize, Serialize};

use super::lenient_string;

pub const SUBSCRIBED_MESSAGE: &str = "Thanks for subscribing!";

/// `POST /api/subscribe` body.
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
}

/// Returned for both new and already-known addresses.
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: String,
}

impl SubscribeResponse {
    pub fn subscribed() -> Self {
        Self {
            success: true,
            message: SUBSCRIBED_MESSAGE.to_string(),
        }
    }
}
