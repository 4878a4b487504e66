//! Handler for the newsletter signup endpoint.

use axum::{Json, extract::State};

use crate::api::dto::subscribe::{SubscribeRequest, SubscribeResponse};
use crate::api::extract::ApiJson;
use crate::error::AppError;
use crate::state::AppState;

/// Records a newsletter signup.
///
/// # Endpoint
///
/// `POST /api/subscribe`
///
/// # Request Body
///
/// ```json
/// { "email": "listener@example.com" }
/// ```
///
/// # Response
///
/// New and already-subscribed addresses get the same answer, so the endpoint
/// cannot be used to test whether an address is on the list:
///
/// ```json
/// { "success": true, "message": "Thanks for subscribing!" }
/// ```
///
/// # Errors
///
/// - `400 {"error": "Invalid email address"}` - missing, non-string or invalid email
/// - `400 {"error": "Invalid request body"}` - body is not JSON
/// - `500` - the record file could not be written
pub async fn subscribe_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SubscribeRequest>,
) -> Result<Json<SubscribeResponse>, AppError> {
    let email = payload.email.unwrap_or_default();

    state.subscriber_service.subscribe(&email).await?;

    Ok(Json(SubscribeResponse::subscribed()))
}
