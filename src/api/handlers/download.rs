//! Handler for the password-protected subscriber export.

use axum::{
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};

use crate::api::dto::download::{DownloadRequest, EXPORT_FILENAME};
use crate::api::extract::ApiJson;
use crate::api::middleware::ClientIdentity;
use crate::error::AppError;
use crate::state::AppState;

/// Downloads the subscriber record file.
///
/// # Endpoint
///
/// `POST /api/download-emails`
///
/// # Request Body
///
/// ```json
/// { "password": "..." }
/// ```
///
/// # Response
///
/// `200` with `Content-Type: text/csv` and
/// `Content-Disposition: attachment; filename="emails.csv"`; the body is the
/// record file verbatim.
///
/// # Errors
///
/// - `401 {"error": "Invalid password"}`
/// - `429 {"error": "Too many attempts, please try again later"}` with `Retry-After`,
///   once the caller exceeds its attempt budget (checked before the password)
/// - `404 {"error": "No emails collected yet"}` - no record file yet
pub async fn download_handler(
    State(state): State<AppState>,
    client: ClientIdentity,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<DownloadRequest>,
) -> Result<Response, AppError> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    let password = payload.password.unwrap_or_default();

    let grant = state
        .admin_gate
        .authorize(&password, client.as_str())
        .inspect_err(|_| {
            tracing::warn!(client = client.as_str(), user_agent, "Subscriber export refused");
        })?;

    let csv = state.subscriber_service.export_all(grant).await?;

    tracing::info!(
        client = client.as_str(),
        user_agent,
        bytes = csv.len(),
        "Subscriber export downloaded"
    );

    let disposition = format!("attachment; filename=\"{EXPORT_FILENAME}\"");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
