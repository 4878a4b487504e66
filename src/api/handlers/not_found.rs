//! Not-found responses and the client-side routing fallback.

use axum::{
    body::Bytes,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

use crate::state::AppState;

/// What an unknown or blocked path receives.
#[derive(Debug, Clone)]
pub enum NotFoundPage {
    /// Development: bare `404 Not found`.
    Plain,
    /// Production: the client's `index.html`, which renders its own not-found view.
    Spa(Bytes),
}

impl NotFoundPage {
    /// The shared 404 response. Blocked paths get exactly this.
    pub fn not_found(&self) -> Response {
        match self {
            Self::Plain => (StatusCode::NOT_FOUND, "Not found").into_response(),
            Self::Spa(index) => html(StatusCode::NOT_FOUND, index.clone()),
        }
    }

    /// Response for a path the client router may own.
    pub fn client_route(&self) -> Response {
        match self {
            Self::Plain => self.not_found(),
            Self::Spa(index) => html(StatusCode::OK, index.clone()),
        }
    }
}

fn html(status: StatusCode, body: Bytes) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Whether `path` looks like a client-side route rather than a file or API call.
///
/// Client routes have no file extension in their last segment and are not
/// under `/api`.
pub fn is_client_route(path: &str) -> bool {
    if path == "/api" || path.starts_with("/api/") {
        return false;
    }

    let last = path.rsplit('/').next().unwrap_or_default();
    !last.contains('.')
}

/// Fallback for every request no route or static file answered.
pub async fn fallback_handler(State(state): State<AppState>, uri: Uri) -> Response {
    if is_client_route(uri.path()) {
        state.not_found.client_route()
    } else {
        state.not_found.not_found()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_routes() {
        assert!(is_client_route("/"));
        assert!(is_client_route("/episodes/42"));
        assert!(is_client_route("/about"));

        assert!(!is_client_route("/favicon.ico"));
        assert!(!is_client_route("/assets/missing.js"));
        assert!(!is_client_route("/api/unknown"));
        assert!(!is_client_route("/api"));
    }

    #[test]
    fn test_plain_never_serves_200() {
        let page = NotFoundPage::Plain;

        assert_eq!(page.not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(page.client_route().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_spa_statuses() {
        let page = NotFoundPage::Spa(Bytes::from_static(b"<!doctype html>"));

        assert_eq!(page.not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(page.client_route().status(), StatusCode::OK);
    }
}
