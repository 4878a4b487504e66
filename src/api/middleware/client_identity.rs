//! Client identity resolution shared by the admin gate and rate limiting.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::{HeaderMap, Request, request::Parts},
};
use tower_governor::{GovernorError, key_extractor::KeyExtractor};

use crate::state::AppState;

/// Identity reported when neither proxy headers nor the peer address are available.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Best-effort identifier for the caller.
///
/// When the service runs behind a trusted reverse proxy the first
/// `X-Forwarded-For` hop (or `X-Real-IP`) is used; otherwise the peer socket
/// address. Proxy headers are ignored unless `BEHIND_PROXY` is set, since any
/// client can send them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(pub String);

impl ClientIdentity {
    pub fn resolve(
        headers: &HeaderMap,
        peer: Option<&ConnectInfo<SocketAddr>>,
        behind_proxy: bool,
    ) -> Self {
        if behind_proxy && let Some(ip) = forwarded_ip(headers) {
            return Self(ip);
        }

        match peer {
            Some(ConnectInfo(addr)) => Self(addr.ip().to_string()),
            None => Self(UNKNOWN_CLIENT.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let first_hop = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    first_hop.or_else(real_ip).map(str::to_string)
}

impl<S> FromRequestParts<S> for ClientIdentity
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let peer = parts.extensions.get::<ConnectInfo<SocketAddr>>();

        Ok(Self::resolve(&parts.headers, peer, state.behind_proxy))
    }
}

/// `tower_governor` key extractor keyed by [`ClientIdentity`].
///
/// Never fails: callers without a resolvable address share the
/// [`UNKNOWN_CLIENT`] bucket.
#[derive(Debug, Clone, Copy)]
pub struct ClientIdentityKeyExtractor {
    pub behind_proxy: bool,
}

impl KeyExtractor for ClientIdentityKeyExtractor {
    type Key = String;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let peer = req.extensions().get::<ConnectInfo<SocketAddr>>();

        Ok(ClientIdentity::resolve(req.headers(), peer, self.behind_proxy).0)
    }
}
