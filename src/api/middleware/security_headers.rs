//! Hardening headers applied to every response.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, header},
    middleware::Next,
    response::Response,
};

/// Header set sent with every response. No CSP or HSTS: the client bundle
/// and TLS termination are owned by the deployment.
const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("referrer-policy", "no-referrer"),
    ("x-dns-prefetch-control", "off"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("x-download-options", "noopen"),
    ("x-permitted-cross-domain-policies", "none"),
    ("origin-agent-cluster", "?1"),
];

/// Adds [`SECURITY_HEADERS`] to the response, keeping any value a handler
/// already set.
///
/// # Example
///
/// ```rust,ignore
/// let app = router.layer(middleware::from_fn(security_headers::layer));
/// ```
pub async fn layer(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for &(name, value) in SECURITY_HEADERS {
        if !headers.contains_key(name) {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
    }

    // Never advertise the server implementation.
    headers.remove(header::SERVER);
    headers.remove("x-powered-by");

    response
}
