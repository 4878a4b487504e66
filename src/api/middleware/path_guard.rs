//! Blocks direct retrieval of sensitive files.
//!
//! Runs before routing. A request whose path resolves to the subscriber
//! record file, a config or secrets file, package metadata, or source code
//! receives exactly the response an unknown route would get.

use std::borrow::Cow;
use std::path::Path;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

/// File names that are never served, compared case-insensitively against the
/// normalized final path segment.
const DENYLIST: &[&str] = &[
    "server.config.js",
    "config.js",
    ".env",
    "package.json",
    "package-lock.json",
    "cargo.toml",
    "cargo.lock",
];

const SOURCE_PREFIX: &str = "/src/";
const SOURCE_EXTENSIONS: &[&str] = &[".js", ".jsx", ".mjs", ".ts", ".tsx", ".rs"];

/// Build output and dev-server paths exempt from the source-file rule.
const ALLOWED_PREFIXES: &[&str] = &["/assets/", "/@"];

/// Percent-decoding rounds before giving up; defeats `%252e`-style double encoding.
const MAX_DECODE_ROUNDS: usize = 3;

/// Path classifier for sensitive files.
#[derive(Debug, Clone)]
pub struct PathGuard {
    blocked_names: Vec<String>,
}

impl PathGuard {
    /// Creates a guard that also blocks the basename of `record_file`.
    pub fn new(record_file: &Path) -> Self {
        let mut blocked_names: Vec<String> = DENYLIST.iter().map(|s| s.to_string()).collect();

        if let Some(name) = record_file.file_name().and_then(|n| n.to_str()) {
            let name = name.to_lowercase();
            if !blocked_names.contains(&name) {
                blocked_names.push(name);
            }
        }

        Self { blocked_names }
    }

    /// Returns `true` when `raw_path` must not be served.
    ///
    /// Malformed percent-encoding, invalid UTF-8 and NUL bytes all count as
    /// blocked.
    pub fn is_blocked(&self, raw_path: &str) -> bool {
        let Some(normalized) = normalize(raw_path) else {
            return true;
        };

        let basename = normalized.rsplit('/').next().unwrap_or_default();
        if self.blocked_names.iter().any(|name| name == basename) {
            return true;
        }

        let is_source = normalized.starts_with(SOURCE_PREFIX)
            || normalized == SOURCE_PREFIX.trim_end_matches('/')
            || SOURCE_EXTENSIONS.iter().any(|ext| normalized.ends_with(ext));

        is_source && !ALLOWED_PREFIXES.iter().any(|p| normalized.starts_with(p))
    }
}

/// Decodes, lowercases and resolves `.`/`..` segments.
///
/// Returns `None` if the path cannot be decoded.
fn normalize(raw_path: &str) -> Option<String> {
    let mut decoded: Cow<'_, str> = Cow::Borrowed(raw_path);

    for _ in 0..MAX_DECODE_ROUNDS {
        if !decoded.contains('%') {
            break;
        }
        if !has_valid_escapes(&decoded) {
            return None;
        }
        decoded = Cow::Owned(urlencoding::decode(&decoded).ok()?.into_owned());
    }

    if decoded.contains('\0') {
        return None;
    }

    let lowered = decoded.replace('\\', "/").to_lowercase();

    let mut segments: Vec<&str> = Vec::new();
    for segment in lowered.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    Some(format!("/{}", segments.join("/")))
}

fn has_valid_escapes(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

/// Middleware answering blocked paths with the not-found response.
///
/// # Example
///
/// ```rust,ignore
/// let app = router.layer(middleware::from_fn_with_state(state.clone(), path_guard::layer));
/// ```
pub async fn layer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if state.path_guard.is_blocked(req.uri().path()) {
        tracing::debug!(path = %req.uri().path(), "Blocked sensitive path");
        return state.not_found.not_found();
    }

    next.run(req).await
}
