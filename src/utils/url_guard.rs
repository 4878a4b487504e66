//! Outbound URL allow-list for server-side fetches.
//!
//! The feed endpoint only ever fetches the configured feed URL, so this check
//! currently guards configuration (see [`crate::config::Config::validate`]).
//! It is the gate any caller-supplied URL must pass before the server fetches it.

use std::net::{Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

/// Hostnames of cloud instance-metadata services.
const METADATA_HOSTS: [&str; 3] = [
    "metadata.google.internal",
    "metadata.goog",
    "metadata.azure.com",
];

/// Returns `true` when `input` is an http(s) URL pointing at a public host.
///
/// Rejects:
/// - anything that fails to parse, and any scheme other than `http`/`https`
/// - `localhost` (and `*.localhost`), loopback addresses
/// - `10.0.0.0/8`, `172.16.0.0/12`, `192.168.0.0/16`, `169.254.0.0/16`, `0.0.0.0/8`
/// - IPv6 loopback, unspecified, unique-local and link-local addresses, and
///   IPv4-mapped forms of the ranges above
/// - `*.internal` names and known metadata hostnames
///
/// # Examples
///
/// ```
/// use podcast_site::utils::url_guard::is_external_url_allowed;
///
/// assert!(is_external_url_allowed("https://feeds.example.com/show.rss"));
/// assert!(!is_external_url_allowed("http://169.254.169.254/latest/meta-data"));
/// ```
pub fn is_external_url_allowed(input: &str) -> bool {
    let Ok(url) = Url::parse(input) else {
        return false;
    };

    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }

    match url.host() {
        Some(Host::Domain(domain)) => is_public_domain(&domain.to_ascii_lowercase()),
        Some(Host::Ipv4(ip)) => is_public_ipv4(ip),
        Some(Host::Ipv6(ip)) => is_public_ipv6(ip),
        None => false,
    }
}

fn is_public_domain(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.');

    if domain == "localhost" || domain.ends_with(".localhost") {
        return false;
    }

    if domain.ends_with(".internal") || METADATA_HOSTS.contains(&domain) {
        return false;
    }

    true
}

fn is_public_ipv4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();

    let blocked = a == 0
        || a == 10
        || a == 127
        || (a == 172 && (16..=31).contains(&b))
        || (a == 192 && b == 168)
        || (a == 169 && b == 254);

    !blocked
}

fn is_public_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_public_ipv4(mapped);
    }

    let first = ip.segments()[0];
    let unique_local = (first & 0xfe00) == 0xfc00;
    let link_local = (first & 0xffc0) == 0xfe80;

    !(ip.is_loopback() || ip.is_unspecified() || unique_local || link_local)
}
