//! Client identification utilities
//!
//! Common functions for identifying clients via connection info and
//! HTTP headers.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Key used when no address can be determined for a request
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Extract client IP address
///
/// When `trust_forwarded_for` is set (the service runs behind a reverse
/// proxy that rewrites the header), the first `X-Forwarded-For` hop wins.
/// Otherwise the header is ignored: a client can put anything there.
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `direct_ip` - Peer address of the TCP connection
/// * `trust_forwarded_for` - Whether `X-Forwarded-For` comes from a trusted proxy
///
/// ## Returns
/// The client IP address, or None if not determinable
pub fn extract_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trust_forwarded_for: bool,
) -> Option<IpAddr> {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|xff| xff.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());
        if forwarded.is_some() {
            return forwarded;
        }
    }
    direct_ip
}

/// Stable string key for a client address
pub fn client_key(ip: Option<IpAddr>) -> String {
    ip.map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
