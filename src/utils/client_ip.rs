//! Caller network identity used in rate-limit keys.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Resolves the caller address.
///
/// Behind a trusted proxy the first `X-Forwarded-For` entry wins, then
/// `X-Real-IP`. Otherwise only the socket peer is trusted. Falls back to
/// `"unknown"` when neither is available, so such callers share one bucket.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> String {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }

        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = real_ip {
            return ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
