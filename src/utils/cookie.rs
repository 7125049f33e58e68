//! Session cookie parsing and formatting.
//!
//! Browsers send only `name=value` pairs, but some clients echo the full
//! attribute set back. When an `Expires` attribute follows the session
//! cookie it is honoured.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "_access_token";

const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// The `Expires` attribute sent with the cookie is not an HTTP date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unreadable cookie expiry: {0}")]
pub struct UnreadableExpires(pub String);

/// The session cookie as found in a `Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCookie {
    pub value: String,
    /// Raw `Expires` attribute, when the client sent one.
    pub expires: Option<String>,
}

impl RequestCookie {
    /// Parses the raw `Expires` attribute.
    ///
    /// `Ok(None)` when no attribute was sent.
    pub fn expires_at(&self) -> Result<Option<DateTime<Utc>>, UnreadableExpires> {
        match &self.expires {
            None => Ok(None),
            Some(raw) => DateTime::parse_from_rfc2822(raw)
                .map(|t| Some(t.with_timezone(&Utc)))
                .map_err(|_| UnreadableExpires(raw.clone())),
        }
    }
}

/// Finds the named cookie in a `Cookie` header value.
pub fn find_cookie(header: &str, name: &str) -> Option<RequestCookie> {
    let mut found: Option<RequestCookie> = None;

    for part in header.split(';').map(str::trim) {
        let (key, value) = match part.split_once('=') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => continue,
        };

        if let Some(cookie) = found.as_mut() {
            if key.eq_ignore_ascii_case("expires") {
                cookie.expires = Some(value.to_string());
                continue;
            }
            if key.eq_ignore_ascii_case("path")
                || key.eq_ignore_ascii_case("max-age")
                || key.eq_ignore_ascii_case("samesite")
                || key.eq_ignore_ascii_case("domain")
            {
                continue;
            }
            break;
        }

        if key == name {
            found = Some(RequestCookie {
                value: value.to_string(),
                expires: None,
            });
        }
    }

    found
}

/// Builds the `Set-Cookie` value for a session token.
///
/// `HttpOnly` and `Secure` are only added in production, where the client is
/// served over TLS.
pub fn session_cookie(token: &str, expires: DateTime<Utc>, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; Expires={}; SameSite=Strict",
        expires.format(EXPIRES_FORMAT)
    );
    if secure {
        cookie.push_str("; HttpOnly; Secure");
    }
    cookie
}

/// Builds a `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}=; Path=/; Expires={}; Max-Age=0; SameSite=Strict",
        DateTime::<Utc>::UNIX_EPOCH.format(EXPIRES_FORMAT)
    );
    if secure {
        cookie.push_str("; HttpOnly; Secure");
    }
    cookie
}
