//! Payload self-validation contract.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;
use validator::ValidationErrors;

/// Characters allowed in a caller-supplied alias. Compiled once and never
/// mutated.
static ALIAS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

pub const ALIAS_MIN_LEN: usize = 3;
pub const ALIAS_MAX_LEN: usize = 8;

/// A decoded payload able to check its own invariants.
///
/// Returns `None` when valid, otherwise the message shown to the client.
pub trait Validatable {
    fn validate_payload(&self) -> Option<String>;
}

/// Flattens `validator` errors into one message, fields in name order.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Alias rule shared by every entry point: 3 to 8 characters from the
/// URL-safe alphabet.
pub fn alias_problem(alias: &str) -> Option<String> {
    let len = alias.chars().count();
    if !(ALIAS_MIN_LEN..=ALIAS_MAX_LEN).contains(&len) {
        return Some(format!(
            "alias length must be within {ALIAS_MIN_LEN} and {ALIAS_MAX_LEN} characters"
        ));
    }
    if !ALIAS_PATTERN.is_match(alias) {
        return Some("alias may only contain letters, digits, '-' and '_'".to_string());
    }
    None
}

/// Absolute `http`/`https` URL with a host.
/// The raw string is stored and later sent as `Location`, so it may not
/// contain control characters or whitespace (`Url::parse` strips them).
pub fn is_web_url(raw: &str) -> bool {
    if raw.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return false;
    }
    Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}
