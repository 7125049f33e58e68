//! User entity and sign-in types.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// An account created on first sign-in through an identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub picture: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for creating a new user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub picture: String,
    pub verified: bool,
}

/// Identity provider a client signs in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInMethod {
    Google,
    Github,
}

impl FromStr for SignInMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(SignInMethod::Google),
            "github" => Ok(SignInMethod::Github),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SignInMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignInMethod::Google => f.write_str("google"),
            SignInMethod::Github => f.write_str("github"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_method_parse() {
        assert_eq!("google".parse::<SignInMethod>(), Ok(SignInMethod::Google));
        assert_eq!("github".parse::<SignInMethod>(), Ok(SignInMethod::Github));
        assert!("Google".parse::<SignInMethod>().is_err());
        assert!("".parse::<SignInMethod>().is_err());
    }

    #[test]
    fn test_sign_in_method_display() {
        assert_eq!(SignInMethod::Google.to_string(), "google");
    }
}
