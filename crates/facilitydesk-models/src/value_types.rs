//! Validated primitives.
//!
//! An [`Email`] can only be constructed from a syntactically valid address, so
//! code holding one never has to re-check it. Usernames stay plain strings but
//! share their validation rule here so DTOs and services agree on it.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use validator::{ValidateEmail, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueTypeError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),
}

/// A validated email address.
///
/// Comparison through `PartialEq` is exact; use [`Email::eq_ignore_case`] for
/// uniqueness checks, where `Jo@Site.org` and `jo@site.org` are the same inbox.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn new(email: impl Into<String>) -> Result<Self, ValueTypeError> {
        let email = email.into().trim().to_string();

        if email.is_empty() {
            return Err(ValueTypeError::InvalidEmail("email cannot be empty".into()));
        }
        if !email.validate_email() {
            return Err(ValueTypeError::InvalidEmail(format!(
                "'{}' is not a valid email address",
                email
            )));
        }

        Ok(Self(email))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl fmt::Debug for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Email({})", self.0)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Email {
    type Error = ValueTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Email {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

// Stored blobs are re-validated on load; a corrupted address fails the whole read.
impl<'de> Deserialize<'de> for Email {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

fn rule_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 32;

/// Usernames are ASCII letters, digits, `.`, `_` and `-`, starting with a letter
/// or digit. They are matched case-sensitively at login.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(rule_error(
            "username_length",
            format!(
                "Username must be between {} and {} characters",
                USERNAME_MIN_LEN, USERNAME_MAX_LEN
            ),
        ));
    }

    let mut chars = username.chars();
    let starts_ok = chars.next().is_some_and(|c| c.is_ascii_alphanumeric());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !starts_ok || !rest_ok {
        return Err(rule_error(
            "username_chars",
            "Username may only contain letters, digits, '.', '_' and '-', and must start with a letter or digit",
        ));
    }

    Ok(())
}

pub const FULL_NAME_MAX_LEN: usize = 100;

/// Length is measured after trimming, so a blank name is rejected.
pub fn validate_full_name(full_name: &str) -> Result<(), ValidationError> {
    let len = full_name.trim().chars().count();
    if !(1..=FULL_NAME_MAX_LEN).contains(&len) {
        return Err(rule_error(
            "full_name",
            format!("Full name must be between 1 and {} characters", FULL_NAME_MAX_LEN),
        ));
    }
    Ok(())
}

/// Digits, spaces, `-`, `(`, `)` and a leading `+`; 7 to 15 digits.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Ok(());
    }

    let valid_chars = phone.chars().enumerate().all(|(i, c)| {
        c.is_ascii_digit() || matches!(c, '-' | '(' | ')' | ' ') || (c == '+' && i == 0)
    });
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();

    if !valid_chars || !(7..=15).contains(&digits) {
        return Err(rule_error(
            "phone",
            "Phone number must contain 7 to 15 digits",
        ));
    }

    Ok(())
}
