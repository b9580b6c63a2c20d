use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Why a request could not be authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    Missing,
    Malformed,
    BadSignature,
    Expired,
    UnknownUser,
    BadCredentials,
}

impl AuthFailure {
    #[must_use]
    pub fn reason(self) -> &'static str {
        match self {
            AuthFailure::Missing => "missing",
            AuthFailure::Malformed => "malformed",
            AuthFailure::BadSignature => "bad_signature",
            AuthFailure::Expired => "expired",
            AuthFailure::UnknownUser => "unknown_user",
            AuthFailure::BadCredentials => "bad_credentials",
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            AuthFailure::Missing => "Missing Authorization Header",
            AuthFailure::Malformed => "Malformed token",
            AuthFailure::BadSignature => "Signature verification failed",
            AuthFailure::Expired => "Token has expired",
            AuthFailure::UnknownUser => "User not found",
            AuthFailure::BadCredentials => "Invalid credentials",
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("not found")]
    NotFound,

    #[error("already exists")]
    AlreadyExists,

    #[error("forbidden")]
    Forbidden,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("authentication failed: {0}")]
    Auth(AuthFailure),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Builds a validation error carrying a single message for one field.
    #[must_use]
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        Error::Validation(errors)
    }
}

impl From<AuthFailure> for Error {
    fn from(failure: AuthFailure) -> Self {
        Error::Auth(failure)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
