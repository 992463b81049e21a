//! Normalized API error shape.
//!
//! Every transport failure is reduced to a message plus an optional
//! machine-readable code before it reaches components; components
//! branch on the classification helpers, never on raw transport
//! errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable error codes the Auth collaborator attaches to 401s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bearer token has expired.
    TokenExpired,
    /// Bearer token failed verification.
    TokenInvalid,
    /// No bearer token was sent.
    NoToken,
}

impl ErrorCode {
    /// Parse a wire code string.
    pub fn from_wire(code: &str) -> Option<Self> {
        match code {
            "TOKEN_EXPIRED" => Some(ErrorCode::TokenExpired),
            "TOKEN_INVALID" => Some(ErrorCode::TokenInvalid),
            "NO_TOKEN" => Some(ErrorCode::NoToken),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::TokenExpired => "TOKEN_EXPIRED",
            ErrorCode::TokenInvalid => "TOKEN_INVALID",
            ErrorCode::NoToken => "NO_TOKEN",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What failed, at the transport level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Could not reach the collaborator.
    Connect,
    /// The request timed out.
    Timeout,
    /// The collaborator answered with a non-success status.
    Status(u16),
    /// The response body could not be decoded.
    Decode,
}

/// A normalized collaborator error: message plus optional code.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    /// Transport-level classification.
    pub kind: ApiErrorKind,
    /// Human-readable message, suitable for a transient notification.
    pub message: String,
    /// Machine-readable code, when the collaborator supplied one.
    pub code: Option<ErrorCode>,
}

impl ApiError {
    /// A connection-level failure.
    pub fn connect(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Connect,
            message: message.into(),
            code: None,
        }
    }

    /// A timeout.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Timeout,
            message: message.into(),
            code: None,
        }
    }

    /// A non-success HTTP status.
    pub fn status(status: u16, message: impl Into<String>, code: Option<ErrorCode>) -> Self {
        Self {
            kind: ApiErrorKind::Status(status),
            message: message.into(),
            code,
        }
    }

    /// A body that failed to decode.
    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            message: message.into(),
            code: None,
        }
    }

    /// The HTTP status, if this error carries one.
    pub fn http_status(&self) -> Option<u16> {
        match self.kind {
            ApiErrorKind::Status(s) => Some(s),
            _ => None,
        }
    }

    /// Authentication-class: a 401, or an "unauthorized"-worded error.
    ///
    /// These are terminal for the current session; callers clear the
    /// token and redirect to login.
    pub fn is_auth_error(&self) -> bool {
        self.http_status() == Some(401) || self.message.to_lowercase().contains("unauthorized")
    }

    /// Not-found: surfaced as an empty view, never a crash.
    pub fn is_not_found(&self) -> bool {
        self.http_status() == Some(404)
    }

    /// Server-side failure (5xx).
    pub fn is_server_error(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Status(s) if (500..600).contains(&s))
    }

    /// Whether a read query may be retried: 5xx, timeout, or connect.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Connect | ApiErrorKind::Timeout)
            || self.is_server_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coded_401_is_auth_error() {
        let err = ApiError::status(401, "token expired", Some(ErrorCode::TokenExpired));
        assert!(err.is_auth_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_uncoded_401_is_auth_error() {
        let err = ApiError::status(401, "Unauthorized", None);
        assert!(err.is_auth_error());
    }

    #[test]
    fn test_server_error_is_retryable_not_auth() {
        let err = ApiError::status(503, "service unavailable", None);
        assert!(err.is_retryable());
        assert!(!err.is_auth_error());
    }

    #[test]
    fn test_timeout_is_retryable() {
        assert!(ApiError::timeout("deadline exceeded").is_retryable());
    }

    #[test]
    fn test_not_found() {
        let err = ApiError::status(404, "product not found", None);
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_code_wire_round_trip() {
        assert_eq!(ErrorCode::from_wire("TOKEN_EXPIRED"), Some(ErrorCode::TokenExpired));
        assert_eq!(ErrorCode::from_wire("SOMETHING_ELSE"), None);
        assert_eq!(ErrorCode::NoToken.as_str(), "NO_TOKEN");
    }
}
