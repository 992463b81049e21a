//! Retry policy for collaborator calls.
//!
//! Only read queries retry, and only once — mirroring the generic
//! query layer this core replaces. Mutations never retry; their
//! failure handling is "propagate and keep the last good state".

use crate::error::ApiError;
use std::time::Duration;

/// Retry policy: attempt count plus a fixed backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before each retry.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Policy for read queries: a single retry.
    pub fn reads() -> Self {
        Self {
            max_retries: 1,
            backoff: Duration::from_millis(250),
        }
    }

    /// Policy for mutations: never retry.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Whether to retry after `error` on the given attempt (0-indexed).
    pub fn should_retry(&self, error: &ApiError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_retryable()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::reads()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_retry_once_on_server_error() {
        let policy = RetryPolicy::reads();
        let err = ApiError::status(502, "bad gateway", None);
        assert!(policy.should_retry(&err, 0));
        assert!(!policy.should_retry(&err, 1));
    }

    #[test]
    fn test_auth_errors_never_retry() {
        let policy = RetryPolicy::reads();
        let err = ApiError::status(401, "unauthorized", None);
        assert!(!policy.should_retry(&err, 0));
    }

    #[test]
    fn test_mutations_never_retry() {
        let policy = RetryPolicy::none();
        let err = ApiError::timeout("deadline exceeded");
        assert!(!policy.should_retry(&err, 0));
    }
}
