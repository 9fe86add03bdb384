//! Error types for the core data layer.

use thiserror::Error;

/// Errors produced by [`crate::ReportService`] and the query cache.
///
/// Variants carry owned strings rather than source errors so that a failed
/// fetch can be fanned out to every task waiting on the same cache slot.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("failed to connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("session expired, sign in again")]
    SessionExpired,

    #[error("not connected to a backend")]
    NotConnected,

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: String, end: String },

    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("backend error ({code}): {message}", code = .status.map_or_else(|| "unknown".to_owned(), |s| s.to_string()))]
    Api { message: String, status: Option<u16> },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("{0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the error is plausibly transient and worth one automatic retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::ConnectionFailed { .. } => true,
            Self::Api { status, .. } => status.is_some_and(|s| s >= 500),
            _ => false,
        }
    }

    /// Whether the error indicates a rejected or expired session.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::SessionExpired | Self::NotConnected
        )
    }
}

impl From<adxview_api::Error> for CoreError {
    fn from(err: adxview_api::Error) -> Self {
        use adxview_api::Error as Api;
        match err {
            Api::Authentication { message } => Self::AuthenticationFailed { message },
            Api::SessionExpired => Self::SessionExpired,
            Api::NotAuthenticated => Self::NotConnected,
            Api::Timeout { timeout_secs } => Self::Timeout { timeout_secs },
            Api::Api { message, status } => Self::Api {
                message,
                status: Some(status),
            },
            Api::Deserialization { message, .. } => Self::Internal(message),
            Api::Transport(ref inner) => {
                if inner.is_timeout() {
                    Self::Timeout { timeout_secs: 0 }
                } else if inner.is_connect() {
                    Self::ConnectionFailed {
                        url: inner
                            .url()
                            .map_or_else(|| "<unknown>".to_owned(), ToString::to_string),
                        reason: inner.to_string(),
                    }
                } else {
                    Self::Internal(err.to_string())
                }
            }
            Api::InvalidUrl(e) => Self::Config {
                message: e.to_string(),
            },
            Api::Tls(message) => Self::Config { message },
        }
    }
}
