//! Runtime configuration for a [`crate::ReportService`].

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// How the service authenticates against the reporting backend.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Username and password exchanged for a bearer token at connect time.
    Credentials {
        username: String,
        password: SecretString,
    },
    /// A previously issued bearer token, validated at connect time.
    Token(SecretString),
}

/// TLS verification policy for the backend connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Verify against the system trust store.
    #[default]
    SystemDefaults,
    /// Verify against a custom CA certificate bundle (PEM).
    CustomCa(PathBuf),
    /// Skip verification entirely. Only sensible for local development.
    DangerAcceptInvalid,
}

/// Connection settings for a reporting backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend, e.g. `https://reports.example.com`.
    pub url: Url,
    pub auth: AuthCredentials,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Interval between background refreshes of live queries.
    /// Zero disables the refresh task.
    pub refresh_interval_secs: u64,
}

impl BackendConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

    pub fn new(url: Url, auth: AuthCredentials) -> Self {
        Self {
            url,
            auth,
            tls: TlsVerification::default(),
            timeout: Self::DEFAULT_TIMEOUT,
            refresh_interval_secs: Self::DEFAULT_REFRESH_INTERVAL_SECS,
        }
    }

    /// Parse and validate a backend URL from a string.
    pub fn parse_url(raw: &str) -> Result<Url, CoreError> {
        let url = Url::parse(raw).map_err(|e| CoreError::Config {
            message: format!("invalid backend URL {raw:?}: {e}"),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::Config {
                message: format!("unsupported URL scheme {:?}, expected http or https", url.scheme()),
            });
        }
        Ok(url)
    }

    pub fn with_tls(mut self, tls: TlsVerification) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_refresh_interval(mut self, secs: u64) -> Self {
        self.refresh_interval_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_url_accepts_http_and_https() {
        assert!(BackendConfig::parse_url("http://localhost:8080").is_ok());
        assert!(BackendConfig::parse_url("https://reports.example.com").is_ok());
    }

    #[test]
    fn parse_url_rejects_other_schemes() {
        let err = BackendConfig::parse_url("ftp://reports.example.com").unwrap_err();
        assert!(matches!(err, CoreError::Config { .. }));
    }
}
