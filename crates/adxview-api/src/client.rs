// HTTP client for the reporting backend.
//
// Wraps `reqwest::Client` with URL construction, bearer-token injection,
// and error-body decoding. Endpoint groups (auth, reports) are implemented
// as inherent methods in separate files to keep this module focused on
// transport mechanics.

use std::sync::RwLock;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// The backend's structured error body.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// Raw HTTP client for the reporting backend REST API.
///
/// Holds the bearer token issued at login and attaches it to every
/// request. All methods decode the response body for the caller --
/// HTTP status handling never leaks upward.
pub struct ReportsClient {
    http: reqwest::Client,
    base_url: Url,
    bearer: RwLock<Option<SecretString>>,
}

impl ReportsClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// The `base_url` should be the backend root
    /// (e.g. `https://reports.example.com`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            bearer: RwLock::new(None),
        }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether a bearer token is currently installed.
    pub fn has_token(&self) -> bool {
        self.bearer.read().is_ok_and(|t| t.is_some())
    }

    /// Install a bearer token for subsequent requests.
    pub fn set_token(&self, token: SecretString) {
        if let Ok(mut guard) = self.bearer.write() {
            *guard = Some(token);
        }
    }

    /// Drop the current bearer token.
    pub fn clear_token(&self) {
        if let Ok(mut guard) = self.bearer.write() {
            *guard = None;
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path, e.g. `api/reports/platform`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request with query parameters and decode the response.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("GET {}", url);

        let mut req = self.http.get(url).query(query);
        req = self.attach_bearer(req)?;

        let resp = req.send().await.map_err(Error::Transport)?;
        self.parse_response(resp).await
    }

    /// Send a POST request with an optional JSON body and decode the response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("POST {}", url);

        let mut req = self.http.post(url);
        if let Some(body) = body {
            req = req.json(body);
        }
        req = self.attach_bearer(req)?;

        let resp = req.send().await.map_err(Error::Transport)?;
        self.parse_response(resp).await
    }

    fn attach_bearer(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, Error> {
        let guard = self
            .bearer
            .read()
            .map_err(|_| Error::Authentication {
                message: "token store poisoned".into(),
            })?;
        Ok(match guard.as_ref() {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        })
    }

    /// Decode a response body, mapping error statuses to [`Error`] variants.
    ///
    /// 401 with a token installed means the session expired; 401 without
    /// one is a failed login. Other non-2xx statuses carry the backend's
    /// `{"error": "..."}` body when present.
    async fn parse_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if status == StatusCode::UNAUTHORIZED {
            if self.has_token() {
                return Err(Error::SessionExpired);
            }
            return Err(Error::Authentication {
                message: error_message(&body),
            });
        }

        if !status.is_success() {
            return Err(Error::Api {
                message: error_message(&body),
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

/// Extract the backend's error message, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.to_owned())
}
