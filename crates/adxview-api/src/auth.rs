// Authentication endpoints.
//
// Token-based session against the backend's identity service. Login
// installs the access token in the client; subsequent requests carry
// it as a bearer header automatically.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::ReportsClient;
use crate::error::Error;
use crate::models::{LoginResponse, RefreshResponse, User};

impl ReportsClient {
    /// Authenticate with username/password.
    ///
    /// `POST /api/auth/login`
    ///
    /// On success the returned access token is installed on the client
    /// and used for all subsequent requests.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, Error> {
        debug!(username, "logging in");

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp: LoginResponse = self.post("api/auth/login", Some(&body)).await?;
        self.set_token(SecretString::from(resp.access_token.clone()));

        debug!("login successful");
        Ok(resp)
    }

    /// End the current session and drop the local token.
    ///
    /// `POST /api/auth/logout`
    pub async fn logout(&self) -> Result<(), Error> {
        debug!("logging out");

        // The backend replies with {"message": "..."} -- discard it.
        let _: serde_json::Value = self.post("api/auth/logout", None).await?;
        self.clear_token();

        debug!("logout complete");
        Ok(())
    }

    /// Exchange the refresh token for a fresh access token and install it.
    ///
    /// `POST /api/auth/refresh`
    pub async fn refresh(&self) -> Result<(), Error> {
        debug!("refreshing access token");

        let resp: RefreshResponse = self.post("api/auth/refresh", None).await?;
        self.set_token(SecretString::from(resp.access_token));
        Ok(())
    }

    /// Fetch the authenticated user. Also serves as a cheap validity
    /// probe for a restored token.
    ///
    /// `GET /api/auth/me`
    pub async fn me(&self) -> Result<User, Error> {
        if !self.has_token() {
            return Err(Error::NotAuthenticated);
        }
        self.get("api/auth/me", &[]).await
    }
}
