//! Anonymous authentication for the remote stores.
//!
//! The portal signs in anonymously once at startup; the resulting id token
//! authorizes object-store and document-store calls. Sign-in failures are
//! surfaced but never fatal: the UI keeps loading and store calls fail
//! downstream instead.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::{Result, ZiyaratError};

/// Identity-toolkit endpoint for anonymous sign-up.
const SIGN_UP_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts:signUp";

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Total request timeout in seconds.
const TOTAL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    local_id: String,
}

/// Anonymous credential provider.
pub struct Authenticator {
    http: Client,
    api_key: String,
    configured: bool,
    token: RwLock<Option<String>>,
}

impl Authenticator {
    /// Create an authenticator for the given service credentials.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .build()
            .map_err(|e| ZiyaratError::Auth(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            configured: config.is_configured(),
            token: RwLock::new(None),
        })
    }

    /// Sign in anonymously and cache the id token.
    ///
    /// With placeholder credentials this is a no-op: a warning is logged and
    /// the call succeeds, leaving the session unauthenticated.
    pub async fn sign_in_anonymously(&self) -> Result<()> {
        if !self.configured {
            warn!("service not configured; skipping authentication");
            return Ok(());
        }

        let response = self
            .http
            .post(SIGN_UP_URL)
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({ "returnSecureToken": true }))
            .send()
            .await
            .map_err(|e| ZiyaratError::Auth(format!("sign-in request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ZiyaratError::Auth(format!(
                "sign-in rejected: HTTP {}",
                response.status()
            )));
        }

        let signed: SignInResponse = response
            .json()
            .await
            .map_err(|e| ZiyaratError::Auth(format!("malformed sign-in response: {e}")))?;

        info!(local_id = %signed.local_id, "signed in anonymously");
        *self.token.write().await = Some(signed.id_token);
        Ok(())
    }

    /// Current bearer token, if signed in.
    pub async fn bearer(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Whether a credential is currently cached.
    pub async fn is_signed_in(&self) -> bool {
        self.token.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_sign_in_is_skipped() {
        let auth = Authenticator::new(&ServiceConfig::default()).unwrap();
        auth.sign_in_anonymously().await.unwrap();
        assert!(!auth.is_signed_in().await);
        assert!(auth.bearer().await.is_none());
    }

    #[tokio::test]
    async fn test_placeholder_config_is_skipped() {
        let config = ServiceConfig {
            api_key: "YOUR_API_KEY".to_string(),
            ..ServiceConfig::default()
        };
        let auth = Authenticator::new(&config).unwrap();
        auth.sign_in_anonymously().await.unwrap();
        assert!(auth.bearer().await.is_none());
    }
}
