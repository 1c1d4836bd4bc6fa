//! Firebase Authentication over the Identity Toolkit REST API.

use crate::provider::{IdentityError, IdentityProvider};
use crate::storage::Session;
use portal_core::AuthConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Seconds, as a string
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct FirebaseIdentity {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FirebaseIdentity {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, IdentityError> {
        Self::new(&config.identity_url, &config.api_key)
    }

    async fn call(
        &self,
        method: &str,
        request: &CredentialRequest<'_>,
        anonymous: bool,
    ) -> Result<Session, IdentityError> {
        if self.api_key.is_empty() {
            return Err(IdentityError::Provider("Firebase API key not configured".into()));
        }

        let url = format!("{}/v1/accounts:{}", self.base_url, method);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let envelope: ErrorEnvelope = response
                .json()
                .await
                .map_err(|_| IdentityError::Provider(format!("HTTP {}", status)))?;
            tracing::warn!("Identity Toolkit {} failed: {}", method, envelope.error.message);
            return Err(IdentityError::from_code(&envelope.error.message));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Provider(format!("unreadable response: {}", e)))?;

        let lifetime = body
            .expires_in
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(3600);

        Ok(Session {
            uid: body.local_id,
            email: body.email.filter(|e| !e.is_empty()),
            is_anonymous: anonymous,
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at: chrono::Utc::now().timestamp() + lifetime,
        })
    }
}

impl IdentityProvider for FirebaseIdentity {
    #[instrument(skip(self, password))]
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let request = CredentialRequest {
            email: Some(email),
            password: Some(password),
            return_secure_token: true,
        };
        self.call("signInWithPassword", &request, false).await
    }

    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let request = CredentialRequest {
            email: Some(email),
            password: Some(password),
            return_secure_token: true,
        };
        self.call("signUp", &request, false).await
    }

    #[instrument(skip(self))]
    async fn sign_in_anonymously(&self) -> Result<Session, IdentityError> {
        let request = CredentialRequest {
            email: None,
            password: None,
            return_secure_token: true,
        };
        self.call("signUp", &request, true).await
    }
}
