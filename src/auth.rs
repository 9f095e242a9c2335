// Bearer token acquisition and renewal
// TokenProvider hands out the current token and runs a client-credentials exchange
// when none is held or the held one has expired; concurrent callers share one exchange

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;

pub const TOKEN_PATH: &str = "/v1/security/oauth2/token";

#[derive(Clone, PartialEq)]
pub struct BearerToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl BearerToken {
    // None when the lifetime does not fit a timestamp
    pub fn new(value: impl Into<String>, expires_in_secs: i64) -> Option<Self> {
        let lifetime = Duration::try_seconds(expires_in_secs)?;
        let expires_at = Utc::now().checked_add_signed(lifetime)?;
        Some(Self {
            value: value.into(),
            expires_at,
        })
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

// Token values stay out of logs
impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// Payload of the token endpoint; everything else it returns is ignored
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

// One credential exchange against the auth endpoint
#[async_trait]
pub trait CredentialExchange: Send + Sync + 'static {
    async fn exchange(&self) -> Result<BearerToken, ApiError>;
}

// Client-credentials grant over HTTP form POST
pub struct ClientCredentialsExchange {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl ClientCredentialsExchange {
    pub fn new(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            token_url: config.endpoint(TOKEN_PATH),
            client_id: config.api_key.clone(),
            client_secret: config.api_secret.clone(),
        }
    }

    fn parse_token(body: &str) -> Result<BearerToken, ApiError> {
        let payload: TokenResponse = serde_json::from_str(body)
            .map_err(|e| ApiError::AuthFailure(format!("malformed token payload: {}", e)))?;

        let access_token = payload
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::AuthFailure("token payload missing access_token".to_string()))?;
        let expires_in = payload
            .expires_in
            .ok_or_else(|| ApiError::AuthFailure("token payload missing expires_in".to_string()))?;
        if expires_in <= 0 {
            return Err(ApiError::AuthFailure(format!(
                "token payload has non-positive expires_in: {}",
                expires_in
            )));
        }
        if expires_in > i64::from(i32::MAX) {
            return Err(ApiError::AuthFailure("expires_in out of range".to_string()));
        }

        BearerToken::new(access_token, expires_in)
            .ok_or_else(|| ApiError::AuthFailure("expires_in out of range".to_string()))
    }
}

#[async_trait]
impl CredentialExchange for ClientCredentialsExchange {
    async fn exchange(&self) -> Result<BearerToken, ApiError> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        debug!(url = %self.token_url, "Requesting bearer token");
        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ApiError::AuthFailure(format!("token exchange failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::AuthFailure(format!("token exchange failed: {}", e)))?;

        if !status.is_success() {
            return Err(ApiError::AuthFailure(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        Self::parse_token(&body)
    }
}

pub struct TokenProvider {
    exchange: Arc<dyn CredentialExchange>,
    token: RwLock<Option<BearerToken>>,
    // Held across the check-then-refresh sequence so only one exchange runs at a time
    refresh_lock: Mutex<()>,
    refresh_count: AtomicUsize,
}

impl TokenProvider {
    pub fn new(exchange: Arc<dyn CredentialExchange>) -> Self {
        Self {
            exchange,
            token: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            refresh_count: AtomicUsize::new(0),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self::new(Arc::new(ClientCredentialsExchange::new(http, config)))
    }

    pub async fn get_valid_token(&self) -> Result<BearerToken, ApiError> {
        if let Some(token) = self.current_valid().await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the lock
        if let Some(token) = self.current_valid().await {
            return Ok(token);
        }

        let fresh = self.exchange.exchange().await.map_err(|e| {
            warn!(error = %e, "Bearer token exchange failed");
            e
        })?;
        // A token that is already stale is never stored or handed out
        if !fresh.is_valid() {
            warn!(expires_at = %fresh.expires_at, "Exchanged bearer token is already expired");
            return Err(ApiError::AuthFailure(
                "exchanged token is already expired".to_string(),
            ));
        }
        self.refresh_count.fetch_add(1, Ordering::SeqCst);
        info!(expires_at = %fresh.expires_at, "Bearer token refreshed");

        *self.token.write().await = Some(fresh.clone());
        Ok(fresh)
    }

    // Drops the held token only if it is still the one the resource server rejected
    pub async fn invalidate(&self, rejected: &BearerToken) {
        let mut token = self.token.write().await;
        if token.as_ref() == Some(rejected) {
            debug!("Discarding rejected bearer token");
            *token = None;
        }
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_count.load(Ordering::SeqCst)
    }

    async fn current_valid(&self) -> Option<BearerToken> {
        self.token
            .read()
            .await
            .as_ref()
            .filter(|t| t.is_valid())
            .cloned()
    }
}
