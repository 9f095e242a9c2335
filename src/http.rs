// Token-attaching decorator around reqwest::Client
// Every outbound data call goes through execute(); there are no retries at this layer

use std::sync::Arc;

use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::TokenProvider;
use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError};

pub const AMADEUS_JSON: &str = "application/vnd.amadeus+json";

pub struct AuthenticatedHttpClient {
    http: reqwest::Client,
    tokens: Arc<TokenProvider>,
    config: ClientConfig,
}

impl AuthenticatedHttpClient {
    pub fn new(http: reqwest::Client, tokens: Arc<TokenProvider>, config: ClientConfig) -> Self {
        Self {
            http,
            tokens,
            config,
        }
    }

    // Builds the shared transport (bounded per-call timeout) and the token provider on top of it
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::InitError(e.to_string()))?;
        let tokens = Arc::new(TokenProvider::from_config(http.clone(), config));

        Ok(Self::new(http, tokens, config.clone()))
    }

    pub fn tokens(&self) -> &Arc<TokenProvider> {
        &self.tokens
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(self.config.endpoint(path))
            .header(ACCEPT, AMADEUS_JSON)
    }

    pub async fn execute(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let token = self.tokens.get_valid_token().await?;

        let request = request
            .bearer_auth(&token.value)
            .build()
            .map_err(|e| ApiError::TransportFailure(e.to_string()))?;
        debug!(method = %request.method(), url = %request.url(), "Sending upstream request");

        let response = self.http.execute(request).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(status = status.as_u16(), error = %e, "Failed to read upstream error body");
                String::new()
            }
        };

        if status == StatusCode::UNAUTHORIZED {
            // Token looked valid locally; drop it so the next request starts with a fresh exchange
            warn!("Upstream rejected bearer token before its recorded expiry");
            self.tokens.invalidate(&token).await;
            return Err(ApiError::UpstreamAuthFailure(body));
        }

        debug!(status = status.as_u16(), "Upstream returned an error status");
        Err(ApiError::UpstreamError {
            status_code: status.as_u16(),
            body,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self.execute(self.get(path).query(query)).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}
