// Error taxonomy shared by the token provider, the upstream clients and the search engine

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    // Client-credentials exchange failed or returned a malformed payload
    #[error("Authentication failure: {0}")]
    AuthFailure(String),

    // Resource server rejected a token we believed to be valid
    #[error("Upstream rejected bearer token: {0}")]
    UpstreamAuthFailure(String),

    #[error("Upstream error: {status_code} - {body}")]
    UpstreamError { status_code: u16, body: String },

    #[error("Transport failure: {0}")]
    TransportFailure(String),

    // 2xx response whose body does not match the expected shape
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No cached search results")]
    CacheEmpty,
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::UpstreamError {
                status_code: 404,
                ..
            }
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::TransportFailure(format!("request timed out: {}", err))
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::TransportFailure(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}
