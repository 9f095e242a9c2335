// Inbound HTTP surface
//
// /health                              GET
// /api/flight-offers/search            GET
// /api/flight-offers/details/{id}      GET
// /api/flight-offers/dictionaries      GET
// /api/flight-offers/cache             DELETE
// /api/airport-and-city/search         GET

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::cache::FlightOfferCache;
use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError};
use crate::http::AuthenticatedHttpClient;
use crate::location::{LocationLookupClient, LocationSearchRequest};
use crate::search::{FlightOfferDetails, FlightOfferSearchEngine, FlightSearchCriteria};
use crate::supplier::{Dictionaries, LocationSearchResponse};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<FlightOfferSearchEngine>,
    pub locations: Arc<LocationLookupClient>,
}

impl AppState {
    pub fn new(client: Arc<AuthenticatedHttpClient>) -> Self {
        let locations = Arc::new(LocationLookupClient::new(Arc::clone(&client)));
        let engine = Arc::new(FlightOfferSearchEngine::new(
            client,
            locations.clone(),
            Arc::new(FlightOfferCache::new()),
        ));
        Self { engine, locations }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = AuthenticatedHttpClient::from_config(config)?;
        Ok(Self::new(Arc::new(client)))
    }
}

// Errors surfaced to HTTP callers, one status per failure kind
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    message: String,
    r#type: String,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Api(err) => match err {
                ApiError::NotFound(_) | ApiError::CacheEmpty => StatusCode::NOT_FOUND,
                ApiError::UpstreamError { .. } | ApiError::InvalidResponse(_) => {
                    StatusCode::BAD_GATEWAY
                }
                ApiError::UpstreamAuthFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
                ApiError::TransportFailure(_) => StatusCode::GATEWAY_TIMEOUT,
                ApiError::AuthFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::BadRequest(_) => "invalid_request_error",
            Self::Api(err) => match err {
                ApiError::NotFound(_) => "not_found_error",
                ApiError::CacheEmpty => "cache_empty",
                ApiError::UpstreamError { .. } => "upstream_error",
                ApiError::InvalidResponse(_) => "invalid_upstream_response",
                ApiError::UpstreamAuthFailure(_) => "upstream_auth_error",
                ApiError::TransportFailure(_) => "transport_error",
                ApiError::AuthFailure(_) => "auth_error",
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = ErrorResponse {
            error: ErrorDetail {
                message: self.to_string(),
                r#type: self.error_type().to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchParams {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure_date: Option<String>,
    pub return_date: Option<String>,
    pub currency: Option<String>,
    pub adults: Option<String>,
    pub non_stop: Option<String>,
}

impl FlightSearchParams {
    pub fn into_criteria(self) -> Result<FlightSearchCriteria, AppError> {
        let origin = required("origin", self.origin)?;
        let destination = required("destination", self.destination)?;
        let departure_date = required("departureDate", self.departure_date)?;
        let currency = required("currency", self.currency)?;
        let adults = required("adults", self.adults)?;

        let departure = parse_date("departureDate", &departure_date)?;
        let return_date = self.return_date.filter(|d| !d.trim().is_empty());
        if let Some(return_date) = &return_date {
            if parse_date("returnDate", return_date)? < departure {
                return Err(AppError::BadRequest(
                    "returnDate must not precede departureDate".to_string(),
                ));
            }
        }

        let adults: u32 = adults
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest(format!("adults must be a number, got '{}'", adults)))?;
        if adults < 1 {
            return Err(AppError::BadRequest("adults must be at least 1".to_string()));
        }

        let non_stop = match self.non_stop.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(value) => value.parse().map_err(|_| {
                AppError::BadRequest(format!("nonStop must be true or false, got '{}'", value))
            })?,
        };

        Ok(FlightSearchCriteria {
            origin,
            destination,
            departure_date,
            return_date,
            currency,
            adults,
            non_stop,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSearchParams {
    pub sub_type: Option<String>,
    pub keyword: Option<String>,
    pub country_code: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub sort: Option<String>,
    pub view: Option<String>,
}

impl LocationSearchParams {
    pub fn into_request(self) -> Result<LocationSearchRequest, AppError> {
        let mut request = LocationSearchRequest::new(
            required("subType", self.sub_type)?,
            required("keyword", self.keyword)?,
        );
        request.country_code = self.country_code.filter(|c| !c.trim().is_empty());
        if let Some(limit) = self.limit {
            request.limit = parse_number("limit", &limit)?;
        }
        if let Some(offset) = self.offset {
            request.offset = parse_number("offset", &offset)?;
        }
        if let Some(sort) = self.sort.filter(|s| !s.trim().is_empty()) {
            request.sort = sort;
        }
        if let Some(view) = self.view.filter(|v| !v.trim().is_empty()) {
            request.view = view;
        }
        Ok(request)
    }
}

fn required(name: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(AppError::BadRequest(format!("{} is required", name))),
    }
}

fn parse_date(name: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("{} must be YYYY-MM-DD, got '{}'", name, value)))
}

fn parse_number(name: &str, value: &str) -> Result<u32, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{} must be a non-negative number, got '{}'", name, value)))
}

pub fn build_router(state: AppState) -> Router {
    let flight_offers = Router::new()
        .route("/search", get(search_flights))
        .route("/details/{id}", get(offer_details))
        .route("/dictionaries", get(cached_dictionaries))
        .route("/cache", axum::routing::delete(evict_cache));

    Router::new()
        .route("/health", get(health))
        .nest("/api/flight-offers", flight_offers)
        .route("/api/airport-and-city/search", get(search_locations))
        .with_state(state)
}

// Router plus CORS for the browser client and request tracing
pub fn build_app(state: AppState, cors_origin: &str) -> Result<Router, ClientError> {
    let origin = HeaderValue::from_str(cors_origin)
        .map_err(|e| ClientError::ConfigError(format!("invalid cors_origin '{}': {}", cors_origin, e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::DELETE])
        .allow_headers(Any);

    Ok(build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "cache": state.engine.cache().stats(),
    }))
}

async fn search_flights(
    State(state): State<AppState>,
    Query(params): Query<FlightSearchParams>,
) -> Result<Response, AppError> {
    let criteria = params.into_criteria()?;
    let result = state.engine.search(&criteria).await?;
    Ok(Json(result.as_ref()).into_response())
}

async fn offer_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FlightOfferDetails>, AppError> {
    Ok(Json(state.engine.offer_details(&id)?))
}

async fn cached_dictionaries(State(state): State<AppState>) -> Json<Dictionaries> {
    Json(state.engine.cached_dictionaries())
}

async fn evict_cache(State(state): State<AppState>) -> StatusCode {
    state.engine.evict();
    StatusCode::NO_CONTENT
}

async fn search_locations(
    State(state): State<AppState>,
    Query(params): Query<LocationSearchParams>,
) -> Result<Json<LocationSearchResponse>, AppError> {
    let request = params.into_request()?;
    Ok(Json(state.locations.search(&request).await?))
}
