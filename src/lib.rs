// Backend proxy for flight-offer and location search against the upstream travel API

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod http;
pub mod location;
pub mod search;
pub mod supplier;
pub mod telemetry;

// Re-export key types for convenience
pub use api::{build_app, build_router, AppError, AppState};
pub use auth::{BearerToken, ClientCredentialsExchange, CredentialExchange, TokenProvider};
pub use cache::{CacheStatsReport, FlightOfferCache};
pub use config::{ClientConfig, ProxyConfig, ServerConfig};
pub use dictionary::DictionaryFilter;
pub use error::{ApiError, ClientError};
pub use http::AuthenticatedHttpClient;
pub use location::{LocationLookup, LocationLookupClient, LocationSearchRequest};
pub use search::{FlightOfferDetails, FlightOfferSearchEngine, FlightSearchCriteria};
pub use supplier::{Dictionaries, FlightOffer, FlightOfferSearchResult, LocationInfo};
