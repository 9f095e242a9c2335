// Flight-offer search orchestration
// A search goes upstream, backfills missing city/country names and replaces the cache slot;
// detail lookups are served from that slot

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::FlightOfferCache;
use crate::dictionary::DictionaryFilter;
use crate::error::ApiError;
use crate::http::AuthenticatedHttpClient;
use crate::location::LocationLookup;
use crate::supplier::{Dictionaries, FlightOffer, FlightOfferSearchResult};

pub const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";

// Upper bound on simultaneous location lookups while enriching one search
const ENRICHMENT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct FlightSearchCriteria {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub currency: String,
    pub adults: u32,
    pub non_stop: bool,
}

impl FlightSearchCriteria {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("originLocationCode", self.origin.clone()),
            ("destinationLocationCode", self.destination.clone()),
            ("departureDate", self.departure_date.clone()),
            ("currencyCode", self.currency.clone()),
            ("adults", self.adults.to_string()),
            ("nonStop", self.non_stop.to_string()),
        ];
        if let Some(return_date) = &self.return_date {
            query.push(("returnDate", return_date.clone()));
        }
        query
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOfferDetails {
    pub flight_offer: FlightOffer,
    pub dictionaries: Dictionaries,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct EnrichmentReport {
    pub enriched: usize,
    pub not_found: usize,
    pub failed: usize,
}

// Lookups that fail or find nothing leave their entry untouched and never abort the rest
pub async fn enrich_locations(
    lookup: &dyn LocationLookup,
    dictionaries: &mut Dictionaries,
) -> EnrichmentReport {
    let pending: Vec<String> = dictionaries
        .locations
        .iter()
        .filter(|(_, location)| location.needs_enrichment())
        .map(|(code, _)| code.clone())
        .collect();

    let outcomes: Vec<_> = stream::iter(pending)
        .map(|code| async move {
            let outcome = lookup.lookup(&code).await;
            (code, outcome)
        })
        .buffer_unordered(ENRICHMENT_CONCURRENCY)
        .collect()
        .await;

    let mut report = EnrichmentReport::default();
    for (code, outcome) in outcomes {
        match outcome {
            Ok(Some(detail)) => {
                if let Some(location) = dictionaries.locations.get_mut(&code) {
                    location.merge_names(&detail);
                }
                report.enriched += 1;
            }
            Ok(None) => {
                debug!(iata_code = %code, "Location not found, keeping partial entry");
                report.not_found += 1;
            }
            Err(e) => {
                warn!(iata_code = %code, error = %e, "Location lookup failed, keeping partial entry");
                report.failed += 1;
            }
        }
    }
    report
}

pub struct FlightOfferSearchEngine {
    client: Arc<AuthenticatedHttpClient>,
    locations: Arc<dyn LocationLookup>,
    cache: Arc<FlightOfferCache>,
}

impl FlightOfferSearchEngine {
    pub fn new(
        client: Arc<AuthenticatedHttpClient>,
        locations: Arc<dyn LocationLookup>,
        cache: Arc<FlightOfferCache>,
    ) -> Self {
        Self {
            client,
            locations,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<FlightOfferCache> {
        &self.cache
    }

    // Upstream failures return before the cache is touched
    pub async fn search(
        &self,
        criteria: &FlightSearchCriteria,
    ) -> Result<Arc<FlightOfferSearchResult>, ApiError> {
        debug!(
            origin = %criteria.origin,
            destination = %criteria.destination,
            departure_date = %criteria.departure_date,
            "Searching flight offers"
        );
        let mut result: FlightOfferSearchResult = self
            .client
            .get_json(FLIGHT_OFFERS_PATH, &criteria.to_query())
            .await?;

        let report = enrich_locations(self.locations.as_ref(), &mut result.dictionaries).await;

        info!(
            offers = result.data.len(),
            enriched = report.enriched,
            not_found = report.not_found,
            failed = report.failed,
            "Flight offer search completed"
        );

        let dictionaries = result.dictionaries.clone();
        let snapshot = self.cache.put(result, dictionaries);
        Ok(Arc::clone(&snapshot.result))
    }

    pub fn offer_details(&self, offer_id: &str) -> Result<FlightOfferDetails, ApiError> {
        let snapshot = self.cache.snapshot().ok_or(ApiError::CacheEmpty)?;

        let offer = snapshot
            .result
            .data
            .iter()
            .find(|offer| offer.id == offer_id)
            .ok_or_else(|| ApiError::NotFound(format!("flight offer {}", offer_id)))?;

        Ok(FlightOfferDetails {
            flight_offer: offer.clone(),
            dictionaries: DictionaryFilter::project(offer, &snapshot.dictionaries),
        })
    }

    // Empty structure when nothing has been searched yet
    pub fn cached_dictionaries(&self) -> Dictionaries {
        self.cache
            .last_dictionaries()
            .map(|d| d.as_ref().clone())
            .unwrap_or_default()
    }

    pub fn evict(&self) {
        info!("Evicting cached flight offers");
        self.cache.clear();
    }
}
