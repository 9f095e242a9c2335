use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// Data structures for the upstream flight-offer search response
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlightOfferSearchResult {
    pub meta: Meta,
    pub data: Vec<FlightOffer>,
    pub dictionaries: Dictionaries,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Meta {
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlightOffer {
    #[serde(rename = "type")]
    pub offer_type: String,
    pub id: String,
    pub source: String,
    pub instant_ticketing_required: bool,
    pub non_homogeneous: bool,
    pub one_way: bool,
    pub last_ticketing_date: Option<String>,
    pub number_of_bookable_seats: u32,
    pub itineraries: Vec<Itinerary>,
    pub price: Option<Price>,
    pub pricing_options: Option<PricingOptions>,
    pub validating_airline_codes: Vec<String>,
    pub traveler_pricings: Vec<TravelerPricing>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Itinerary {
    pub duration: Option<String>,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Segment {
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
    pub carrier_code: String,
    pub number: String,
    pub aircraft: Option<Aircraft>,
    pub operating: Option<Operating>,
    pub duration: Option<String>,
    pub id: String,
    pub number_of_stops: u32,
    #[serde(rename = "blacklistedInEU")]
    pub blacklisted_in_eu: bool,
}

// Departure or arrival point of a segment
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlightEndpoint {
    pub iata_code: String,
    pub terminal: Option<String>,
    pub at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Aircraft {
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Operating {
    pub carrier_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Price {
    pub currency: String,
    pub total: String,
    pub base: String,
    pub fees: Vec<Fee>,
    pub grand_total: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Fee {
    pub amount: String,
    #[serde(rename = "type")]
    pub fee_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingOptions {
    pub fare_type: Vec<String>,
    pub included_checked_bags_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TravelerPricing {
    pub traveler_id: String,
    pub fare_option: String,
    pub traveler_type: String,
    pub price: Option<Price>,
    pub fare_details_by_segment: Vec<FareDetailsBySegment>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FareDetailsBySegment {
    pub segment_id: String,
    pub cabin: Option<String>,
    pub fare_basis: Option<String>,
    pub branded_fare: Option<String>,
    pub branded_fare_label: Option<String>,
    #[serde(rename = "class")]
    pub class_type: Option<String>,
    pub included_checked_bags: Option<IncludedCheckedBags>,
    pub amenities: Vec<Amenity>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IncludedCheckedBags {
    pub weight: Option<u32>,
    pub weight_unit: Option<String>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Amenity {
    pub description: String,
    pub is_chargeable: bool,
    pub amenity_type: String,
    pub amenity_provider: Option<AmenityProvider>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AmenityProvider {
    pub name: String,
}

// Lookup tables referenced by code from the offers
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Dictionaries {
    pub locations: BTreeMap<String, LocationInfo>,
    pub aircraft: BTreeMap<String, String>,
    pub currencies: BTreeMap<String, String>,
    pub carriers: BTreeMap<String, String>,
}

impl Dictionaries {
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
            && self.aircraft.is_empty()
            && self.currencies.is_empty()
            && self.carriers.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationInfo {
    pub city_code: Option<String>,
    pub city_name: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
}

impl LocationInfo {
    pub fn needs_enrichment(&self) -> bool {
        self.city_name.is_none() || self.country_name.is_none()
    }

    // Fills in names the lookup returned; existing values are never cleared
    pub fn merge_names(&mut self, detail: &LocationInfo) {
        if let Some(city) = &detail.city_name {
            self.city_name = Some(city.clone());
        }
        if let Some(country) = &detail.country_name {
            self.country_name = Some(country.clone());
        }
    }
}

// Data structures for the location reference-data endpoints
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocationDetailResponse {
    pub meta: Option<serde_json::Value>,
    pub data: Option<LocationData>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocationSearchResponse {
    pub meta: LocationSearchMeta,
    pub data: Vec<LocationData>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocationSearchMeta {
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationData {
    #[serde(rename = "type")]
    pub location_type: Option<String>,
    pub sub_type: Option<String>,
    pub name: Option<String>,
    pub detailed_name: Option<String>,
    pub id: Option<String>,
    pub iata_code: Option<String>,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    pub city_name: Option<String>,
    pub city_code: Option<String>,
    pub country_name: Option<String>,
    pub country_code: Option<String>,
    pub region_code: Option<String>,
}

impl From<&Address> for LocationInfo {
    fn from(address: &Address) -> Self {
        LocationInfo {
            city_code: address.city_code.clone(),
            city_name: address.city_name.clone(),
            country_code: address.country_code.clone(),
            country_name: address.country_name.clone(),
        }
    }
}
