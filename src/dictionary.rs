// Projection of the search-wide dictionaries down to the codes one offer references

use std::collections::{BTreeMap, BTreeSet};

use crate::supplier::{Dictionaries, FlightOffer};

// Codes referenced by the segments of an offer
#[derive(Debug, Default, PartialEq)]
pub struct ReferencedCodes {
    pub locations: BTreeSet<String>,
    pub carriers: BTreeSet<String>,
    pub aircraft: BTreeSet<String>,
}

impl ReferencedCodes {
    pub fn of(offer: &FlightOffer) -> Self {
        let mut codes = ReferencedCodes::default();

        for segment in offer.itineraries.iter().flat_map(|i| &i.segments) {
            codes.locations.insert(segment.departure.iata_code.clone());
            codes.locations.insert(segment.arrival.iata_code.clone());
            codes.carriers.insert(segment.carrier_code.clone());

            if let Some(operating) = segment
                .operating
                .as_ref()
                .and_then(|o| o.carrier_code.as_ref())
            {
                codes.carriers.insert(operating.clone());
            }
            if let Some(aircraft) = &segment.aircraft {
                codes.aircraft.insert(aircraft.code.clone());
            }
        }

        codes
    }
}

pub struct DictionaryFilter;

impl DictionaryFilter {
    // Codes missing from the full dictionaries are skipped; currencies are not segment-referenced
    pub fn project(offer: &FlightOffer, full: &Dictionaries) -> Dictionaries {
        let codes = ReferencedCodes::of(offer);

        Dictionaries {
            locations: pick(&full.locations, &codes.locations),
            carriers: pick(&full.carriers, &codes.carriers),
            aircraft: pick(&full.aircraft, &codes.aircraft),
            currencies: BTreeMap::new(),
        }
    }
}

fn pick<V: Clone>(table: &BTreeMap<String, V>, keys: &BTreeSet<String>) -> BTreeMap<String, V> {
    keys.iter()
        .filter_map(|key| table.get(key).map(|value| (key.clone(), value.clone())))
        .collect()
}
