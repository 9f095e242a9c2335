use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flight_search_proxy::cache::FlightOfferCache;
use flight_search_proxy::dictionary::DictionaryFilter;
use flight_search_proxy::supplier::{
    Aircraft, Dictionaries, FlightEndpoint, FlightOffer, FlightOfferSearchResult, Itinerary,
    LocationInfo, Segment,
};
use rand::{seq::SliceRandom, thread_rng, Rng};
use std::sync::Arc;
use std::thread;

const AIRPORTS: [&str; 12] = [
    "JFK", "LAX", "ORD", "ATL", "DFW", "DEN", "SFO", "SEA", "MIA", "BOS", "CDG", "LHR",
];
const CARRIERS: [&str; 6] = ["AA", "DL", "UA", "B6", "AF", "BA"];
const AIRCRAFT: [&str; 4] = ["321", "738", "77W", "789"];

fn random_segment(rng: &mut impl Rng) -> Segment {
    let mut pair = AIRPORTS.choose_multiple(rng, 2);
    let from = pair.next().copied().unwrap_or("JFK");
    let to = pair.next().copied().unwrap_or("LAX");
    Segment {
        departure: FlightEndpoint {
            iata_code: from.to_string(),
            ..FlightEndpoint::default()
        },
        arrival: FlightEndpoint {
            iata_code: to.to_string(),
            ..FlightEndpoint::default()
        },
        carrier_code: CARRIERS.choose(rng).unwrap().to_string(),
        aircraft: Some(Aircraft {
            code: AIRCRAFT.choose(rng).unwrap().to_string(),
        }),
        ..Segment::default()
    }
}

fn random_search(offers: usize) -> (FlightOfferSearchResult, Dictionaries) {
    let mut rng = thread_rng();
    let data = (0..offers)
        .map(|i| FlightOffer {
            id: (i + 1).to_string(),
            itineraries: (0..rng.gen_range(1..=2))
                .map(|_| Itinerary {
                    duration: None,
                    segments: (0..rng.gen_range(1..=3))
                        .map(|_| random_segment(&mut rng))
                        .collect(),
                })
                .collect(),
            ..FlightOffer::default()
        })
        .collect();

    let mut dictionaries = Dictionaries::default();
    for code in AIRPORTS {
        dictionaries.locations.insert(
            code.to_string(),
            LocationInfo {
                city_code: Some(code.to_string()),
                city_name: Some(format!("{} CITY", code)),
                ..LocationInfo::default()
            },
        );
    }
    for code in CARRIERS {
        dictionaries
            .carriers
            .insert(code.to_string(), format!("{} AIRLINES", code));
    }
    for code in AIRCRAFT {
        dictionaries
            .aircraft
            .insert(code.to_string(), format!("AIRCRAFT {}", code));
    }

    let result = FlightOfferSearchResult {
        data,
        dictionaries: dictionaries.clone(),
        ..FlightOfferSearchResult::default()
    };
    (result, dictionaries)
}

pub fn dictionary_projection_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("dictionary_projection");

    for offers in [10, 100, 250].iter() {
        let (result, dictionaries) = random_search(*offers);
        group.bench_with_input(BenchmarkId::from_parameter(offers), offers, |b, _| {
            b.iter(|| {
                for offer in &result.data {
                    black_box(DictionaryFilter::project(offer, &dictionaries));
                }
            });
        });
    }

    group.finish();
}

// Mixed detail reads and search replacements from several threads
pub fn cache_contention_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("flight_offer_cache");

    for readers in [1, 4, 8].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(readers),
            readers,
            |b, &readers| {
                let (result, dictionaries) = random_search(50);
                let cache = Arc::new(FlightOfferCache::new());
                cache.put(result.clone(), dictionaries.clone());

                b.iter(|| {
                    let mut handles = vec![];

                    {
                        let cache = Arc::clone(&cache);
                        let result = result.clone();
                        let dictionaries = dictionaries.clone();
                        handles.push(thread::spawn(move || {
                            for _ in 0..10 {
                                cache.put(result.clone(), dictionaries.clone());
                            }
                        }));
                    }

                    for _ in 0..readers {
                        let cache = Arc::clone(&cache);
                        handles.push(thread::spawn(move || {
                            let mut rng = thread_rng();
                            for _ in 0..250 {
                                if let Some(snapshot) = cache.snapshot() {
                                    if let Some(offer) = snapshot.result.data.choose(&mut rng) {
                                        black_box(DictionaryFilter::project(
                                            offer,
                                            &snapshot.dictionaries,
                                        ));
                                    }
                                }
                            }
                        }));
                    }

                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    dictionary_projection_benchmark,
    cache_contention_benchmark
);
criterion_main!(benches);
