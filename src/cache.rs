// Single-slot cache holding the most recent flight-offer search and its enriched dictionaries
// Shared by all requests; every put replaces the whole snapshot

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::error::ApiError;
use crate::supplier::{Dictionaries, FlightOfferSearchResult};

#[derive(Debug, Default)]
pub struct CacheStats {
    pub put_count: AtomicUsize,
    pub hit_count: AtomicUsize,
    pub miss_count: AtomicUsize,
    pub clear_count: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsReport {
    pub put_count: usize,
    pub hit_count: usize,
    pub miss_count: usize,
    pub clear_count: usize,
    pub occupied: bool,
}

// Immutable once stored; readers hold an Arc to the snapshot they observed
#[derive(Debug)]
pub struct CachedSearch {
    pub result: Arc<FlightOfferSearchResult>,
    pub dictionaries: Arc<Dictionaries>,
}

#[derive(Debug, Default)]
pub struct FlightOfferCache {
    slot: RwLock<Option<Arc<CachedSearch>>>,
    stats: CacheStats,
}

impl FlightOfferCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, result: FlightOfferSearchResult, dictionaries: Dictionaries) -> Arc<CachedSearch> {
        let snapshot = Arc::new(CachedSearch {
            result: Arc::new(result),
            dictionaries: Arc::new(dictionaries),
        });
        *self.slot.write() = Some(Arc::clone(&snapshot));
        self.stats.put_count.fetch_add(1, Ordering::SeqCst);
        snapshot
    }

    // Both halves come from the same put
    pub fn snapshot(&self) -> Option<Arc<CachedSearch>> {
        let snapshot = self.slot.read().clone();
        self.record_lookup(snapshot.is_some());
        snapshot
    }

    pub fn last_result(&self) -> Result<Arc<FlightOfferSearchResult>, ApiError> {
        self.snapshot()
            .map(|s| Arc::clone(&s.result))
            .ok_or(ApiError::CacheEmpty)
    }

    pub fn last_dictionaries(&self) -> Option<Arc<Dictionaries>> {
        self.snapshot().map(|s| Arc::clone(&s.dictionaries))
    }

    pub fn clear(&self) {
        *self.slot.write() = None;
        self.stats.clear_count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn stats(&self) -> CacheStatsReport {
        CacheStatsReport {
            put_count: self.stats.put_count.load(Ordering::SeqCst),
            hit_count: self.stats.hit_count.load(Ordering::SeqCst),
            miss_count: self.stats.miss_count.load(Ordering::SeqCst),
            clear_count: self.stats.clear_count.load(Ordering::SeqCst),
            occupied: self.slot.read().is_some(),
        }
    }

    fn record_lookup(&self, hit: bool) {
        if hit {
            self.stats.hit_count.fetch_add(1, Ordering::SeqCst);
        } else {
            self.stats.miss_count.fetch_add(1, Ordering::SeqCst);
        }
    }
}
