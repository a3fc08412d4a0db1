use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use lru::LruCache;

use crate::calendar::DayData;

// Performance Metrics
#[derive(Debug, Default)]
pub struct Metrics {
    calculation_time: AtomicU64,
    days_computed: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_calculation(&self, duration: Duration, days: u64) {
        self.calculation_time
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.days_computed.fetch_add(days, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn days_computed(&self) -> u64 {
        self.days_computed.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> String {
        format!(
            "Performance Metrics:\n\
             Calculation Time: {}µs\n\
             Days Computed: {}\n\
             Cache Hits: {}\n\
             Cache Misses: {}\n\
             Cache Hit Rate: {:.2}%",
            self.calculation_time.load(Ordering::Relaxed),
            self.days_computed(),
            self.cache_hits(),
            self.cache_misses(),
            self.cache_hit_rate() * 100.0
        )
    }

    pub fn cache_hit_rate(&self) -> f64 {
        let hits = self.cache_hits() as f64;
        let misses = self.cache_misses() as f64;
        let total = hits + misses;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }
}

// Day cache, keyed by civil date
pub struct CalendarCache {
    cache: LruCache<NaiveDate, DayData>,
}

impl CalendarCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: LruCache::new(capacity),
        }
    }

    // LruCache::get requires mutable access, so we use &mut self.
    pub fn get_day(&mut self, date: &NaiveDate) -> Option<DayData> {
        self.cache.get(date).cloned()
    }

    pub fn put_day(&mut self, data: DayData) {
        self.cache.put(data.astro.date, data);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }
}
