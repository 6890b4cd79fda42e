use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::errors::TrendError;
use crate::rates::models::{Granularity, RateObservation, RateSeries};

pub const DEFAULT_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub series: RateSeries,
    pub granularity: Granularity,
    pub start: NaiveDate,
}

#[derive(Debug)]
struct CacheEntry {
    value: Vec<RateObservation>,
    fetched_at: DateTime<Utc>,
}

type Slot = Arc<Mutex<Option<CacheEntry>>>;

/// Time-boxed store of resampled rate series.
///
/// Each key has its own lock, held across the upstream fetch, so concurrent
/// callers for the same key wait for one fetch instead of issuing their own.
/// Entries are never evicted; an expired entry is refreshed on next use and
/// kept as a fallback if the refresh fails transiently.
pub struct RateCache {
    ttl: Duration,
    enabled: bool,
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_TTL_SECS))
    }
}

impl RateCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            enabled: true,
            slots: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    /// Pass-through cache: every lookup goes upstream.
    pub fn disabled() -> Self {
        Self {
            ttl: Duration::zero(),
            enabled: false,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: CacheKey) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.entry(key).or_default().clone()
    }

    /// Lookup evaluated as of `now`.
    pub fn get_or_fetch_at<F>(
        &self,
        key: CacheKey,
        now: DateTime<Utc>,
        fetch: F,
    ) -> Result<Vec<RateObservation>, TrendError>
    where
        F: FnOnce() -> Result<Vec<RateObservation>, TrendError>,
    {
        if !self.enabled {
            return fetch();
        }

        let slot = self.slot(key);
        let mut entry = slot.lock().unwrap_or_else(|p| p.into_inner());

        if let Some(cached) = entry.as_ref() {
            // An expiry past the representable range never lapses.
            let fresh = cached
                .fetched_at
                .checked_add_signed(self.ttl)
                .map_or(true, |expires| now < expires);
            if fresh {
                debug!(series = key.series.series_id(), granularity = ?key.granularity, "rate cache hit");
                return Ok(cached.value.clone());
            }
        }

        match fetch() {
            Ok(value) => {
                *entry = Some(CacheEntry {
                    value: value.clone(),
                    fetched_at: now,
                });
                Ok(value)
            }
            Err(e) => match entry.as_ref() {
                Some(stale) if e.is_transient() => {
                    warn!(
                        series = key.series.series_id(),
                        fetched_at = %stale.fetched_at,
                        error = %e,
                        "upstream refresh failed, serving stale rates"
                    );
                    Ok(stale.value.clone())
                }
                _ => Err(e),
            },
        }
    }
}
