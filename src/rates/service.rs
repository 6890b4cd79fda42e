use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;

use crate::errors::TrendError;
use crate::rates::cache::{CacheKey, RateCache};
use crate::rates::fred::RateSource;
use crate::rates::models::{Granularity, RateObservation, RateSeries};
use crate::rates::resample::resample_rates;
use crate::retry::{with_retry, RetryPolicy};

/// Fetches, resamples and caches external rate series.
pub struct RateService {
    source: Arc<dyn RateSource>,
    cache: Arc<RateCache>,
    retry: RetryPolicy,
}

impl RateService {
    pub fn new(source: Arc<dyn RateSource>, cache: Arc<RateCache>, retry: RetryPolicy) -> Self {
        Self {
            source,
            cache,
            retry,
        }
    }

    pub fn resampled_series(
        &self,
        series: RateSeries,
        granularity: Granularity,
        start: NaiveDate,
    ) -> Result<Vec<RateObservation>, TrendError> {
        self.resampled_series_at(series, granularity, start, Utc::now())
    }

    pub fn resampled_series_at(
        &self,
        series: RateSeries,
        granularity: Granularity,
        start: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<RateObservation>, TrendError> {
        let key = CacheKey {
            series,
            granularity,
            start,
        };

        self.cache.get_or_fetch_at(key, now, || {
            let raw = with_retry(&self.retry, series.series_id(), || {
                self.source.fetch_observations(series, start)
            })?;
            let resampled = resample_rates(&raw, granularity);
            info!(
                series = series.series_id(),
                granularity = ?granularity,
                raw = raw.len(),
                periods = resampled.len(),
                "rate series refreshed"
            );
            Ok(resampled)
        })
    }
}
