// pipeline.rs
use chrono::{NaiveDate, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, info_span, warn};

use crate::config::AppConfig;
use crate::db::connection::Database;
use crate::db::listings::{load_listing_rows, validate_rows};
use crate::domain::changes::{change_metrics, SeriesField};
use crate::domain::listing::Category;
use crate::domain::weekly::resample_weekly;
use crate::errors::TrendError;
use crate::rates::{align_to_periods, FredClient, RateCache, RateSeries, RateService};
use crate::report::{CategoryTrend, RateTrend, TrendReport};
use crate::retry::{with_retry, RetryPolicy};
use crate::snapshot::{source_from_config, SnapshotSource};

/// One end-to-end run: snapshot, aggregate, rates, report.
pub struct TrendPipeline {
    snapshot: Box<dyn SnapshotSource>,
    local_path: PathBuf,
    table: String,
    rates: RateService,
    rate_start: NaiveDate,
    retry: RetryPolicy,
}

impl TrendPipeline {
    pub fn new(
        snapshot: Box<dyn SnapshotSource>,
        local_path: impl Into<PathBuf>,
        table: impl Into<String>,
        rates: RateService,
        rate_start: NaiveDate,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            snapshot,
            local_path: local_path.into(),
            table: table.into(),
            rates,
            rate_start,
            retry,
        }
    }

    /// Wire the production collaborators from configuration.
    pub fn from_config(cfg: &AppConfig, cache: Arc<RateCache>) -> Result<Self, TrendError> {
        let snapshot = source_from_config(&cfg.snapshot)?;
        let fred = FredClient::new(
            &cfg.rates.base_url,
            cfg.rates.api_key.expose().to_string(),
            Duration::from_secs(cfg.rates.timeout_secs),
        )?;
        let rates = RateService::new(Arc::new(fred), cache, cfg.retry.clone());

        Ok(Self::new(
            snapshot,
            cfg.snapshot.local_path.clone(),
            cfg.snapshot.table.clone(),
            rates,
            cfg.rates.start_date,
            cfg.retry.clone(),
        ))
    }

    pub fn run(&self) -> Result<TrendReport, TrendError> {
        let started = Instant::now();
        let _span = info_span!("trend_run", source = %self.snapshot.describe()).entered();

        // 1. Snapshot, once, before anything reads it
        let db = Database::new(&self.local_path);
        db.close();
        let snapshot = with_retry(&self.retry, "snapshot", || {
            self.snapshot.fetch(&self.local_path)
        })?;
        info!(
            bytes = snapshot.bytes,
            sha256 = %snapshot.sha256,
            path = %snapshot.local_path.display(),
            "snapshot fetched"
        );

        // 2. Load and validate listings
        let rows = load_listing_rows(&db, &self.table)?;
        let loaded = validate_rows(&rows)?;
        let data_last_updated = loaded.records.iter().map(|r| r.observed_at).max();

        // 3. Rates
        let mut rates = Vec::with_capacity(RateSeries::ALL.len());
        for series in RateSeries::ALL {
            let granularity = series.default_granularity();
            let observations = self
                .rates
                .resampled_series(series, granularity, self.rate_start)?;
            rates.push(RateTrend {
                series,
                title: series.title(),
                granularity,
                observations,
            });
        }

        let mortgage = rates
            .iter()
            .find(|r| r.series == RateSeries::ThirtyYearMortgage)
            .map(|r| r.observations.as_slice())
            .unwrap_or(&[]);

        // 4. Per-category weekly series and change metrics
        let mut categories = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let weekly = resample_weekly(&loaded.records, category);
            let price_change = change_metrics(&weekly, SeriesField::Price);
            let count_change = change_metrics(&weekly, SeriesField::Count);

            for (field, metrics) in [("price", &price_change), ("count", &count_change)] {
                for (metric, reason) in metrics.unavailable() {
                    warn!(category = category.as_str(), field, metric, reason, "change metric unavailable");
                }
            }

            categories.push(CategoryTrend {
                category,
                label: category.label(),
                mortgage_overlay: align_to_periods(&weekly, mortgage),
                weekly,
                price_change,
                count_change,
            });
        }

        info!(
            weeks = categories.iter().map(|c| c.weekly.len()).max().unwrap_or(0),
            elapsed = ?started.elapsed(),
            "trend report built"
        );

        Ok(TrendReport {
            generated_at: Utc::now(),
            data_last_updated,
            snapshot,
            tracked_rows: loaded.records.len(),
            untracked_rows: loaded.untracked,
            categories,
            rates,
        })
    }
}
