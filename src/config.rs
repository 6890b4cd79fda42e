// config.rs
use chrono::{Duration, NaiveDate};
use ::config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

use crate::db::listings::DEFAULT_LISTINGS_TABLE;
use crate::errors::TrendError;
use crate::rates::DEFAULT_TTL_SECS;
use crate::retry::RetryPolicy;

pub const ENV_PREFIX: &str = "LISTING_TRENDS";

/// Credential string that never shows up in debug output or logs.
#[derive(Clone, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    #[cfg(test)]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(***)")
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub snapshot: SnapshotConfig,
    pub rates: RatesConfig,
    pub retry: RetryPolicy,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// `file:///...` or `https://...` (presigned object URL).
    pub source: String,
    /// Where the fetched copy is written and opened from.
    pub local_path: PathBuf,
    pub table: String,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<Secret>,
    pub timeout_secs: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            source: "file:///var/lib/listing_trends/listings_master.db".to_string(),
            local_path: PathBuf::from("listings_master.db"),
            table: DEFAULT_LISTINGS_TABLE.to_string(),
            region: None,
            access_key_id: None,
            secret_access_key: None,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    pub base_url: String,
    pub api_key: Secret,
    pub start_date: NaiveDate,
    pub timeout_secs: u64,
    pub cache_ttl_secs: i64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.stlouisfed.org/fred/".to_string(),
            api_key: Secret::default(),
            start_date: NaiveDate::from_ymd_opt(2022, 6, 1).unwrap_or(NaiveDate::MIN),
            timeout_secs: 5,
            cache_ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ReportConfig {
    /// Write the JSON report here instead of stdout.
    pub output: Option<PathBuf>,
    pub pretty: bool,
}

impl RatesConfig {
    /// `cache_ttl_secs` as a duration; must be non-negative and representable.
    pub fn cache_ttl(&self) -> Result<Duration, TrendError> {
        if self.cache_ttl_secs < 0 {
            return Err(TrendError::Config("rates.cache_ttl_secs must not be negative".into()));
        }
        Duration::try_seconds(self.cache_ttl_secs).ok_or_else(|| {
            TrendError::Config(format!(
                "rates.cache_ttl_secs out of range: {}",
                self.cache_ttl_secs
            ))
        })
    }
}

impl AppConfig {
    /// Layer an optional TOML file under `LISTING_TRENDS__SECTION__KEY`
    /// environment overrides.
    pub fn load(path: &str) -> Result<Self, TrendError> {
        let config = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .map_err(|e| TrendError::Config(e.to_string()))?;

        let cfg: AppConfig = config
            .try_deserialize()
            .map_err(|e| TrendError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), TrendError> {
        self.rates.cache_ttl()?;
        if self.snapshot.table.trim().is_empty() {
            return Err(TrendError::Config("snapshot.table must not be empty".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(TrendError::Config("retry.max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}
