// fred.rs
use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::errors::TrendError;
use crate::rates::models::{FredObservationsResponse, RateObservation, RateSeries};

/// Anything that can return raw observations for a rate series.
pub trait RateSource: Send + Sync {
    /// Observations dated on or after `start`, through today.
    fn fetch_observations(
        &self,
        series: RateSeries,
        start: NaiveDate,
    ) -> Result<Vec<RateObservation>, TrendError>;
}

/// St. Louis Fed (FRED) observations API.
pub struct FredClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl FredClient {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, TrendError> {
        let base = Url::parse(base_url)
            .map_err(|e| TrendError::Config(format!("invalid FRED base url '{base_url}': {e}")))?;
        let endpoint = base
            .join("series/observations")
            .map_err(|e| TrendError::Config(format!("invalid FRED base url '{base_url}': {e}")))?;

        if api_key.trim().is_empty() {
            return Err(TrendError::Config("FRED api key is not set".into()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrendError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

impl RateSource for FredClient {
    fn fetch_observations(
        &self,
        series: RateSeries,
        start: NaiveDate,
    ) -> Result<Vec<RateObservation>, TrendError> {
        let start_param = start.format("%Y-%m-%d").to_string();
        let params = [
            ("series_id", series.series_id()),
            ("api_key", self.api_key.as_str()),
            ("file_type", "json"),
            ("observation_start", start_param.as_str()),
        ];

        let resp = self
            .client
            .get(self.endpoint.clone())
            .query(&params)
            .send()
            .map_err(|e| {
                TrendError::UpstreamUnavailable(format!("{}: {}", series.series_id(), e.without_url()))
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| TrendError::UpstreamUnavailable(format!("{}: {e}", series.series_id())))?;

        if !status.is_success() {
            return Err(classify_status(series, status, &text));
        }

        let observations = parse_observations(&text)?;
        debug!(
            series = series.series_id(),
            count = observations.len(),
            "rate observations fetched"
        );
        Ok(observations)
    }
}

/// 4xx (other than throttling) means our request is wrong; retrying won't help.
fn classify_status(series: RateSeries, status: StatusCode, body: &str) -> TrendError {
    let msg = format!("{} HTTP {}: {}", series.series_id(), status, body.trim());
    if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
        TrendError::Config(msg)
    } else {
        TrendError::UpstreamUnavailable(msg)
    }
}

/// Decode an observations payload, skipping "." placeholders.
pub fn parse_observations(body: &str) -> Result<Vec<RateObservation>, TrendError> {
    let payload: FredObservationsResponse = serde_json::from_str(body)
        .map_err(|e| TrendError::UpstreamUnavailable(format!("malformed observations payload: {e}")))?;

    let mut out = Vec::with_capacity(payload.observations.len());
    for obs in payload.observations {
        let value = obs.value.trim();
        if value == "." || value.is_empty() {
            continue;
        }

        let date = NaiveDate::parse_from_str(obs.date.trim(), "%Y-%m-%d").map_err(|e| {
            TrendError::Validation(format!("observation date '{}': {e}", obs.date))
        })?;
        let rate: f64 = value.parse().map_err(|e| {
            TrendError::Validation(format!("observation value '{value}' on {date}: {e}"))
        })?;

        out.push(RateObservation::new(date, rate));
    }

    out.sort_by_key(|o| o.date);
    Ok(out)
}
