// src/domain/changes.rs

use chrono::Duration;
use serde::Serialize;

use crate::domain::weekly::WeeklyAggregate;
use crate::errors::TrendError;

/// Periods between the latest week and the one it is compared against.
pub const LOOKBACK_PERIODS: usize = 4;

/// Which column of a weekly series a metric is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesField {
    Price,
    Count,
}

impl SeriesField {
    pub fn value_of(&self, agg: &WeeklyAggregate) -> f64 {
        match self {
            SeriesField::Price => agg.mean_price as f64,
            SeriesField::Count => agg.distinct_count as f64,
        }
    }
}

/// One percent-change figure, or why it could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricOutcome {
    Available { value: f64 },
    Unavailable { reason: String },
}

impl From<Result<f64, TrendError>> for MetricOutcome {
    fn from(result: Result<f64, TrendError>) -> Self {
        match result {
            Ok(value) => MetricOutcome::Available { value },
            Err(e) => MetricOutcome::Unavailable {
                reason: e.to_string(),
            },
        }
    }
}

/// Headline change figures for one field of one category. Each figure stands
/// on its own: a short series still reports its total change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeMetrics {
    /// First week to latest week, in percent.
    pub total_pct_change: MetricOutcome,
    /// Week `LOOKBACK_PERIODS` back to latest week, in percent.
    pub trailing_pct_change: MetricOutcome,
}

impl ChangeMetrics {
    pub fn unavailable(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        [
            ("total", &self.total_pct_change),
            ("trailing", &self.trailing_pct_change),
        ]
        .into_iter()
        .filter_map(|(name, outcome)| match outcome {
            MetricOutcome::Unavailable { reason } => Some((name, reason.as_str())),
            MetricOutcome::Available { .. } => None,
        })
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn pct_change(base: f64, current: f64, what: &str) -> Result<f64, TrendError> {
    if base == 0.0 {
        return Err(TrendError::DivisionByZero(format!("{what} base value is zero")));
    }
    Ok(round2((current / base - 1.0) * 100.0))
}

/// `(last / first - 1) * 100`, rounded to two places.
pub fn total_percent_change(
    series: &[WeeklyAggregate],
    field: SeriesField,
) -> Result<f64, TrendError> {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(TrendError::InsufficientData("series is empty".into()));
    };
    pct_change(field.value_of(first), field.value_of(last), "total change")
}

/// Percent change from the week `LOOKBACK_PERIODS` weeks before the latest
/// one, located by its `period_end` so dropped weeks cannot shift the base.
pub fn trailing_change(
    series: &[WeeklyAggregate],
    field: SeriesField,
) -> Result<f64, TrendError> {
    if series.len() <= LOOKBACK_PERIODS {
        return Err(TrendError::InsufficientData(format!(
            "need at least {} periods for a {LOOKBACK_PERIODS}-period lookback, got {}",
            LOOKBACK_PERIODS + 1,
            series.len()
        )));
    }

    let Some(last) = series.last() else {
        return Err(TrendError::InsufficientData("series is empty".into()));
    };
    let target = last.period_end - Duration::weeks(LOOKBACK_PERIODS as i64);

    let base = series
        .binary_search_by_key(&target, |agg| agg.period_end)
        .map(|idx| &series[idx])
        .map_err(|_| {
            TrendError::InsufficientData(format!("no observations for the week ending {target}"))
        })?;

    pct_change(field.value_of(base), field.value_of(last), "trailing change")
}

pub fn change_metrics(series: &[WeeklyAggregate], field: SeriesField) -> ChangeMetrics {
    ChangeMetrics {
        total_pct_change: total_percent_change(series, field).into(),
        trailing_pct_change: trailing_change(series, field).into(),
    }
}
