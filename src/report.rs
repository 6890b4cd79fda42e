// report.rs
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::config::ReportConfig;
use crate::domain::changes::ChangeMetrics;
use crate::domain::listing::Category;
use crate::domain::weekly::WeeklyAggregate;
use crate::errors::TrendError;
use crate::rates::{AlignedPoint, Granularity, RateObservation, RateSeries};
use crate::snapshot::SnapshotInfo;

/// Everything a chart or summary layer needs from one run.
#[derive(Debug, Serialize)]
pub struct TrendReport {
    pub generated_at: DateTime<Utc>,
    /// Latest observation timestamp in the snapshot.
    pub data_last_updated: Option<NaiveDateTime>,
    pub snapshot: SnapshotInfo,
    pub tracked_rows: usize,
    pub untracked_rows: usize,
    pub categories: Vec<CategoryTrend>,
    pub rates: Vec<RateTrend>,
}

#[derive(Debug, Serialize)]
pub struct CategoryTrend {
    pub category: Category,
    pub label: &'static str,
    pub weekly: Vec<WeeklyAggregate>,
    pub price_change: ChangeMetrics,
    pub count_change: ChangeMetrics,
    /// 30-year mortgage rate for each week in `weekly`.
    pub mortgage_overlay: Vec<AlignedPoint>,
}

#[derive(Debug, Serialize)]
pub struct RateTrend {
    pub series: RateSeries,
    pub title: &'static str,
    pub granularity: Granularity,
    pub observations: Vec<RateObservation>,
}

pub fn write_report(report: &TrendReport, cfg: &ReportConfig) -> Result<(), TrendError> {
    let writer: Box<dyn Write> = match &cfg.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);

    if cfg.pretty {
        serde_json::to_writer_pretty(&mut writer, report)?;
    } else {
        serde_json::to_writer(&mut writer, report)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
