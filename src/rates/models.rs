use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Interest-rate series plotted next to the listing trends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateSeries {
    /// 10-year treasury constant maturity yield (daily).
    #[serde(rename = "DGS10")]
    TenYearTreasury,
    /// 30-year fixed mortgage average (weekly).
    #[serde(rename = "MORTGAGE30US")]
    ThirtyYearMortgage,
    /// Effective federal funds rate (monthly).
    #[serde(rename = "FEDFUNDS")]
    FederalFunds,
}

impl RateSeries {
    pub const ALL: [RateSeries; 3] = [
        RateSeries::TenYearTreasury,
        RateSeries::ThirtyYearMortgage,
        RateSeries::FederalFunds,
    ];

    pub fn series_id(&self) -> &'static str {
        match self {
            RateSeries::TenYearTreasury => "DGS10",
            RateSeries::ThirtyYearMortgage => "MORTGAGE30US",
            RateSeries::FederalFunds => "FEDFUNDS",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            RateSeries::TenYearTreasury => "10 Year Treasury Yield",
            RateSeries::ThirtyYearMortgage => "30 Yr Fixed Mortgage Rate",
            RateSeries::FederalFunds => "Federal Funds Rate",
        }
    }

    /// Coarsest bucket the source publishes at without interpolation.
    pub fn default_granularity(&self) -> Granularity {
        match self {
            RateSeries::FederalFunds => Granularity::Monthly,
            _ => Granularity::Weekly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateObservation {
    pub date: NaiveDate,
    pub rate: f64,
}

impl RateObservation {
    pub fn new(date: NaiveDate, rate: f64) -> Self {
        Self { date, rate }
    }
}

// ----- FRED wire format -----

#[derive(Debug, Deserialize)]
pub(crate) struct FredObservationsResponse {
    pub observations: Vec<FredObservation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FredObservation {
    pub date: String,
    /// Decimal string, or "." when the source has no value for the date.
    pub value: String,
}
