use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::TrendError;

/// Property-type buckets tracked by the trend report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Apartment,
    Condo,
    Townhouse,
    SingleFamily,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Apartment,
        Category::Condo,
        Category::Townhouse,
        Category::SingleFamily,
    ];

    /// Exact match against the store's home-type column.
    pub fn from_home_type(home_type: &str) -> Option<Self> {
        match home_type {
            "APARTMENT" => Some(Category::Apartment),
            "CONDO" => Some(Category::Condo),
            "TOWNHOUSE" => Some(Category::Townhouse),
            "SINGLE_FAMILY" => Some(Category::SingleFamily),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Apartment => "APARTMENT",
            Category::Condo => "CONDO",
            Category::Townhouse => "TOWNHOUSE",
            Category::SingleFamily => "SINGLE_FAMILY",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Apartment => "Apartments",
            Category::Condo => "Condos",
            Category::Townhouse => "Townhouses",
            Category::SingleFamily => "Single Family",
        }
    }
}

/// A row as it comes out of the listings table, before validation.
#[derive(Debug, Clone)]
pub struct RawListingRow {
    pub id: String,
    pub home_type: String,
    pub listed_price: Option<f64>,
    pub observed_at: Option<String>,
}

/// One observation of one listing on one scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub id: String,
    pub category: Category,
    pub listed_price: f64,
    pub observed_at: NaiveDateTime,
}

impl ListingRecord {
    /// Validate a raw row.
    ///
    /// Returns `Ok(None)` for home types outside the tracked categories.
    pub fn from_row(row: &RawListingRow) -> Result<Option<Self>, TrendError> {
        let Some(category) = Category::from_home_type(&row.home_type) else {
            return Ok(None);
        };

        let id = row.id.trim();
        if id.is_empty() {
            return Err(TrendError::Validation(format!(
                "{} row with empty listing id",
                category.as_str()
            )));
        }

        let listed_price = match row.listed_price {
            Some(p) if p.is_finite() && p > 0.0 => p,
            other => {
                return Err(TrendError::Validation(format!(
                    "listing {id}: price {other:?} is not a positive number"
                )))
            }
        };

        let raw_ts = row.observed_at.as_deref().unwrap_or("");
        let observed_at = parse_observed_at(raw_ts).ok_or_else(|| {
            TrendError::Validation(format!("listing {id}: unparseable timestamp '{raw_ts}'"))
        })?;

        Ok(Some(Self {
            id: id.to_string(),
            category,
            listed_price,
            observed_at,
        }))
    }

    pub fn observed_date(&self) -> NaiveDate {
        self.observed_at.date()
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];

/// Parse the timestamp formats seen in the scrape history.
/// Offset-bearing timestamps keep their local wall-clock date.
pub fn parse_observed_at(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
