// src/domain/weekly.rs

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::domain::listing::{Category, ListingRecord};

/// Mean list price and active-listing count for one category in one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyAggregate {
    /// Sunday closing the week.
    pub period_end: NaiveDate,
    /// Arithmetic mean of list prices, truncated toward zero.
    pub mean_price: i64,
    /// Unique listing ids seen during the week.
    pub distinct_count: u64,
}

/// The Sunday that closes the Monday..Sunday week containing `date`.
pub fn week_ending(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = 6 - date.weekday().num_days_from_monday() as i64;
    date + Duration::days(days_to_sunday)
}

#[derive(Default)]
struct WeekBucket<'a> {
    price_sum: f64,
    rows: u64,
    ids: HashSet<&'a str>,
}

/// Bucket one category's records into weeks ending Sunday.
///
/// Weeks with no records are absent from the output, which is ordered by
/// `period_end` ascending.
pub fn resample_weekly(records: &[ListingRecord], category: Category) -> Vec<WeeklyAggregate> {
    let mut buckets: BTreeMap<NaiveDate, WeekBucket<'_>> = BTreeMap::new();

    for record in records.iter().filter(|r| r.category == category) {
        let bucket = buckets
            .entry(week_ending(record.observed_date()))
            .or_default();
        bucket.price_sum += record.listed_price;
        bucket.rows += 1;
        bucket.ids.insert(record.id.as_str());
    }

    buckets
        .into_iter()
        .map(|(period_end, bucket)| WeeklyAggregate {
            period_end,
            mean_price: (bucket.price_sum / bucket.rows as f64).trunc() as i64,
            distinct_count: bucket.ids.len() as u64,
        })
        .collect()
}
