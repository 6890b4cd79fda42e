use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::domain::changes::round2;
use crate::domain::weekly::{week_ending, WeeklyAggregate};
use crate::rates::models::{Granularity, RateObservation};

/// Last calendar day of the month containing `date`.
pub fn month_ending(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

pub fn period_ending(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Weekly => week_ending(date),
        Granularity::Monthly => month_ending(date),
    }
}

/// Mean rate per period, rounded to two places, ascending by period end.
pub fn resample_rates(
    observations: &[RateObservation],
    granularity: Granularity,
) -> Vec<RateObservation> {
    let mut buckets: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();

    for obs in observations {
        let entry = buckets
            .entry(period_ending(obs.date, granularity))
            .or_insert((0.0, 0));
        entry.0 += obs.rate;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(period_end, (sum, n))| RateObservation::new(period_end, round2(sum / n as f64)))
        .collect()
}

/// A weekly aggregate's period joined with a rate for the same period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedPoint {
    pub period_end: NaiveDate,
    pub rate: Option<f64>,
}

/// Join a resampled rate series onto weekly aggregates by exact period end.
pub fn align_to_periods(
    weekly: &[WeeklyAggregate],
    rates: &[RateObservation],
) -> Vec<AlignedPoint> {
    let by_date: HashMap<NaiveDate, f64> = rates.iter().map(|r| (r.date, r.rate)).collect();

    weekly
        .iter()
        .map(|w| AlignedPoint {
            period_end: w.period_end,
            rate: by_date.get(&w.period_end).copied(),
        })
        .collect()
}
