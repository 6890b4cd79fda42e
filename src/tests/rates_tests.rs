// src/tests/rates_tests.rs

use super::utils::date;
use crate::domain::weekly::WeeklyAggregate;
use crate::errors::TrendError;
use crate::rates::fred::parse_observations;
use crate::rates::resample::{month_ending, resample_rates};
use crate::rates::{align_to_periods, Granularity, RateObservation, RateSeries};

#[test]
fn fred_payload_skips_missing_values() {
    let body = r#"{
        "realtime_start": "2024-01-01",
        "count": 4,
        "observations": [
            {"realtime_start": "2024-01-01", "date": "2022-06-14", "value": "3.48"},
            {"realtime_start": "2024-01-01", "date": "2022-06-13", "value": "3.37"},
            {"realtime_start": "2024-01-01", "date": "2022-06-20", "value": "."},
            {"realtime_start": "2024-01-01", "date": "2022-06-21", "value": "3.31"}
        ]
    }"#;

    let obs = parse_observations(body).unwrap();
    assert_eq!(
        obs,
        vec![
            RateObservation::new(date(2022, 6, 13), 3.37),
            RateObservation::new(date(2022, 6, 14), 3.48),
            RateObservation::new(date(2022, 6, 21), 3.31),
        ]
    );
}

#[test]
fn malformed_payload_is_upstream_failure() {
    assert!(matches!(
        parse_observations("<html>503</html>"),
        Err(TrendError::UpstreamUnavailable(_))
    ));
    assert!(matches!(
        parse_observations(r#"{"observations":[{"date":"2022-06-13","value":"abc"}]}"#),
        Err(TrendError::Validation(_))
    ));
}

#[test]
fn weekly_resample_averages_and_rounds() {
    let obs = vec![
        RateObservation::new(date(2022, 6, 13), 3.37),
        RateObservation::new(date(2022, 6, 14), 3.48),
        RateObservation::new(date(2022, 6, 15), 3.30),
        RateObservation::new(date(2022, 6, 21), 3.31),
    ];

    let weekly = resample_rates(&obs, Granularity::Weekly);
    assert_eq!(
        weekly,
        vec![
            // (3.37 + 3.48 + 3.30) / 3 = 3.3833
            RateObservation::new(date(2022, 6, 19), 3.38),
            RateObservation::new(date(2022, 6, 26), 3.31),
        ]
    );
}

#[test]
fn monthly_resample_labels_by_month_end() {
    let obs = vec![
        RateObservation::new(date(2022, 12, 1), 4.10),
        RateObservation::new(date(2022, 11, 1), 3.78),
        RateObservation::new(date(2023, 1, 1), 4.33),
    ];
    let monthly = resample_rates(&obs, Granularity::Monthly);
    let ends: Vec<_> = monthly.iter().map(|o| o.date).collect();
    assert_eq!(ends, vec![date(2022, 11, 30), date(2022, 12, 31), date(2023, 1, 31)]);
}

#[test]
fn month_ending_handles_leap_years() {
    assert_eq!(month_ending(date(2024, 2, 10)), date(2024, 2, 29));
    assert_eq!(month_ending(date(2023, 2, 28)), date(2023, 2, 28));
    assert_eq!(month_ending(date(2022, 12, 5)), date(2022, 12, 31));
}

#[test]
fn alignment_joins_on_period_end() {
    let weekly = vec![
        WeeklyAggregate {
            period_end: date(2022, 6, 19),
            mean_price: 1,
            distinct_count: 1,
        },
        WeeklyAggregate {
            period_end: date(2022, 6, 26),
            mean_price: 1,
            distinct_count: 1,
        },
    ];
    let rates = vec![
        RateObservation::new(date(2022, 6, 12), 5.23),
        RateObservation::new(date(2022, 6, 26), 5.81),
    ];

    let aligned = align_to_periods(&weekly, &rates);
    assert_eq!(aligned.len(), 2);
    assert_eq!(aligned[0].rate, None);
    assert_eq!(aligned[1].rate, Some(5.81));
}

#[test]
fn series_metadata() {
    assert_eq!(RateSeries::TenYearTreasury.series_id(), "DGS10");
    assert_eq!(RateSeries::ThirtyYearMortgage.series_id(), "MORTGAGE30US");
    assert_eq!(RateSeries::FederalFunds.default_granularity(), Granularity::Monthly);
    assert_eq!(RateSeries::TenYearTreasury.default_granularity(), Granularity::Weekly);
    assert_eq!(
        serde_json::to_string(&RateSeries::FederalFunds).unwrap(),
        "\"FEDFUNDS\""
    );
}
