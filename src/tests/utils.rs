use crate::domain::listing::{Category, ListingRecord};
use crate::errors::TrendError;
use crate::rates::fred::RateSource;
use crate::rates::{RateObservation, RateSeries};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Unique path under the system temp dir.
pub fn temp_path(prefix: &str, ext: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    std::env::temp_dir().join(format!(
        "{prefix}_{}_{}.{ext}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    ))
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(9, 30, 0).unwrap()
}

pub fn record(id: &str, category: Category, price: f64, observed_at: NaiveDateTime) -> ListingRecord {
    ListingRecord {
        id: id.to_string(),
        category,
        listed_price: price,
        observed_at,
    }
}

/// Fixture row: (zpid, HomeType, ListedPrice, LastUpdated).
pub type FixtureRow<'a> = (&'a str, &'a str, f64, &'a str);

/// Write a listings store with the scrape job's table layout.
pub fn create_listings_db(table: &str, rows: &[FixtureRow<'_>]) -> PathBuf {
    let path = temp_path("listings", "db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(&format!(
        r#"CREATE TABLE "{table}" (
            zpid TEXT,
            HomeType TEXT,
            ListedPrice REAL,
            LastUpdated TEXT
        );"#
    ))
    .unwrap();

    for (zpid, home_type, price, updated) in rows {
        conn.execute(
            &format!(r#"INSERT INTO "{table}" (zpid, HomeType, ListedPrice, LastUpdated) VALUES (?1, ?2, ?3, ?4)"#),
            params![zpid, home_type, price, updated],
        )
        .unwrap();
    }
    path
}

/// In-memory rate source that counts upstream calls.
pub struct FakeRateSource {
    pub calls: AtomicUsize,
    pub delay: Duration,
    observations: Vec<RateObservation>,
    /// Errors handed out (in order) before any success.
    failures: Mutex<Vec<TrendError>>,
}

impl FakeRateSource {
    pub fn new(observations: Vec<RateObservation>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            observations,
            failures: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail_next(&self, err: TrendError) {
        self.failures.lock().unwrap().push(err);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RateSource for FakeRateSource {
    fn fetch_observations(
        &self,
        _series: RateSeries,
        start: NaiveDate,
    ) -> Result<Vec<RateObservation>, TrendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        let mut failures = self.failures.lock().unwrap();
        if !failures.is_empty() {
            return Err(failures.remove(0));
        }

        Ok(self
            .observations
            .iter()
            .filter(|o| o.date >= start)
            .cloned()
            .collect())
    }
}
