use crate::db::connection::Database;
use crate::domain::listing::{ListingRecord, RawListingRow};
use crate::errors::TrendError;
use rusqlite::types::Value;
use tracing::{debug, info};

/// Default table name; the scrape job names the table after the file.
pub const DEFAULT_LISTINGS_TABLE: &str = "listings_master.db";

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Listing ids are stored as INTEGER by some scrape runs and TEXT by others.
fn value_to_id(value: Value) -> Option<String> {
    match value {
        Value::Integer(i) => Some(i.to_string()),
        Value::Text(s) => Some(s),
        Value::Real(f) if f.fract() == 0.0 => Some(format!("{}", f as i64)),
        _ => None,
    }
}

fn value_to_timestamp(value: Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s),
        Value::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}

/// Read every row of the listings table.
pub fn load_listing_rows(db: &Database, table: &str) -> Result<Vec<RawListingRow>, TrendError> {
    let sql = format!(
        "SELECT zpid, HomeType, ListedPrice, LastUpdated FROM {}",
        quote_ident(table)
    );

    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| TrendError::DbError(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, Value>(0)?,           // zpid
                    row.get::<_, Option<String>>(1)?,  // HomeType
                    row.get::<_, Option<f64>>(2)?,     // ListedPrice
                    row.get::<_, Value>(3)?,           // LastUpdated
                ))
            })
            .map_err(|e| TrendError::DbError(e.to_string()))?;

        let mut out = Vec::new();
        for (idx, r) in rows.enumerate() {
            let (id, home_type, listed_price, observed_at) =
                r.map_err(|e| TrendError::DbError(e.to_string()))?;

            let id = value_to_id(id).ok_or_else(|| {
                TrendError::Validation(format!("row {idx}: listing id is missing or not scalar"))
            })?;

            out.push(RawListingRow {
                id,
                home_type: home_type.unwrap_or_default(),
                listed_price,
                observed_at: value_to_timestamp(observed_at),
            });
        }

        debug!(rows = out.len(), table, "listing rows loaded");
        Ok(out)
    })
}

/// Result of validating a full snapshot.
#[derive(Debug, Default)]
pub struct LoadedListings {
    pub records: Vec<ListingRecord>,
    /// Rows whose home type is outside the tracked categories.
    pub untracked: usize,
}

/// Validate raw rows; the first invalid tracked row fails the whole load.
pub fn validate_rows(rows: &[RawListingRow]) -> Result<LoadedListings, TrendError> {
    let mut loaded = LoadedListings::default();

    for row in rows {
        match ListingRecord::from_row(row)? {
            Some(record) => loaded.records.push(record),
            None => loaded.untracked += 1,
        }
    }

    info!(
        tracked = loaded.records.len(),
        untracked = loaded.untracked,
        "listing rows validated"
    );
    Ok(loaded)
}
