// src/tests/listings_tests.rs

use super::utils::{create_listings_db, temp_path};
use crate::db::connection::Database;
use crate::db::listings::{load_listing_rows, validate_rows, DEFAULT_LISTINGS_TABLE};
use crate::domain::listing::Category;
use crate::errors::TrendError;
use rusqlite::{params, Connection};

#[test]
fn loads_every_row_of_the_table() {
    let path = create_listings_db(
        DEFAULT_LISTINGS_TABLE,
        &[
            ("101", "CONDO", 350_000.0, "2022-06-15 07:00:00"),
            ("102", "TOWNHOUSE", 640_000.0, "2022-06-15 07:00:00"),
            ("103", "LOT", 90_000.0, "2022-06-15 07:00:00"),
        ],
    );
    let db = Database::new(&path);

    let rows = load_listing_rows(&db, DEFAULT_LISTINGS_TABLE).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].id, "101");
    assert_eq!(rows[1].home_type, "TOWNHOUSE");
    assert_eq!(rows[2].listed_price, Some(90_000.0));

    let loaded = validate_rows(&rows).unwrap();
    assert_eq!(loaded.records.len(), 2);
    assert_eq!(loaded.untracked, 1);
    assert_eq!(loaded.records[0].category, Category::Condo);
}

#[test]
fn integer_ids_and_prices_are_accepted() {
    let path = temp_path("listings_int", "db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        r#"CREATE TABLE "snap" (zpid INTEGER, HomeType TEXT, ListedPrice INTEGER, LastUpdated TEXT);"#,
    )
    .unwrap();
    conn.execute(
        r#"INSERT INTO "snap" VALUES (?1, ?2, ?3, ?4)"#,
        params![555_i64, "SINGLE_FAMILY", 1_250_000_i64, "2022-07-01"],
    )
    .unwrap();
    drop(conn);

    let rows = load_listing_rows(&Database::new(&path), "snap").unwrap();
    assert_eq!(rows[0].id, "555");
    assert_eq!(rows[0].listed_price, Some(1_250_000.0));
}

#[test]
fn bad_tracked_row_fails_the_load() {
    let path = create_listings_db(
        DEFAULT_LISTINGS_TABLE,
        &[
            ("101", "CONDO", 350_000.0, "2022-06-15"),
            ("102", "CONDO", 360_000.0, "not a date"),
        ],
    );
    let rows = load_listing_rows(&Database::new(&path), DEFAULT_LISTINGS_TABLE).unwrap();

    assert!(matches!(validate_rows(&rows), Err(TrendError::Validation(_))));
}

#[test]
fn missing_table_is_a_db_error() {
    let path = create_listings_db("other", &[]);
    let err = load_listing_rows(&Database::new(&path), DEFAULT_LISTINGS_TABLE).unwrap_err();
    assert!(matches!(err, TrendError::DbError(_)));
}

#[test]
fn switching_files_on_one_thread_reopens() {
    let a = create_listings_db("t", &[("1", "CONDO", 1.0, "2022-06-15")]);
    let b = create_listings_db(
        "t",
        &[("1", "CONDO", 1.0, "2022-06-15"), ("2", "CONDO", 2.0, "2022-06-15")],
    );

    assert_eq!(load_listing_rows(&Database::new(&a), "t").unwrap().len(), 1);
    assert_eq!(load_listing_rows(&Database::new(&b), "t").unwrap().len(), 2);
}

#[test]
fn home_type_must_match_exactly() {
    let path = create_listings_db(
        DEFAULT_LISTINGS_TABLE,
        &[
            ("201", "CONDO", 350_000.0, "2022-06-15 07:00:00"),
            ("202", " CONDO", 350_000.0, "2022-06-15 07:00:00"),
            ("203", "condo", 350_000.0, "2022-06-15 07:00:00"),
        ],
    );
    let rows = load_listing_rows(&Database::new(&path), DEFAULT_LISTINGS_TABLE).unwrap();

    let loaded = validate_rows(&rows).unwrap();
    assert_eq!(loaded.records.len(), 1);
    assert_eq!(loaded.records[0].id, "201");
    assert_eq!(loaded.untracked, 2);
}
