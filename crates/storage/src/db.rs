use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;
use struk_core::ParseResult;
use thiserror::Error;

pub type DbPool = Pool<Sqlite>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Failed to encode parse result: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Stored scan {id} has an unreadable parse result: {source}")]
    Decode {
        id: i64,
        #[source]
        source: serde_json::Error,
    },
}

/// One stored scan, with its parse result decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRecord {
    pub id: i64,
    pub raw_text: String,
    pub parsed: ParseResult,
    pub scanned_at: DateTime<Utc>,
}

/// A history row: enough to list scans without decoding them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub id: i64,
    pub scanned_at: DateTime<Utc>,
    pub item_count: i64,
    pub total: u64,
}

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite:{}?mode=rwc", path.display()))
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            raw_text TEXT NOT NULL,
            parsed TEXT NOT NULL,
            item_count INTEGER NOT NULL,
            total INTEGER NOT NULL,
            scanned_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_scans_scanned_at ON scans(scanned_at)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Store one scan and return its new id.
pub async fn insert_scan(
    pool: &DbPool,
    raw_text: &str,
    parsed: &ParseResult,
    scanned_at: DateTime<Utc>,
) -> Result<i64, StorageError> {
    let json = serde_json::to_string(parsed)?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO scans (raw_text, parsed, item_count, total, scanned_at) VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(raw_text)
    .bind(json)
    .bind(parsed.items.len() as i64)
    .bind(to_db_amount(parsed.total))
    .bind(to_db_timestamp(scanned_at))
    .fetch_one(pool)
    .await?;

    Ok(id)
}

pub async fn get_scan(pool: &DbPool, id: i64) -> Result<Option<ScanRecord>, StorageError> {
    let row = sqlx::query_as::<_, (i64, String, String, DateTime<Utc>)>(
        "SELECT id, raw_text, parsed, scanned_at FROM scans WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(|r| {
        let parsed = serde_json::from_str(&r.2).map_err(|source| StorageError::Decode { id: r.0, source })?;
        Ok(ScanRecord {
            id: r.0,
            raw_text: r.1,
            parsed,
            scanned_at: r.3,
        })
    })
    .transpose()
}

/// Scans ordered most recent first. `limit` of `None` returns everything.
pub async fn list_history(pool: &DbPool, limit: Option<u32>) -> Result<Vec<ScanSummary>, StorageError> {
    let limit = limit.map(i64::from).unwrap_or(-1);
    let rows = sqlx::query_as::<_, (i64, DateTime<Utc>, i64, i64)>(
        "SELECT id, scanned_at, item_count, total FROM scans ORDER BY scanned_at DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ScanSummary {
            id: r.0,
            scanned_at: r.1,
            item_count: r.2,
            total: from_db_amount(r.3),
        })
        .collect())
}

/// Returns whether a row was removed.
pub async fn delete_scan(pool: &DbPool, id: i64) -> Result<bool, StorageError> {
    let result = sqlx::query("DELETE FROM scans WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Fixed-width RFC 3339 so text ordering matches chronological ordering.
fn to_db_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// SQLite integers are signed; amounts beyond i64 never occur on real receipts.
fn to_db_amount(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_db_amount(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
