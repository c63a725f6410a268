//! Database operations for `ingest_runs`.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use tinfo_core::RunSummary;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `ingest_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngestRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub trigger_source: String,
    pub country: String,
    pub parameters: Value,
    /// `running` until finished, then `success`, `no_data` or `error`.
    pub status: String,
    pub raw_fetched: i32,
    pub duplicate_skipped: i32,
    pub old_skipped: i32,
    pub retained: i32,
    pub persisted: i32,
    pub category_breakdown: Value,
    pub message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

const RUN_COLUMNS: &str = "id, public_id, trigger_source, country, parameters, status, \
     raw_fetched, duplicate_skipped, old_skipped, retained, persisted, \
     category_breakdown, message, started_at, completed_at, created_at";

fn count_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Creates a new ingest run in `running` status with `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_ingest_run(
    pool: &PgPool,
    trigger_source: &str,
    country: &str,
    parameters: Value,
) -> Result<IngestRunRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, IngestRunRow>(&format!(
        "INSERT INTO ingest_runs (public_id, trigger_source, country, parameters, status) \
         VALUES ($1, $2, $3, $4, 'running') \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(public_id)
    .bind(trigger_source)
    .bind(country)
    .bind(parameters)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Records the final summary of a `running` run and sets `completed_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidIngestRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn finish_ingest_run(
    pool: &PgPool,
    id: i64,
    summary: &RunSummary,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingest_runs \
         SET status = $1, raw_fetched = $2, duplicate_skipped = $3, old_skipped = $4, \
             retained = $5, persisted = $6, category_breakdown = $7, message = $8, \
             completed_at = NOW() \
         WHERE id = $9 AND status = 'running'",
    )
    .bind(summary.status.as_str())
    .bind(count_i32(summary.raw_fetched))
    .bind(count_i32(summary.duplicate_skipped))
    .bind(count_i32(summary.old_skipped))
    .bind(count_i32(summary.retained))
    .bind(count_i32(summary.persisted))
    .bind(summary.categories.to_json())
    .bind(&summary.message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidIngestRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_ingest_run(pool: &PgPool, id: i64) -> Result<IngestRunRow, DbError> {
    let row = sqlx::query_as::<_, IngestRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM ingest_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recent `limit` runs, ordered by `created_at DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_ingest_runs(pool: &PgPool, limit: i64) -> Result<Vec<IngestRunRow>, DbError> {
    let rows = sqlx::query_as::<_, IngestRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM ingest_runs ORDER BY created_at DESC, id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
