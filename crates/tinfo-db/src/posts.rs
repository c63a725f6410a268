//! Database operations for the `posts` table.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use tinfo_core::NewPost;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub instagram_shortcode: String,
    /// One of `Job`, `House`, `Event`, `Ignore` (enforced by a CHECK constraint).
    pub category: String,
    pub status: String,
    pub content: String,
    pub details: Value,
    pub original_url: Option<String>,
    pub author: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Load every persisted shortcode in a single round trip.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_post_shortcodes(pool: &PgPool) -> Result<HashSet<String>, DbError> {
    let shortcodes: Vec<String> = sqlx::query_scalar("SELECT instagram_shortcode FROM posts")
        .fetch_all(pool)
        .await?;

    Ok(shortcodes.into_iter().collect())
}

/// Insert a new post and return its generated id.
///
/// Each call commits on its own; there is no batch transaction.
///
/// # Errors
///
/// Returns [`DbError::DuplicateShortcode`] if the shortcode already exists,
/// or [`DbError::Sqlx`] for any other failure.
pub async fn insert_post(pool: &PgPool, post: &NewPost) -> Result<i64, DbError> {
    let result = sqlx::query_scalar::<_, i64>(
        "INSERT INTO posts \
             (instagram_shortcode, category, status, content, details, \
              original_url, author, posted_at, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING id",
    )
    .bind(&post.shortcode)
    .bind(post.category.as_str())
    .bind(post.status.as_str())
    .bind(&post.content)
    .bind(&post.details)
    .bind(&post.original_url)
    .bind(post.author.as_deref())
    .bind(post.posted_at)
    .bind(post.created_at)
    .fetch_one(pool)
    .await;

    match result {
        Ok(id) => Ok(id),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(DbError::DuplicateShortcode(post.shortcode.clone()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Fetch a single post by its shortcode, or `None` if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_post_by_shortcode(
    pool: &PgPool,
    shortcode: &str,
) -> Result<Option<PostRow>, DbError> {
    let row = sqlx::query_as::<_, PostRow>(
        "SELECT id, instagram_shortcode, category, status, content, details, \
                original_url, author, posted_at, created_at \
         FROM posts \
         WHERE instagram_shortcode = $1",
    )
    .bind(shortcode)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Count persisted posts.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_posts(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
