//! Post storage seam used by the pipeline.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tinfo_core::NewPost;

use crate::error::IngestError;

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Every shortcode currently persisted.
    async fn existing_shortcodes(&self) -> Result<HashSet<String>, IngestError>;

    /// Insert one post, committing immediately.
    ///
    /// A shortcode collision must surface as [`IngestError::DuplicateKey`].
    async fn insert(&self, post: &NewPost) -> Result<(), IngestError>;
}

#[async_trait]
impl<T: PostStore + ?Sized> PostStore for Arc<T> {
    async fn existing_shortcodes(&self) -> Result<HashSet<String>, IngestError> {
        (**self).existing_shortcodes().await
    }

    async fn insert(&self, post: &NewPost) -> Result<(), IngestError> {
        (**self).insert(post).await
    }
}

/// Postgres-backed store over the `posts` table.
#[derive(Debug, Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn existing_shortcodes(&self) -> Result<HashSet<String>, IngestError> {
        Ok(tinfo_db::list_post_shortcodes(&self.pool).await?)
    }

    async fn insert(&self, post: &NewPost) -> Result<(), IngestError> {
        let id = tinfo_db::insert_post(&self.pool, post).await?;
        tracing::debug!(id, shortcode = %post.shortcode, category = %post.category, "inserted post");
        Ok(())
    }
}
