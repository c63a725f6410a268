//! Content rewriting capability.

mod gemini;
mod passthrough;

pub use gemini::{GeminiRewriter, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MIN_INTERVAL_MS};
pub use passthrough::{normalize_text, PassthroughRewriter};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tinfo_core::{Category, RawPost};

use crate::error::IngestError;

/// Rewritten content for one post plus any fields extracted along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rewrite {
    pub content: String,
    /// Category-specific extracted fields, e.g. `job_title` or `rent_price`.
    pub fields: Map<String, Value>,
}

/// Turns a raw post into publishable content for its category.
#[async_trait]
pub trait Rewriter: Send + Sync {
    /// # Errors
    ///
    /// Returns [`IngestError::Classification`] when the rewrite cannot be
    /// produced; callers fall back to the raw text.
    async fn rewrite(&self, post: &RawPost, category: Category) -> Result<Rewrite, IngestError>;
}

#[async_trait]
impl<T: Rewriter + ?Sized> Rewriter for std::sync::Arc<T> {
    async fn rewrite(&self, post: &RawPost, category: Category) -> Result<Rewrite, IngestError> {
        (**self).rewrite(post, category).await
    }
}
