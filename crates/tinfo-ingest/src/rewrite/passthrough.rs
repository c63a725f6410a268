use async_trait::async_trait;
use serde_json::Map;
use tinfo_core::{Category, RawPost};

use super::{Rewrite, Rewriter};
use crate::error::IngestError;

/// Collapse runs of whitespace to a single space and trim the ends.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Publishes the normalized raw text unchanged. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRewriter;

#[async_trait]
impl Rewriter for PassthroughRewriter {
    async fn rewrite(&self, post: &RawPost, _category: Category) -> Result<Rewrite, IngestError> {
        Ok(Rewrite {
            content: normalize_text(&post.text),
            fields: Map::new(),
        })
    }
}
