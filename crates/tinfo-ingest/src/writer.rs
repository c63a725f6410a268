//! Persistence of classified posts.

use tinfo_core::{Category, IgnorePolicy, NewPost};

use crate::error::IngestError;
use crate::store::PostStore;

#[derive(Debug, Default)]
pub struct WriteOutcome {
    pub persisted: usize,
    pub write_duplicates: usize,
    /// Rows the store rejected individually; later rows are still written.
    pub write_failures: usize,
    pub ignored_dropped: usize,
    /// Set when the store became unavailable and stopped the batch. Rows written before it
    /// stay committed.
    pub fatal: Option<IngestError>,
}

/// Insert `posts` one at a time, in the given order.
///
/// Duplicate keys and other row-level rejections are counted and skipped.
/// Only [`IngestError::StorageUnavailable`] stops the remaining writes.
pub async fn write_posts(
    store: &dyn PostStore,
    posts: &[NewPost],
    ignore_policy: IgnorePolicy,
) -> WriteOutcome {
    let mut outcome = WriteOutcome::default();

    for post in posts {
        if post.category == Category::Ignore && ignore_policy == IgnorePolicy::Drop {
            outcome.ignored_dropped += 1;
            continue;
        }

        match store.insert(post).await {
            Ok(()) => outcome.persisted += 1,
            Err(IngestError::DuplicateKey(shortcode)) => {
                tracing::info!(shortcode, "post already stored, skipping");
                outcome.write_duplicates += 1;
            }
            Err(e @ IngestError::StorageUnavailable(_)) => {
                tracing::error!(
                    shortcode = %post.shortcode,
                    persisted = outcome.persisted,
                    error = %e,
                    "storage unavailable, stopping writes"
                );
                outcome.fatal = Some(e);
                break;
            }
            Err(e) => {
                tracing::warn!(
                    shortcode = %post.shortcode,
                    error = %e,
                    "post rejected by storage, skipping"
                );
                outcome.write_failures += 1;
            }
        }
    }

    outcome
}
