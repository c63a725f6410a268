//! Source fetcher abstraction and the concurrent fan-out over targets.

mod instagram;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tinfo_core::{RawPost, Target};

use crate::error::IngestError;

/// Retrieves candidate posts for one target.
///
/// Implementations may be slow and may fail; a failure only loses the posts
/// of that target.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, target: &Target) -> Result<Vec<RawPost>, IngestError>;
}

#[async_trait]
impl<T: SourceFetcher + ?Sized> SourceFetcher for std::sync::Arc<T> {
    async fn fetch(&self, target: &Target) -> Result<Vec<RawPost>, IngestError> {
        (**self).fetch(target).await
    }
}

/// Everything fetched across all targets of a run.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Target order, newest-first within each target.
    pub posts: Vec<RawPost>,
    /// Targets whose fetch failed.
    pub failures: Vec<Target>,
}

/// Fetch every target with at most `max_concurrent` requests in flight.
///
/// Results are concatenated in target order regardless of completion order.
/// Continues past individual target failures, logging warnings.
pub async fn fetch_all(
    fetcher: &dyn SourceFetcher,
    targets: &[Target],
    max_concurrent: usize,
) -> FetchReport {
    let results: Vec<(&Target, Result<Vec<RawPost>, IngestError>)> = stream::iter(targets)
        .map(|target| async move { (target, fetcher.fetch(target).await) })
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    let mut report = FetchReport::default();
    for (target, result) in results {
        match result {
            Ok(mut posts) => {
                posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
                tracing::debug!(target = %target, count = posts.len(), "collected posts");
                report.posts.extend(posts);
            }
            Err(e) => {
                tracing::warn!(target = %target, error = %e, "target fetch failed");
                report.failures.push(target.clone());
            }
        }
    }
    report
}
