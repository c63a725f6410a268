//! Ingestion pipeline orchestration.

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use tinfo_core::{Category, NewPost, PostStatus, RawPost, RegionCatalog, RunParameters, RunSummary};

use crate::classifier::classify;
use crate::filter::{filter_posts, FilterRules};
use crate::rewrite::{Rewrite, Rewriter};
use crate::sources::{fetch_all, SourceFetcher};
use crate::store::PostStore;
use crate::summary::Summarizer;
use crate::targets::resolve_targets;
use crate::writer::write_posts;

pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

/// One configured ingestion pipeline.
///
/// The fetcher, rewriter and store are trait objects so the binary can pick
/// implementations at runtime and tests can substitute in-memory fakes.
pub struct Pipeline {
    catalog: RegionCatalog,
    fetcher: Box<dyn SourceFetcher>,
    rewriter: Box<dyn Rewriter>,
    store: Box<dyn PostStore>,
    max_concurrent: usize,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        catalog: RegionCatalog,
        fetcher: Box<dyn SourceFetcher>,
        rewriter: Box<dyn Rewriter>,
        store: Box<dyn PostStore>,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            rewriter,
            store,
            max_concurrent: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }

    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Run resolve → fetch → filter → classify → write once.
    ///
    /// Never fails: every outcome, including configuration and storage
    /// failures, is reported through the returned summary's status.
    pub async fn run(&self, params: &RunParameters, now: DateTime<Utc>) -> RunSummary {
        let mut summarizer = Summarizer::new();

        let targets = match resolve_targets(&self.catalog, &params.country, params.targets.as_deref())
        {
            Ok(targets) => targets,
            Err(e) => {
                tracing::error!(country = %params.country, error = %e, "target resolution failed");
                summarizer.fail(e.to_string());
                return summarizer.finish();
            }
        };
        tracing::info!(
            country = %params.country,
            targets = targets.len(),
            days = params.days,
            limit = params.limit,
            skip_duplicates = params.skip_duplicates,
            "starting ingest run"
        );

        // Snapshot taken once, before fetching.
        let existing = if params.skip_duplicates {
            match self.store.existing_shortcodes().await {
                Ok(existing) => existing,
                Err(e) => {
                    tracing::error!(error = %e, "could not load persisted shortcodes");
                    summarizer.fail(e.to_string());
                    return summarizer.finish();
                }
            }
        } else {
            HashSet::new()
        };

        let report = fetch_all(self.fetcher.as_ref(), &targets, self.max_concurrent).await;
        summarizer.record_fetch(report.posts.len(), report.failures.len());
        if !report.failures.is_empty() {
            tracing::warn!(
                failed = report.failures.len(),
                total = targets.len(),
                "some targets could not be fetched"
            );
        }

        let rules = FilterRules {
            days: params.days,
            limit: params.limit,
            skip_duplicates: params.skip_duplicates,
        };
        let filtered = filter_posts(report.posts, &existing, rules, now);
        summarizer.record_filter(&filtered);
        if filtered.retained.is_empty() {
            return summarizer.finish();
        }

        let mut classified = Vec::with_capacity(filtered.retained.len());
        for post in &filtered.retained {
            let category = classify(&post.text, post.target.intent());
            summarizer.record_category(category);

            let (rewrite, fallback_error) = match self.rewriter.rewrite(post, category).await {
                Ok(rewrite) => (rewrite, None),
                Err(e) => {
                    tracing::warn!(
                        shortcode = %post.shortcode,
                        error = %e,
                        "rewrite failed, falling back to raw text"
                    );
                    summarizer.record_rewrite_fallback();
                    let raw = Rewrite {
                        content: post.text.clone(),
                        ..Rewrite::default()
                    };
                    (raw, Some(e.to_string()))
                }
            };
            classified.push(build_new_post(
                post,
                category,
                rewrite,
                fallback_error,
                now,
            ));
        }

        // Stable: fetch order is kept within a category.
        classified.sort_by_key(|p| p.category);

        let written = write_posts(self.store.as_ref(), &classified, params.ignore_policy).await;
        summarizer.record_writes(&written);

        let summary = summarizer.finish();
        tracing::info!(
            status = %summary.status,
            raw_fetched = summary.raw_fetched,
            retained = summary.retained,
            persisted = summary.persisted,
            "ingest run finished"
        );
        summary
    }
}

/// Assemble the insert payload for one classified post.
fn build_new_post(
    post: &RawPost,
    category: Category,
    rewrite: Rewrite,
    fallback_error: Option<String>,
    created_at: DateTime<Utc>,
) -> NewPost {
    let mut details = json!({
        "rewritten_text": rewrite.content,
        "instagram_shortcode": post.shortcode,
        "original_url": post.post_url,
        "posted_at": post.published_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        "author": post.author,
        "image_url": post.image_url,
        "target": post.target.to_string(),
    });
    if let Value::Object(map) = &mut details {
        map.extend(rewrite.fields);
        if let Some(error) = fallback_error {
            map.insert("rewrite".to_string(), Value::from("fallback"));
            map.insert("rewrite_error".to_string(), Value::from(error));
        }
    }
    strip_nul_value(&mut details);

    NewPost {
        shortcode: post.shortcode.clone(),
        category,
        status: if category == Category::Ignore {
            PostStatus::Ignored
        } else {
            PostStatus::New
        },
        content: strip_nul(&rewrite.content),
        details,
        original_url: strip_nul(&post.post_url),
        author: post.author.as_deref().map(strip_nul),
        posted_at: post.published_at,
        created_at,
    }
}

/// Postgres TEXT and JSONB columns reject the NUL character.
fn strip_nul(text: &str) -> String {
    text.replace('\0', "")
}

fn strip_nul_value(value: &mut Value) {
    match value {
        Value::String(s) if s.contains('\0') => *s = strip_nul(s),
        Value::Array(items) => items.iter_mut().for_each(strip_nul_value),
        Value::Object(map) => map.values_mut().for_each(strip_nul_value),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn strip_nul_value_cleans_nested_strings() {
        let mut value = json!({
            "rewritten_text": "a\0b",
            "tags": ["c\0", 1],
            "nested": {"d": "\0e"}
        });
        strip_nul_value(&mut value);
        assert_eq!(value, json!({"rewritten_text": "ab", "tags": ["c", 1], "nested": {"d": "e"}}));
    }
}
