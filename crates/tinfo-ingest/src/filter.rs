//! Duplicate and age-window filtering.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use tinfo_core::RawPost;

/// Posts that survived filtering plus the rejection counts.
#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub retained: Vec<RawPost>,
    pub duplicate_skipped: usize,
    pub old_skipped: usize,
    pub over_limit_skipped: usize,
}

/// Window and cap applied to one run's fetched posts.
#[derive(Debug, Clone, Copy)]
pub struct FilterRules {
    pub days: u32,
    pub limit: usize,
    pub skip_duplicates: bool,
}

impl FilterRules {
    /// Oldest publication time still inside the window.
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.days))
    }
}

/// Apply the duplicate check, then the age check, then the cap.
///
/// `existing` is the snapshot of persisted shortcodes taken at the start of
/// the run; it is consulted only when `skip_duplicates` is set. A shortcode
/// already seen earlier in `posts` is always a duplicate. Survivors keep
/// their input order and the first `limit` are retained.
#[must_use]
pub fn filter_posts(
    posts: Vec<RawPost>,
    existing: &HashSet<String>,
    rules: FilterRules,
    now: DateTime<Utc>,
) -> FilterOutcome {
    let cutoff = rules.cutoff(now);
    let mut seen: HashSet<String> = HashSet::with_capacity(posts.len());
    let mut outcome = FilterOutcome::default();

    for post in posts {
        let persisted = rules.skip_duplicates && existing.contains(&post.shortcode);
        if persisted || !seen.insert(post.shortcode.clone()) {
            outcome.duplicate_skipped += 1;
            continue;
        }
        if post.published_at < cutoff {
            outcome.old_skipped += 1;
            continue;
        }
        outcome.retained.push(post);
    }

    if outcome.retained.len() > rules.limit {
        outcome.over_limit_skipped = outcome.retained.len() - rules.limit;
        outcome.retained.truncate(rules.limit);
    }

    tracing::debug!(
        retained = outcome.retained.len(),
        duplicate_skipped = outcome.duplicate_skipped,
        old_skipped = outcome.old_skipped,
        over_limit_skipped = outcome.over_limit_skipped,
        "filtered posts"
    );
    outcome
}
