//! Run accounting and the stdout report.

use std::fmt::Write as _;

use tinfo_core::{Category, CategoryBreakdown, RunStatus, RunSummary};

use crate::filter::FilterOutcome;
use crate::writer::WriteOutcome;

pub const NO_POSTS_MESSAGE: &str = "No posts found to process";

/// Accumulates counters over a run and decides the terminal status.
#[derive(Debug, Default)]
pub struct Summarizer {
    summary: RunSummary,
    error: Option<String>,
}

impl Summarizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fetch(&mut self, raw_fetched: usize, fetch_failures: usize) {
        self.summary.raw_fetched = raw_fetched;
        self.summary.fetch_failures = fetch_failures;
    }

    pub fn record_filter(&mut self, outcome: &FilterOutcome) {
        self.summary.duplicate_skipped = outcome.duplicate_skipped;
        self.summary.old_skipped = outcome.old_skipped;
        self.summary.over_limit_skipped = outcome.over_limit_skipped;
        self.summary.retained = outcome.retained.len();
    }

    pub fn record_category(&mut self, category: Category) {
        self.summary.categories.increment(category);
    }

    pub fn record_rewrite_fallback(&mut self) {
        self.summary.rewrite_fallbacks += 1;
    }

    pub fn record_writes(&mut self, outcome: &WriteOutcome) {
        self.summary.persisted = outcome.persisted;
        self.summary.write_duplicates = outcome.write_duplicates;
        self.summary.write_failures = outcome.write_failures;
        self.summary.ignored_dropped = outcome.ignored_dropped;
        if let Some(e) = &outcome.fatal {
            self.fail(e.to_string());
        }
    }

    /// Mark the run as failed. The first failure wins.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(message.into());
        }
    }

    /// Decide the status and message and hand out the finished summary.
    #[must_use]
    pub fn finish(mut self) -> RunSummary {
        let s = &mut self.summary;
        let (status, message) = if let Some(error) = self.error {
            (RunStatus::Error, error)
        } else if s.raw_fetched == 0 || s.retained == 0 {
            (RunStatus::NoData, NO_POSTS_MESSAGE.to_string())
        } else if s.persisted > 0 {
            (
                RunStatus::Success,
                format!("Persisted {} of {} retained posts", s.persisted, s.retained),
            )
        } else if s.ignored_dropped == s.retained {
            (
                RunStatus::Success,
                format!("All {} retained posts were ignored", s.retained),
            )
        } else if s.write_failures > 0 {
            (
                RunStatus::Error,
                format!(
                    "None of {} retained posts could be stored ({} rejected by storage)",
                    s.retained, s.write_failures
                ),
            )
        } else {
            (
                RunStatus::NoData,
                format!("All {} retained posts were already stored", s.retained),
            )
        };
        s.status = status;
        s.message = message;
        self.summary
    }
}

/// `{"Job": 1, "House": 0, "Event": 2, "Ignore": 0}` in priority order.
#[must_use]
pub fn render_breakdown(categories: &CategoryBreakdown) -> String {
    let body = categories
        .iter()
        .map(|(category, n)| format!("\"{category}\": {n}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{body}}}")
}

/// The stdout report, one line per entry, ending with `=== Done ===`.
#[must_use]
pub fn render(summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Filtering {} raw posts", summary.raw_fetched);
    let _ = writeln!(out, "Skipped {} duplicate posts", summary.duplicate_skipped);
    let _ = writeln!(out, "Skipped {} old posts", summary.old_skipped);
    if summary.over_limit_skipped > 0 {
        let _ = writeln!(
            out,
            "Skipped {} posts over limit",
            summary.over_limit_skipped
        );
    }
    if summary.retained == 0 {
        let _ = writeln!(out, "{NO_POSTS_MESSAGE}");
    } else {
        let _ = writeln!(out, "Retained {} new posts", summary.retained);
        let _ = writeln!(
            out,
            "Category breakdown: {}",
            render_breakdown(&summary.categories)
        );
    }
    if summary.write_failures > 0 {
        let _ = writeln!(out, "Failed to store {} posts", summary.write_failures);
    }
    if summary.status == RunStatus::Error {
        let _ = writeln!(out, "Error: {}", summary.message);
    }
    out.push_str("=== Done ===\n");
    out
}
