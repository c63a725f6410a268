//! Ingestion pipeline for tinfo.
//!
//! Resolves region targets, fetches Instagram posts through a pluggable
//! fetcher, drops duplicates and stale posts, classifies and rewrites the
//! survivors, and persists them. Every run ends in a [`RunSummary`] that is
//! rendered as the stdout report.
//!
//! [`RunSummary`]: tinfo_core::RunSummary

pub mod classifier;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod rewrite;
pub mod sources;
pub mod store;
pub mod summary;
pub mod targets;
pub mod writer;

pub use classifier::classify;
pub use error::IngestError;
pub use pipeline::{Pipeline, DEFAULT_MAX_CONCURRENT_FETCHES};
pub use rewrite::{GeminiRewriter, PassthroughRewriter, Rewrite, Rewriter};
pub use sources::SourceFetcher;
pub use store::{PgPostStore, PostStore};
pub use summary::render;
pub use targets::{parse_target_list, resolve_targets};
