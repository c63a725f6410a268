//! Conversion from actor dataset items into [`RawPost`]s.

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;
use tinfo_core::{RawPost, Target};

use crate::types::DatasetItem;

/// Why a dataset item could not become a [`RawPost`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("item has no shortcode")]
    MissingShortcode,
    #[error("item {shortcode} has no timestamp")]
    MissingTimestamp { shortcode: String },
    #[error("item {shortcode} has unparseable timestamp '{raw}'")]
    InvalidTimestamp { shortcode: String, raw: String },
}

/// Canonical post URL for a shortcode.
#[must_use]
pub fn post_url(shortcode: &str) -> String {
    format!("https://www.instagram.com/p/{shortcode}/")
}

/// Parse an actor timestamp.
///
/// Accepts RFC 3339 (`2026-03-01T12:00:00.000Z`) and offset-less ISO values,
/// which are taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize one dataset item fetched for `target`.
///
/// # Errors
///
/// Returns a [`SkipReason`] when the item lacks a shortcode or a usable
/// timestamp. Callers skip such items rather than failing the fetch.
pub fn normalize_item(item: DatasetItem, target: &Target) -> Result<RawPost, SkipReason> {
    let shortcode = non_empty(item.short_code).ok_or(SkipReason::MissingShortcode)?;

    let raw_ts = non_empty(item.timestamp).ok_or_else(|| SkipReason::MissingTimestamp {
        shortcode: shortcode.clone(),
    })?;
    let published_at = parse_timestamp(&raw_ts).ok_or_else(|| SkipReason::InvalidTimestamp {
        shortcode: shortcode.clone(),
        raw: raw_ts.clone(),
    })?;

    Ok(RawPost {
        post_url: post_url(&shortcode),
        text: item.caption.unwrap_or_default(),
        image_url: non_empty(item.display_url).or_else(|| non_empty(item.thumbnail_url)),
        author: non_empty(item.owner_username),
        published_at,
        target: target.clone(),
        shortcode,
    })
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
