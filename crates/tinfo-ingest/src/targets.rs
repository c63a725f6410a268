//! Target resolution: region defaults or an explicit override list.

use tinfo_core::{ConfigError, RegionCatalog, Target};

use crate::error::IngestError;

/// Parse a comma- or whitespace-separated target list.
///
/// Entries are trimmed, empty entries are dropped, and duplicates are removed
/// keeping the first occurrence. `@name` is an account, anything else a
/// hashtag.
#[must_use]
pub fn parse_target_list(raw: &str) -> Vec<Target> {
    let mut targets: Vec<Target> = Vec::new();
    for entry in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        if let Some(target) = Target::parse(entry) {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
    }
    targets
}

/// Resolve the ordered, non-empty list of targets for a run.
///
/// An explicit list wins when it parses to at least one target; otherwise
/// the built-in targets of `country` are used.
///
/// # Errors
///
/// Returns [`IngestError::Configuration`] when no explicit targets were given
/// and `country` matches no known region.
pub fn resolve_targets(
    catalog: &RegionCatalog,
    country: &str,
    explicit: Option<&str>,
) -> Result<Vec<Target>, IngestError> {
    if let Some(raw) = explicit {
        let targets = parse_target_list(raw);
        if !targets.is_empty() {
            tracing::debug!(count = targets.len(), "using explicit targets");
            return Ok(targets);
        }
        tracing::warn!(raw, "explicit target list is empty, using region defaults");
    }

    let region = catalog
        .find(country)
        .ok_or_else(|| ConfigError::UnknownRegion(country.to_string()))?;
    Ok(region.targets())
}
