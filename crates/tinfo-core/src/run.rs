use crate::posts::CategoryBreakdown;
use crate::regions::{RegionCatalog, DEFAULT_REGION};

pub const DEFAULT_DAYS: u32 = 14;
pub const MAX_DAYS: u32 = 365;
pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 50;

/// What happens to posts classified as [`Category::Ignore`](crate::Category::Ignore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IgnorePolicy {
    /// Store them with status `ignored`.
    #[default]
    Persist,
    /// Count them in the breakdown but skip the insert.
    Drop,
}

/// Per-invocation configuration, fixed for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunParameters {
    pub country: String,
    /// Delimiter-separated override of the region's default targets.
    pub targets: Option<String>,
    pub days: u32,
    pub limit: usize,
    pub skip_duplicates: bool,
    pub ignore_policy: IgnorePolicy,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            country: DEFAULT_REGION.to_string(),
            targets: None,
            days: DEFAULT_DAYS,
            limit: DEFAULT_LIMIT,
            skip_duplicates: true,
            ignore_policy: IgnorePolicy::Persist,
        }
    }
}

impl RunParameters {
    /// Build parameters from untrusted invocation input.
    ///
    /// Never fails: a country that is not in `catalog` falls back to
    /// [`DEFAULT_REGION`], and out-of-range `days`/`limit` fall back to their
    /// defaults.
    #[must_use]
    pub fn from_invocation(
        catalog: &RegionCatalog,
        country: &str,
        targets: Option<String>,
        days: i64,
        limit: i64,
        skip_duplicates: bool,
        ignore_policy: IgnorePolicy,
    ) -> Self {
        let country = catalog
            .find(country)
            .map_or_else(|| DEFAULT_REGION.to_string(), |region| region.name.clone());
        Self {
            country,
            targets: targets.filter(|t| !t.trim().is_empty()),
            days: normalize_days(days),
            limit: normalize_limit(limit),
            skip_duplicates,
            ignore_policy,
        }
    }
}

/// Clamp policy for the age window: values outside `1..=365` become the default.
#[must_use]
pub fn normalize_days(days: i64) -> u32 {
    u32::try_from(days)
        .ok()
        .filter(|d| (1..=MAX_DAYS).contains(d))
        .unwrap_or(DEFAULT_DAYS)
}

/// Clamp policy for the retention cap: values outside `1..=50` become the default.
#[must_use]
pub fn normalize_limit(limit: i64) -> usize {
    usize::try_from(limit)
        .ok()
        .filter(|l| (1..=MAX_LIMIT).contains(l))
        .unwrap_or(DEFAULT_LIMIT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    Success,
    #[default]
    NoData,
    Error,
}

impl RunStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::NoData => "no_data",
            RunStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters and outcome of one pipeline run.
///
/// `raw_fetched == duplicate_skipped + old_skipped + over_limit_skipped + retained`
/// and `categories.total() == retained` hold for every finalized summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub raw_fetched: usize,
    pub duplicate_skipped: usize,
    pub old_skipped: usize,
    pub over_limit_skipped: usize,
    pub retained: usize,
    pub categories: CategoryBreakdown,
    /// Targets whose fetch failed and contributed zero posts.
    pub fetch_failures: usize,
    /// Posts whose rewrite failed and fell back to raw text.
    pub rewrite_fallbacks: usize,
    pub persisted: usize,
    /// Inserts rejected by the shortcode uniqueness constraint.
    pub write_duplicates: usize,
    /// Inserts rejected for row-level reasons other than a duplicate
    /// shortcode. The remaining posts are still written.
    pub write_failures: usize,
    /// Ignore posts intentionally not stored under [`IgnorePolicy::Drop`].
    pub ignored_dropped: usize,
    pub status: RunStatus,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_in_range_are_kept() {
        assert_eq!(normalize_days(1), 1);
        assert_eq!(normalize_days(30), 30);
        assert_eq!(normalize_days(365), 365);
    }

    #[test]
    fn days_out_of_range_fall_back_to_default() {
        assert_eq!(normalize_days(0), DEFAULT_DAYS);
        assert_eq!(normalize_days(-3), DEFAULT_DAYS);
        assert_eq!(normalize_days(366), DEFAULT_DAYS);
        assert_eq!(normalize_days(i64::MAX), DEFAULT_DAYS);
    }

    #[test]
    fn limit_out_of_range_falls_back_to_default() {
        assert_eq!(normalize_limit(50), 50);
        assert_eq!(normalize_limit(51), DEFAULT_LIMIT);
        assert_eq!(normalize_limit(0), DEFAULT_LIMIT);
        assert_eq!(normalize_limit(-1), DEFAULT_LIMIT);
    }

    #[test]
    fn unknown_country_falls_back_to_default_region() {
        let catalog = RegionCatalog::builtin();
        let params = RunParameters::from_invocation(
            &catalog,
            "Atlantis",
            None,
            14,
            10,
            true,
            IgnorePolicy::Persist,
        );
        assert_eq!(params.country, DEFAULT_REGION);
    }

    #[test]
    fn known_country_is_canonicalized() {
        let catalog = RegionCatalog::builtin();
        let params = RunParameters::from_invocation(
            &catalog,
            "thailand",
            Some("  ".to_string()),
            400,
            5,
            false,
            IgnorePolicy::Drop,
        );
        assert_eq!(params.country, "Thailand");
        assert_eq!(params.targets, None);
        assert_eq!(params.days, DEFAULT_DAYS);
        assert_eq!(params.limit, 5);
        assert!(!params.skip_duplicates);
        assert_eq!(params.ignore_policy, IgnorePolicy::Drop);
    }
}
