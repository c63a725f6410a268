//! Region catalog: the default targets queried for each supported region.
//!
//! The built-in regions can be overridden or extended from a YAML file:
//!
//! ```yaml
//! regions:
//!   - name: Vancouver
//!     hashtags: [vancouverjobs, vancouverrentals]
//!     accounts: [dailyhive]
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::targets::Target;
use crate::ConfigError;

/// Region used when the caller's selector is not on the whitelist.
pub const DEFAULT_REGION: &str = "Toronto";

const BUILTIN_REGIONS: &[(&str, &[&str], &[&str])] = &[
    (
        "Toronto",
        &["torontojobs", "torontorentals", "トロント求人", "torontoevents"],
        &["blogto", "torontolife"],
    ),
    (
        "Thailand",
        &[
            "thailandjobs",
            "bangkokrentals",
            "タイ就職",
            "バンコク生活",
            "thailandtravel",
        ],
        &[],
    ),
    (
        "Philippines",
        &[
            "philippinesjobs",
            "manilarentals",
            "セブ島留学",
            "フィリピン求人",
            "manilalife",
        ],
        &[],
    ),
    (
        "UK",
        &[
            "ukjobs",
            "londonrentals",
            "イギリスワーホリ",
            "ロンドン生活",
            "uklife",
        ],
        &[],
    ),
    (
        "Australia",
        &[
            "australiajobs",
            "sydneyrentals",
            "オーストラリアワーホリ",
            "メルボルンカフェ",
            "sydneylife",
        ],
        &[],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub accounts: Vec<String>,
}

impl Region {
    /// Default targets for the region: hashtags first, then accounts.
    #[must_use]
    pub fn targets(&self) -> Vec<Target> {
        self.hashtags
            .iter()
            .map(|h| Target::hashtag(h))
            .chain(self.accounts.iter().map(|a| Target::account(a)))
            .filter(|t| !t.locator.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct RegionsFile {
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone)]
pub struct RegionCatalog {
    regions: Vec<Region>,
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RegionCatalog {
    #[must_use]
    pub fn builtin() -> Self {
        let regions = BUILTIN_REGIONS
            .iter()
            .map(|(name, hashtags, accounts)| Region {
                name: (*name).to_string(),
                hashtags: hashtags.iter().map(|s| (*s).to_string()).collect(),
                accounts: accounts.iter().map(|s| (*s).to_string()).collect(),
            })
            .collect();
        Self { regions }
    }

    /// Replace regions with the same (case-insensitive) name, append the rest.
    pub fn merge(&mut self, file: RegionsFile) {
        for region in file.regions {
            match self
                .regions
                .iter_mut()
                .find(|r| r.name.eq_ignore_ascii_case(&region.name))
            {
                Some(existing) => *existing = region,
                None => self.regions.push(region),
            }
        }
    }

    /// Look up a region by name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Region> {
        let name = name.trim();
        self.regions
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.name.as_str())
    }
}

/// Build the region catalog: built-in regions plus the YAML file at `path`,
/// if one exists.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_regions(path: &Path) -> Result<RegionCatalog, ConfigError> {
    let mut catalog = RegionCatalog::builtin();
    if !path.exists() {
        return Ok(catalog);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RegionsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let regions_file: RegionsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::RegionsFileParse)?;

    validate_regions(&regions_file)?;
    catalog.merge(regions_file);

    Ok(catalog)
}

fn validate_regions(regions_file: &RegionsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for region in &regions_file.regions {
        if region.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "region name must be non-empty".to_string(),
            ));
        }

        if region.targets().is_empty() {
            return Err(ConfigError::Validation(format!(
                "region '{}' must list at least one hashtag or account",
                region.name
            )));
        }

        if !seen_names.insert(region.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate region name: '{}'",
                region.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "regions_test.rs"]
mod tests;
