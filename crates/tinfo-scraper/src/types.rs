//! Wire types for the Apify REST API and the Instagram scraper actor.

use serde::{Deserialize, Serialize};

/// Envelope used by every Apify `data` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Actor run metadata returned when starting or polling a run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    /// `READY`, `RUNNING`, `SUCCEEDED`, `FAILED`, `ABORTED`, `TIMED-OUT`, ...
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
}

impl RunData {
    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        self.status == "SUCCEEDED"
    }

    #[must_use]
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self.status.as_str(),
            "FAILED" | "ABORTED" | "TIMED-OUT" | "TIMING-OUT" | "ABORTING"
        )
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProxyConfig {
    #[serde(rename = "useApifyProxy")]
    pub use_apify_proxy: bool,
}

/// Input for the Instagram scraper actor.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActorInput {
    #[serde(rename = "directUrls")]
    pub direct_urls: Vec<String>,
    #[serde(rename = "resultsType")]
    pub results_type: String,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
    pub proxy: ProxyConfig,
}

impl ActorInput {
    /// Posts for a single profile or hashtag page.
    #[must_use]
    pub fn posts(url: String, results_limit: u32) -> Self {
        Self {
            direct_urls: vec![url],
            results_type: "posts".to_string(),
            results_limit,
            proxy: ProxyConfig {
                use_apify_proxy: true,
            },
        }
    }
}

/// One dataset item produced by the actor.
///
/// Every field is optional: the actor emits error rows and partial rows
/// alongside real posts, so validation happens in [`crate::normalize`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetItem {
    #[serde(rename = "shortCode")]
    pub short_code: Option<String>,
    pub caption: Option<String>,
    #[serde(rename = "displayUrl")]
    pub display_url: Option<String>,
    #[serde(rename = "thumbnailUrl")]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "ownerUsername")]
    pub owner_username: Option<String>,
    pub url: Option<String>,
    /// ISO-8601, usually with a `Z` suffix. Kept as text so a single bad
    /// value only drops its own item.
    pub timestamp: Option<String>,
}
