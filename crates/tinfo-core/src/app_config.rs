use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub regions_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Apify API token. When `None` the CLI cannot fetch from Instagram.
    pub apify_token: Option<String>,
    pub apify_actor_id: String,
    /// Per-target `resultsLimit` sent to the Apify actor.
    pub apify_results_limit: u32,
    pub scraper_request_timeout_secs: u64,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_ms: u64,
    pub fetch_max_concurrent: usize,
    /// Gemini API key. When `None` posts are stored with their raw text.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Minimum spacing between Gemini requests.
    pub gemini_min_interval_ms: u64,
    pub persist_ignored: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("regions_path", &self.regions_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "apify_token",
                &self.apify_token.as_ref().map(|_| "[redacted]"),
            )
            .field("apify_actor_id", &self.apify_actor_id)
            .field("apify_results_limit", &self.apify_results_limit)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_ms",
                &self.scraper_retry_backoff_base_ms,
            )
            .field("fetch_max_concurrent", &self.fetch_max_concurrent)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_model", &self.gemini_model)
            .field("gemini_min_interval_ms", &self.gemini_min_interval_ms)
            .field("persist_ignored", &self.persist_ignored)
            .finish()
    }
}
