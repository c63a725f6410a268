use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by Apify (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("Apify API error (status {status}) from {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    #[error("actor run {run_id} finished with status {status}")]
    RunFailed { run_id: String, status: String },

    #[error("actor run {run_id} still not finished after {polls} polls")]
    RunTimedOut { run_id: String, polls: u32 },

    #[error("APIFY_TOKEN is not configured")]
    MissingToken,
}
