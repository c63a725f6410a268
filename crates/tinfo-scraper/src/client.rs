//! HTTP client for the Apify Instagram scraper actor.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use tinfo_core::{RawPost, Target};

use crate::error::ScraperError;
use crate::normalize::{normalize_item, SkipReason};
use crate::rate_limit::retry_with_backoff;
use crate::types::{ActorInput, ApiResponse, DatasetItem, RunData};

pub const DEFAULT_BASE_URL: &str = "https://api.apify.com/v2";

/// Upper bound on long-poll rounds before a run is reported as stuck.
const DEFAULT_MAX_POLLS: u32 = 30;

/// Longest `waitForFinish` Apify honours.
const MAX_POLL_WAIT_SECS: u64 = 60;

/// Starts actor runs for one target at a time, long-polls them to completion
/// and reads the resulting dataset.
///
/// Transient errors (429, network failures, 5xx) are retried with exponential
/// backoff up to `max_retries` additional attempts per request.
pub struct InstagramClient {
    client: Client,
    base_url: String,
    token: String,
    actor_id: String,
    results_limit: u32,
    max_retries: u32,
    backoff_base_ms: u64,
    poll_wait_secs: u64,
    max_polls: u32,
}

impl InstagramClient {
    /// Creates a client with the given request timeout and retry policy.
    ///
    /// The long-poll window is kept 10 s below `timeout_secs` (and at most
    /// 60 s) so a poll never trips the request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::MissingToken`] for an empty token, or
    /// [`ScraperError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        token: &str,
        actor_id: &str,
        results_limit: u32,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScraperError> {
        if token.trim().is_empty() {
            return Err(ScraperError::MissingToken);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("tinfo/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.trim().to_string(),
            actor_id: actor_id.to_string(),
            results_limit,
            max_retries,
            backoff_base_ms,
            poll_wait_secs: timeout_secs.saturating_sub(10).min(MAX_POLL_WAIT_SECS),
            max_polls: DEFAULT_MAX_POLLS,
        })
    }

    /// Points the client at a different API root (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls.max(1);
        self
    }

    #[must_use]
    pub fn actor_input(&self, target: &Target) -> ActorInput {
        ActorInput::posts(target.url(), self.results_limit)
    }

    fn runs_url(&self) -> String {
        format!("{}/acts/{}/runs", self.base_url, self.actor_id)
    }

    fn run_url(&self, run_id: &str) -> String {
        format!(
            "{}/actor-runs/{run_id}?waitForFinish={}",
            self.base_url, self.poll_wait_secs
        )
    }

    fn dataset_items_url(&self, dataset_id: &str) -> String {
        format!(
            "{}/datasets/{dataset_id}/items?format=json&clean=true",
            self.base_url
        )
    }

    /// Starts an actor run. Returns as soon as Apify accepts it.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ScraperError::Api`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network or TLS failure after all retries.
    /// - [`ScraperError::Deserialize`]: body is not a run envelope.
    pub async fn start_run(&self, input: &ActorInput) -> Result<RunData, ScraperError> {
        let url = self.runs_url();
        let response: ApiResponse<RunData> = self
            .execute(Method::POST, &url, Some(input), "actor run start")
            .await?;
        Ok(response.data)
    }

    /// Fetches the current state of a run, long-polling on the server side.
    ///
    /// # Errors
    ///
    /// Same as [`InstagramClient::start_run`].
    pub async fn get_run(&self, run_id: &str) -> Result<RunData, ScraperError> {
        let url = self.run_url(run_id);
        let response: ApiResponse<RunData> = self
            .execute(Method::GET, &url, None, "actor run status")
            .await?;
        Ok(response.data)
    }

    /// Polls until the run reaches a terminal status.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::RunFailed`] for `FAILED`, `ABORTED` or
    /// `TIMED-OUT`, and [`ScraperError::RunTimedOut`] if the run is still
    /// going after the poll budget.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData, ScraperError> {
        for poll in 1..=self.max_polls {
            let run = self.get_run(run_id).await?;
            if run.is_succeeded() {
                return Ok(run);
            }
            if run.is_terminal_failure() {
                return Err(ScraperError::RunFailed {
                    run_id: run.id,
                    status: run.status,
                });
            }
            tracing::debug!(run_id, poll, status = %run.status, "actor run still in progress");
            if self.poll_wait_secs == 0 {
                tokio::time::sleep(Duration::from_millis(self.backoff_base_ms)).await;
            }
        }
        Err(ScraperError::RunTimedOut {
            run_id: run_id.to_string(),
            polls: self.max_polls,
        })
    }

    /// Reads every item in a dataset.
    ///
    /// # Errors
    ///
    /// Same as [`InstagramClient::start_run`].
    pub async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<DatasetItem>, ScraperError> {
        let url = self.dataset_items_url(dataset_id);
        self.execute(Method::GET, &url, None, "dataset items").await
    }

    /// Runs the actor for one target end to end and returns its posts in
    /// dataset order.
    ///
    /// Items without a shortcode or a usable timestamp are dropped here.
    ///
    /// # Errors
    ///
    /// Any error from starting, polling or reading the run.
    pub async fn fetch_target_posts(&self, target: &Target) -> Result<Vec<RawPost>, ScraperError> {
        let input = self.actor_input(target);
        tracing::info!(target = %target, limit = self.results_limit, "starting Instagram scrape");

        let run = self.start_run(&input).await?;
        tracing::debug!(target = %target, run_id = %run.id, "actor run started");

        let completed = self.wait_for_run(&run.id).await?;
        let items = self.dataset_items(&completed.default_dataset_id).await?;
        let item_count = items.len();

        let mut posts = Vec::with_capacity(item_count);
        for item in items {
            match normalize_item(item, target) {
                Ok(post) => posts.push(post),
                Err(SkipReason::MissingShortcode) => {
                    tracing::debug!(target = %target, "skipping dataset item without shortcode");
                }
                Err(reason) => {
                    tracing::warn!(target = %target, reason = %reason, "skipping dataset item");
                }
            }
        }

        tracing::info!(
            target = %target,
            items = item_count,
            posts = posts.len(),
            "Instagram scrape complete"
        );
        Ok(posts)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&ActorInput>,
        context: &str,
    ) -> Result<T, ScraperError> {
        let method = &method;
        retry_with_backoff::<_, ScraperError, _, _>(
            self.max_retries,
            self.backoff_base_ms,
            || async move {
                let mut request = self
                    .client
                    .request(method.clone(), url)
                    .bearer_auth(&self.token);
                if let Some(body) = body {
                    request = request.json(body);
                }
                let response = request.send().await?;
                let text = read_body(response, url).await?;
                serde_json::from_str::<T>(&text).map_err(|source| ScraperError::Deserialize {
                    context: context.to_owned(),
                    source,
                })
            },
        )
        .await
    }
}

async fn read_body(response: reqwest::Response, url: &str) -> Result<String, ScraperError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);
        return Err(ScraperError::RateLimited { retry_after_secs });
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ScraperError::Api {
            status: status.as_u16(),
            url: url.to_owned(),
            message,
        });
    }
    Ok(response.text().await?)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
