//! Gemini `generateContent` rewriter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tinfo_core::{Category, RawPost};
use tinfo_scraper::{retry_with_backoff, Transient};
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::passthrough::normalize_text;
use super::{Rewrite, Rewriter};
use crate::error::IngestError;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const TEMPERATURE: f32 = 0.4;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_BASE_MS: u64 = 2_000;
/// Free-tier quota is about 15 requests per minute.
pub const DEFAULT_GEMINI_MIN_INTERVAL_MS: u64 = 4_000;

#[derive(Debug, Error)]
enum GeminiError {
    #[error("Gemini request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini returned status 429 (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("Gemini returned status {status}")]
    Status { status: u16 },

    #[error("Gemini response parse error: {0}")]
    Parse(String),

    #[error("Gemini returned no text")]
    Empty,
}

impl Transient for GeminiError {
    fn is_retriable(&self) -> bool {
        match self {
            GeminiError::RateLimited { .. } => true,
            GeminiError::Status { status } => *status >= 500,
            GeminiError::Http(e) => e.is_timeout() || e.is_connect(),
            GeminiError::Parse(_) | GeminiError::Empty => false,
        }
    }

    fn retry_after_secs(&self) -> Option<u64> {
        match self {
            GeminiError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }
}

impl From<GeminiError> for IngestError {
    fn from(err: GeminiError) -> Self {
        IngestError::Classification(err.to_string())
    }
}

/// Fields requested from the model for each category.
fn extracted_fields(category: Category) -> &'static [&'static str] {
    match category {
        Category::Job => &[
            "job_title",
            "job_description_summary",
            "shop_name",
            "location",
            "apply_method",
        ],
        Category::House => &[
            "rent_price",
            "area",
            "nearest_station",
            "room_type",
            "move_in_date",
        ],
        Category::Event => &["event_name", "event_date", "event_place"],
        Category::Ignore => &[],
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Rewrites posts into short Japanese introductions and extracts structured
/// fields for the category.
///
/// `Ignore` posts are not sent to the model; they get the normalized raw text.
/// Requests are spaced at least `min_interval` apart, retries included, and
/// 429/5xx answers are retried with backoff.
pub struct GeminiRewriter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_retries: u32,
    backoff_base_ms: u64,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl GeminiRewriter {
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            min_interval: Duration::from_millis(DEFAULT_GEMINI_MIN_INTERVAL_MS),
            last_request: Mutex::new(None),
        })
    }

    /// A `backoff_base_ms` of zero retries without sleeping.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Wait until `min_interval` has passed since the previous request.
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            tokio::time::sleep_until(previous + self.min_interval).await;
        }
        *last = Some(Instant::now());
    }

    async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        let request = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                response_mime_type: "application/json",
            },
        };
        let request = &request;

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            self.pace().await;
            self.send(request).await
        })
        .await
    }

    async fn send(&self, request: &GenerateRequest<'_>) -> Result<String, GeminiError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(0);
            return Err(GeminiError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            return Err(GeminiError::Status {
                status: status.as_u16(),
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        body.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or(GeminiError::Empty)
    }
}

/// Build the instruction sent to the model.
#[must_use]
pub fn build_prompt(post: &RawPost, category: Category) -> String {
    let fields = extracted_fields(category)
        .iter()
        .map(|f| format!("  \"{f}\": ..."))
        .collect::<Vec<_>>()
        .join(",\n");
    let fields = if fields.is_empty() {
        String::new()
    } else {
        format!(",\n{fields}")
    };

    format!(
        "You write listings for a community portal for Japanese residents abroad.\n\
         The Instagram post below has been classified as: {category}.\n\
         \n\
         Post text:\n{text}\n\
         Image URL: {image}\n\
         \n\
         Rewrite the post as a polite, modern and sincere Japanese introduction of at most \
         150 characters, and extract the listed fields when the post states them \
         (use null otherwise; rent_price is a number).\n\
         Respond with a single JSON object:\n\
         {{\n  \"rewritten_text\": \"...\"{fields}\n}}",
        text = post.text.trim(),
        image = post.image_url.as_deref().unwrap_or("none"),
    )
}

/// Parse the model's JSON answer into a [`Rewrite`].
///
/// Tolerates Markdown code fences and a nested `data` object. Only the
/// fields requested for `category` with non-null values are kept.
///
/// # Errors
///
/// Returns [`IngestError::Classification`] when the answer is not a JSON
/// object or has no non-empty `rewritten_text`.
pub fn parse_model_output(raw: &str, category: Category) -> Result<Rewrite, IngestError> {
    let cleaned = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| IngestError::Classification(format!("model output is not JSON: {e}")))?;
    let Value::Object(mut object) = value else {
        return Err(IngestError::Classification(
            "model output is not a JSON object".to_string(),
        ));
    };
    if let Some(Value::Object(data)) = object.remove("data") {
        for (key, value) in data {
            object.entry(key).or_insert(value);
        }
    }

    let content = object
        .get("rewritten_text")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            IngestError::Classification("model output has no rewritten_text".to_string())
        })?
        .to_string();

    let mut fields = Map::new();
    for &name in extracted_fields(category) {
        match object.remove(name) {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) if s.trim().is_empty() => {}
            Some(value) => {
                fields.insert(name.to_string(), value);
            }
        }
    }

    Ok(Rewrite { content, fields })
}

#[async_trait]
impl Rewriter for GeminiRewriter {
    async fn rewrite(&self, post: &RawPost, category: Category) -> Result<Rewrite, IngestError> {
        if category == Category::Ignore {
            return Ok(Rewrite {
                content: normalize_text(&post.text),
                fields: Map::new(),
            });
        }

        let prompt = build_prompt(post, category);
        let answer = self.generate(&prompt).await?;
        let rewrite = parse_model_output(&answer, category)?;
        tracing::debug!(
            shortcode = %post.shortcode,
            category = %category,
            fields = rewrite.fields.len(),
            "rewrote post"
        );
        Ok(rewrite)
    }
}
