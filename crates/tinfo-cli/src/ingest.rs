//! `tinfo-cli ingest`: wire config into a [`Pipeline`] and record the run.

use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use sqlx::PgPool;
use tinfo_core::{load_regions, AppConfig, ConfigError, IgnorePolicy, RunParameters, RunSummary};
use tinfo_db::PoolConfig;
use tinfo_ingest::summary::Summarizer;
use tinfo_ingest::{GeminiRewriter, PassthroughRewriter, PgPostStore, Pipeline, Rewriter};
use tinfo_scraper::InstagramClient;

use crate::IngestArgs;

const TRIGGER_SOURCE: &str = "cli";

struct PreparedRun {
    pipeline: Pipeline,
    params: RunParameters,
    pool: PgPool,
}

/// Run one ingestion and return its summary.
///
/// Setup failures (bad config, unreadable regions file, missing Apify token)
/// are folded into an `error` summary so the report is always printed.
pub(crate) async fn run_ingest(
    config: Result<AppConfig, ConfigError>,
    args: &IngestArgs,
) -> RunSummary {
    let prepared = match config
        .map_err(anyhow::Error::from)
        .and_then(|config| prepare(&config, args))
    {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "ingest setup failed");
            return failed_summary(&e);
        }
    };
    let PreparedRun {
        pipeline,
        params,
        pool,
    } = prepared;

    let run_id = start_run_best_effort(&pool, &params).await;
    let summary = pipeline.run(&params, Utc::now()).await;
    if let Some(id) = run_id {
        finish_run_best_effort(&pool, id, &summary).await;
    }
    summary
}

fn prepare(config: &AppConfig, args: &IngestArgs) -> anyhow::Result<PreparedRun> {
    let catalog = load_regions(&config.regions_path)?;

    let ignore_policy = if args.drop_ignored || !config.persist_ignored {
        IgnorePolicy::Drop
    } else {
        IgnorePolicy::Persist
    };
    let params = RunParameters::from_invocation(
        &catalog,
        &args.country,
        args.targets.clone(),
        lenient_int("days", &args.days),
        lenient_int("limit", &args.limit),
        !args.no_skip_duplicates,
        ignore_policy,
    );
    if catalog.find(&args.country).is_none() {
        tracing::warn!(
            requested = %args.country,
            using = %params.country,
            "unknown country, falling back to default region"
        );
    }

    let pool = tinfo_db::connect_pool_lazy(&config.database_url, PoolConfig::from_app_config(config))?;

    let token = config.apify_token.as_deref().unwrap_or_default();
    let fetcher = InstagramClient::new(
        token,
        &config.apify_actor_id,
        config.apify_results_limit,
        config.scraper_request_timeout_secs,
        config.scraper_max_retries,
        config.scraper_retry_backoff_base_ms,
    )?;

    let rewriter: Box<dyn Rewriter> = match config.gemini_api_key.as_deref() {
        Some(key) if !args.passthrough => Box::new(
            GeminiRewriter::new(key, &config.gemini_model, config.scraper_request_timeout_secs)?
                .with_retry(
                    config.scraper_max_retries,
                    config.scraper_retry_backoff_base_ms,
                )
                .with_min_interval(Duration::from_millis(config.gemini_min_interval_ms)),
        ),
        _ => {
            tracing::info!("using passthrough rewriter");
            Box::new(PassthroughRewriter)
        }
    };

    let pipeline = Pipeline::new(
        catalog,
        Box::new(fetcher),
        rewriter,
        Box::new(PgPostStore::new(pool.clone())),
    )
    .with_max_concurrent(config.fetch_max_concurrent);

    Ok(PreparedRun {
        pipeline,
        params,
        pool,
    })
}

/// Invocation numbers never abort a run: anything that is not an integer is
/// handed on as out-of-range so it falls back to the default.
fn lenient_int(name: &str, raw: &str) -> i64 {
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(arg = name, value = raw, "not an integer, using default");
        i64::MIN
    })
}

fn failed_summary(error: &anyhow::Error) -> RunSummary {
    let mut summarizer = Summarizer::new();
    summarizer.fail(format!("{error:#}"));
    summarizer.finish()
}

fn parameters_json(params: &RunParameters) -> Value {
    json!({
        "country": params.country,
        "targets": params.targets,
        "days": params.days,
        "limit": params.limit,
        "skip_duplicates": params.skip_duplicates,
        "ignore_policy": match params.ignore_policy {
            IgnorePolicy::Persist => "persist",
            IgnorePolicy::Drop => "drop",
        },
    })
}

/// Run bookkeeping never decides the outcome of the ingest itself.
async fn start_run_best_effort(pool: &PgPool, params: &RunParameters) -> Option<i64> {
    match tinfo_db::create_ingest_run(
        pool,
        TRIGGER_SOURCE,
        &params.country,
        parameters_json(params),
    )
    .await
    {
        Ok(run) => Some(run.id),
        Err(e) => {
            tracing::warn!(error = %e, "failed to record ingest run start");
            None
        }
    }
}

async fn finish_run_best_effort(pool: &PgPool, run_id: i64, summary: &RunSummary) {
    if let Err(e) = tinfo_db::finish_ingest_run(pool, run_id, summary).await {
        tracing::warn!(run_id, error = %e, "failed to record ingest run result");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_summary_is_error_with_message() {
        let error = anyhow::Error::from(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
        let summary = failed_summary(&error);
        assert_eq!(summary.status, tinfo_core::RunStatus::Error);
        assert!(summary.message.contains("DATABASE_URL"));
        assert_eq!(summary.raw_fetched, 0);
    }

    #[test]
    fn lenient_int_accepts_integers_and_maps_garbage_out_of_range() {
        assert_eq!(lenient_int("days", " 30 "), 30);
        assert_eq!(lenient_int("days", "-5"), -5);
        assert_eq!(lenient_int("days", "abc"), i64::MIN);
        assert_eq!(tinfo_core::normalize_days(lenient_int("days", "abc")), 14);
        assert_eq!(tinfo_core::normalize_limit(lenient_int("limit", "1.5")), 10);
    }

    #[test]
    fn parameters_json_records_policy() {
        let params = RunParameters {
            ignore_policy: IgnorePolicy::Drop,
            targets: Some("#torontojobs".to_string()),
            ..RunParameters::default()
        };
        let value = parameters_json(&params);
        assert_eq!(value["ignore_policy"], "drop");
        assert_eq!(value["targets"], "#torontojobs");
        assert_eq!(value["days"], 14);
        assert_eq!(value["skip_duplicates"], true);
    }
}
