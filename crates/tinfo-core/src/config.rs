use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Apify actor ID for `apify/instagram-scraper`.
const DEFAULT_APIFY_ACTOR_ID: &str = "shu8hvrXbJbY3Eb9W";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings count as unset so `.env` templates with `KEY=` lines work.
    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected true/false, got '{raw}'"),
            }),
        }
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("TINFO_ENV", "development"))?;
    let log_level = or_default("TINFO_LOG_LEVEL", "info");
    let regions_path = PathBuf::from(or_default("TINFO_REGIONS_PATH", "./config/regions.yaml"));

    let db_max_connections = parse_u32("TINFO_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("TINFO_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("TINFO_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let apify_token = optional("APIFY_TOKEN");
    let apify_actor_id = or_default("TINFO_APIFY_ACTOR_ID", DEFAULT_APIFY_ACTOR_ID);
    let apify_results_limit = parse_u32("TINFO_APIFY_RESULTS_LIMIT", "10")?;
    let scraper_request_timeout_secs = parse_u64("TINFO_SCRAPER_REQUEST_TIMEOUT_SECS", "60")?;
    let scraper_max_retries = parse_u32("TINFO_SCRAPER_MAX_RETRIES", "3")?;
    let scraper_retry_backoff_base_ms = parse_u64("TINFO_SCRAPER_RETRY_BACKOFF_BASE_MS", "1000")?;
    let fetch_max_concurrent = parse_usize("TINFO_FETCH_MAX_CONCURRENT", "4")?;

    let gemini_api_key = optional("GEMINI_API_KEY");
    let gemini_model = or_default("TINFO_GEMINI_MODEL", "gemini-flash-latest");
    let gemini_min_interval_ms = parse_u64("TINFO_GEMINI_MIN_INTERVAL_MS", "4000")?;
    let persist_ignored = parse_bool("TINFO_PERSIST_IGNORED", true)?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        regions_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        apify_token,
        apify_actor_id,
        apify_results_limit,
        scraper_request_timeout_secs,
        scraper_max_retries,
        scraper_retry_backoff_base_ms,
        fetch_max_concurrent,
        gemini_api_key,
        gemini_model,
        gemini_min_interval_ms,
        persist_ignored,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TINFO_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
