use std::str::FromStr;

use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_SEARCH_TERMS: &[&str] = &[
    "we buy houses",
    "sell my house fast",
    "sell my house fast for cash",
];

pub const DEFAULT_CHART_TERM: &str = "we buy houses";

pub const DEFAULT_IBUYER_DOMAINS: &[&str] = &[
    "opendoor.com",
    "offerpad.com",
    "redfin.com",
    "zillow.com",
    "homelight.com",
    "knock.com",
    "orchard.com",
    "webuyuglyhouses.com",
    "houzeo.com",
];

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
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
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value::<u64>(var, &or_default(var, default))
    };

    let parse_positive = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = parse_value::<usize>(var, &or_default(var, default))?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    };

    let serper_api_key = optional("SERPER_API_KEY");
    let semrush_api_key = optional("SEMRUSH_API_KEY");
    let log_level = or_default("MARKETSCOPE_LOG_LEVEL", "info");
    let markets_path = PathBuf::from(or_default(
        "MARKETSCOPE_MARKETS_PATH",
        "./config/markets.yaml",
    ));

    let search_terms = match optional("MARKETSCOPE_SEARCH_TERMS") {
        Some(raw) => parse_list(&raw),
        None => DEFAULT_SEARCH_TERMS.iter().map(|s| (*s).to_string()).collect(),
    };
    if search_terms.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "MARKETSCOPE_SEARCH_TERMS".to_string(),
            reason: "at least one search term is required".to_string(),
        });
    }

    let chart_term = or_default("MARKETSCOPE_CHART_TERM", DEFAULT_CHART_TERM);

    let ibuyer_domains = match optional("MARKETSCOPE_IBUYER_DOMAINS") {
        Some(raw) => parse_list(&raw),
        None => DEFAULT_IBUYER_DOMAINS
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
    };

    let search_delay_ms = parse_num("MARKETSCOPE_SEARCH_DELAY_MS", "1000")?;
    let seo_batch_size = parse_positive("MARKETSCOPE_SEO_BATCH_SIZE", "5")?;
    let seo_max_concurrent = parse_positive("MARKETSCOPE_SEO_MAX_CONCURRENT", "5")?;
    let seo_batch_delay_ms = parse_num("MARKETSCOPE_SEO_BATCH_DELAY_MS", "1000")?;
    let seo_cache_ttl_secs = parse_num("MARKETSCOPE_SEO_CACHE_TTL_SECS", "86400")?;
    let request_timeout_secs = parse_num("MARKETSCOPE_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_value::<u32>(
        "MARKETSCOPE_MAX_RETRIES",
        &or_default("MARKETSCOPE_MAX_RETRIES", "2"),
    )?;
    let retry_backoff_base_ms = parse_num("MARKETSCOPE_RETRY_BACKOFF_BASE_MS", "500")?;
    let seo_stage_timeout_secs = parse_num("MARKETSCOPE_SEO_STAGE_TIMEOUT_SECS", "90")?;
    let analysis_timeout_secs = parse_num("MARKETSCOPE_ANALYSIS_TIMEOUT_SECS", "180")?;

    let default_radius_miles = parse_value::<f64>(
        "MARKETSCOPE_DEFAULT_RADIUS_MILES",
        &or_default("MARKETSCOPE_DEFAULT_RADIUS_MILES", "50"),
    )?;
    if !default_radius_miles.is_finite() || default_radius_miles < 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MARKETSCOPE_DEFAULT_RADIUS_MILES".to_string(),
            reason: "must be a non-negative number of miles".to_string(),
        });
    }

    Ok(AppConfig {
        serper_api_key,
        semrush_api_key,
        log_level,
        markets_path,
        search_terms,
        chart_term,
        ibuyer_domains,
        search_delay_ms,
        seo_batch_size,
        seo_max_concurrent,
        seo_batch_delay_ms,
        seo_cache_ttl_secs,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        seo_stage_timeout_secs,
        analysis_timeout_secs,
        default_radius_miles,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Split a comma-separated list, trimming entries and dropping empties.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
