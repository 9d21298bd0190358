use std::path::PathBuf;

use crate::ConfigError;

#[derive(Clone)]
pub struct AppConfig {
    pub serper_api_key: Option<String>,
    pub semrush_api_key: Option<String>,
    pub log_level: String,
    pub markets_path: PathBuf,
    /// Search terms queried per analysis, in the order they are issued.
    pub search_terms: Vec<String>,
    /// Term whose top results feed the ranking/authority chart.
    pub chart_term: String,
    pub ibuyer_domains: Vec<String>,
    pub search_delay_ms: u64,
    pub seo_batch_size: usize,
    pub seo_max_concurrent: usize,
    pub seo_batch_delay_ms: u64,
    pub seo_cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub seo_stage_timeout_secs: u64,
    pub analysis_timeout_secs: u64,
    pub default_radius_miles: f64,
}

impl AppConfig {
    /// The Serper key, for commands that cannot run without search.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `SERPER_API_KEY` is unset.
    pub fn require_serper_api_key(&self) -> Result<&str, ConfigError> {
        self.serper_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("SERPER_API_KEY".to_string()))
    }

    /// The SEMrush key, for commands that cannot run without SEO data.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `SEMRUSH_API_KEY` is unset.
    pub fn require_semrush_api_key(&self) -> Result<&str, ConfigError> {
        self.semrush_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("SEMRUSH_API_KEY".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "serper_api_key",
                &self.serper_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "semrush_api_key",
                &self.semrush_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("log_level", &self.log_level)
            .field("markets_path", &self.markets_path)
            .field("search_terms", &self.search_terms)
            .field("chart_term", &self.chart_term)
            .field("ibuyer_domains", &self.ibuyer_domains)
            .field("search_delay_ms", &self.search_delay_ms)
            .field("seo_batch_size", &self.seo_batch_size)
            .field("seo_max_concurrent", &self.seo_max_concurrent)
            .field("seo_batch_delay_ms", &self.seo_batch_delay_ms)
            .field("seo_cache_ttl_secs", &self.seo_cache_ttl_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("seo_stage_timeout_secs", &self.seo_stage_timeout_secs)
            .field("analysis_timeout_secs", &self.analysis_timeout_secs)
            .field("default_radius_miles", &self.default_radius_miles)
            .finish()
    }
}
