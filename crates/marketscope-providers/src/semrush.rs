//! HTTP client for the SEMrush backlinks-overview report.
//!
//! The report is returned as `;`-delimited CSV: a header line followed by a
//! single data row `target;ascore;total;domains_num`. Unknown domains come
//! back as a plain-text `ERROR 50 :: NOTHING FOUND` body with HTTP 200.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use marketscope_core::extract_base_domain;
use reqwest::{Client, Url};

use crate::cache::SeoCache;
use crate::error::ProviderError;
use crate::http::read_success_body;
use crate::provider::SeoProvider;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::types::SeoMetrics;

const DEFAULT_BASE_URL: &str = "https://api.semrush.com/";
const PROVIDER: &str = "semrush";

pub struct SemrushClient {
    client: Client,
    api_key: String,
    report_url: Url,
    retry: RetryPolicy,
    cache: Arc<SeoCache>,
}

impl SemrushClient {
    /// Creates a client pointed at the production SEMrush API.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        retry: RetryPolicy,
        cache: Arc<SeoCache>,
    ) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, timeout_secs, retry, cache, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        retry: RetryPolicy,
        cache: Arc<SeoCache>,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("marketscope/0.1 (market-research)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let report_url = Url::parse(&normalised)
            .and_then(|base| base.join("analytics/v1/"))
            .map_err(|e| ProviderError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            report_url,
            retry,
            cache,
        })
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<SeoCache> {
        &self.cache
    }

    /// Fetches backlink metrics for the root domain of `domain`.
    ///
    /// Served from the cache while an entry is fresh. Returns `Ok(None)` when
    /// no domain can be extracted or SEMrush has no data for it.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::Api`] if SEMrush answers with an error other than "nothing found".
    /// - [`ProviderError::RateLimited`] / [`ProviderError::UnexpectedStatus`] on non-2xx responses.
    /// - [`ProviderError::Http`] on network failure after retries.
    /// - [`ProviderError::Parse`] if the CSV report is malformed.
    pub async fn fetch_metrics(&self, domain: &str) -> Result<Option<SeoMetrics>, ProviderError> {
        let Some(root) = extract_base_domain(domain) else {
            tracing::warn!(domain, "could not extract a root domain; skipping SEO lookup");
            return Ok(None);
        };

        if let Some(cached) = self.cache.get(&root) {
            tracing::debug!(domain = %root, "SEO cache hit");
            return Ok(Some(cached));
        }

        let url = self.build_url(&root);
        tracing::debug!(domain = %root, "requesting SEMrush backlinks overview");

        let body = retry_with_backoff(self.retry, PROVIDER, || {
            let request = self.client.get(url.clone());
            async move { read_success_body(request, PROVIDER).await }
        })
        .await?;

        let metrics = parse_backlinks_overview(&root, &body)?;
        if let Some(m) = &metrics {
            self.cache.put(m.clone());
        }
        Ok(metrics)
    }

    fn build_url(&self, domain: &str) -> Url {
        let mut url = self.report_url.clone();
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("target", domain)
            .append_pair("type", "backlinks_overview")
            .append_pair("target_type", "root_domain")
            .append_pair("display_date", "latest")
            .append_pair("export_columns", "target,ascore,total,domains_num")
            .append_pair("display_limit", "1")
            .append_pair("database", "us");
        url
    }
}

/// Parses a backlinks-overview CSV body for `domain`.
///
/// `none` or empty numeric cells read as zero.
pub(crate) fn parse_backlinks_overview(
    domain: &str,
    body: &str,
) -> Result<Option<SeoMetrics>, ProviderError> {
    let body = body.trim();
    if let Some(message) = body.strip_prefix("ERROR") {
        if message.contains("NOTHING FOUND") {
            return Ok(None);
        }
        return Err(ProviderError::Api {
            provider: PROVIDER,
            message: body.to_string(),
        });
    }

    let mut lines = body.lines().map(str::trim).filter(|l| !l.is_empty());
    let parse_err = |reason: &str| ProviderError::Parse {
        context: format!("SEMrush backlinks overview for {domain}"),
        reason: reason.to_string(),
    };

    lines.next().ok_or_else(|| parse_err("empty response"))?;
    let row = lines.next().ok_or_else(|| parse_err("missing data row"))?;

    let cells: Vec<&str> = row
        .split(';')
        .map(|c| c.trim().trim_matches('"'))
        .collect();
    if cells.len() < 4 {
        return Err(parse_err(&format!(
            "expected 4 columns, found {}",
            cells.len()
        )));
    }

    let authority_score = parse_cell::<f64>(cells[1]).map_err(|e| parse_err(&e))?;
    let backlink_count = parse_cell::<u64>(cells[2]).map_err(|e| parse_err(&e))?;
    let referring_domains = parse_cell::<u64>(cells[3]).map_err(|e| parse_err(&e))?;

    Ok(Some(SeoMetrics {
        domain: domain.to_string(),
        authority_score,
        backlink_count,
        referring_domains,
    }))
}

fn parse_cell<T>(cell: &str) -> Result<T, String>
where
    T: std::str::FromStr + Default,
    T::Err: std::fmt::Display,
{
    if cell.is_empty() || cell.eq_ignore_ascii_case("none") {
        return Ok(T::default());
    }
    cell.parse::<T>()
        .map_err(|e| format!("invalid value '{cell}': {e}"))
}

#[async_trait]
impl SeoProvider for SemrushClient {
    async fn domain_metrics(&self, domain: &str) -> Option<SeoMetrics> {
        match self.fetch_metrics(domain).await {
            Ok(Some(metrics)) => Some(metrics),
            Ok(None) => {
                tracing::info!(domain, "no SEO data for domain");
                None
            }
            Err(e) => {
                tracing::error!(domain, error = %e, "SEMrush lookup failed");
                None
            }
        }
    }
}
