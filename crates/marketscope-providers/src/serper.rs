//! HTTP client for the Serper.dev Google search API.

use std::time::Duration;

use async_trait::async_trait;
use marketscope_core::extract_base_domain;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::http::read_success_body;
use crate::provider::SearchProvider;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::types::{SearchQuery, SearchResult};

const DEFAULT_BASE_URL: &str = "https://google.serper.dev/";
const PROVIDER: &str = "serper";

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: u32,
    gl: &'a str,
    hl: &'a str,
    autocorrect: bool,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperOrganic>,
}

#[derive(Debug, Deserialize)]
struct SerperOrganic {
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Client for Serper's `/search` endpoint.
///
/// Use [`SerperClient::new`] for production or [`SerperClient::with_base_url`]
/// to point at a mock server in tests.
pub struct SerperClient {
    client: Client,
    api_key: String,
    search_url: Url,
    retry: RetryPolicy,
}

impl SerperClient {
    /// Creates a client pointed at the production Serper API.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        retry: RetryPolicy,
    ) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, timeout_secs, retry, DEFAULT_BASE_URL)
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
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("marketscope/0.1 (market-research)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let search_url = Url::parse(&normalised)
            .and_then(|base| base.join("search"))
            .map_err(|e| ProviderError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            search_url,
            retry,
        })
    }

    /// Fetches organic results for one query.
    ///
    /// Ranks are the 1-based positions in the provider's organic list; entries
    /// without a link or a recoverable domain are skipped but do not shift
    /// the ranks of later entries.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::RateLimited`] on HTTP 429 after retries.
    /// - [`ProviderError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ProviderError::Http`] on network failure after retries.
    /// - [`ProviderError::Deserialize`] if the body is not the expected JSON.
    pub async fn search_organic(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        let text = query.text();
        let payload = SerperRequest {
            q: &text,
            num: query.num_results,
            gl: &query.country,
            hl: &query.language,
            autocorrect: true,
        };

        tracing::debug!(
            term = %query.term,
            location = %query.location(),
            "requesting Serper results"
        );

        let body = retry_with_backoff(self.retry, PROVIDER, || {
            let request = self
                .client
                .post(self.search_url.clone())
                .header("X-API-KEY", &self.api_key)
                .json(&payload);
            async move { read_success_body(request, PROVIDER).await }
        })
        .await?;

        let parsed: SerperResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: format!("Serper results for '{text}'"),
                source: e,
            })?;

        Ok(organic_to_results(parsed.organic))
    }
}

fn organic_to_results(organic: Vec<SerperOrganic>) -> Vec<SearchResult> {
    organic
        .into_iter()
        .zip(1u32..)
        .filter_map(|(hit, rank)| {
            let url = hit.link.filter(|l| !l.trim().is_empty())?;
            let Some(domain) = extract_base_domain(&url) else {
                tracing::debug!(url = %url, rank, "skipping result without a recoverable domain");
                return None;
            };
            Some(SearchResult {
                domain,
                rank,
                url,
                title: hit.title.unwrap_or_default(),
            })
        })
        .collect()
}

#[async_trait]
impl SearchProvider for SerperClient {
    async fn search(&self, query: &SearchQuery) -> Vec<SearchResult> {
        match self.search_organic(query).await {
            Ok(results) => {
                if results.is_empty() {
                    tracing::warn!(
                        term = %query.term,
                        location = %query.location(),
                        "no organic results"
                    );
                } else {
                    tracing::info!(
                        term = %query.term,
                        location = %query.location(),
                        count = results.len(),
                        "retrieved organic results"
                    );
                }
                results
            }
            Err(e) => {
                tracing::error!(
                    term = %query.term,
                    location = %query.location(),
                    error = %e,
                    "Serper search failed"
                );
                Vec::new()
            }
        }
    }
}
