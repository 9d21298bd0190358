//! Market analysis orchestration.
//!
//! A run moves through [`AnalysisStage`]s in a fixed order:
//!
//! 1. Fetch search results for each configured term, sequentially, with a
//!    delay between calls.
//! 2. Extract the unique domains in first-seen order.
//! 3. Fetch SEO metrics in batches with a cap on in-flight calls and a delay
//!    between batches. The whole stage is bounded by a timeout.
//! 4. Aggregate rankings across terms.
//! 5. Build buyer metrics, chart data, per-term counts, and the summary.
//!
//! Only step 1 can fail the run, when no term returns any result. Provider
//! failures below that are absorbed by the providers themselves.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use marketscope_core::{deduplicate_domains, AppConfig, BuyerClassifier};
use marketscope_providers::{SearchProvider, SearchQuery, SeoMetrics, SeoProvider};
use uuid::Uuid;

use crate::error::AnalysisError;
use crate::ranking::RankAggregator;
use crate::summary::{buyer_metrics, chart_data, summarize, term_summaries};
use crate::types::{AnalysisStage, MarketAnalysis, MarketLocation, TermResults};

/// Tunables for one analyzer, normally derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub search_terms: Vec<String>,
    pub chart_term: String,
    pub search_delay: Duration,
    pub seo_batch_size: usize,
    pub seo_max_concurrent: usize,
    pub seo_batch_delay: Duration,
    pub seo_stage_timeout: Duration,
    pub analysis_timeout: Duration,
}

impl AnalysisSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            search_terms: config.search_terms.clone(),
            chart_term: config.chart_term.clone(),
            search_delay: Duration::from_millis(config.search_delay_ms),
            seo_batch_size: config.seo_batch_size,
            seo_max_concurrent: config.seo_max_concurrent,
            seo_batch_delay: Duration::from_millis(config.seo_batch_delay_ms),
            seo_stage_timeout: Duration::from_secs(config.seo_stage_timeout_secs),
            analysis_timeout: Duration::from_secs(config.analysis_timeout_secs),
        }
    }
}

pub struct MarketAnalyzer<S, M> {
    search: S,
    seo: M,
    classifier: BuyerClassifier,
    settings: AnalysisSettings,
}

impl<S, M> MarketAnalyzer<S, M>
where
    S: SearchProvider,
    M: SeoProvider,
{
    pub fn new(search: S, seo: M, classifier: BuyerClassifier, settings: AnalysisSettings) -> Self {
        Self {
            search,
            seo,
            classifier,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Runs [`Self::analyze_market`] bounded by the configured analysis
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Timeout`] if the run does not finish in time,
    /// otherwise whatever [`Self::analyze_market`] returns.
    pub async fn analyze_with_timeout(
        &self,
        city: &str,
        state: &str,
    ) -> Result<MarketAnalysis, AnalysisError> {
        let limit = self.settings.analysis_timeout;
        tokio::time::timeout(limit, self.analyze_market(city, state))
            .await
            .map_err(|_| {
                tracing::error!(city, state, secs = limit.as_secs(), "market analysis timed out");
                AnalysisError::Timeout {
                    secs: limit.as_secs(),
                }
            })?
    }

    /// Runs a complete market analysis for `city`, `state`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::NoSearchResults`] when every configured term
    /// comes back empty.
    pub async fn analyze_market(
        &self,
        city: &str,
        state: &str,
    ) -> Result<MarketAnalysis, AnalysisError> {
        let run_id = Uuid::new_v4();
        let mut stage = AnalysisStage::FetchSearch;
        tracing::info!(%run_id, city, state, "starting market analysis");

        let search_results = self.fetch_search_results(city, state).await;
        if search_results.is_empty() {
            tracing::error!(%run_id, city, state, %stage, "no search results for any term");
            return Err(AnalysisError::NoSearchResults {
                city: city.to_string(),
                state: state.to_string(),
            });
        }

        stage = advance(stage, run_id);
        let unique_domains = deduplicate_domains(
            search_results
                .iter()
                .flat_map(|t| t.results.iter().map(|r| r.domain.as_str())),
        );
        let total_results: usize = search_results.iter().map(|t| t.results.len()).sum();
        tracing::info!(
            %run_id,
            domains = unique_domains.len(),
            total_results,
            "extracted unique domains"
        );

        stage = advance(stage, run_id);
        let seo_metrics = self.fetch_seo_metrics(&unique_domains).await;

        stage = advance(stage, run_id);
        let mut aggregator = RankAggregator::new(&seo_metrics, &self.classifier);
        for term in &search_results {
            aggregator.observe_term(&term.term, &term.results);
        }
        let ranking = aggregator.finish();

        stage = advance(stage, run_id);
        let buyers = buyer_metrics(&unique_domains, &self.classifier);
        let chart = search_results
            .iter()
            .find(|t| t.term == self.settings.chart_term)
            .map(|t| chart_data(&t.results, &seo_metrics, &self.classifier))
            .unwrap_or_default();
        let terms = term_summaries(&search_results, &self.classifier);
        let summary = summarize(&unique_domains, total_results, &buyers, &seo_metrics, &ranking);

        stage = advance(stage, run_id);
        debug_assert_eq!(stage, AnalysisStage::Done);
        tracing::info!(
            %run_id,
            city,
            state,
            domains = summary.total_domains,
            ibuyers = summary.ibuyer_count,
            "market analysis complete"
        );

        Ok(MarketAnalysis {
            run_id,
            timestamp: Utc::now(),
            market: MarketLocation {
                city: city.to_string(),
                state: state.to_string(),
            },
            search_results,
            seo_metrics,
            ibuyer_metrics: buyers,
            ranking_analysis: ranking.rankings,
            domain_performance: ranking.performance,
            chart_data: chart,
            term_summaries: terms,
            summary,
        })
    }

    /// Queries every configured term in order, pausing between calls.
    /// Terms with no results are left out.
    pub async fn fetch_search_results(&self, city: &str, state: &str) -> Vec<TermResults> {
        let terms = &self.settings.search_terms;
        let total = terms.len();
        let mut collected = Vec::with_capacity(total);

        for (idx, term) in terms.iter().enumerate() {
            tracing::info!(term = %term, index = idx + 1, total, "fetching search results");
            let query = SearchQuery::new(term.as_str(), city, state);
            let results = self.search.search(&query).await;

            if results.is_empty() {
                tracing::warn!(term = %term, city, state, "no results for term");
            } else {
                collected.push(TermResults {
                    term: term.clone(),
                    results,
                });
            }

            if idx + 1 < total {
                tokio::time::sleep(self.settings.search_delay).await;
            }
        }

        tracing::info!(city, state, found = collected.len(), total, "search stage complete");
        collected
    }

    /// Fetches SEO metrics for `domains`, keyed by the requested domain.
    ///
    /// Domains without metrics are omitted. If the stage exceeds its timeout
    /// the result is empty and the analysis continues without enrichment.
    pub async fn fetch_seo_metrics(&self, domains: &[String]) -> BTreeMap<String, SeoMetrics> {
        let limit = self.settings.seo_stage_timeout;
        if let Ok(metrics) = tokio::time::timeout(limit, self.fetch_seo_batches(domains)).await {
            metrics
        } else {
            tracing::warn!(
                domains = domains.len(),
                secs = limit.as_secs(),
                "SEO stage timed out; continuing without SEO metrics"
            );
            BTreeMap::new()
        }
    }

    async fn fetch_seo_batches(&self, domains: &[String]) -> BTreeMap<String, SeoMetrics> {
        let mut metrics = BTreeMap::new();
        let batch_size = self.settings.seo_batch_size.max(1);
        let max_concurrent = self.settings.seo_max_concurrent.max(1);
        let total_batches = domains.len().div_ceil(batch_size);

        for (idx, batch) in domains.chunks(batch_size).enumerate() {
            let fetched: Vec<(&String, Option<SeoMetrics>)> = stream::iter(batch)
                .map(|domain| async move { (domain, self.seo.domain_metrics(domain).await) })
                .buffer_unordered(max_concurrent)
                .collect()
                .await;

            for (domain, result) in fetched {
                match result {
                    Some(m) => {
                        metrics.insert(domain.clone(), m);
                    }
                    None => tracing::debug!(domain = %domain, "no SEO metrics; omitting"),
                }
            }

            tracing::info!(
                batch = idx + 1,
                total_batches,
                fetched = metrics.len(),
                "processed SEO batch"
            );

            if idx + 1 < total_batches {
                tokio::time::sleep(self.settings.seo_batch_delay).await;
            }
        }

        tracing::info!(requested = domains.len(), fetched = metrics.len(), "SEO stage complete");
        metrics
    }
}

fn advance(stage: AnalysisStage, run_id: Uuid) -> AnalysisStage {
    let next = stage.next();
    tracing::debug!(%run_id, from = %stage, to = %next, "analysis stage transition");
    next
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
