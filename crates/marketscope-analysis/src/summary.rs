//! Report sections derived from the ranking aggregate: buyer metrics, chart
//! points for the headline term, per-term counts, and the market summary.

use std::collections::BTreeMap;

use marketscope_core::BuyerClassifier;
use marketscope_providers::{SearchResult, SeoMetrics};
use serde::Serialize;

use crate::ranking::{DomainPerformance, DomainRankingStats, RankingAnalysis};
use crate::types::TermResults;

const CHART_LIMIT: usize = 10;
const TOP_PERFORMERS: usize = 5;
const TOP_DOMAINS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuyerMetrics {
    pub count: usize,
    /// Share of unique domains that are known buyers; `0` with no domains.
    pub ratio: f64,
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub position: u32,
    pub domain: String,
    pub authority_score: f64,
    pub backlink_count: u64,
    pub referring_domains: u64,
    pub is_ibuyer: bool,
    pub has_seo_metrics: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermSummary {
    pub term: String,
    pub result_count: usize,
    pub buyer_count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MarketSummary {
    pub total_domains: usize,
    pub total_results: usize,
    pub ibuyer_ratio: f64,
    pub ibuyer_count: usize,
    pub investor_count: usize,
    pub avg_authority_score: f64,
    pub avg_backlinks: f64,
    /// Highest visibility first.
    pub top_performers: Vec<DomainPerformance>,
    /// Best rank first, ties broken by higher authority.
    pub top_domains: Vec<DomainRankingStats>,
}

#[must_use]
pub fn buyer_metrics(unique_domains: &[String], classifier: &BuyerClassifier) -> BuyerMetrics {
    let domains: Vec<String> = unique_domains
        .iter()
        .filter(|d| classifier.is_ibuyer(d))
        .cloned()
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let ratio = if unique_domains.is_empty() {
        0.0
    } else {
        domains.len() as f64 / unique_domains.len() as f64
    };
    BuyerMetrics {
        count: domains.len(),
        ratio,
        domains,
    }
}

/// Top results for the chart term in rank order, annotated with SEO metrics
/// (zeros when none were fetched) and buyer classification.
#[must_use]
pub fn chart_data(
    results: &[SearchResult],
    seo_metrics: &BTreeMap<String, SeoMetrics>,
    classifier: &BuyerClassifier,
) -> Vec<ChartPoint> {
    let mut top: Vec<&SearchResult> = results.iter().collect();
    top.sort_by_key(|r| r.rank);
    top.into_iter()
        .take(CHART_LIMIT)
        .map(|r| {
            let metrics = seo_metrics.get(&r.domain);
            ChartPoint {
                position: r.rank,
                domain: r.domain.clone(),
                authority_score: metrics.map_or(0.0, |m| m.authority_score),
                backlink_count: metrics.map_or(0, |m| m.backlink_count),
                referring_domains: metrics.map_or(0, |m| m.referring_domains),
                is_ibuyer: classifier.is_ibuyer(&r.domain),
                has_seo_metrics: metrics.is_some(),
            }
        })
        .collect()
}

#[must_use]
pub fn term_summaries(
    search_results: &[TermResults],
    classifier: &BuyerClassifier,
) -> Vec<TermSummary> {
    search_results
        .iter()
        .filter(|t| !t.results.is_empty())
        .map(|t| TermSummary {
            term: t.term.clone(),
            result_count: t.results.len(),
            buyer_count: t
                .results
                .iter()
                .filter(|r| classifier.is_ibuyer(&r.domain))
                .count(),
        })
        .collect()
}

#[must_use]
pub fn summarize(
    unique_domains: &[String],
    total_results: usize,
    buyers: &BuyerMetrics,
    seo_metrics: &BTreeMap<String, SeoMetrics>,
    ranking: &RankingAnalysis,
) -> MarketSummary {
    let authority: Vec<f64> = seo_metrics.values().map(|m| m.authority_score).collect();
    #[allow(clippy::cast_precision_loss)]
    let backlinks: Vec<f64> = seo_metrics.values().map(|m| m.backlink_count as f64).collect();

    let mut top_performers = ranking.performance.clone();
    top_performers.sort_by(|a, b| b.visibility_score.total_cmp(&a.visibility_score));
    top_performers.truncate(TOP_PERFORMERS);

    let mut top_domains = ranking.rankings.clone();
    top_domains.sort_by(|a, b| {
        a.best_rank
            .cmp(&b.best_rank)
            .then_with(|| b.authority_score.total_cmp(&a.authority_score))
    });
    top_domains.truncate(TOP_DOMAINS);

    MarketSummary {
        total_domains: unique_domains.len(),
        total_results,
        ibuyer_ratio: buyers.ratio,
        ibuyer_count: buyers.count,
        investor_count: unique_domains.len().saturating_sub(buyers.count),
        avg_authority_score: crate::stats::mean(&authority),
        avg_backlinks: crate::stats::mean(&backlinks),
        top_performers,
        top_domains,
    }
}
