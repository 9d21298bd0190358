use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use marketscope_providers::{SearchResult, SeoMetrics};
use serde::Serialize;
use uuid::Uuid;

use crate::ranking::{DomainPerformance, DomainRankingStats};
use crate::summary::{BuyerMetrics, ChartPoint, MarketSummary, TermSummary};

/// Ordered results for one search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermResults {
    pub term: String,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketLocation {
    pub city: String,
    pub state: String,
}

/// Complete output of one market analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct MarketAnalysis {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub market: MarketLocation,
    /// Terms that produced results, in configured order.
    pub search_results: Vec<TermResults>,
    pub seo_metrics: BTreeMap<String, SeoMetrics>,
    pub ibuyer_metrics: BuyerMetrics,
    pub ranking_analysis: Vec<DomainRankingStats>,
    pub domain_performance: Vec<DomainPerformance>,
    pub chart_data: Vec<ChartPoint>,
    pub term_summaries: Vec<TermSummary>,
    pub summary: MarketSummary,
}

/// Stages of a market analysis, strictly in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnalysisStage {
    FetchSearch,
    ExtractDomains,
    FetchSeo,
    Aggregate,
    Summarize,
    Done,
}

impl AnalysisStage {
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::FetchSearch => Self::ExtractDomains,
            Self::ExtractDomains => Self::FetchSeo,
            Self::FetchSeo => Self::Aggregate,
            Self::Aggregate => Self::Summarize,
            Self::Summarize | Self::Done => Self::Done,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FetchSearch => "fetch_search",
            Self::ExtractDomains => "extract_domains",
            Self::FetchSeo => "fetch_seo",
            Self::Aggregate => "aggregate",
            Self::Summarize => "summarize",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
