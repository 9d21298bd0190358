//! Market scoring and competitive-search analysis for marketscope.
//!
//! Two independent pipelines live here. [`score_markets`] ranks a
//! candidate-market table by opportunity relative to a target, usually on a
//! set chosen by [`find_comparable_markets`]. [`MarketAnalyzer`] runs the
//! search/SEO pipeline for one market and aggregates competitor rankings.

pub mod comparables;
pub mod error;
pub mod opportunity;
pub mod pipeline;
pub mod ranking;
pub mod stats;
pub mod summary;
pub mod tags;
pub mod types;

pub use comparables::{find_comparable_markets, haversine_miles};
pub use error::AnalysisError;
pub use opportunity::{
    score_markets, tercile_categories, OpportunityCategory, OpportunityReport, ScoredMarket,
    StandardizedUsage,
};
pub use pipeline::{AnalysisSettings, MarketAnalyzer};
pub use ranking::{DomainPerformance, DomainRankingStats, RankAggregator, RankingAnalysis};
pub use summary::{BuyerMetrics, ChartPoint, MarketSummary, TermSummary};
pub use tags::{assign_tags, MarketTag, TagRule, TAG_RULES};
pub use types::{AnalysisStage, MarketAnalysis, MarketLocation, TermResults};
