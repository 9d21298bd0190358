//! Opportunity scoring over a candidate-market table.
//!
//! Scoring runs as a fixed sequence of column passes over the whole set:
//! required-column defaults, usage standardization, per-market metrics,
//! similarity normalization, the weighted composite with a market-size
//! adjustment, tercile categories, and finally tags. Every ratio that could
//! divide by zero has an explicit fallback so no `NaN` reaches the output.

use marketscope_core::{normalize_market_key, CandidateMarket};
use serde::Serialize;

use crate::error::AnalysisError;
use crate::stats::{bounds, impute_mean, mean, min_max, quantile, sigmoid, standardize};
use crate::tags::{assign_tags, MarketTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum OpportunityCategory {
    Low,
    Average,
    High,
}

impl std::fmt::Display for OpportunityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Low => "Low",
            Self::Average => "Average",
            Self::High => "High",
        })
    }
}

/// Usage columns rescaled to zero mean and unit variance across the set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StandardizedUsage {
    pub users_org: f64,
    pub cvr_org: f64,
    pub leads_org: f64,
    pub users_paid: f64,
    pub cvr_paid: f64,
    pub leads_paid: f64,
}

impl StandardizedUsage {
    fn from_row(row: [f64; USAGE_COLUMNS]) -> Self {
        let [users_org, cvr_org, leads_org, users_paid, cvr_paid, leads_paid] = row;
        Self {
            users_org,
            cvr_org,
            leads_org,
            users_paid,
            cvr_paid,
            leads_paid,
        }
    }
}

/// A candidate market with every derived scoring column attached.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredMarket {
    #[serde(flatten)]
    pub market: CandidateMarket,
    pub is_target: bool,
    pub standardized_usage: StandardizedUsage,
    /// Mean deviation of this row's standardized usage from the non-target
    /// baseline.
    pub performance_diff: f64,
    /// Sites per 100 housing units.
    pub network_penetration: f64,
    pub avg_network_penetration: f64,
    pub engagement_diversity: f64,
    pub growth_potential: f64,
    pub performance_efficiency: f64,
    /// In `(0, 1)`; higher means closer to saturation.
    pub saturation_risk: f64,
    /// In `[0, 1]`; higher means more similar to the target.
    pub norm_similarity: f64,
    pub raw_opportunity_score: f64,
    pub normalized_log_housing: f64,
    /// In `[0, 1]` across the set.
    pub opportunity_score: f64,
    pub opportunity_category: OpportunityCategory,
    pub tags: Vec<MarketTag>,
}

/// Scored candidate set, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct OpportunityReport {
    pub target_key: String,
    pub markets: Vec<ScoredMarket>,
}

impl OpportunityReport {
    #[must_use]
    pub fn target(&self) -> Option<&ScoredMarket> {
        self.markets.iter().find(|m| m.is_target)
    }

    /// Markets ordered by descending opportunity score.
    #[must_use]
    pub fn ranked(&self) -> Vec<&ScoredMarket> {
        let mut ranked: Vec<&ScoredMarket> = self.markets.iter().collect();
        ranked.sort_by(|a, b| b.opportunity_score.total_cmp(&a.opportunity_score));
        ranked
    }
}

const USAGE_COLUMNS: usize = 6;

const WEIGHT_SIMILARITY: f64 = 0.3;
const WEIGHT_PERFORMANCE: f64 = 0.2;
const WEIGHT_MARKET: f64 = 0.1;

/// Scores every market in `markets` relative to the market at `target_key`.
///
/// # Errors
///
/// - [`AnalysisError::EmptyCandidateSet`] when `markets` is empty.
/// - [`AnalysisError::TargetNotFound`] when no row matches `target_key`
///   (compared case-insensitively on trimmed `"city, state"`).
pub fn score_markets(
    markets: &[CandidateMarket],
    target_key: &str,
) -> Result<OpportunityReport, AnalysisError> {
    if markets.is_empty() {
        return Err(AnalysisError::EmptyCandidateSet);
    }
    let target_key = normalize_market_key(target_key);
    let target_idx = markets
        .iter()
        .position(|m| m.key() == target_key)
        .ok_or_else(|| AnalysisError::TargetNotFound {
            key: target_key.clone(),
        })?;

    tracing::info!(
        target = %target_key,
        candidates = markets.len(),
        "calculating opportunity scores"
    );

    let sites = required_column(markets, "unique_sites", |m| m.unique_sites);
    let housing = required_column(markets, "housing_units", |m| m.housing_units);
    let users_org = required_column(markets, "users_org", |m| m.users_org);
    let users_paid = required_column(markets, "users_paid", |m| m.users_paid);

    let cvr_org = impute_mean(&column(markets, |m| m.cvr_org));
    let leads_org = impute_mean(&column(markets, |m| m.leads_org));
    let cvr_paid = impute_mean(&column(markets, |m| m.cvr_paid));
    let leads_paid = impute_mean(&column(markets, |m| m.leads_paid));

    let standardized: [Vec<f64>; USAGE_COLUMNS] = [
        standardize(&users_org),
        standardize(&cvr_org),
        standardize(&leads_org),
        standardize(&users_paid),
        standardize(&cvr_paid),
        standardize(&leads_paid),
    ];
    let performance_diff = performance_diff(&standardized, target_idx);

    let penetration: Vec<f64> = sites
        .iter()
        .zip(&housing)
        .map(|(&s, &h)| if h > 0.0 { s / h * 100.0 } else { 0.0 })
        .collect();
    let avg_penetration = mean(&penetration);
    if avg_penetration == 0.0 {
        tracing::warn!("average network penetration is zero; growth potential defaults to 0");
    }

    let log_housing: Vec<f64> = housing.iter().map(|h| h.ln_1p()).collect();
    let normalized_log_housing = min_max(&log_housing).unwrap_or_else(|| {
        tracing::warn!("log housing units are constant across the set; size adjustment is 0");
        vec![0.0; markets.len()]
    });
    let norm_similarity = normalized_similarity(markets);

    let mut scored: Vec<ScoredMarket> = Vec::with_capacity(markets.len());
    for (i, market) in markets.iter().enumerate() {
        let engagement_diversity = sites[i] / (users_org[i] + users_paid[i] + 1.0);
        let growth_potential = if avg_penetration == 0.0 {
            0.0
        } else {
            (avg_penetration - penetration[i]) / avg_penetration
        };
        let performance_efficiency = (leads_org[i] + leads_paid[i]) / (sites[i] + 1.0);
        let saturation_risk = sigmoid(-(sites[i].ln_1p() - log_housing[i]));

        let raw_opportunity_score = WEIGHT_SIMILARITY * norm_similarity[i]
            + WEIGHT_PERFORMANCE * (1.0 - performance_diff[i])
            + WEIGHT_MARKET * penetration[i]
            + WEIGHT_MARKET * engagement_diversity
            + WEIGHT_MARKET * growth_potential
            + WEIGHT_MARKET * performance_efficiency
            + WEIGHT_MARKET * (1.0 - saturation_risk);

        let row: [f64; USAGE_COLUMNS] = std::array::from_fn(|j| standardized[j][i]);

        scored.push(ScoredMarket {
            market: market.clone(),
            is_target: i == target_idx,
            standardized_usage: StandardizedUsage::from_row(row),
            performance_diff: performance_diff[i],
            network_penetration: penetration[i],
            avg_network_penetration: avg_penetration,
            engagement_diversity,
            growth_potential,
            performance_efficiency,
            saturation_risk,
            norm_similarity: norm_similarity[i],
            raw_opportunity_score,
            normalized_log_housing: normalized_log_housing[i],
            opportunity_score: raw_opportunity_score * (1.0 + normalized_log_housing[i]),
            opportunity_category: OpportunityCategory::Average,
            tags: Vec::new(),
        });
    }

    normalize_scores(&mut scored);

    let scores: Vec<f64> = scored.iter().map(|m| m.opportunity_score).collect();
    for (market, category) in scored.iter_mut().zip(tercile_categories(&scores)) {
        market.opportunity_category = category;
    }
    for market in &mut scored {
        market.tags = assign_tags(market);
    }

    tracing::info!(target = %target_key, "opportunity scoring complete");
    Ok(OpportunityReport {
        target_key,
        markets: scored,
    })
}

fn column(
    markets: &[CandidateMarket],
    get: impl Fn(&CandidateMarket) -> Option<f64>,
) -> Vec<Option<f64>> {
    markets.iter().map(get).collect()
}

/// Values for a column the composite cannot do without; gaps become `1.0`.
fn required_column(
    markets: &[CandidateMarket],
    name: &str,
    get: impl Fn(&CandidateMarket) -> Option<f64>,
) -> Vec<f64> {
    let values = column(markets, get);
    let missing = values.iter().filter(|v| v.is_none()).count();
    if missing > 0 {
        tracing::warn!(column = name, missing, "missing values defaulted to 1");
    }
    values.into_iter().map(|v| v.unwrap_or(1.0)).collect()
}

/// Per-row mean of `(z - baseline)` over the standardized usage columns,
/// where `baseline` is each column's mean over the non-target rows.
fn performance_diff(standardized: &[Vec<f64>; USAGE_COLUMNS], target_idx: usize) -> Vec<f64> {
    let baselines: Vec<f64> = standardized
        .iter()
        .map(|col| {
            let others: Vec<f64> = col
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != target_idx)
                .map(|(_, &v)| v)
                .collect();
            mean(&others)
        })
        .collect();

    let rows = standardized[0].len();
    (0..rows)
        .map(|i| {
            let deviations: Vec<f64> = standardized
                .iter()
                .zip(&baselines)
                .map(|(col, baseline)| col[i] - baseline)
                .collect();
            mean(&deviations)
        })
        .collect()
}

/// `1 - minmax(similarity_score)`. Missing or constant similarity yields `1`
/// for every row; a row without a score in an otherwise scored set is
/// treated as the least similar.
fn normalized_similarity(markets: &[CandidateMarket]) -> Vec<f64> {
    let present: Vec<f64> = markets.iter().filter_map(|m| m.similarity_score).collect();
    if present.is_empty() {
        return vec![1.0; markets.len()];
    }
    let Some((lo, hi)) = bounds(&present).filter(|(lo, hi)| hi > lo) else {
        return vec![1.0; markets.len()];
    };
    markets
        .iter()
        .map(|m| m.similarity_score.map_or(0.0, |s| 1.0 - (s - lo) / (hi - lo)))
        .collect()
}

/// Min-max normalizes final scores; identical scores all become `1.0`.
fn normalize_scores(scored: &mut [ScoredMarket]) {
    let scores: Vec<f64> = scored.iter().map(|m| m.opportunity_score).collect();
    match min_max(&scores) {
        Some(normalized) => {
            for (market, score) in scored.iter_mut().zip(normalized) {
                market.opportunity_score = score;
            }
        }
        None => {
            tracing::warn!("all opportunity scores are identical; setting every score to 1");
            for market in scored.iter_mut() {
                market.opportunity_score = 1.0;
            }
        }
    }
}

/// Assigns tercile categories from the quantile edges `[min, q1/3, q2/3, max]`.
///
/// Repeated edges are dropped before binning. Bins are right-closed and the
/// first also holds the minimum. Three surviving bins map to `Low`,
/// `Average`, `High`; two map to `Low`, `High`. When only `[min, max]`
/// survives, rows at the minimum are `Low` and the rest `High`, so ties at
/// either end are labelled the same way. A single distinct score places every
/// row in `Average`.
#[must_use]
pub fn tercile_categories(scores: &[f64]) -> Vec<OpportunityCategory> {
    use OpportunityCategory::{Average, High, Low};

    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);
    let Some((lo, hi)) = bounds(&sorted) else {
        return Vec::new();
    };
    if lo == hi {
        return vec![Average; scores.len()];
    }

    let mut edges = vec![
        lo,
        quantile(&sorted, 1.0 / 3.0),
        quantile(&sorted, 2.0 / 3.0),
        hi,
    ];
    edges.dedup();

    // Upper bound of each bin.
    let mut uppers = edges[1..].to_vec();
    if uppers.len() == 1 {
        uppers.insert(0, lo);
    }
    let labels: &[OpportunityCategory] = if uppers.len() == 3 {
        &[Low, Average, High]
    } else {
        &[Low, High]
    };

    scores
        .iter()
        .map(|&score| {
            let bin = uppers
                .iter()
                .position(|&upper| score <= upper)
                .unwrap_or(uppers.len() - 1);
            labels[bin]
        })
        .collect()
}

#[cfg(test)]
#[path = "opportunity_test.rs"]
mod tests;
