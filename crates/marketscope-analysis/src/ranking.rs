//! Cross-term rank aggregation.
//!
//! [`RankAggregator`] is fed one term's ordered results at a time and keeps
//! O(1)-per-observation running statistics per domain. [`RankAggregator::finish`]
//! then derives term coverage and visibility once over the completed
//! aggregate.
//!
//! SEO metrics come from a single canonical per-domain map and are attached
//! once, when a domain is first seen, to both outputs.

use std::collections::{BTreeMap, HashMap, HashSet};

use marketscope_core::BuyerClassifier;
use marketscope_providers::{SearchResult, SeoMetrics};
use serde::Serialize;

/// Rank points for a single appearance: rank 1 earns 10, rank 10 earns 1.
const RANK_POINT_CEILING: i64 = 11;

/// Per-domain ranking statistics across all queried terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainRankingStats {
    pub domain: String,
    pub best_rank: u32,
    pub appearances: u32,
    /// Running mean of every rank recorded for the domain.
    pub average_rank: f64,
    /// Terms the domain appeared under, in observation order.
    pub terms: Vec<String>,
    pub authority_score: f64,
    pub backlink_count: u64,
    pub referring_domains: u64,
    pub is_ibuyer: bool,
    /// Latest rank recorded for each term.
    pub positions: BTreeMap<String, u32>,
}

/// Per-domain visibility statistics across all queried terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainPerformance {
    pub domain: String,
    pub total_appearances: u32,
    /// Sum of `11 - rank` over all appearances.
    pub rank_points: i64,
    pub average_position: f64,
    /// `total_appearances / terms_queried`.
    pub term_coverage: f64,
    pub authority_score: f64,
    pub backlink_strength: u64,
    pub visibility_score: f64,
}

/// Finalized aggregate, both outputs in first-seen domain order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankingAnalysis {
    pub terms_queried: usize,
    pub rankings: Vec<DomainRankingStats>,
    pub performance: Vec<DomainPerformance>,
}

impl RankingAnalysis {
    #[must_use]
    pub fn ranking(&self, domain: &str) -> Option<&DomainRankingStats> {
        self.rankings.iter().find(|r| r.domain == domain)
    }

    #[must_use]
    pub fn performance_of(&self, domain: &str) -> Option<&DomainPerformance> {
        self.performance.iter().find(|p| p.domain == domain)
    }
}

#[derive(Debug)]
struct Accumulator {
    ranking: DomainRankingStats,
    rank_points: i64,
}

pub struct RankAggregator<'a> {
    seo_metrics: &'a BTreeMap<String, SeoMetrics>,
    classifier: &'a BuyerClassifier,
    index: HashMap<String, usize>,
    entries: Vec<Accumulator>,
    terms: HashSet<String>,
}

impl<'a> RankAggregator<'a> {
    #[must_use]
    pub fn new(
        seo_metrics: &'a BTreeMap<String, SeoMetrics>,
        classifier: &'a BuyerClassifier,
    ) -> Self {
        Self {
            seo_metrics,
            classifier,
            index: HashMap::new(),
            entries: Vec::new(),
            terms: HashSet::new(),
        }
    }

    /// Records one term's ordered results. Terms with no results do not
    /// count towards coverage.
    pub fn observe_term(&mut self, term: &str, results: &[SearchResult]) {
        if results.is_empty() {
            return;
        }
        self.terms.insert(term.to_string());
        for result in results {
            self.observe(term, result);
        }
    }

    fn observe(&mut self, term: &str, result: &SearchResult) {
        let rank = result.rank;
        let points = RANK_POINT_CEILING - i64::from(rank);

        if let Some(&i) = self.index.get(&result.domain) {
            let acc = &mut self.entries[i];
            let stats = &mut acc.ranking;
            stats.best_rank = stats.best_rank.min(rank);
            stats.appearances += 1;
            let n = f64::from(stats.appearances);
            stats.average_rank = (stats.average_rank * (n - 1.0) + f64::from(rank)) / n;
            stats.terms.push(term.to_string());
            stats.positions.insert(term.to_string(), rank);
            acc.rank_points += points;
            return;
        }

        let metrics = self.seo_metrics.get(&result.domain);
        let ranking = DomainRankingStats {
            domain: result.domain.clone(),
            best_rank: rank,
            appearances: 1,
            average_rank: f64::from(rank),
            terms: vec![term.to_string()],
            authority_score: metrics.map_or(0.0, |m| m.authority_score),
            backlink_count: metrics.map_or(0, |m| m.backlink_count),
            referring_domains: metrics.map_or(0, |m| m.referring_domains),
            is_ibuyer: self.classifier.is_ibuyer(&result.domain),
            positions: BTreeMap::from([(term.to_string(), rank)]),
        };
        self.index.insert(result.domain.clone(), self.entries.len());
        self.entries.push(Accumulator {
            ranking,
            rank_points: points,
        });
    }

    /// Derives coverage and visibility over the completed aggregate.
    #[must_use]
    pub fn finish(self) -> RankingAnalysis {
        let terms_queried = self.terms.len();
        #[allow(clippy::cast_precision_loss)]
        let term_count = terms_queried as f64;

        let performance = self
            .entries
            .iter()
            .map(|acc| {
                let stats = &acc.ranking;
                let appearances = f64::from(stats.appearances);
                let term_coverage = if terms_queried == 0 {
                    0.0
                } else {
                    (appearances / term_count).min(1.0)
                };
                #[allow(clippy::cast_precision_loss)]
                let points_per_appearance = acc.rank_points as f64 / appearances;
                DomainPerformance {
                    domain: stats.domain.clone(),
                    total_appearances: stats.appearances,
                    rank_points: acc.rank_points,
                    average_position: stats.average_rank,
                    term_coverage,
                    authority_score: stats.authority_score,
                    backlink_strength: stats.backlink_count,
                    visibility_score: points_per_appearance
                        * term_coverage
                        * (stats.authority_score / 100.0),
                }
            })
            .collect();

        let rankings = self.entries.into_iter().map(|acc| acc.ranking).collect();

        RankingAnalysis {
            terms_queried,
            rankings,
            performance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(domain: &str, rank: u32) -> SearchResult {
        SearchResult {
            domain: domain.to_string(),
            rank,
            url: format!("https://{domain}/"),
            title: domain.to_string(),
        }
    }

    fn metrics(domain: &str, authority: f64) -> SeoMetrics {
        SeoMetrics {
            domain: domain.to_string(),
            authority_score: authority,
            backlink_count: 1_000,
            referring_domains: 100,
        }
    }

    fn classifier() -> BuyerClassifier {
        BuyerClassifier::new(["opendoor.com", "offerpad.com"])
    }

    #[test]
    fn average_rank_of_three_one_two_is_exactly_two() {
        let seo = BTreeMap::new();
        let classifier = classifier();
        let mut agg = RankAggregator::new(&seo, &classifier);
        agg.observe_term("t1", &[result("a.com", 1), result("b.com", 2), result("d.com", 3)]);
        agg.observe_term("t2", &[result("d.com", 1)]);
        agg.observe_term("t3", &[result("a.com", 1), result("d.com", 2)]);

        let analysis = agg.finish();
        let d = analysis.ranking("d.com").unwrap();
        assert_eq!(d.appearances, 3);
        assert!((d.average_rank - 2.0).abs() < f64::EPSILON);
        assert_eq!(d.best_rank, 1);
        assert_eq!(d.terms, vec!["t1", "t2", "t3"]);
        assert_eq!(d.positions.get("t2"), Some(&1));
        assert_eq!(analysis.performance_of("d.com").unwrap().rank_points, 8 + 10 + 9);
    }

    #[test]
    fn running_mean_matches_full_recompute() {
        let seo = BTreeMap::new();
        let classifier = classifier();
        let mut agg = RankAggregator::new(&seo, &classifier);
        let ranks = [7, 2, 9, 4, 4, 1, 10, 3];
        for (i, &rank) in ranks.iter().enumerate() {
            agg.observe_term(&format!("term {i}"), &[result("d.com", rank)]);
        }
        let analysis = agg.finish();
        let expected = f64::from(ranks.iter().sum::<u32>()) / 8.0;
        let d = analysis.ranking("d.com").unwrap();
        assert!((d.average_rank - expected).abs() < 1e-12);
        let perf = analysis.performance_of("d.com").unwrap();
        assert!((perf.average_position - expected).abs() < 1e-12);
    }

    #[test]
    fn visibility_for_single_top_rank_out_of_three_terms() {
        let seo = BTreeMap::from([("top.com".to_string(), metrics("top.com", 50.0))]);
        let classifier = classifier();
        let mut agg = RankAggregator::new(&seo, &classifier);
        agg.observe_term("t1", &[result("top.com", 1)]);
        agg.observe_term("t2", &[result("other.com", 1)]);
        agg.observe_term("t3", &[result("other.com", 1)]);

        let analysis = agg.finish();
        let perf = analysis.performance_of("top.com").unwrap();
        assert_eq!(analysis.terms_queried, 3);
        assert_eq!(perf.rank_points, 10);
        assert!((perf.term_coverage - 1.0 / 3.0).abs() < 1e-12);
        assert!((perf.visibility_score - 1.667).abs() < 1e-3);
    }

    #[test]
    fn missing_seo_metrics_default_to_zero_not_omitted() {
        let seo = BTreeMap::new();
        let classifier = classifier();
        let mut agg = RankAggregator::new(&seo, &classifier);
        agg.observe_term("t1", &[result("unknown.com", 4)]);

        let analysis = agg.finish();
        let ranking = analysis.ranking("unknown.com").unwrap();
        let perf = analysis.performance_of("unknown.com").unwrap();
        assert_eq!(ranking.authority_score, 0.0);
        assert_eq!(ranking.backlink_count, 0);
        assert_eq!(perf.authority_score, 0.0);
        assert_eq!(perf.backlink_strength, 0);
        assert_eq!(perf.visibility_score, 0.0);
        assert_eq!(perf.rank_points, 7);
    }

    #[test]
    fn empty_terms_do_not_count_towards_coverage() {
        let seo = BTreeMap::new();
        let classifier = classifier();
        let mut agg = RankAggregator::new(&seo, &classifier);
        agg.observe_term("t1", &[result("a.com", 1)]);
        agg.observe_term("t2", &[]);

        let analysis = agg.finish();
        assert_eq!(analysis.terms_queried, 1);
        assert_eq!(analysis.performance_of("a.com").unwrap().term_coverage, 1.0);
    }

    #[test]
    fn nothing_observed_yields_empty_analysis() {
        let seo = BTreeMap::new();
        let classifier = classifier();
        let analysis = RankAggregator::new(&seo, &classifier).finish();
        assert_eq!(analysis.terms_queried, 0);
        assert!(analysis.rankings.is_empty());
        assert!(analysis.performance.is_empty());
    }

    #[test]
    fn buyer_flag_and_first_seen_order() {
        let seo = BTreeMap::new();
        let classifier = classifier();
        let mut agg = RankAggregator::new(&seo, &classifier);
        agg.observe_term("t1", &[result("local.com", 1), result("opendoor.com", 2)]);
        agg.observe_term("t2", &[result("offerpad.com", 1), result("local.com", 2)]);

        let analysis = agg.finish();
        let order: Vec<&str> = analysis.rankings.iter().map(|r| r.domain.as_str()).collect();
        assert_eq!(order, vec!["local.com", "opendoor.com", "offerpad.com"]);
        assert!(!analysis.ranking("local.com").unwrap().is_ibuyer);
        assert!(analysis.ranking("opendoor.com").unwrap().is_ibuyer);
    }
}
