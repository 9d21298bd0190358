use super::*;

fn market(city: &str, state: &str, sites: f64, housing: f64) -> CandidateMarket {
    CandidateMarket {
        city: city.to_string(),
        state: state.to_string(),
        unique_sites: Some(sites),
        housing_units: Some(housing),
        users_org: Some(200.0),
        users_paid: Some(50.0),
        cvr_org: Some(0.05),
        cvr_paid: Some(0.03),
        leads_org: Some(10.0),
        leads_paid: Some(4.0),
        lat: 30.27,
        lng: -97.74,
        similarity_score: None,
        website: None,
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn by_city<'a>(report: &'a OpportunityReport, city: &str) -> &'a ScoredMarket {
    report
        .markets
        .iter()
        .find(|m| m.market.city == city)
        .expect("market should be in report")
}

#[test]
fn penetration_and_growth_follow_worked_example() {
    let markets = vec![
        market("Austin", "TX", 100.0, 10_000.0),
        market("Round Rock", "TX", 50.0, 20_000.0),
    ];
    let report = score_markets(&markets, "Austin, TX").unwrap();

    let austin = by_city(&report, "Austin");
    let round_rock = by_city(&report, "Round Rock");

    assert!(austin.is_target);
    assert!(approx(austin.network_penetration, 1.0));
    assert!(approx(round_rock.network_penetration, 0.25));
    assert!(approx(austin.avg_network_penetration, 0.625));
    assert!(approx(austin.growth_potential, -0.6));
    assert!(approx(round_rock.growth_potential, 0.6));

    assert!(round_rock.tags.contains(&MarketTag::HighGrowthPotential));
    assert!(round_rock.tags.contains(&MarketTag::LowPenetration));
    assert!(!austin.tags.contains(&MarketTag::HighGrowthPotential));
    assert!(!austin.tags.contains(&MarketTag::LowPenetration));
}

#[test]
fn target_lookup_is_case_and_whitespace_insensitive() {
    let markets = vec![market("Austin", "TX", 100.0, 10_000.0)];
    let report = score_markets(&markets, "  austin ,  tx ").unwrap();
    assert_eq!(report.target_key, "austin, tx");
    assert!(report.target().is_some());
}

#[test]
fn missing_target_is_distinct_error() {
    let markets = vec![market("Austin", "TX", 100.0, 10_000.0)];
    let err = score_markets(&markets, "Dallas, TX").unwrap_err();
    assert!(matches!(err, AnalysisError::TargetNotFound { ref key } if key == "dallas, tx"));
}

#[test]
fn empty_candidate_set_is_rejected() {
    let err = score_markets(&[], "Austin, TX").unwrap_err();
    assert!(matches!(err, AnalysisError::EmptyCandidateSet));
}

#[test]
fn scores_are_normalized_and_categories_monotonic() {
    let markets = vec![
        market("Austin", "TX", 100.0, 10_000.0),
        market("Round Rock", "TX", 50.0, 20_000.0),
        market("Georgetown", "TX", 10.0, 30_000.0),
        market("San Marcos", "TX", 80.0, 5_000.0),
        market("Kyle", "TX", 5.0, 15_000.0),
        market("Pflugerville", "TX", 30.0, 25_000.0),
    ];
    let report = score_markets(&markets, "Austin, TX").unwrap();

    let scores: Vec<f64> = report.markets.iter().map(|m| m.opportunity_score).collect();
    assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
    assert!(scores.iter().any(|&s| approx(s, 0.0)));
    assert!(scores.iter().any(|&s| approx(s, 1.0)));

    let ranked = report.ranked();
    for pair in ranked.windows(2) {
        assert!(pair[0].opportunity_score >= pair[1].opportunity_score);
        assert!(pair[0].opportunity_category >= pair[1].opportunity_category);
    }
    assert_eq!(ranked[0].opportunity_category, OpportunityCategory::High);
    assert_eq!(
        ranked.last().unwrap().opportunity_category,
        OpportunityCategory::Low
    );
}

#[test]
fn identical_markets_fall_back_to_constant_score() {
    let markets = vec![
        market("Austin", "TX", 100.0, 10_000.0),
        market("Austin Twin", "TX", 100.0, 10_000.0),
        market("Austin Triplet", "TX", 100.0, 10_000.0),
    ];
    let report = score_markets(&markets, "Austin, TX").unwrap();

    for m in &report.markets {
        assert!(approx(m.opportunity_score, 1.0));
        assert_eq!(m.opportunity_category, OpportunityCategory::Average);
        assert!(approx(m.normalized_log_housing, 0.0));
        assert!(m.raw_opportunity_score.is_finite());
    }
}

#[test]
fn missing_required_columns_default_to_one() {
    let mut sparse = market("Round Rock", "TX", 50.0, 20_000.0);
    sparse.unique_sites = None;
    sparse.users_paid = None;
    sparse.leads_org = None;
    let markets = vec![market("Austin", "TX", 100.0, 10_000.0), sparse];

    let report = score_markets(&markets, "Austin, TX").unwrap();
    let round_rock = by_city(&report, "Round Rock");

    assert!(approx(round_rock.network_penetration, 1.0 / 20_000.0 * 100.0));
    assert!(approx(round_rock.engagement_diversity, 1.0 / (200.0 + 1.0 + 1.0)));
    // leads_org imputed with the column mean (10.0)
    assert!(approx(round_rock.performance_efficiency, 14.0 / 2.0));
    for m in &report.markets {
        assert!(m.opportunity_score.is_finite());
        assert!(m.performance_diff.is_finite());
    }
}

#[test]
fn zero_housing_does_not_produce_nan() {
    let markets = vec![
        market("Austin", "TX", 100.0, 10_000.0),
        market("Ghost Town", "TX", 0.0, 0.0),
    ];
    let report = score_markets(&markets, "Austin, TX").unwrap();
    let ghost = by_city(&report, "Ghost Town");
    assert!(approx(ghost.network_penetration, 0.0));
    assert!(report.markets.iter().all(|m| m.opportunity_score.is_finite()));
}

#[test]
fn performance_diff_is_centred_on_non_target_rows() {
    let mut markets = vec![
        market("Austin", "TX", 100.0, 10_000.0),
        market("Round Rock", "TX", 50.0, 20_000.0),
        market("Georgetown", "TX", 10.0, 30_000.0),
    ];
    markets[0].users_org = Some(900.0);
    markets[0].cvr_org = Some(0.2);
    markets[1].leads_paid = Some(12.0);

    let report = score_markets(&markets, "Austin, TX").unwrap();
    let non_target: Vec<f64> = report
        .markets
        .iter()
        .filter(|m| !m.is_target)
        .map(|m| m.performance_diff)
        .collect();
    assert!(approx(mean(&non_target), 0.0));
    assert!(report.target().unwrap().performance_diff > 0.0);
}

#[test]
fn lower_similarity_distance_maps_to_higher_norm_similarity() {
    let mut markets = vec![
        market("Austin", "TX", 100.0, 10_000.0),
        market("Round Rock", "TX", 50.0, 20_000.0),
        market("Georgetown", "TX", 10.0, 30_000.0),
    ];
    markets[0].similarity_score = Some(0.0);
    markets[1].similarity_score = Some(1.0);
    markets[2].similarity_score = Some(4.0);

    let report = score_markets(&markets, "Austin, TX").unwrap();
    assert!(approx(by_city(&report, "Austin").norm_similarity, 1.0));
    assert!(approx(by_city(&report, "Round Rock").norm_similarity, 0.75));
    assert!(approx(by_city(&report, "Georgetown").norm_similarity, 0.0));
    assert!(by_city(&report, "Round Rock")
        .tags
        .contains(&MarketTag::VerySimilar));
    assert!(!by_city(&report, "Georgetown")
        .tags
        .contains(&MarketTag::VerySimilar));
}

#[test]
fn absent_or_constant_similarity_is_fully_similar() {
    let markets = vec![
        market("Austin", "TX", 100.0, 10_000.0),
        market("Round Rock", "TX", 50.0, 20_000.0),
    ];
    let report = score_markets(&markets, "Austin, TX").unwrap();
    assert!(report.markets.iter().all(|m| approx(m.norm_similarity, 1.0)));

    let mut constant = markets.clone();
    for m in &mut constant {
        m.similarity_score = Some(2.5);
    }
    let report = score_markets(&constant, "Austin, TX").unwrap();
    assert!(report.markets.iter().all(|m| approx(m.norm_similarity, 1.0)));
}

#[test]
fn terciles_split_evenly_spread_scores() {
    let categories = tercile_categories(&[0.0, 0.5, 1.0]);
    assert_eq!(
        categories,
        vec![
            OpportunityCategory::Low,
            OpportunityCategory::Average,
            OpportunityCategory::High
        ]
    );
}

#[test]
fn terciles_drop_collapsed_edges() {
    let categories = tercile_categories(&[0.0, 0.0, 0.0, 1.0]);
    assert_eq!(
        categories,
        vec![
            OpportunityCategory::Low,
            OpportunityCategory::Low,
            OpportunityCategory::Low,
            OpportunityCategory::High
        ]
    );
}

#[test]
fn terciles_label_tied_top_scores_high() {
    let categories = tercile_categories(&[0.0, 1.0, 1.0, 1.0]);
    assert_eq!(
        categories,
        vec![
            OpportunityCategory::Low,
            OpportunityCategory::High,
            OpportunityCategory::High,
            OpportunityCategory::High
        ]
    );
}

#[test]
fn terciles_with_two_surviving_bins_use_low_and_high() {
    assert_eq!(
        tercile_categories(&[0.0, 0.0, 1.0, 2.0]),
        vec![
            OpportunityCategory::Low,
            OpportunityCategory::Low,
            OpportunityCategory::Low,
            OpportunityCategory::High
        ]
    );
    assert_eq!(
        tercile_categories(&[0.0, 1.0, 2.0, 2.0]),
        vec![
            OpportunityCategory::Low,
            OpportunityCategory::Low,
            OpportunityCategory::High,
            OpportunityCategory::High
        ]
    );
}

#[test]
fn maximum_score_is_never_low_when_scores_differ() {
    let sets: [&[f64]; 5] = [
        &[0.0, 1.0, 1.0, 1.0],
        &[0.0, 0.0, 0.0, 1.0],
        &[0.0, 0.0, 1.0, 1.0],
        &[0.0, 0.2, 0.2, 0.2, 1.0],
        &[0.0, 0.4, 0.5, 0.9, 1.0, 1.0],
    ];
    for scores in sets {
        let categories = tercile_categories(scores);
        for (score, category) in scores.iter().zip(&categories) {
            if (score - 1.0).abs() < f64::EPSILON {
                assert_eq!(*category, OpportunityCategory::High, "scores: {scores:?}");
            }
        }
        let mut pairs: Vec<_> = scores.iter().zip(&categories).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(b.0));
        assert!(pairs.windows(2).all(|w| w[0].1 <= w[1].1), "scores: {scores:?}");
    }
}

#[test]
fn terciles_of_constant_scores_do_not_panic() {
    let categories = tercile_categories(&[1.0, 1.0, 1.0]);
    assert!(categories
        .iter()
        .all(|c| *c == OpportunityCategory::Average));
    assert!(tercile_categories(&[]).is_empty());
}
