//! Market tags: named predicates evaluated over a scored market row.
//!
//! [`TAG_RULES`] is evaluated in order, so tag lists come out in a stable
//! order. Predicates only read columns that exist before tagging runs.

use serde::Serialize;

use crate::opportunity::ScoredMarket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketTag {
    HighGrowthPotential,
    EfficiencyStar,
    LowPenetration,
    VerySimilar,
}

impl MarketTag {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::HighGrowthPotential => "high_growth_potential",
            Self::EfficiencyStar => "efficiency_star",
            Self::LowPenetration => "low_penetration",
            Self::VerySimilar => "very_similar",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::HighGrowthPotential => "High Growth Potential",
            Self::EfficiencyStar => "Efficiency Star",
            Self::LowPenetration => "Low Penetration",
            Self::VerySimilar => "Very Similar",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::HighGrowthPotential => "Market shows significant room for network expansion",
            Self::EfficiencyStar => "Exceptional lead generation performance",
            Self::LowPenetration => "Limited network presence in the market",
            Self::VerySimilar => "Highly similar to the target market",
        }
    }
}

impl std::fmt::Display for MarketTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

pub struct TagRule {
    pub tag: MarketTag,
    pub applies: fn(&ScoredMarket) -> bool,
}

pub const TAG_RULES: &[TagRule] = &[
    TagRule {
        tag: MarketTag::HighGrowthPotential,
        applies: |m| m.growth_potential > 0.5,
    },
    TagRule {
        tag: MarketTag::EfficiencyStar,
        applies: |m| m.performance_efficiency > 0.8,
    },
    TagRule {
        tag: MarketTag::LowPenetration,
        applies: |m| m.network_penetration < m.avg_network_penetration,
    },
    TagRule {
        tag: MarketTag::VerySimilar,
        applies: |m| m.norm_similarity > 0.5,
    },
];

/// Tags whose predicate holds for `market`, in table order.
#[must_use]
pub fn assign_tags(market: &ScoredMarket) -> Vec<MarketTag> {
    TAG_RULES
        .iter()
        .filter(|rule| (rule.applies)(market))
        .map(|rule| rule.tag)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_serialized_form() {
        for rule in TAG_RULES {
            let json = serde_json::to_string(&rule.tag).unwrap();
            assert_eq!(json, format!("\"{}\"", rule.tag.key()));
        }
    }

    #[test]
    fn every_tag_has_metadata() {
        for rule in TAG_RULES {
            assert!(!rule.tag.name().is_empty());
            assert!(!rule.tag.description().is_empty());
        }
    }
}
