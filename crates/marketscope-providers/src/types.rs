use serde::{Deserialize, Serialize};

/// One organic search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Registrable domain of `url`.
    pub domain: String,
    /// 1-based position in the provider's organic list.
    pub rank: u32,
    pub url: String,
    pub title: String,
}

/// Authority and backlink metrics for one root domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoMetrics {
    pub domain: String,
    /// Authority score on a 0–100 scale.
    pub authority_score: f64,
    pub backlink_count: u64,
    pub referring_domains: u64,
}

/// A localized search request: `"<term> <city>, <state>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub city: String,
    pub state: String,
    /// Country hint (`gl`).
    pub country: String,
    /// Interface language hint (`hl`).
    pub language: String,
    pub num_results: u32,
}

impl SearchQuery {
    /// Builds a query with US/English locale hints and 10 results.
    pub fn new(term: impl Into<String>, city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            city: city.into(),
            state: state.into(),
            country: "us".to_string(),
            language: "en".to_string(),
            num_results: 10,
        }
    }

    #[must_use]
    pub fn location(&self) -> String {
        format!("{}, {}", self.city.trim(), self.state.trim())
    }

    /// Full query text sent to the provider.
    #[must_use]
    pub fn text(&self) -> String {
        format!("{} {}", self.term.trim().to_lowercase(), self.location())
            .trim()
            .to_string()
    }
}
