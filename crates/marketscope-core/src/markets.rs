//! Candidate-market rows and the static dataset they are loaded into.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One row of the candidate-market table.
///
/// Usage statistics are optional: missing values are imputed by the
/// opportunity scorer rather than rejected at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMarket {
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub unique_sites: Option<f64>,
    #[serde(default)]
    pub housing_units: Option<f64>,
    #[serde(default)]
    pub users_org: Option<f64>,
    #[serde(default)]
    pub users_paid: Option<f64>,
    #[serde(default)]
    pub cvr_org: Option<f64>,
    #[serde(default)]
    pub cvr_paid: Option<f64>,
    #[serde(default)]
    pub leads_org: Option<f64>,
    #[serde(default)]
    pub leads_paid: Option<f64>,
    pub lat: f64,
    pub lng: f64,
    /// Distance-like similarity to the current target; lower is more similar.
    #[serde(default)]
    pub similarity_score: Option<f64>,
    /// Competitor website serving this market, if known.
    #[serde(default)]
    pub website: Option<String>,
}

impl CandidateMarket {
    /// Lookup key for this row: lowercase, trimmed `"city, state"`.
    #[must_use]
    pub fn key(&self) -> String {
        market_key(&self.city, &self.state)
    }
}

/// Builds the dataset key for a city/state pair.
#[must_use]
pub fn market_key(city: &str, state: &str) -> String {
    format!("{}, {}", city.trim(), state.trim()).to_lowercase()
}

/// Normalises a caller-supplied `"City, ST"` string into a dataset key.
#[must_use]
pub fn normalize_market_key(raw: &str) -> String {
    match raw.split_once(',') {
        Some((city, state)) => market_key(city, state),
        None => raw.trim().to_lowercase(),
    }
}

/// Static candidate-market table keyed by [`market_key`].
#[derive(Debug, Clone, Default)]
pub struct MarketDataset {
    markets: Vec<CandidateMarket>,
    index: HashMap<String, usize>,
}

impl MarketDataset {
    /// Builds a dataset, rejecting blank names, non-finite coordinates, and
    /// duplicate keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first offending row.
    pub fn from_markets(markets: Vec<CandidateMarket>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(markets.len());

        for (i, market) in markets.iter().enumerate() {
            if market.city.trim().is_empty() || market.state.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "market at position {i} must have a non-empty city and state"
                )));
            }
            if !market.lat.is_finite() || !market.lng.is_finite() {
                return Err(ConfigError::Validation(format!(
                    "market '{}' has non-finite coordinates",
                    market.key()
                )));
            }
            if index.insert(market.key(), i).is_some() {
                return Err(ConfigError::Validation(format!(
                    "duplicate market: '{}'",
                    market.key()
                )));
            }
        }

        Ok(Self { markets, index })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CandidateMarket> {
        self.index
            .get(&normalize_market_key(key))
            .map(|&i| &self.markets[i])
    }

    #[must_use]
    pub fn markets(&self) -> &[CandidateMarket] {
        &self.markets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct MarketsFile {
    markets: Vec<CandidateMarket>,
}

/// Load and validate the candidate-market dataset from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_markets(path: &Path) -> Result<MarketDataset, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::MarketsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: MarketsFile = serde_yaml::from_str(&content)?;
    let dataset = MarketDataset::from_markets(file.markets)?;
    tracing::info!(
        path = %path.display(),
        markets = dataset.len(),
        "loaded candidate markets"
    );
    Ok(dataset)
}
