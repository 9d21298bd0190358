//! Comparable-market discovery around a target.
//!
//! Markets within a great-circle radius of the target are kept and given a
//! `similarity_score`: the Euclidean distance to the target in standardized
//! feature space. Lower scores mean more similar markets.

use marketscope_core::{normalize_market_key, CandidateMarket, MarketDataset};

use crate::error::AnalysisError;
use crate::stats::standardize;

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Great-circle distance in miles between two `(lat, lng)` points in degrees.
#[must_use]
pub fn haversine_miles(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * a.sqrt().min(1.0).asin()
}

/// Returns the target and every market within `radius_miles` of it, target
/// first, each carrying a fresh `similarity_score`.
///
/// # Errors
///
/// Returns [`AnalysisError::TargetNotFound`] when `target_key` is not in the
/// dataset.
pub fn find_comparable_markets(
    dataset: &MarketDataset,
    target_key: &str,
    radius_miles: f64,
) -> Result<Vec<CandidateMarket>, AnalysisError> {
    let key = normalize_market_key(target_key);
    let target = dataset
        .get(&key)
        .ok_or_else(|| AnalysisError::TargetNotFound { key: key.clone() })?;

    let mut selected: Vec<CandidateMarket> = vec![target.clone()];
    selected.extend(
        dataset
            .markets()
            .iter()
            .filter(|m| m.key() != key)
            .filter(|m| haversine_miles(target.lat, target.lng, m.lat, m.lng) <= radius_miles)
            .cloned(),
    );

    let features = feature_columns(&selected);
    for (i, market) in selected.iter_mut().enumerate() {
        let distance: f64 = features
            .iter()
            .map(|col| (col[i] - col[0]).powi(2))
            .sum::<f64>()
            .sqrt();
        market.similarity_score = Some(distance);
    }

    tracing::info!(
        target = %key,
        radius_miles,
        comparables = selected.len() - 1,
        "selected comparable markets"
    );
    Ok(selected)
}

/// Standardized `ln(1 + housing)`, `ln(1 + sites)` and total users columns.
fn feature_columns(markets: &[CandidateMarket]) -> [Vec<f64>; 3] {
    let log_housing: Vec<f64> = markets
        .iter()
        .map(|m| m.housing_units.unwrap_or(0.0).ln_1p())
        .collect();
    let log_sites: Vec<f64> = markets
        .iter()
        .map(|m| m.unique_sites.unwrap_or(0.0).ln_1p())
        .collect();
    let users: Vec<f64> = markets
        .iter()
        .map(|m| m.users_org.unwrap_or(0.0) + m.users_paid.unwrap_or(0.0))
        .collect();
    [standardize(&log_housing), standardize(&log_sites), standardize(&users)]
}
