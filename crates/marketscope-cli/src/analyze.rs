//! `analyze` and `score` command handlers.
//!
//! Both select comparable markets around the target and score them. `analyze`
//! then runs the search/SEO pipeline for the target and fetches SEO metrics
//! for competitor websites listed in the comparable set.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use marketscope_analysis::{
    find_comparable_markets, score_markets, AnalysisSettings, MarketAnalysis, MarketAnalyzer,
    OpportunityReport,
};
use marketscope_core::{
    deduplicate_domains, extract_base_domain, load_markets, market_key, AppConfig, BuyerClassifier,
};
use marketscope_providers::{RetryPolicy, SemrushClient, SeoCache, SeoMetrics, SerperClient};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ScoreOutput {
    target: String,
    radius_miles: f64,
    opportunity: OpportunityReport,
}

#[derive(Debug, Serialize)]
struct AnalyzeOutput {
    target: String,
    radius_miles: f64,
    opportunity: OpportunityReport,
    competitor_seo: BTreeMap<String, SeoMetrics>,
    market_analysis: Option<MarketAnalysis>,
}

fn resolve_radius(config: &AppConfig, radius: Option<f64>) -> anyhow::Result<f64> {
    let radius = radius.unwrap_or(config.default_radius_miles);
    if !radius.is_finite() || radius < 0.0 {
        anyhow::bail!("radius must be a non-negative number of miles, got {radius}");
    }
    Ok(radius)
}

/// Loads the dataset, selects comparables, and scores them.
fn score_comparables(
    config: &AppConfig,
    target: &str,
    radius_miles: f64,
) -> anyhow::Result<OpportunityReport> {
    let dataset = load_markets(&config.markets_path)?;
    let comparables = find_comparable_markets(&dataset, target, radius_miles)?;
    Ok(score_markets(&comparables, target)?)
}

/// Scores comparable markets and prints the report as JSON.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded or the target is not in
/// it.
pub(crate) fn run_score(
    config: &AppConfig,
    city: &str,
    state: &str,
    radius: Option<f64>,
) -> anyhow::Result<()> {
    let radius_miles = resolve_radius(config, radius)?;
    let target = market_key(city, state);
    let opportunity = score_comparables(config, &target, radius_miles)?;

    print_json(&ScoreOutput {
        target,
        radius_miles,
        opportunity,
    })
}

/// Full analysis: comparables, scoring, and unless `skip_search` is set,
/// the search/SEO pipeline plus competitor-website SEO.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded, the target is missing,
/// `SERPER_API_KEY` is unset while search is requested, no search term
/// returns results, or the analysis times out.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    city: &str,
    state: &str,
    radius: Option<f64>,
    skip_search: bool,
) -> anyhow::Result<()> {
    let radius_miles = resolve_radius(config, radius)?;
    let target = market_key(city, state);
    let opportunity = score_comparables(config, &target, radius_miles)?;

    if skip_search {
        tracing::info!(target = %target, "search skipped; reporting scores only");
        return print_json(&AnalyzeOutput {
            target,
            radius_miles,
            opportunity,
            competitor_seo: BTreeMap::new(),
            market_analysis: None,
        });
    }

    let serper_key = config.require_serper_api_key()?;
    let retry = RetryPolicy {
        max_retries: config.max_retries,
        backoff_base_ms: config.retry_backoff_base_ms,
    };

    let search = SerperClient::new(serper_key, config.request_timeout_secs, retry)
        .map_err(|e| anyhow::anyhow!("failed to build Serper client: {e}"))?;

    let seo = match config.semrush_api_key.as_deref() {
        Some(key) => {
            let cache = Arc::new(SeoCache::new(Duration::from_secs(config.seo_cache_ttl_secs)));
            Some(
                SemrushClient::new(key, config.request_timeout_secs, retry, cache)
                    .map_err(|e| anyhow::anyhow!("failed to build SEMrush client: {e}"))?,
            )
        }
        None => {
            tracing::warn!("SEMRUSH_API_KEY is not set; SEO metrics will be empty");
            None
        }
    };

    let analyzer = MarketAnalyzer::new(
        search,
        seo,
        BuyerClassifier::new(config.ibuyer_domains.iter().cloned()),
        AnalysisSettings::from_app_config(config),
    );

    let market_analysis = analyzer.analyze_with_timeout(city, state).await?;

    let websites = competitor_domains(&opportunity);
    tracing::info!(websites = websites.len(), "fetching competitor website SEO metrics");
    let competitor_seo = analyzer.fetch_seo_metrics(&websites).await;

    print_json(&AnalyzeOutput {
        target,
        radius_miles,
        opportunity,
        competitor_seo,
        market_analysis: Some(market_analysis),
    })
}

/// Unique root domains of the competitor websites in the scored set.
fn competitor_domains(report: &OpportunityReport) -> Vec<String> {
    deduplicate_domains(
        report
            .markets
            .iter()
            .filter_map(|m| m.market.website.as_deref())
            .filter_map(extract_base_domain),
    )
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketscope_core::CandidateMarket;

    fn market(city: &str, website: Option<&str>) -> CandidateMarket {
        CandidateMarket {
            city: city.to_string(),
            state: "TX".to_string(),
            unique_sites: Some(10.0),
            housing_units: Some(1_000.0),
            users_org: None,
            users_paid: None,
            cvr_org: None,
            cvr_paid: None,
            leads_org: None,
            leads_paid: None,
            lat: 30.0,
            lng: -97.0,
            similarity_score: None,
            website: website.map(str::to_string),
        }
    }

    #[test]
    fn competitor_domains_are_normalized_and_deduplicated() {
        let markets = vec![
            market("Austin", Some("https://www.austincashbuyers.com/")),
            market("Round Rock", None),
            market("Kyle", Some("austincashbuyers.com/kyle")),
            market("Buda", Some("https://budahomebuyers.com")),
        ];
        let report = score_markets(&markets, "Austin, TX").unwrap();
        assert_eq!(
            competitor_domains(&report),
            vec!["austincashbuyers.com", "budahomebuyers.com"]
        );
    }
}
