use std::sync::Arc;
use std::time::Duration;

use marketscope_core::AppConfig;
use marketscope_providers::{RetryPolicy, SemrushClient, SeoCache};

/// Fetch SEO metrics for a single domain and print them as JSON.
///
/// Unlike the analysis pipeline, provider errors are reported rather than
/// swallowed, since there is nothing to degrade to.
///
/// # Errors
///
/// Returns an error if `SEMRUSH_API_KEY` is unset, the client cannot be
/// built, or the lookup fails.
pub(crate) async fn run_seo(config: &AppConfig, domain: &str) -> anyhow::Result<()> {
    let api_key = config.require_semrush_api_key()?;

    let retry = RetryPolicy {
        max_retries: config.max_retries,
        backoff_base_ms: config.retry_backoff_base_ms,
    };
    let cache = Arc::new(SeoCache::new(Duration::from_secs(config.seo_cache_ttl_secs)));
    let client = SemrushClient::new(api_key, config.request_timeout_secs, retry, cache)
        .map_err(|e| anyhow::anyhow!("failed to build SEMrush client: {e}"))?;

    match client.fetch_metrics(domain).await? {
        Some(metrics) => println!("{}", serde_json::to_string_pretty(&metrics)?),
        None => {
            tracing::info!(domain, "SEMrush has no data for domain");
            println!("null");
        }
    }
    Ok(())
}
