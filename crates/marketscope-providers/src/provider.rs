//! Provider traits consumed by the market analysis pipeline.
//!
//! Implementations absorb their own failures: a search that errors yields an
//! empty result list and an SEO lookup that errors yields `None`, both logged
//! at the provider boundary.

use std::sync::Arc;

use async_trait::async_trait;

use crate::types::{SearchQuery, SearchResult, SeoMetrics};

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Organic results for `query`, in rank order. Empty on any failure.
    async fn search(&self, query: &SearchQuery) -> Vec<SearchResult>;
}

#[async_trait]
pub trait SeoProvider: Send + Sync {
    /// Metrics for `domain`, or `None` when unknown or unavailable.
    async fn domain_metrics(&self, domain: &str) -> Option<SeoMetrics>;
}

#[async_trait]
impl<T: SearchProvider + ?Sized> SearchProvider for Arc<T> {
    async fn search(&self, query: &SearchQuery) -> Vec<SearchResult> {
        (**self).search(query).await
    }
}

#[async_trait]
impl<T: SeoProvider + ?Sized> SeoProvider for Arc<T> {
    async fn domain_metrics(&self, domain: &str) -> Option<SeoMetrics> {
        (**self).domain_metrics(domain).await
    }
}

/// A missing SEO provider (no API key configured) knows nothing.
#[async_trait]
impl<T: SeoProvider> SeoProvider for Option<T> {
    async fn domain_metrics(&self, domain: &str) -> Option<SeoMetrics> {
        match self {
            Some(provider) => provider.domain_metrics(domain).await,
            None => None,
        }
    }
}
