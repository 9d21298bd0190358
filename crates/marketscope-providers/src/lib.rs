//! External search and SEO data providers for marketscope.
//!
//! [`SerperClient`] fetches organic Google rankings per search term and
//! [`SemrushClient`] fetches backlink authority metrics per domain, backed by
//! a TTL [`SeoCache`]. Both implement the provider traits in [`provider`],
//! whose contract is that upstream failures surface as empty or absent
//! values rather than errors.

pub mod cache;
pub mod error;
mod http;
pub mod provider;
pub mod retry;
pub mod semrush;
pub mod serper;
pub mod types;

pub use cache::{CacheEntry, Clock, SeoCache, SystemClock};
pub use error::ProviderError;
pub use provider::{SearchProvider, SeoProvider};
pub use retry::RetryPolicy;
pub use semrush::SemrushClient;
pub use serper::SerperClient;
pub use types::{SearchQuery, SearchResult, SeoMetrics};
