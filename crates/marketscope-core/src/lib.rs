//! Shared configuration, domain normalisation, and candidate-market data for marketscope.

pub mod app_config;
pub mod config;
pub mod domain;
pub mod error;
pub mod markets;

pub use app_config::AppConfig;
pub use config::{
    load_app_config, load_app_config_from_env, DEFAULT_CHART_TERM, DEFAULT_IBUYER_DOMAINS,
    DEFAULT_SEARCH_TERMS,
};
pub use domain::{deduplicate_domains, extract_base_domain, BuyerClassifier};
pub use error::ConfigError;
pub use markets::{load_markets, market_key, normalize_market_key, CandidateMarket, MarketDataset};
