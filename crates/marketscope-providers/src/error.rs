use thiserror::Error;

/// Errors raised inside the provider clients.
///
/// These never cross the [`crate::provider`] trait boundary: the trait
/// implementations log them and return empty/absent values instead.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {provider}")]
    RateLimited { provider: &'static str },

    #[error("unexpected HTTP status {status} from {provider}")]
    UnexpectedStatus { status: u16, provider: &'static str },

    /// The provider answered with an application-level error message.
    #[error("{provider} API error: {message}")]
    Api {
        provider: &'static str,
        message: String,
    },

    #[error("could not parse {context}: {reason}")]
    Parse { context: String, reason: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
