use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The requested target market is not in the candidate dataset.
    #[error("target market not found: {key}")]
    TargetNotFound { key: String },

    /// Every configured search term came back empty.
    #[error("no search results found for {city}, {state}")]
    NoSearchResults { city: String, state: String },

    #[error("candidate market set is empty")]
    EmptyCandidateSet,

    #[error("market analysis timed out after {secs}s")]
    Timeout { secs: u64 },
}
