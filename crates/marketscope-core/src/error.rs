use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read markets file {path}: {source}")]
    MarketsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse markets file: {0}")]
    MarketsFileParse(#[from] serde_yaml::Error),

    #[error("markets validation failed: {0}")]
    Validation(String),
}
