//! Error types for the classico debate engine

use thiserror::Error;

/// Result type alias for classico operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the classico debate engine
#[derive(Debug, Error)]
pub enum Error {
    /// Non-retryable fetch failure against an external data source
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Rate-limit retries exhausted against an external data source
    #[error("rate limit exhausted after {attempts} attempts: {endpoint}")]
    RateLimitExhausted {
        /// Endpoint that kept answering 429
        endpoint: String,
        /// Number of attempts made
        attempts: u32,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stats cross-validation failure; recovered via fallback inside the
    /// reconciler, never surfaced to a session
    #[error("stats validation failed: {0}")]
    Validation(String),

    /// Cache read/write failure; logged and degraded to a cache miss
    #[error("cache error: {0}")]
    Cache(String),

    /// Generator failure; the only error fatal to a running session
    #[error("generation error: {0}")]
    Generation(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid session request input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a cache error
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a generation error
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
