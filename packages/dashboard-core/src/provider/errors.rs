use thiserror::Error;

/// Errors that can occur within a [`MarketDataProvider`](super::MarketDataProvider).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure (connection, timeout, TLS).
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with an error status or message.
    #[error("API error: {0}")]
    Api(String),

    /// The provider answered but the payload could not be understood.
    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
