//! Error types for mood analysis providers

use thiserror::Error;

/// Errors from a mood analysis provider.
///
/// These never leave the analysis layer as errors: [`super::MoodAnalyzer`]
/// folds every one of them into the fallback analysis.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Provider returned HTTP {status}: {body}")]
    StatusError { status: u16, body: String },

    #[error("Data format error: {message}")]
    FormatError { message: String },

    #[error("Provider did not answer within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("No API key configured for {provider}")]
    MissingApiKey { provider: String },
}

impl ProviderError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError { message: message.into() }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::FormatError { message: message.into() }
    }

    /// Short stable label, used as a metrics label value.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NetworkError { .. } => "network",
            ProviderError::StatusError { .. } => "status",
            ProviderError::FormatError { .. } => "format",
            ProviderError::Timeout { .. } => "timeout",
            ProviderError::MissingApiKey { .. } => "missing_api_key",
        }
    }
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;
