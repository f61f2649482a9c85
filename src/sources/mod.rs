//! Search backends with a small trait-based architecture.
//!
//! Every backend implements [`Source`]. The [`SourceAggregator`] combines a
//! primary and a secondary backend into one candidate list and degrades to
//! the primary alone when the secondary is unreachable.
//!
//! Two production backends are provided:
//!
//! - [`ArxivSource`]: arXiv Atom API
//! - [`SemanticScholarSource`]: Semantic Scholar Graph API paper search
//!
//! [`MockSource`] returns canned responses for tests.

mod aggregator;
mod arxiv;
pub mod mock;
mod semantic;

pub use aggregator::{AggregatorSettings, SourceAggregator};
pub use arxiv::{ArxivSource, ARXIV_API_URL};
pub use mock::MockSource;
pub use semantic::{SemanticScholarSource, SEMANTIC_API_BASE};

pub(crate) use semantic::{S2Paper, S2SearchResponse};

use crate::models::{SearchQuery, SearchResponse};
use async_trait::async_trait;

/// The Source trait defines the interface for all search backends.
///
/// # Implementing a New Source
///
/// 1. Create a new struct that implements `Source`
/// 2. Implement `id`, `name` and `search`
/// 3. Hand it to [`SourceAggregator::new`] as the primary or secondary backend
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "arxiv", "semantic")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Search for papers matching the query
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// Parsing error (XML, JSON)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl SourceError {
    /// Whether the error comes from the network or the remote service
    /// rather than from malformed input or output
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SourceError::Network(_)
                | SourceError::Timeout
                | SourceError::RateLimit
                | SourceError::Api(_)
        )
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(SourceError::Network("refused".to_string()).is_transport());
        assert!(SourceError::Timeout.is_transport());
        assert!(SourceError::RateLimit.is_transport());
        assert!(SourceError::Api("status 500".to_string()).is_transport());
        assert!(!SourceError::Parse("bad feed".to_string()).is_transport());
        assert!(!SourceError::InvalidRequest("empty".to_string()).is_transport());
    }

    #[test]
    fn test_json_error_is_parse() {
        let err: SourceError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
