//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::{Paper, PaperBuilder, SearchQuery, SearchResponse, SourceType};
use crate::sources::{Source, SourceError};

/// Canned behavior of a [`MockSource`]
#[derive(Debug, Clone)]
enum MockBehavior {
    Papers(Vec<Paper>),
    Fail(MockFailure),
}

/// Error kinds a [`MockSource`] can be told to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Network,
    RateLimit,
    Parse,
}

impl MockFailure {
    fn to_error(self) -> SourceError {
        match self {
            MockFailure::Network => SourceError::Network("connection refused".to_string()),
            MockFailure::RateLimit => SourceError::RateLimit,
            MockFailure::Parse => SourceError::Parse("malformed response".to_string()),
        }
    }
}

/// A mock source for testing that returns predefined responses.
///
/// Returned papers are truncated to the requested `max_results`, and every
/// call is recorded.
#[derive(Debug)]
pub struct MockSource {
    id: String,
    behavior: Mutex<MockBehavior>,
    calls: AtomicUsize,
    requested: Mutex<Vec<usize>>,
}

impl MockSource {
    /// Create a new mock source returning no papers.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            behavior: Mutex::new(MockBehavior::Papers(Vec::new())),
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock source returning `papers`.
    pub fn with_papers(id: impl Into<String>, papers: Vec<Paper>) -> Self {
        let source = Self::new(id);
        source.set_papers(papers);
        source
    }

    /// Create a mock source that always fails.
    pub fn failing(id: impl Into<String>, failure: MockFailure) -> Self {
        let source = Self::new(id);
        source.set_failure(failure);
        source
    }

    /// Set the papers to return.
    pub fn set_papers(&self, papers: Vec<Paper>) {
        if let Ok(mut guard) = self.behavior.lock() {
            *guard = MockBehavior::Papers(papers);
        }
    }

    /// Make every subsequent search fail.
    pub fn set_failure(&self, failure: MockFailure) {
        if let Ok(mut guard) = self.behavior.lock() {
            *guard = MockBehavior::Fail(failure);
        }
    }

    /// Number of searches issued so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `max_results` of every search, in call order
    pub fn requested_limits(&self) -> Vec<usize> {
        self.requested
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(query.max_results);
        }

        let behavior = self
            .behavior
            .lock()
            .map_err(|_| SourceError::Other("mock state poisoned".to_string()))?
            .clone();

        match behavior {
            MockBehavior::Papers(mut papers) => {
                papers.truncate(query.max_results);
                Ok(SearchResponse::new(papers, self.name(), &query.query))
            }
            MockBehavior::Fail(failure) => Err(failure.to_error()),
        }
    }
}

/// Helper function to create a mock paper for testing.
pub fn make_paper(title: &str, abstract_text: &str, year: Option<i32>, source: SourceType) -> Paper {
    PaperBuilder::new(title, source)
        .abstract_text(abstract_text)
        .maybe_year(year)
        .paper_url(format!("http://example.com/{}", title.replace(' ', "-")))
        .build()
}
