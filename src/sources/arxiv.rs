//! arXiv search backend.

use async_trait::async_trait;
use chrono::Datelike;
use feed_rs::parser;

use crate::models::{Paper, PaperBuilder, SearchQuery, SearchResponse, SourceType};
use crate::sources::{Source, SourceError};
use crate::text::collapse_whitespace;
use crate::utils::HttpClient;

/// Base URL for arXiv API
pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// arXiv search backend
///
/// Results are ranked by relevance. Every paper gets venue "arXiv" and a
/// PDF link (falling back to the entry page when the feed has none).
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: HttpClient,
    base_url: String,
}

impl ArxivSource {
    /// Create a new arXiv source
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self::with_client(HttpClient::new()?))
    }

    /// Create with a shared HTTP client
    pub fn with_client(client: HttpClient) -> Self {
        Self {
            client,
            base_url: ARXIV_API_URL.to_string(),
        }
    }

    /// Point the source at another endpoint (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build search query for arXiv API
    fn build_search_query(query: &SearchQuery) -> String {
        let terms = query.query.trim();
        if terms.is_empty() {
            "all:*".to_string()
        } else {
            format!("all:{}", terms)
        }
    }

    /// Parse an Atom feed body into papers
    fn parse_feed(bytes: &[u8]) -> Result<Vec<Paper>, SourceError> {
        let feed = parser::parse(bytes)
            .map_err(|e| SourceError::Parse(format!("Failed to parse Atom feed: {}", e)))?;
        Ok(feed.entries.iter().filter_map(Self::parse_entry).collect())
    }

    /// Parse arXiv Atom feed entry into Paper
    fn parse_entry(entry: &feed_rs::model::Entry) -> Option<Paper> {
        let title = entry
            .title
            .as_ref()
            .map(|t| collapse_whitespace(&t.content))
            .filter(|t| !t.is_empty())?;

        let abstract_text = entry
            .summary
            .as_ref()
            .map(|s| s.content.trim())
            .unwrap_or("");

        let entry_url = entry.id.clone();
        let pdf_url = entry
            .links
            .iter()
            .find(|l| {
                l.title.as_deref() == Some("pdf")
                    || l.media_type.as_deref() == Some("application/pdf")
            })
            .map(|l| l.href.clone())
            .unwrap_or_else(|| entry_url.clone());

        Some(
            PaperBuilder::new(title, SourceType::ArxivSearch)
                .authors(entry.authors.iter().map(|a| a.name.clone()))
                .abstract_text(abstract_text)
                .maybe_year(entry.published.map(|d| d.year()))
                .paper_url(entry_url)
                .pdf_url(pdf_url)
                .venue("arXiv")
                .build(),
        )
    }
}

#[async_trait]
impl Source for ArxivSource {
    fn id(&self) -> &str {
        "arxiv"
    }

    fn name(&self) -> &str {
        "arXiv"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        let search_query = Self::build_search_query(query);
        let url = format!(
            "{}?search_query={}&start=0&max_results={}&sortBy=relevance&sortOrder=descending",
            self.base_url,
            urlencoding::encode(&search_query),
            query.max_results
        );

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/atom+xml")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimit);
        }
        if !status.is_success() {
            return Err(SourceError::Api(format!(
                "arXiv API returned status: {}",
                status
            )));
        }

        let bytes = response.bytes().await?;
        let mut papers = Self::parse_feed(bytes.as_ref())?;
        papers.truncate(query.max_results);

        tracing::debug!("arXiv returned {} papers for '{}'", papers.len(), query.query);
        Ok(SearchResponse::new(papers, "arXiv", &query.query))
    }
}
