//! Semantic Scholar search backend and shared Graph API types.

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{EnrichmentRecord, Paper, PaperBuilder, SearchQuery, SearchResponse, SourceType};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

/// Default Graph API root
pub const SEMANTIC_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";

/// Fields requested by paper search
const SEARCH_FIELDS: &str = "title,abstract,year,authors,venue,url,openAccessPdf,citationCount";

/// Page size ceiling of the search endpoint
const MAX_LIMIT: usize = 100;

/// Semantic Scholar search backend
///
/// Items without a title or an abstract are skipped, since there is
/// nothing to analyze for them.
#[derive(Debug, Clone)]
pub struct SemanticScholarSource {
    client: HttpClient,
    base_url: String,
}

impl SemanticScholarSource {
    /// Create a new Semantic Scholar source
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self::with_client(HttpClient::new()?))
    }

    /// Create with a shared HTTP client (which may carry an API key)
    pub fn with_client(client: HttpClient) -> Self {
        Self {
            client,
            base_url: SEMANTIC_API_BASE.to_string(),
        }
    }

    /// Point the source at another Graph API root (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Convert a search item; `None` when it lacks a title or abstract
    fn parse_paper(data: &S2Paper) -> Option<Paper> {
        let title = data.title.as_deref().map(str::trim).unwrap_or("");
        let abstract_text = data.r#abstract.as_deref().map(str::trim).unwrap_or("");
        if title.is_empty() || abstract_text.is_empty() {
            return None;
        }

        let paper_url = data.url.clone().unwrap_or_default();
        let pdf_url = data
            .open_access_pdf_url()
            .unwrap_or_else(|| paper_url.clone());

        let mut builder = PaperBuilder::new(title, SourceType::SemanticScholar)
            .abstract_text(abstract_text)
            .authors(data.author_names())
            .maybe_year(data.year)
            .paper_url(paper_url)
            .pdf_url(pdf_url)
            .venue(data.venue.clone().unwrap_or_default());
        if let Some(count) = data.citation_count() {
            builder = builder.citation_count(count);
        }
        Some(builder.build())
    }
}

#[async_trait]
impl Source for SemanticScholarSource {
    fn id(&self) -> &str {
        "semantic"
    }

    fn name(&self) -> &str {
        "Semantic Scholar"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        let url = format!(
            "{}/paper/search?query={}&limit={}&fields={}",
            self.base_url,
            urlencoding::encode(&query.query),
            query.max_results.min(MAX_LIMIT),
            SEARCH_FIELDS
        );

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimit);
        }
        if !status.is_success() {
            return Err(SourceError::Api(format!(
                "Semantic Scholar API returned status: {}",
                status
            )));
        }

        let bytes = response.bytes().await?;
        let data: S2SearchResponse = serde_json::from_slice(&bytes)
            .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))?;

        let papers: Vec<Paper> = data.data.iter().filter_map(Self::parse_paper).collect();

        tracing::debug!(
            "Semantic Scholar returned {} usable papers for '{}'",
            papers.len(),
            query.query
        );
        Ok(SearchResponse::new(papers, "Semantic Scholar", &query.query))
    }
}

// ===== Semantic Scholar API Types =====

/// One paper as returned by the Graph API; every field may be missing
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct S2Paper {
    pub title: Option<String>,
    pub r#abstract: Option<String>,
    pub year: Option<i32>,
    #[serde(default)]
    pub authors: Vec<S2Author>,
    pub venue: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "openAccessPdf")]
    pub open_access_pdf: Option<S2OpenAccessPdf>,
    #[serde(rename = "citationCount")]
    pub citation_count: Option<i64>,
}

impl S2Paper {
    pub fn author_names(&self) -> Vec<String> {
        self.authors
            .iter()
            .filter_map(|a| a.name.clone())
            .filter(|n| !n.trim().is_empty())
            .collect()
    }

    pub fn open_access_pdf_url(&self) -> Option<String> {
        self.open_access_pdf
            .as_ref()
            .and_then(|p| p.url.clone())
            .filter(|u| !u.is_empty())
    }

    pub fn citation_count(&self) -> Option<u32> {
        self.citation_count.and_then(|c| u32::try_from(c).ok())
    }

    /// Metadata record used to enrich an uploaded document
    pub fn to_enrichment(&self) -> EnrichmentRecord {
        EnrichmentRecord {
            title: self.title.clone().unwrap_or_default(),
            year: self.year,
            authors: self.author_names(),
            venue: self.venue.clone().unwrap_or_default(),
            paper_url: self.url.clone().unwrap_or_default(),
            pdf_url: self.open_access_pdf_url().unwrap_or_default(),
            citation_count: self.citation_count(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct S2OpenAccessPdf {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct S2Author {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct S2SearchResponse {
    #[serde(default)]
    pub data: Vec<S2Paper>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: serde_json::Value) -> S2Paper {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_paper_full() {
        let data = item(json!({
            "title": " Attention Is All You Need ",
            "abstract": "We propose the Transformer.",
            "year": 2017,
            "authors": [{"name": "Ashish Vaswani"}, {"name": null}, {"name": "Noam Shazeer"}],
            "venue": "NeurIPS",
            "url": "https://www.semanticscholar.org/paper/abc",
            "openAccessPdf": {"url": "https://arxiv.org/pdf/1706.03762"},
            "citationCount": 90000
        }));

        let paper = SemanticScholarSource::parse_paper(&data).unwrap();
        assert_eq!(paper.title, "Attention Is All You Need");
        assert_eq!(paper.authors, vec!["Ashish Vaswani", "Noam Shazeer"]);
        assert_eq!(paper.year, Some(2017));
        assert_eq!(paper.citation_count, Some(90000));
        assert_eq!(paper.pdf_url, "https://arxiv.org/pdf/1706.03762");
        assert_eq!(paper.source, SourceType::SemanticScholar);
    }

    #[test]
    fn test_parse_paper_requires_title_and_abstract() {
        assert!(SemanticScholarSource::parse_paper(&item(json!({"title": "Only title"}))).is_none());
        assert!(SemanticScholarSource::parse_paper(&item(json!({
            "title": "  ",
            "abstract": "text"
        })))
        .is_none());
    }

    #[test]
    fn test_pdf_falls_back_to_paper_url() {
        let data = item(json!({
            "title": "T",
            "abstract": "A.",
            "url": "https://s2/p",
            "openAccessPdf": null
        }));
        let paper = SemanticScholarSource::parse_paper(&data).unwrap();
        assert_eq!(paper.pdf_url, "https://s2/p");
        assert_eq!(paper.citation_count, None);
    }

    #[test]
    fn test_to_enrichment() {
        let record = item(json!({
            "title": "Canonical Title",
            "year": 2020,
            "authors": [{"name": "A. Author"}],
            "citationCount": 12
        }))
        .to_enrichment();
        assert_eq!(record.title, "Canonical Title");
        assert_eq!(record.year, Some(2020));
        assert_eq!(record.authors, vec!["A. Author"]);
        assert_eq!(record.citation_count, Some(12));
        assert_eq!(record.pdf_url, "");
    }
}
