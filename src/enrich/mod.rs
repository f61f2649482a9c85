//! Canonical metadata lookup for uploaded documents.
//!
//! An uploaded file carries whatever the local text yields: maybe a DOI,
//! maybe a usable title. [`MetadataEnricher`] resolves that against the
//! Semantic Scholar Graph API, first by exact DOI and then by title search
//! with Jaccard re-ranking of the candidates.

use std::collections::HashSet;

use crate::models::EnrichmentRecord;
use crate::sources::{S2Paper, S2SearchResponse, SEMANTIC_API_BASE};
use crate::utils::ResilientFetcher;

/// Fields requested for enrichment lookups
const LOOKUP_FIELDS: &str = "title,year,authors,venue,url,openAccessPdf,citationCount";

/// Candidates considered by a title search
const SEARCH_LIMIT: &str = "5";

/// Words ignored when comparing titles
const TITLE_STOP_WORDS: [&str; 10] = [
    "the", "and", "for", "with", "from", "using", "study", "paper", "approach", "method",
];

/// Resolves DOIs and titles to canonical paper metadata
#[derive(Debug, Clone)]
pub struct MetadataEnricher {
    fetcher: ResilientFetcher,
    base_url: String,
}

impl MetadataEnricher {
    pub fn new(fetcher: ResilientFetcher) -> Self {
        Self {
            fetcher,
            base_url: SEMANTIC_API_BASE.to_string(),
        }
    }

    /// Point lookups at another Graph API root (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Look up metadata by DOI, then by title.
    ///
    /// A DOI hit returns immediately. Without a usable title no search
    /// request is made.
    pub async fn enrich(&self, doi: Option<&str>, title: Option<&str>) -> Option<EnrichmentRecord> {
        if let Some(doi) = doi {
            if let Some(record) = self.lookup_doi(doi).await {
                tracing::debug!("Resolved DOI {} to '{}'", doi, record.title);
                return Some(record);
            }
        }

        let title = normalize_query_title(title.unwrap_or(""));
        if title.is_empty() {
            return None;
        }
        self.search_title(&title).await
    }

    async fn lookup_doi(&self, doi: &str) -> Option<EnrichmentRecord> {
        let doi = clean_doi(doi);
        if doi.is_empty() {
            return None;
        }

        let url = format!("{}/paper/DOI:{}", self.base_url, doi);
        let body = self.fetcher.request(&url, &[("fields", LOOKUP_FIELDS)]).await?;
        let paper: S2Paper = serde_json::from_value(body).ok()?;
        Some(paper.to_enrichment())
    }

    async fn search_title(&self, title: &str) -> Option<EnrichmentRecord> {
        let url = format!("{}/paper/search", self.base_url);
        let params = [
            ("query", title),
            ("limit", SEARCH_LIMIT),
            ("fields", LOOKUP_FIELDS),
        ];
        let body = self.fetcher.request(&url, &params).await?;
        let response: S2SearchResponse = serde_json::from_value(body).ok()?;

        let best = best_title_match(title, &response.data, |p| p.title.as_deref().unwrap_or(""))?;
        tracing::debug!(
            "Title search for '{}' matched '{}'",
            title,
            best.title.as_deref().unwrap_or("")
        );
        Some(best.to_enrichment())
    }
}

/// Trim and lowercase a DOI, dropping trailing punctuation picked up from prose
pub fn clean_doi(doi: &str) -> String {
    doi.trim()
        .to_lowercase()
        .trim_end_matches([')', '.', ',', ';'])
        .to_string()
}

/// Tidy a title before sending it as a search query
pub fn normalize_query_title(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches([' ', '.', ',', ':', ';', '(', ')', '[', ']', '{', '}'])
        .to_string()
}

/// Comparison tokens of a title
pub fn title_tokens(text: &str) -> HashSet<String> {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { ' ' })
        .collect();
    lowered
        .split_whitespace()
        .filter(|t| t.len() > 2 && !TITLE_STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity of two token sets; 0 when either is empty
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Candidate whose title is most similar to `query`.
///
/// Ties go to the earlier candidate. A query with no usable tokens selects
/// the first candidate.
pub fn best_title_match<'a, T, F>(query: &str, candidates: &'a [T], title_of: F) -> Option<&'a T>
where
    F: Fn(&T) -> &str,
{
    let first = candidates.first()?;
    let query_tokens = title_tokens(query);
    if query_tokens.is_empty() {
        return Some(first);
    }

    let mut best = first;
    let mut best_score = jaccard(&query_tokens, &title_tokens(title_of(first)));
    for candidate in &candidates[1..] {
        let score = jaccard(&query_tokens, &title_tokens(title_of(candidate)));
        if score > best_score {
            best = candidate;
            best_score = score;
        }
    }
    Some(best)
}
