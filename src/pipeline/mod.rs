//! End-to-end analysis of a search query or an uploaded document.
//!
//! Query mode: aggregate both backends, filter by year, dedupe, classify
//! every abstract and build the similarity network plus a narrative summary.
//!
//! Upload mode: combine heading extraction with keyword classification,
//! infer missing metadata from the text, then try to enrich it against
//! Semantic Scholar (DOI, then inferred title, then derived titles).
//!
//! Every step runs sequentially within the calling task. Network failures
//! degrade the output; only invalid input returns an error.

pub mod document;
mod summary;

pub use document::{load_document, DocumentError};
pub use summary::{comparison_rows, structured_summary, top_terms, MethodologyRow};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::enrich::{normalize_query_title, MetadataEnricher};
use crate::graph::{GraphSettings, SimilarityGraphBuilder};
use crate::models::{
    EnrichmentRecord, Paper, PaperAnalysis, PaperBuilder, SectionKind, SectionSet,
    SimilarityGraph, SourceType,
};
use crate::sources::{ArxivSource, SemanticScholarSource, SourceAggregator, SourceError};
use crate::text::{
    citation_summary, collapse_whitespace, format_sections, infer, normalize_lines,
    pick_first_non_empty, HeadingSegmenter, SectionClassifier,
};
use crate::utils::{
    dedupe_papers, validate_max_results, validate_query, validate_upload_filename,
    validate_year_range, HttpClient, HttpTransport, ResilientFetcher, ValidationError,
    DEFAULT_USER_AGENT,
};

/// Characters of an upload passed to the keyword classifier
const CLASSIFIER_INPUT_LIMIT: usize = 25_000;

/// Sections that headings may supply; the rest always come from the classifier
const HEADING_SECTIONS: [SectionKind; 5] = [
    SectionKind::LiteratureReview,
    SectionKind::MethodUsed,
    SectionKind::Contributions,
    SectionKind::Limitations,
    SectionKind::FutureWork,
];

const LOCAL_PROVENANCE: &str = "Uploaded document + local analysis";
const ENRICHED_PROVENANCE: &str = "Uploaded document + local analysis + Semantic Scholar enrichment";
const UNMATCHED_CITATION_NOTE: &str = "Citation count unavailable for local upload without metadata match. \
     Upload with DOI/title metadata for better citation retrieval.";

/// Pipeline errors; only malformed input stops an analysis
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Query-mode input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub max_results: usize,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, max_results: usize) -> Self {
        Self {
            query: query.into(),
            max_results,
            start_year: None,
            end_year: None,
        }
    }

    /// Restrict to papers published within `[start, end]`
    pub fn years(mut self, start: Option<i32>, end: Option<i32>) -> Self {
        self.start_year = start;
        self.end_year = end;
        self
    }
}

/// Query-mode output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryReport {
    pub query: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub analyses: Vec<PaperAnalysis>,
    pub graph: SimilarityGraph,
    pub summary: String,
    pub comparison: Vec<MethodologyRow>,
}

/// Metadata supplied by the document reader, if any
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHints {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub year: Option<i32>,
}

/// Upload-mode input: extracted text plus reader hints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadInput {
    pub text: String,
    pub filename: String,
    pub hints: DocumentHints,
}

impl UploadInput {
    pub fn new(text: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            filename: filename.into(),
            hints: DocumentHints::default(),
        }
    }

    pub fn with_hints(mut self, hints: DocumentHints) -> Self {
        self.hints = hints;
        self
    }
}

/// Upload-mode output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReport {
    pub analysis: PaperAnalysis,
    pub filename: String,
    /// How the result was produced (local only, or with enrichment)
    pub provenance: String,
    pub enrichment: Option<EnrichmentRecord>,
}

/// Orchestrates search, classification, enrichment and graph building
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    aggregator: SourceAggregator,
    enricher: MetadataEnricher,
    classifier: SectionClassifier,
    headings: HeadingSegmenter,
    graph: SimilarityGraphBuilder,
    min_results: usize,
    max_results: usize,
}

impl AnalysisPipeline {
    pub fn new(aggregator: SourceAggregator, enricher: MetadataEnricher) -> Self {
        Self {
            aggregator,
            enricher,
            classifier: SectionClassifier::new(),
            headings: HeadingSegmenter::new(),
            graph: SimilarityGraphBuilder::default(),
            min_results: 4,
            max_results: 20,
        }
    }

    /// Production pipeline over arXiv and Semantic Scholar
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let client = HttpClient::with_timeout(
            DEFAULT_USER_AGENT,
            config.api_keys.semantic_scholar.as_deref(),
            config.search.timeout(),
        )?;

        let arxiv = ArxivSource::with_client(client.clone()).with_base_url(&config.search.arxiv_url);
        let semantic = SemanticScholarSource::with_client(client.clone())
            .with_base_url(&config.search.semantic_scholar_url);
        let aggregator = SourceAggregator::new(Arc::new(arxiv), Arc::new(semantic))
            .with_settings(config.search.aggregator_settings());

        let fetcher = ResilientFetcher::new(Arc::new(HttpTransport::new(client)), config.retry.policy());
        let enricher =
            MetadataEnricher::new(fetcher).with_base_url(&config.search.semantic_scholar_url);

        Ok(Self::new(aggregator, enricher)
            .with_graph_settings(config.graph.settings())
            .with_result_limits(config.search.min_results, config.search.max_results))
    }

    pub fn with_graph_settings(mut self, settings: GraphSettings) -> Self {
        self.graph = SimilarityGraphBuilder::new(settings);
        self
    }

    /// Accepted range of `max_results`
    pub fn with_result_limits(mut self, min: usize, max: usize) -> Self {
        self.min_results = min;
        self.max_results = max;
        self
    }

    /// Search, classify and relate papers for a query
    pub async fn analyze_query(&self, request: &QueryRequest) -> Result<QueryReport, PipelineError> {
        let query = validate_query(&request.query)?;
        let max_results =
            validate_max_results(request.max_results, self.min_results, self.max_results)?;
        let (start_year, end_year) = validate_year_range(request.start_year, request.end_year)?;

        let candidates = match self.aggregator.search(&query, max_results).await {
            Ok(papers) => papers,
            Err(err) => {
                tracing::warn!("Search for '{}' failed on every backend: {}", query, err);
                Vec::new()
            }
        };

        let found = candidates.len();
        let mut papers = dedupe_papers(filter_by_year(candidates, start_year, end_year));
        papers.truncate(max_results);
        tracing::info!(
            "Analyzing {} of {} candidate papers for '{}'",
            papers.len(),
            found,
            query
        );

        let graph = self.graph.build(&papers);
        let analyses: Vec<PaperAnalysis> = papers
            .into_iter()
            .map(|paper| {
                let mut sections = self.classifier.classify(&paper.r#abstract);
                sections.citations = citation_narrative(paper.citation_count);
                PaperAnalysis::new(paper, sections)
            })
            .collect();

        let summary = structured_summary(&query, &analyses);
        let comparison = comparison_rows(&analyses);

        Ok(QueryReport {
            query,
            start_year,
            end_year,
            analyses,
            graph,
            summary,
            comparison,
        })
    }

    /// Extract sections and metadata from an uploaded document
    pub async fn analyze_upload(&self, input: &UploadInput) -> Result<UploadReport, PipelineError> {
        validate_upload_filename(&input.filename)?;
        let text = normalize_lines(&input.text);
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyDocument.into());
        }

        let mut sections = format_sections(&self.merge_sections(&text));

        let hints = &input.hints;
        let title = hints
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .or_else(|| infer::infer_title(&text))
            .map(|t| normalize_query_title(&t))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| input.filename.clone());
        let mut authors = if hints.authors.is_empty() {
            infer::infer_authors(&text)
        } else {
            hints.authors.clone()
        };
        let mut year = hints.year.or_else(|| infer::infer_year(&text));
        let doi = infer::infer_doi(&text);

        let enrichment = self
            .enrich_upload(doi.as_deref(), &title, &text, &input.filename)
            .await;

        let mut builder = PaperBuilder::new(title, SourceType::Upload);
        let (provenance, citation_note) = match &enrichment {
            Some(record) => {
                if authors.is_empty() {
                    authors = record.authors.clone();
                }
                if year.is_none() {
                    year = record.year;
                }
                builder = builder
                    .venue(record.venue.clone())
                    .paper_url(record.paper_url.clone())
                    .pdf_url(record.pdf_url.clone());
                if let Some(count) = record.citation_count {
                    builder = builder.citation_count(count);
                }
                let note = match record.citation_count {
                    Some(count) => {
                        format!("Cited by approximately {count} papers (Semantic Scholar).")
                    }
                    None => "Citation count unavailable in metadata.".to_string(),
                };
                (ENRICHED_PROVENANCE, note)
            }
            None => (LOCAL_PROVENANCE, UNMATCHED_CITATION_NOTE.to_string()),
        };

        sections.citations = pick_first_non_empty(Some(sections.citations.as_str()), &citation_note);

        let paper = builder.authors(authors).maybe_year(year).build();
        tracing::info!("Analyzed upload '{}' ({})", input.filename, provenance);

        Ok(UploadReport {
            analysis: PaperAnalysis::new(paper, sections),
            filename: input.filename.clone(),
            provenance: provenance.to_string(),
            enrichment,
        })
    }

    /// Heading sections take precedence over keyword classification
    fn merge_sections(&self, text: &str) -> SectionSet {
        let compact = collapse_whitespace(text);
        let classifier_input = match compact.char_indices().nth(CLASSIFIER_INPUT_LIMIT) {
            Some((idx, _)) => &compact[..idx],
            None => compact.as_str(),
        };
        let base = self.classifier.classify(classifier_input);
        let headings = self.headings.segment(text);

        let mut merged = base.clone();
        for kind in HEADING_SECTIONS {
            merged.set(kind, pick_first_non_empty(headings.get(kind), base.get(kind)));
        }
        merged.citations = citation_summary(text, headings.get(SectionKind::Citations));
        merged
    }

    /// Enrichment passes in order, stopping at the first match.
    ///
    /// The DOI is only tried on the first pass; titles already tried are
    /// skipped.
    async fn enrich_upload(
        &self,
        doi: Option<&str>,
        title: &str,
        text: &str,
        filename: &str,
    ) -> Option<EnrichmentRecord> {
        let candidates = [
            title.to_string(),
            normalize_query_title(&infer::fallback_title(text, filename)),
            normalize_query_title(&infer::filename_title(filename)),
        ];

        let mut tried: Vec<&str> = Vec::new();
        for (pass, candidate) in candidates.iter().enumerate() {
            if tried.contains(&candidate.as_str()) {
                continue;
            }
            tried.push(candidate);

            let pass_doi = if pass == 0 { doi } else { None };
            if let Some(record) = self.enricher.enrich(pass_doi, Some(candidate)).await {
                tracing::debug!("Enrichment pass {} matched '{}'", pass + 1, record.title);
                return Some(record);
            }
        }
        tracing::debug!("No metadata match for upload '{}'", filename);
        None
    }
}

/// Keep papers published within `[start, end]`.
///
/// Papers without a year are dropped only when a bound is given.
pub fn filter_by_year(papers: Vec<Paper>, start: Option<i32>, end: Option<i32>) -> Vec<Paper> {
    papers
        .into_iter()
        .filter(|p| p.year_within(start, end))
        .collect()
}

/// Citation line attached to a searched paper
pub fn citation_narrative(count: Option<u32>) -> String {
    match count {
        Some(count) => format!("Cited by approximately {count} papers (source metadata)."),
        None => "Citation count unavailable in source metadata.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::INSUFFICIENT_INFORMATION;
    use crate::sources::mock::{make_paper, MockFailure};
    use crate::sources::MockSource;
    use crate::utils::{RetryPolicy, Transport, TransportError, TransportResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Fails every request and records the URLs it was asked for
    #[derive(Debug, Default)]
    struct OfflineTransport {
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for OfflineTransport {
        async fn get_json(
            &self,
            url: &str,
            params: &[(&str, &str)],
            _timeout: Duration,
        ) -> Result<TransportResponse, TransportError> {
            let query = params
                .iter()
                .find(|(k, _)| *k == "query")
                .map(|(_, v)| format!("?query={v}"))
                .unwrap_or_default();
            self.urls.lock().unwrap().push(format!("{url}{query}"));
            Ok(TransportResponse::new(404, None))
        }
    }

    fn offline_enricher(transport: Arc<OfflineTransport>) -> MetadataEnricher {
        let policy = RetryPolicy {
            attempts: 1,
            backoff_step: Duration::from_millis(1),
            timeout: Duration::from_secs(1),
        };
        MetadataEnricher::new(ResilientFetcher::new(transport, policy)).with_base_url("http://s2")
    }

    fn pipeline(primary: Vec<Paper>, secondary: Vec<Paper>) -> AnalysisPipeline {
        let aggregator = SourceAggregator::new(
            Arc::new(MockSource::with_papers("a", primary)),
            Arc::new(MockSource::with_papers("b", secondary)),
        );
        AnalysisPipeline::new(aggregator, offline_enricher(Arc::default()))
    }

    fn arxiv(title: &str, year: Option<i32>) -> Paper {
        make_paper(
            title,
            "We propose a graph method. Prior work used rules. However, it is costly.",
            year,
            SourceType::ArxivSearch,
        )
    }

    #[tokio::test]
    async fn test_query_filters_dedupes_and_truncates() {
        let primary = vec![
            arxiv("Deep Learning for X", Some(2021)),
            arxiv("Old Paper", Some(1999)),
            arxiv("Undated Paper", None),
            arxiv("Graph Paper", Some(2022)),
        ];
        let secondary = vec![
            make_paper("deep learning for x!!", "Dup.", Some(2021), SourceType::SemanticScholar),
            make_paper("Extra One", "Text.", Some(2020), SourceType::SemanticScholar),
            make_paper("Extra Two", "Text.", Some(2020), SourceType::SemanticScholar),
            make_paper("Extra Three", "Text.", Some(2020), SourceType::SemanticScholar),
        ];
        let request = QueryRequest::new("graphs", 4).years(Some(2000), Some(2025));

        let report = pipeline(primary, secondary).analyze_query(&request).await.unwrap();
        let titles: Vec<_> = report.analyses.iter().map(|a| a.paper.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Deep Learning for X", "Graph Paper", "Extra One", "Extra Two"]
        );
        assert_eq!(report.graph.node_count(), 4);
        assert!(report.graph.is_connected());
        assert_eq!(report.comparison.len(), 4);
        assert!(report.summary.contains("- **Papers analyzed:** 4"));
    }

    #[tokio::test]
    async fn test_query_sections_and_citations() {
        let paper = PaperBuilder::new("Cited", SourceType::SemanticScholar)
            .abstract_text("We propose a new method. Prior work used heuristic rules.")
            .citation_count(12)
            .build();
        let report = pipeline(Vec::new(), vec![paper, arxiv("Uncited", None)])
            .analyze_query(&QueryRequest::new("q", 4))
            .await
            .unwrap();

        assert_eq!(
            report.analyses[0].sections.citations,
            "Cited by approximately 12 papers (source metadata)."
        );
        assert!(report.analyses[0]
            .sections
            .method_used
            .contains("We propose a new method."));
        assert_eq!(
            report.analyses[1].sections.citations,
            "Citation count unavailable in source metadata."
        );
    }

    #[tokio::test]
    async fn test_query_empty_abstract_is_insufficient() {
        let paper = make_paper("Bare", "", Some(2020), SourceType::ArxivSearch);
        let report = pipeline(vec![paper], Vec::new())
            .analyze_query(&QueryRequest::new("q", 4))
            .await
            .unwrap();
        let sections = &report.analyses[0].sections;
        assert_eq!(sections.method_used, INSUFFICIENT_INFORMATION);
        assert_eq!(sections.citations, "Citation count unavailable in source metadata.");
        assert_eq!(
            report.graph.placeholder.as_deref(),
            Some(crate::graph::SINGLE_PAPER_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_query_validation_errors() {
        let p = pipeline(Vec::new(), Vec::new());
        assert!(matches!(
            p.analyze_query(&QueryRequest::new("  ", 10)).await,
            Err(PipelineError::Validation(ValidationError::EmptyQuery))
        ));
        assert!(matches!(
            p.analyze_query(&QueryRequest::new("q", 50)).await,
            Err(PipelineError::Validation(ValidationError::ResultsOutOfRange { .. }))
        ));
        assert!(matches!(
            p.analyze_query(&QueryRequest::new("q", 10).years(Some(2022), Some(2020)))
                .await,
            Err(PipelineError::Validation(ValidationError::InvertedYearRange { .. }))
        ));
    }

    #[tokio::test]
    async fn test_total_outage_degrades_to_empty_report() {
        let aggregator = SourceAggregator::new(
            Arc::new(MockSource::failing("a", MockFailure::Network)),
            Arc::new(MockSource::failing("b", MockFailure::Network)),
        );
        let p = AnalysisPipeline::new(aggregator, offline_enricher(Arc::default()));
        let report = p.analyze_query(&QueryRequest::new("q", 10)).await.unwrap();
        assert!(report.analyses.is_empty());
        assert_eq!(report.summary, "No structured analysis available.");
        assert_eq!(
            report.graph.placeholder.as_deref(),
            Some(crate::graph::NO_PAPERS_MESSAGE)
        );
    }

    #[test]
    fn test_filter_by_year() {
        let papers = vec![
            arxiv("A", Some(2019)),
            arxiv("B", None),
            arxiv("C", Some(2021)),
        ];
        assert_eq!(filter_by_year(papers.clone(), None, None).len(), 3);
        let kept = filter_by_year(papers.clone(), Some(2020), None);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "C");
        let kept = filter_by_year(papers, None, Some(2020));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "A");
    }

    const UPLOAD: &str = "\
Sparse Retrieval for Long Documents
Jane Doe, John Roe
Published 2021. DOI: 10.1000/sparse.42

Abstract
We propose a hierarchical index for long documents. Prior work indexes passages independently.

2 Related Work
Earlier systems split documents into passages and index them independently of each other.

References
[1] A. Author. Retrieval. 2020.
[2] B. Author. Indexing. 2021.
";

    #[tokio::test]
    async fn test_upload_without_enrichment() {
        let transport = Arc::new(OfflineTransport::default());
        let aggregator = SourceAggregator::new(
            Arc::new(MockSource::new("a")),
            Arc::new(MockSource::new("b")),
        );
        let p = AnalysisPipeline::new(aggregator, offline_enricher(transport.clone()));

        let report = p
            .analyze_upload(&UploadInput::new(UPLOAD, "sparse_retrieval.txt"))
            .await
            .unwrap();

        let paper = &report.analysis.paper;
        assert_eq!(paper.title, "Sparse Retrieval for Long Documents");
        assert_eq!(paper.authors, vec!["Jane Doe", "John Roe"]);
        assert_eq!(paper.year, Some(2021));
        assert_eq!(paper.source, SourceType::Upload);
        assert_eq!(report.provenance, LOCAL_PROVENANCE);
        assert!(report.enrichment.is_none());

        let sections = &report.analysis.sections;
        assert!(sections
            .literature_review
            .starts_with("Earlier systems split documents into passages"));
        assert_eq!(
            sections.citations,
            "References section detected with at least 2 indexed citations."
        );

        // DOI on the first pass, then the two distinct fallback titles
        let urls = transport.urls.lock().unwrap().clone();
        assert_eq!(urls[0], "http://s2/paper/DOI:10.1000/sparse.42");
        assert_eq!(
            urls[1],
            "http://s2/paper/search?query=Sparse Retrieval for Long Documents"
        );
        assert_eq!(urls.last().unwrap(), "http://s2/paper/search?query=sparse retrieval");
        assert_eq!(urls.len(), 3);
    }

    #[tokio::test]
    async fn test_upload_hints_take_precedence() {
        let input = UploadInput::new(UPLOAD, "paper.md").with_hints(DocumentHints {
            title: Some("Given Title From Metadata".to_string()),
            authors: vec!["Meta Author".to_string()],
            year: Some(2019),
        });
        let report = pipeline(Vec::new(), Vec::new())
            .analyze_upload(&input)
            .await
            .unwrap();
        assert_eq!(report.analysis.paper.title, "Given Title From Metadata");
        assert_eq!(report.analysis.paper.authors, vec!["Meta Author"]);
        assert_eq!(report.analysis.paper.year, Some(2019));
    }

    #[tokio::test]
    async fn test_upload_validation() {
        let p = pipeline(Vec::new(), Vec::new());
        assert!(matches!(
            p.analyze_upload(&UploadInput::new("text", "deck.pptx")).await,
            Err(PipelineError::Validation(ValidationError::UnsupportedFormat(_)))
        ));
        assert!(matches!(
            p.analyze_upload(&UploadInput::new(" \n\0 ", "empty.txt")).await,
            Err(PipelineError::Validation(ValidationError::EmptyDocument))
        ));
    }

    #[test]
    fn test_citation_narrative() {
        assert_eq!(
            citation_narrative(Some(3)),
            "Cited by approximately 3 papers (source metadata)."
        );
        assert_eq!(
            citation_narrative(None),
            "Citation count unavailable in source metadata."
        );
    }
}
