//! Paper model representing a research paper from any source.

use serde::{Deserialize, Serialize};

/// Earliest publication year accepted on a [`Paper`]
pub const MIN_YEAR: i32 = 1900;

/// Latest publication year accepted on a [`Paper`]
pub const MAX_YEAR: i32 = 2100;

/// Where a paper came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    ArxivSearch,
    SemanticScholar,
    /// Supplied by the user rather than found by a search
    #[default]
    Upload,
}

impl SourceType {
    /// Returns the display name of the source
    pub fn name(&self) -> &'static str {
        match self {
            SourceType::ArxivSearch => "arXiv",
            SourceType::SemanticScholar => "Semantic Scholar",
            SourceType::Upload => "Upload",
        }
    }

    /// Returns the source identifier
    pub fn id(&self) -> &'static str {
        match self {
            SourceType::ArxivSearch => "arxiv",
            SourceType::SemanticScholar => "semantic",
            SourceType::Upload => "upload",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A research paper from any academic source
///
/// Papers are value objects: a pipeline run builds them once and never
/// mutates them afterwards. Two papers are considered the same work when
/// their normalized titles match (see [`crate::utils::normalize_title`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// Paper title
    pub title: String,

    /// Abstract text (may be empty for some sources)
    #[serde(default)]
    pub r#abstract: String,

    /// Authors in publication order
    #[serde(default)]
    pub authors: Vec<String>,

    /// Publication year
    #[serde(default)]
    pub year: Option<i32>,

    /// Source where the paper was found
    #[serde(default)]
    pub source: SourceType,

    /// Paper page URL
    #[serde(default)]
    pub paper_url: String,

    /// Direct PDF URL
    #[serde(default)]
    pub pdf_url: String,

    /// Journal, conference or repository name
    #[serde(default)]
    pub venue: String,

    /// Citation count reported by the source
    #[serde(default)]
    pub citation_count: Option<u32>,
}

impl Paper {
    /// Create a new paper with required fields
    pub fn new(title: String, source: SourceType) -> Self {
        Self {
            title,
            r#abstract: String::new(),
            authors: Vec::new(),
            year: None,
            source,
            paper_url: String::new(),
            pdf_url: String::new(),
            venue: String::new(),
            citation_count: None,
        }
    }

    /// Authors joined for display
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }

    /// Whether the paper has a publication year inside `[start, end]`.
    ///
    /// Missing bounds are open; a paper without a year only passes when
    /// both bounds are missing.
    pub fn year_within(&self, start: Option<i32>, end: Option<i32>) -> bool {
        if start.is_none() && end.is_none() {
            return true;
        }
        match self.year {
            None => false,
            Some(year) => {
                start.map_or(true, |s| year >= s) && end.map_or(true, |e| year <= e)
            }
        }
    }
}

/// Builder for constructing Paper objects
#[derive(Debug, Clone)]
pub struct PaperBuilder {
    paper: Paper,
}

impl PaperBuilder {
    /// Create a new builder with required fields
    pub fn new(title: impl Into<String>, source: SourceType) -> Self {
        Self {
            paper: Paper::new(title.into(), source),
        }
    }

    /// Set abstract
    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.paper.r#abstract = abstract_text.into();
        self
    }

    /// Set authors
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paper.authors = authors
            .into_iter()
            .map(Into::into)
            .filter(|a: &String| !a.trim().is_empty())
            .collect();
        self
    }

    /// Set publication year; years outside 1900-2100 are ignored
    pub fn year(mut self, year: i32) -> Self {
        if (MIN_YEAR..=MAX_YEAR).contains(&year) {
            self.paper.year = Some(year);
        }
        self
    }

    /// Set publication year from an optional value
    pub fn maybe_year(self, year: Option<i32>) -> Self {
        match year {
            Some(y) => self.year(y),
            None => self,
        }
    }

    /// Set paper page URL
    pub fn paper_url(mut self, url: impl Into<String>) -> Self {
        self.paper.paper_url = url.into();
        self
    }

    /// Set PDF URL
    pub fn pdf_url(mut self, url: impl Into<String>) -> Self {
        self.paper.pdf_url = url.into();
        self
    }

    /// Set venue
    pub fn venue(mut self, venue: impl Into<String>) -> Self {
        self.paper.venue = venue.into();
        self
    }

    /// Set citation count
    pub fn citation_count(mut self, count: u32) -> Self {
        self.paper.citation_count = Some(count);
        self
    }

    /// Build the Paper
    pub fn build(self) -> Paper {
        self.paper
    }
}
