//! Section sets and per-paper analysis results.

use serde::{Deserialize, Serialize};

use super::Paper;

/// Marker used for every section when the source text has no sentences
pub const INSUFFICIENT_INFORMATION: &str = "insufficient information";

/// The fixed, ordered set of semantic sections extracted from a paper
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Insights,
    LiteratureReview,
    MethodUsed,
    Contributions,
    Limitations,
    FutureWork,
    ResearchGap,
    Citations,
}

impl SectionKind {
    /// All sections in output order
    pub const ALL: [SectionKind; 8] = [
        SectionKind::Insights,
        SectionKind::LiteratureReview,
        SectionKind::MethodUsed,
        SectionKind::Contributions,
        SectionKind::Limitations,
        SectionKind::FutureWork,
        SectionKind::ResearchGap,
        SectionKind::Citations,
    ];

    /// Stable snake_case key
    pub fn key(&self) -> &'static str {
        match self {
            SectionKind::Insights => "insights",
            SectionKind::LiteratureReview => "literature_review",
            SectionKind::MethodUsed => "method_used",
            SectionKind::Contributions => "contributions",
            SectionKind::Limitations => "limitations",
            SectionKind::FutureWork => "future_work",
            SectionKind::ResearchGap => "research_gap",
            SectionKind::Citations => "citations",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::Insights => "Insights",
            SectionKind::LiteratureReview => "Literature Review",
            SectionKind::MethodUsed => "Method Used",
            SectionKind::Contributions => "Contributions",
            SectionKind::Limitations => "Limitations",
            SectionKind::FutureWork => "Future Work",
            SectionKind::ResearchGap => "Research Gap",
            SectionKind::Citations => "Citations",
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Plain-prose text for each [`SectionKind`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSet {
    pub insights: String,
    pub literature_review: String,
    pub method_used: String,
    pub contributions: String,
    pub limitations: String,
    pub future_work: String,
    pub research_gap: String,
    pub citations: String,
}

impl SectionSet {
    /// A section set where every field holds the same text
    pub fn filled(text: &str) -> Self {
        let mut set = Self::default();
        for kind in SectionKind::ALL {
            set.set(kind, text.to_string());
        }
        set
    }

    /// Borrow the text of one section
    pub fn get(&self, kind: SectionKind) -> &str {
        match kind {
            SectionKind::Insights => &self.insights,
            SectionKind::LiteratureReview => &self.literature_review,
            SectionKind::MethodUsed => &self.method_used,
            SectionKind::Contributions => &self.contributions,
            SectionKind::Limitations => &self.limitations,
            SectionKind::FutureWork => &self.future_work,
            SectionKind::ResearchGap => &self.research_gap,
            SectionKind::Citations => &self.citations,
        }
    }

    /// Replace the text of one section
    pub fn set(&mut self, kind: SectionKind, text: String) {
        let slot = match kind {
            SectionKind::Insights => &mut self.insights,
            SectionKind::LiteratureReview => &mut self.literature_review,
            SectionKind::MethodUsed => &mut self.method_used,
            SectionKind::Contributions => &mut self.contributions,
            SectionKind::Limitations => &mut self.limitations,
            SectionKind::FutureWork => &mut self.future_work,
            SectionKind::ResearchGap => &mut self.research_gap,
            SectionKind::Citations => &mut self.citations,
        };
        *slot = text;
    }

    /// Iterate sections in output order
    pub fn iter(&self) -> impl Iterator<Item = (SectionKind, &str)> + '_ {
        SectionKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

/// One analyzed paper: the paper itself plus its extracted sections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperAnalysis {
    pub paper: Paper,
    pub sections: SectionSet,
}

impl PaperAnalysis {
    pub fn new(paper: Paper, sections: SectionSet) -> Self {
        Self { paper, sections }
    }
}

/// Canonical metadata resolved for an uploaded document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    pub title: String,
    pub year: Option<i32>,
    pub authors: Vec<String>,
    pub venue: String,
    pub paper_url: String,
    pub pdf_url: String,
    pub citation_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_sets_every_section() {
        let set = SectionSet::filled(INSUFFICIENT_INFORMATION);
        assert!(set.iter().all(|(_, text)| text == INSUFFICIENT_INFORMATION));
        assert_eq!(set.iter().count(), 8);
    }

    #[test]
    fn test_get_set_round_trip_per_kind() {
        let mut set = SectionSet::default();
        set.set(SectionKind::FutureWork, "next".to_string());
        assert_eq!(set.future_work, "next");
        assert_eq!(set.get(SectionKind::FutureWork), "next");
        assert_eq!(set.get(SectionKind::Limitations), "");
    }

    #[test]
    fn test_kind_order_and_keys() {
        let keys: Vec<_> = SectionKind::ALL.iter().map(|k| k.key()).collect();
        assert_eq!(
            keys,
            vec![
                "insights",
                "literature_review",
                "method_used",
                "contributions",
                "limitations",
                "future_work",
                "research_gap",
                "citations"
            ]
        );
    }
}
