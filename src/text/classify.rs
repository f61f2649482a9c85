//! Keyword-scored section classification of abstracts.
//!
//! Each extractable [`SectionKind`] owns a fixed keyword list. Every sentence
//! is scored by how many distinct keywords it contains (case-insensitive
//! substring match); the best-scoring sentences become the section text.
//! Categories with no matching sentence fall back to positional picks or
//! fixed statements, and two sections (`insights`, `research_gap`) are
//! always synthesized from the others.

use crate::models::{SectionKind, SectionSet, INSUFFICIENT_INFORMATION};

use super::segment::sentences;

/// Keyword table for the five extractable sections
const SECTION_KEYWORDS: [(SectionKind, &[&str]); 5] = [
    (
        SectionKind::LiteratureReview,
        &[
            "related work",
            "previous work",
            "prior work",
            "existing methods",
            "state-of-the-art",
            "literature",
            "baseline",
            "compared",
        ],
    ),
    (
        SectionKind::MethodUsed,
        &[
            "we propose",
            "our approach",
            "method",
            "framework",
            "architecture",
            "algorithm",
            "model",
            "training",
            "dataset",
            "evaluation",
            "experiment",
        ],
    ),
    (
        SectionKind::Contributions,
        &[
            "contribution",
            "we introduce",
            "we present",
            "novel",
            "new",
            "first",
            "outperform",
            "improve",
            "significant",
        ],
    ),
    (
        SectionKind::Limitations,
        &[
            "limitation",
            "however",
            "challenge",
            "constraint",
            "drawback",
            "cannot",
            "fails",
            "costly",
            "expensive",
            "still difficult",
        ],
    ),
    (
        SectionKind::FutureWork,
        &[
            "future work",
            "in future",
            "further work",
            "next step",
            "can be extended",
            "promising direction",
        ],
    ),
];

/// Statement used when no sentence mentions a limitation
pub const LIMITATIONS_NOT_EXPLICIT: &str = "Not explicitly stated in the abstract; practical constraints and edge-case behavior require deeper full-text review.";

/// Placeholder used when no sentence mentions future work
pub const FUTURE_WORK_NOT_STATED: &str = "Not explicitly stated in abstract.";

/// Keywords registered for a section; empty for derived sections
pub fn keywords(kind: SectionKind) -> &'static [&'static str] {
    SECTION_KEYWORDS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, words)| *words)
        .unwrap_or(&[])
}

/// Number of distinct keywords of `kind` present in `sentence`
pub fn score_sentence(sentence: &str, kind: SectionKind) -> usize {
    let lower = sentence.to_lowercase();
    keywords(kind).iter().filter(|kw| lower.contains(*kw)).count()
}

/// Keyword-based classifier mapping free text to a [`SectionSet`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionClassifier;

impl SectionClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify an abstract (or any plain text) into sections.
    ///
    /// The `citations` field is left empty; callers attach a citation
    /// narrative from metadata. Text without sentences yields a set where
    /// every field is [`INSUFFICIENT_INFORMATION`].
    pub fn classify(&self, text: &str) -> SectionSet {
        let sentences: Vec<&str> = sentences(text).collect();
        if sentences.is_empty() {
            return SectionSet::filled(INSUFFICIENT_INFORMATION);
        }

        let literature_review = extract_section(&sentences, SectionKind::LiteratureReview);
        let method_used = extract_section(&sentences, SectionKind::MethodUsed);
        let contributions = extract_section(&sentences, SectionKind::Contributions);
        let limitations = extract_section(&sentences, SectionKind::Limitations);
        let mut future_work = extract_section(&sentences, SectionKind::FutureWork);

        let insights = build_insights(&sentences, &method_used, &contributions);

        if future_work == FUTURE_WORK_NOT_STATED {
            future_work = derive_future_work(&limitations);
        }

        let research_gap = derive_research_gap(&literature_review, &limitations, &future_work);

        SectionSet {
            insights,
            literature_review,
            method_used,
            contributions,
            limitations,
            future_work,
            research_gap,
            citations: String::new(),
        }
    }
}

/// Number of sentences kept for a section
fn top_k(kind: SectionKind) -> usize {
    match kind {
        SectionKind::MethodUsed => 3,
        _ => 2,
    }
}

fn extract_section(sentences: &[&str], kind: SectionKind) -> String {
    let mut scored: Vec<(usize, &str)> = sentences
        .iter()
        .map(|s| (score_sentence(s, kind), *s))
        .filter(|(score, _)| *score > 0)
        .collect();

    if !scored.is_empty() {
        // stable sort keeps original order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        return scored
            .iter()
            .take(top_k(kind))
            .map(|(_, s)| *s)
            .collect::<Vec<_>>()
            .join(" ");
    }

    fallback(sentences, kind)
}

fn fallback(sentences: &[&str], kind: SectionKind) -> String {
    match kind {
        SectionKind::MethodUsed => leading(sentences, 2),
        SectionKind::Contributions => sentences.last().copied().unwrap_or_default().to_string(),
        SectionKind::Limitations => LIMITATIONS_NOT_EXPLICIT.to_string(),
        SectionKind::FutureWork => FUTURE_WORK_NOT_STATED.to_string(),
        _ => sentences.first().copied().unwrap_or_default().to_string(),
    }
}

fn leading(sentences: &[&str], n: usize) -> String {
    sentences
        .iter()
        .take(n)
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_insights(sentences: &[&str], method_used: &str, contributions: &str) -> String {
    let core = leading(sentences, 2);
    format!(
        "This paper focuses on a concrete problem setting and proposes a targeted strategy. \
         Core context: {core} Technical direction: {method_used} Main outcome: {contributions}"
    )
}

fn derive_future_work(limitations: &str) -> String {
    format!(
        "Inferred future direction from limitations: extend evaluation across more diverse datasets, \
         improve robustness in edge cases, and optimize efficiency for real-world deployment. \
         Key limitation context: {limitations}"
    )
}

fn derive_research_gap(literature_review: &str, limitations: &str, future_work: &str) -> String {
    format!(
        "Current work indicates a gap between benchmark performance and reliable deployment in real settings. \
         More standardized evaluation protocols, transparent failure analysis, and cross-domain generalization studies are needed. \
         Evidence from related-work context: {literature_review} \
         Observed constraints: {limitations} \
         Forward direction: {future_work}"
    )
}
