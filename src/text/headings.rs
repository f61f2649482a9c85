//! Heading-based section extraction for full documents.
//!
//! Uploaded papers usually carry explicit headings ("2 Related Work",
//! "Methodology:", "References"). The segmenter finds the first line that
//! looks like a known heading for each category and collects the body that
//! follows it.

use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::models::SectionKind;

use super::segment::lines;

/// Body text is cut once the joined lines grow past this many chars
const COLLECT_LIMIT: usize = 2600;

/// Maximum chars kept per extracted section
const SECTION_LIMIT: usize = 2200;

/// A heading-shaped line only ends a section after this many body lines
const MIN_BODY_LINES: usize = 5;

const HEADING_PATTERNS: [(SectionKind, &str); 6] = [
    (
        SectionKind::LiteratureReview,
        r"related works?|literature review|background",
    ),
    (
        SectionKind::MethodUsed,
        r"methods?|methodology|approach|framework|experimental setup",
    ),
    (SectionKind::Contributions, r"contributions?|main contributions?"),
    (
        SectionKind::Limitations,
        r"limitations?|threats to validity|discussion",
    ),
    (
        SectionKind::FutureWork,
        r"future work|conclusions? and future work",
    ),
    (SectionKind::Citations, r"references|bibliography"),
];

fn heading_matchers() -> &'static [(SectionKind, Regex)] {
    static MATCHERS: OnceLock<Vec<(SectionKind, Regex)>> = OnceLock::new();
    MATCHERS.get_or_init(|| {
        HEADING_PATTERNS
            .iter()
            .map(|(kind, pattern)| {
                let re = Regex::new(&format!(r"(?i)^(?:{pattern})\s*[:\-]?$"))
                    .expect("valid heading pattern");
                (*kind, re)
            })
            .collect()
    })
}

fn numeric_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.\d+)*\.?\s*").expect("valid regex"))
}

fn heading_like() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+(\.\d+)*)?\s*[A-Z][A-Za-z0-9\s\-]{2,50}$").expect("valid regex")
    })
}

fn citation_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\d+\]").expect("valid regex"))
}

/// Sections found under explicit headings, keyed by category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingSections {
    sections: BTreeMap<SectionKind, String>,
}

impl HeadingSections {
    pub fn get(&self, kind: SectionKind) -> Option<&str> {
        self.sections.get(&kind).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionKind, &str)> + '_ {
        self.sections.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Locates known headings in line-structured text
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingSegmenter;

impl HeadingSegmenter {
    pub fn new() -> Self {
        Self
    }

    /// Extract the body under the first matching heading of each category
    pub fn segment(&self, text: &str) -> HeadingSections {
        let all: Vec<&str> = lines(text).collect();
        let mut sections = BTreeMap::new();
        if all.is_empty() {
            return HeadingSections { sections };
        }

        for (kind, matcher) in heading_matchers() {
            let Some(idx) = find_heading(&all, matcher) else {
                continue;
            };
            let body = collect_body(&all[idx + 1..]);
            if !body.is_empty() {
                sections.insert(*kind, truncate_chars(&body, SECTION_LIMIT));
            }
        }

        HeadingSections { sections }
    }
}

/// Whether `line` is a heading of the category matched by `matcher`
fn is_heading(line: &str, matcher: &Regex) -> bool {
    let compact = numeric_prefix().replace(line, "");
    matcher.is_match(compact.trim())
}

fn find_heading(lines: &[&str], matcher: &Regex) -> Option<usize> {
    lines.iter().position(|line| is_heading(line, matcher))
}

fn collect_body(lines: &[&str]) -> String {
    let mut chunks: Vec<&str> = Vec::new();
    let mut joined_len = 0usize;
    for line in lines {
        if chunks.len() >= MIN_BODY_LINES && heading_like().is_match(line) {
            break;
        }
        if !chunks.is_empty() {
            joined_len += 1;
        }
        joined_len += line.chars().count();
        chunks.push(line);
        if joined_len > COLLECT_LIMIT {
            break;
        }
    }
    chunks.join(" ").trim().to_string()
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Merge a heading-derived value with the classifier's value.
///
/// The heading text wins when it has any non-whitespace content.
pub fn pick_first_non_empty(primary: Option<&str>, fallback: &str) -> String {
    match primary.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => fallback.to_string(),
    }
}

fn distinct_markers(text: &str) -> usize {
    citation_marker()
        .find_iter(text)
        .map(|m| m.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Describe the citations visible in a document.
///
/// `references` is the body found under a References/Bibliography heading.
pub fn citation_summary(text: &str, references: Option<&str>) -> String {
    if let Some(block) = references.filter(|b| !b.trim().is_empty()) {
        let count = distinct_markers(block);
        if count > 0 {
            return format!("References section detected with at least {count} indexed citations.");
        }
        return "References section detected in uploaded paper.".to_string();
    }

    let count = distinct_markers(text);
    if count > 0 {
        return format!("Detected at least {count} indexed citations in the document.");
    }
    "Citations not clearly identifiable from extracted text.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAPER: &str = "\
Sparse Retrieval for Long Documents
Jane Doe, John Roe

Abstract
We study retrieval.

2 Related Work
Prior systems index passages independently.
They rarely model document structure.

3.1. Methodology:
We build a hierarchical index.
Each level stores summaries.
Queries descend the tree.
Scoring uses BM25 at the leaves.
Results are merged by rank.
Experiments
We evaluate on three corpora.

References
[1] A. Author. Retrieval. 2020.
[2] B. Author. Indexing. 2021.
[1] A. Author. Retrieval. 2020.
";

    #[test]
    fn test_numeric_prefix_and_trailing_colon() {
        let sections = HeadingSegmenter::new().segment(PAPER);
        let method = sections.get(SectionKind::MethodUsed).unwrap();
        assert!(method.starts_with("We build a hierarchical index."));
        // the heading-shaped "Experiments" line stops collection after 5 body lines
        assert!(!method.contains("We evaluate"));
    }

    #[test]
    fn test_short_heading_before_min_lines_does_not_stop() {
        let sections = HeadingSegmenter::new().segment(PAPER);
        let related = sections.get(SectionKind::LiteratureReview).unwrap();
        // fewer than five body lines so the next heading is swallowed
        assert!(related.contains("Prior systems index passages independently."));
        assert!(related.contains("3.1. Methodology:"));
    }

    #[test]
    fn test_missing_categories_absent() {
        let sections = HeadingSegmenter::new().segment(PAPER);
        assert!(sections.get(SectionKind::Limitations).is_none());
        assert!(sections.get(SectionKind::FutureWork).is_none());
        assert!(sections.get(SectionKind::Citations).is_some());
    }

    #[test]
    fn test_empty_text() {
        assert!(HeadingSegmenter::new().segment("").is_empty());
        assert!(HeadingSegmenter::new().segment("\n \n").is_empty());
    }

    #[test]
    fn test_heading_match_rules() {
        let future = &heading_matchers()[4].1;
        assert!(is_heading("6 Conclusion and Future Work", future));
        assert!(is_heading("FUTURE WORK -", future));
        assert!(!is_heading("Future work will extend this.", future));
    }

    #[test]
    fn test_section_truncated_to_limit() {
        let body = "x".repeat(3000);
        let text = format!("Discussion\n{body}");
        let sections = HeadingSegmenter::new().segment(&text);
        assert_eq!(
            sections.get(SectionKind::Limitations).unwrap().chars().count(),
            SECTION_LIMIT
        );
    }

    #[test]
    fn test_pick_first_non_empty() {
        assert_eq!(pick_first_non_empty(Some("  heading  "), "fallback"), "heading");
        assert_eq!(pick_first_non_empty(Some("   "), "fallback"), "fallback");
        assert_eq!(pick_first_non_empty(None, "fallback"), "fallback");
    }

    #[test]
    fn test_citation_summary_variants() {
        let sections = HeadingSegmenter::new().segment(PAPER);
        assert_eq!(
            citation_summary(PAPER, sections.get(SectionKind::Citations)),
            "References section detected with at least 2 indexed citations."
        );
        assert_eq!(
            citation_summary("", Some("A. Author. Retrieval.")),
            "References section detected in uploaded paper."
        );
        assert_eq!(
            citation_summary("as shown in [3] and [4] and [3]", None),
            "Detected at least 2 indexed citations in the document."
        );
        assert_eq!(
            citation_summary("no markers here", None),
            "Citations not clearly identifiable from extracted text."
        );
    }
}
