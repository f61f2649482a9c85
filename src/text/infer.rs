//! Best-effort metadata inference from raw document text.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::{MAX_YEAR, MIN_YEAR};

use super::segment::sentences;

fn year_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("valid regex"))
}

fn doi_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b10\.\d{4,9}/[-._;()/:A-Z0-9]+\b").expect("valid regex"))
}

fn author_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",| and ").expect("valid regex"))
}

fn char_prefix(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// First plausible title line among the first 20 lines
pub fn infer_title(text: &str) -> Option<String> {
    text.lines().take(20).map(str::trim).find_map(|line| {
        let len = line.chars().count();
        let lower = line.to_lowercase();
        let skip = lower.starts_with("abstract") || lower.starts_with("introduction");
        ((15..=180).contains(&len) && !skip).then(|| line.to_string())
    })
}

fn looks_like_name(part: &str) -> bool {
    let words = part.split_whitespace().count();
    (1..=5).contains(&words) && part.chars().next().is_some_and(char::is_uppercase)
}

/// Author list from the byline, if one can be recognized.
///
/// Only non-empty lines 2 to 8 are considered; lines with e-mail addresses
/// are skipped.
pub fn infer_authors(text: &str) -> Vec<String> {
    let candidates = text
        .lines()
        .take(40)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .skip(1)
        .take(7);

    for line in candidates {
        if line.contains('@') || line.chars().count() >= 150 {
            continue;
        }
        if !line.contains(',') && !line.to_lowercase().contains(" and ") {
            continue;
        }
        let parts: Vec<String> = author_separator()
            .split(line)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        if (1..=8).contains(&parts.len()) && parts.iter().all(|p| looks_like_name(p)) {
            return parts;
        }
    }
    Vec::new()
}

/// First four-digit year in the first 6000 chars
pub fn infer_year(text: &str) -> Option<i32> {
    year_pattern()
        .find_iter(char_prefix(text, 6000))
        .filter_map(|m| m.as_str().parse::<i32>().ok())
        .find(|year| (MIN_YEAR..=MAX_YEAR).contains(year))
}

/// First DOI-shaped token in the text
pub fn infer_doi(text: &str) -> Option<String> {
    doi_pattern().find(text).map(|m| m.as_str().trim().to_string())
}

/// Title derived from a file name: stem with `_` and `-` read as spaces
pub fn filename_title(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.replace(['_', '-'], " ").trim().to_string()
}

/// Secondary title used when the primary title found no metadata match
pub fn fallback_title(text: &str, filename: &str) -> String {
    if let Some(title) = infer_title(text) {
        if title.split_whitespace().count() >= 4 {
            return title;
        }
    }

    let informative = sentences(char_prefix(text, 1200)).find(|s| {
        let len = s.chars().count();
        (20..=220).contains(&len) && s.split_whitespace().count() >= 5
    });
    match informative {
        Some(sentence) => sentence.to_string(),
        None => filename_title(filename),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\
Graph Attention for Citation Recommendation
Alice Martin, Bob Chen and Carol Diaz
alice@example.org
Abstract
Published 2019 in the proceedings. Citations are sparse.
DOI: 10.1145/3292500.3330925.
";

    #[test]
    fn test_infer_title_skips_short_and_abstract_lines() {
        assert_eq!(
            infer_title(HEADER).as_deref(),
            Some("Graph Attention for Citation Recommendation")
        );
        assert_eq!(infer_title("Abstract: this line is long enough\nshort"), None);
    }

    #[test]
    fn test_infer_authors() {
        assert_eq!(
            infer_authors(HEADER),
            vec!["Alice Martin", "Bob Chen", "Carol Diaz"]
        );
        assert!(infer_authors("Title only\nthe results, however, were mixed").is_empty());
    }

    #[test]
    fn test_infer_year() {
        assert_eq!(infer_year(HEADER), Some(2019));
        assert_eq!(infer_year("ids 1850 and 12019"), None);
    }

    #[test]
    fn test_infer_doi() {
        assert_eq!(
            infer_doi(HEADER).as_deref(),
            Some("10.1145/3292500.3330925")
        );
        assert_eq!(infer_doi("no identifier"), None);
    }

    #[test]
    fn test_filename_title() {
        assert_eq!(filename_title("deep_graph-models.pdf"), "deep graph models");
        assert_eq!(filename_title("notes.txt"), "notes");
    }

    #[test]
    fn test_fallback_title_order() {
        assert_eq!(
            fallback_title(HEADER, "x.pdf"),
            "Graph Attention for Citation Recommendation"
        );

        let text = "Short header here!\nThis opening sentence has plenty of words in it. More.";
        assert_eq!(
            fallback_title(text, "x.pdf"),
            "This opening sentence has plenty of words in it."
        );

        assert_eq!(fallback_title("tiny", "my_paper.md"), "my paper");
    }
}
