//! Cleanup of extracted section text for display.
//!
//! Text pulled out of PDFs is full of hyphenation artifacts, URLs, license
//! boilerplate and reference-list fragments. [`clean_section_text`] keeps
//! the first few readable sentences and bounds the total length.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::{SectionKind, SectionSet};

use super::segment::{collapse_whitespace, sentences};

/// Sentences shorter than this are treated as noise
const MIN_SENTENCE_CHARS: usize = 40;

/// Maximum digit-to-letter ratio of a readable sentence
const MAX_DIGIT_RATIO: f64 = 0.30;

fn hyphen_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\w)-\s+(\w)").expect("valid regex"))
}

fn url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+").expect("valid regex"))
}

fn doi_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bdoi:\s*\S+").expect("valid regex"))
}

fn boilerplate() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(the author\(s\)|copyright|all rights reserved)\b").expect("valid regex")
    })
}

fn boilerplate_with_open_access() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(open access|the author\(s\)|copyright|all rights reserved)\b")
            .expect("valid regex")
    })
}

fn journal_citation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[a-z]+\s*\(\d{4}\)\s*\d+:\d+\b").expect("valid regex"))
}

fn abstract_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\babstract\b").expect("valid regex"))
}

fn non_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\W+").expect("valid regex"))
}

/// Sentence and character caps for one section
fn limits(kind: SectionKind) -> (usize, usize) {
    match kind {
        SectionKind::Insights => (5, 900),
        SectionKind::ResearchGap => (4, 900),
        _ => (4, 780),
    }
}

/// Apply per-section cleanup to every field of an upload result.
///
/// `citations` only gets whitespace normalization.
pub fn format_sections(sections: &SectionSet) -> SectionSet {
    let mut out = SectionSet::default();
    for (kind, text) in sections.iter() {
        let cleaned = if kind == SectionKind::Citations {
            collapse_whitespace(&text.replace('\0', " "))
        } else {
            let (max_sentences, max_chars) = limits(kind);
            clean_section_text(text, max_sentences, max_chars)
        };
        out.set(kind, cleaned);
    }
    out
}

/// Keep up to `max_sentences` readable, distinct sentences within `max_chars`
pub fn clean_section_text(text: &str, max_sentences: usize, max_chars: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cleaned = text.replace('\0', " ");
    let cleaned = hyphen_break().replace_all(&cleaned, "$1$2");
    let cleaned = url().replace_all(&cleaned, " ");
    let cleaned = doi_token().replace_all(&cleaned, " ");
    let cleaned = collapse_whitespace(&cleaned);

    let mut selected: Vec<&str> = Vec::new();
    let mut seen: HashSet<[u8; 16]> = HashSet::new();
    for part in sentences(&cleaned) {
        let sentence = part.trim_matches(|c| c == ' ' || c == '-');
        if sentence.is_empty() || is_noisy_sentence(sentence) {
            continue;
        }
        let norm = non_word().replace_all(&sentence.to_lowercase(), "").into_owned();
        if norm.is_empty() || !seen.insert(md5::compute(norm.as_bytes()).0) {
            continue;
        }
        selected.push(sentence);
        if selected.len() >= max_sentences {
            break;
        }
    }

    let result = if selected.is_empty() {
        collapse_whitespace(&boilerplate_with_open_access().replace_all(&cleaned, " "))
    } else {
        selected.join(" ")
    };

    truncate_with_ellipsis(&result, max_chars)
}

/// Whether a sentence looks like metadata, a reference entry or boilerplate
pub fn is_noisy_sentence(sentence: &str) -> bool {
    let lower = sentence.to_lowercase();
    if sentence.chars().count() < MIN_SENTENCE_CHARS {
        return true;
    }
    if lower.contains("doi.org") || lower.contains("open access") {
        return true;
    }
    if boilerplate().is_match(&lower) || journal_citation().is_match(&lower) {
        return true;
    }
    if abstract_word().is_match(&lower) && sentence.matches(',').count() > 5 {
        return true;
    }

    let alpha = sentence.chars().filter(|c| c.is_alphabetic()).count();
    let digits = sentence.chars().filter(|c| c.is_numeric()).count();
    alpha > 0 && digits as f64 / alpha as f64 > MAX_DIGIT_RATIO
}

fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", keep.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyphenation_urls_and_doi_removed() {
        let text = "The proposed retrie- val pipeline is described at https://example.org/x \
                    and archived under doi:10.1000/xyz123 for future reference.";
        let out = clean_section_text(text, 4, 780);
        assert!(out.contains("retrieval pipeline"));
        assert!(!out.contains("https://"));
        assert!(!out.contains("10.1000"));
    }

    #[test]
    fn test_noisy_sentences_dropped() {
        let text = "Short one. \
                    Copyright 2021 the publisher, all rights reserved by the holders here. \
                    Available at doi.org for anyone who wants to read the paper online. \
                    Nature (2020) 12:345 reported a related measurement in great detail. \
                    We train a transformer encoder on the full corpus of scientific text.";
        let out = clean_section_text(text, 4, 780);
        assert_eq!(
            out,
            "We train a transformer encoder on the full corpus of scientific text."
        );
    }

    #[test]
    fn test_digit_heavy_sentence_is_noise() {
        assert!(is_noisy_sentence("Table 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 values ok."));
        assert!(!is_noisy_sentence(
            "Our evaluation covers 3 datasets and several strong baselines."
        ));
    }

    #[test]
    fn test_near_duplicates_removed() {
        let text = "The model improves recall on every benchmark we tried. \
                    the model improves recall, on every benchmark we tried! \
                    A second distinct sentence that is long enough to keep.";
        let out = clean_section_text(text, 4, 780);
        assert_eq!(
            out,
            "The model improves recall on every benchmark we tried. \
             A second distinct sentence that is long enough to keep."
        );
    }

    #[test]
    fn test_sentence_cap() {
        let text = (0..8)
            .map(|i| format!("Sentence number {i} is long enough to pass the noise filter."))
            .collect::<Vec<_>>()
            .join(" ");
        let out = clean_section_text(&text, 4, 10_000);
        assert_eq!(sentences(&out).count(), 4);
    }

    #[test]
    fn test_fallback_when_everything_is_noise() {
        let out = clean_section_text("Open access. Tiny.", 4, 780);
        assert_eq!(out, ". Tiny.");
        assert_eq!(clean_section_text("", 4, 780), "");
    }

    #[test]
    fn test_truncation_adds_ellipsis() {
        let text = "word ".repeat(400);
        let out = clean_section_text(&text, 4, 100);
        assert_eq!(out.chars().count(), 100);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_format_sections_caps_and_citations() {
        let mut set = SectionSet::default();
        set.citations = "  Cited by\n approximately 4 papers.  ".to_string();
        set.insights = "This is a reasonably long insight sentence about retrieval systems.".to_string();
        let out = format_sections(&set);
        assert_eq!(out.citations, "Cited by approximately 4 papers.");
        assert_eq!(out.insights, set.insights);
        assert_eq!(out.limitations, "");
    }
}
