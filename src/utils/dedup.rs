//! Title-based deduplication for papers gathered from several sources.

use std::collections::HashSet;

use crate::models::Paper;

/// Normalize a title for comparison.
///
/// Lowercases, drops everything that is not alphanumeric or whitespace and
/// collapses whitespace runs.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep the first item for every distinct normalized key.
///
/// Output preserves the order in which surviving items were first seen.
pub fn dedupe_by_key<T, F>(items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(normalize_title(key(item))))
        .collect()
}

/// Remove papers whose normalized title was already seen
pub fn dedupe_papers(papers: Vec<Paper>) -> Vec<Paper> {
    let before = papers.len();
    let unique = dedupe_by_key(papers, |p| p.title.as_str());
    if unique.len() < before {
        tracing::debug!("Dropped {} duplicate papers", before - unique.len());
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceType;

    fn make_paper(title: &str, source: SourceType) -> Paper {
        Paper::new(title.to_string(), source)
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("Deep Learning for X"), "deep learning for x");
        assert_eq!(normalize_title("  deep   learning\tfor x!! "), "deep learning for x");
        assert_eq!(normalize_title("Über-Modelle: Teil 2"), "übermodelle teil 2");
        assert_eq!(normalize_title("?!"), "");
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let papers = vec![
            make_paper("Deep Learning for X", SourceType::ArxivSearch),
            make_paper("deep learning for x!!", SourceType::SemanticScholar),
            make_paper("Another Paper", SourceType::SemanticScholar),
        ];

        let unique = dedupe_papers(papers);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title, "Deep Learning for X");
        assert_eq!(unique[0].source, SourceType::ArxivSearch);
        assert_eq!(unique[1].title, "Another Paper");
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let papers = vec![
            make_paper("A", SourceType::ArxivSearch),
            make_paper("B", SourceType::ArxivSearch),
            make_paper("a", SourceType::ArxivSearch),
        ];
        let once = dedupe_papers(papers);
        let twice = dedupe_papers(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_dedupe_by_key_generic() {
        let items = vec![("Graph Nets", 1), ("graph nets", 2), ("Trees", 3)];
        let unique = dedupe_by_key(items, |(title, _)| *title);
        assert_eq!(unique, vec![("Graph Nets", 1), ("Trees", 3)]);
    }
}
