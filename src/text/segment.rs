//! Sentence and line segmentation.

/// Lazy iterator over the sentences of a text block.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace. Items are
/// trimmed and never empty. The iterator is `Clone`, so a saved copy can be
/// replayed from the same position.
#[derive(Debug, Clone)]
pub struct Sentences<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let text = self.rest.trim_start();
            if text.is_empty() {
                self.rest = text;
                return None;
            }

            let mut cut = text.len();
            let mut resume = text.len();
            let mut chars = text.char_indices().peekable();
            while let Some((idx, ch)) = chars.next() {
                if matches!(ch, '.' | '!' | '?') {
                    if let Some(&(next_idx, next)) = chars.peek() {
                        if next.is_whitespace() {
                            cut = idx + ch.len_utf8();
                            resume = next_idx;
                            break;
                        }
                    }
                }
            }

            let sentence = text[..cut].trim();
            self.rest = &text[resume..];
            if !sentence.is_empty() {
                return Some(sentence);
            }
        }
    }
}

/// Split text into sentences
pub fn sentences(text: &str) -> Sentences<'_> {
    Sentences { rest: text }
}

/// Split text into trimmed, non-empty lines
pub fn lines(text: &str) -> impl Iterator<Item = &str> + Clone + '_ {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Collapse every run of whitespace (newlines included) into one space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse runs of spaces and tabs inside each line, keeping line breaks.
///
/// NUL bytes left behind by PDF extraction are treated as spaces.
pub fn normalize_lines(text: &str) -> String {
    text.replace('\0', " ")
        .lines()
        .map(collapse_whitespace)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_split() {
        let parts: Vec<_> =
            sentences("We propose X. It works!  Does it scale? Yes").collect();
        assert_eq!(parts, vec!["We propose X.", "It works!", "Does it scale?", "Yes"]);
    }

    #[test]
    fn test_no_split_without_whitespace() {
        let parts: Vec<_> = sentences("Version 2.0 improves e.g.the baseline.").collect();
        assert_eq!(parts, vec!["Version 2.0 improves e.g.the baseline."]);
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert_eq!(sentences("").count(), 0);
        assert_eq!(sentences("   \n\t ").count(), 0);
        assert_eq!(lines("\n\n  \n").count(), 0);
    }

    #[test]
    fn test_sentences_are_restartable() {
        let iter = sentences("One. Two. Three.");
        let saved = iter.clone();
        assert_eq!(iter.count(), 3);
        assert_eq!(saved.collect::<Vec<_>>(), vec!["One.", "Two.", "Three."]);
    }

    #[test]
    fn test_newline_counts_as_boundary_whitespace() {
        let parts: Vec<_> = sentences("First line.\nSecond line.").collect();
        assert_eq!(parts, vec!["First line.", "Second line."]);
    }

    #[test]
    fn test_multibyte_text() {
        let parts: Vec<_> = sentences("Résumé généré. Ça marche… vraiment? Oui.").collect();
        assert_eq!(parts, vec!["Résumé généré.", "Ça marche… vraiment?", "Oui."]);
    }

    #[test]
    fn test_lines() {
        let parts: Vec<_> = lines("  a  \n\n b\r\nc").collect();
        assert_eq!(parts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_normalize_lines_keeps_breaks() {
        assert_eq!(normalize_lines("a \t b\nc\0d"), "a b\nc d");
        assert_eq!(collapse_whitespace(" a \n b "), "a b");
    }
}
