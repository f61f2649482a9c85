//! TF-IDF vectors over a small corpus of abstracts.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use stop_words::{get, LANGUAGE};

fn token_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"))
}

fn stop_words() -> &'static HashSet<String> {
    static WORDS: OnceLock<HashSet<String>> = OnceLock::new();
    WORDS.get_or_init(|| {
        get(LANGUAGE::English)
            .iter()
            .map(|w| w.to_string().to_lowercase())
            .collect()
    })
}

/// Lowercased word tokens of at least two characters, stop-words removed
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    token_pattern()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .filter(|token| !stop_words().contains(token))
        .collect()
}

/// L2-normalized TF-IDF rows, one per document
#[derive(Debug, Clone, PartialEq)]
pub struct TfidfMatrix {
    vocabulary: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl TfidfMatrix {
    /// Fit on `documents` keeping at most `max_features` terms.
    ///
    /// Terms are ranked by total count over the corpus (ties alphabetical).
    /// Weights use raw counts and the smoothed idf `ln((1+n)/(1+df)) + 1`.
    pub fn fit(documents: &[&str], max_features: usize) -> Self {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d)).collect();

        let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for tokens in &tokenized {
            let mut unique = HashSet::new();
            for token in tokens {
                *totals.entry(token.as_str()).or_insert(0) += 1;
                if unique.insert(token.as_str()) {
                    *doc_freq.entry(token.as_str()).or_insert(0) += 1;
                }
            }
        }

        // BTreeMap iteration is alphabetical; the stable sort keeps that for ties
        let mut ranked: Vec<(&str, usize)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(max_features);
        let mut vocabulary: Vec<String> = ranked.iter().map(|(t, _)| t.to_string()).collect();
        vocabulary.sort();

        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        let n = documents.len() as f64;
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|term| {
                let df = doc_freq.get(term.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let rows = tokenized
            .iter()
            .map(|tokens| {
                let mut row = vec![0.0; vocabulary.len()];
                for token in tokens {
                    if let Some(&i) = index.get(token.as_str()) {
                        row[i] += 1.0;
                    }
                }
                for (value, weight) in row.iter_mut().zip(&idf) {
                    *value *= weight;
                }
                normalize(&mut row);
                row
            })
            .collect();

        Self { vocabulary, rows }
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cosine similarity of documents `i` and `j`; 0 when either is empty
    pub fn cosine(&self, i: usize, j: usize) -> f64 {
        let dot: f64 = self.rows[i]
            .iter()
            .zip(&self.rows[j])
            .map(|(a, b)| a * b)
            .sum();
        dot.clamp(0.0, 1.0)
    }
}

fn normalize(row: &mut [f64]) {
    let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for value in row.iter_mut() {
            *value /= norm;
        }
    }
}
