//! TF-IDF vectorisation and cosine similarity over course documents.
//!
//! - Lowercase, tokens are runs of two or more alphanumeric/underscore chars
//! - English stop words are dropped before building the vocabulary
//! - Raw term counts, smoothed idf: `ln((1 + n) / (1 + df)) + 1`
//! - Rows are L2-normalised, so cosine similarity is a plain dot product

use crate::stop_words::is_stop_word;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Sparse row: (term index, weight), sorted by term index
pub type SparseVector = Vec<(usize, f64)>;

/// Split text into lowercase vocabulary tokens, stop words removed
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

/// A fitted TF-IDF model: one normalised vector per input document
#[derive(Debug, Clone, Default)]
pub struct TfIdfModel {
    /// term -> column index, in lexical order
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    vectors: Vec<SparseVector>,
}

impl TfIdfModel {
    /// Fit the vocabulary and idf weights on `documents` and vectorise them.
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| tokenize(doc.as_ref()))
            .collect();

        let terms: BTreeSet<&str> = tokenized
            .iter()
            .flat_map(|tokens| tokens.iter().map(String::as_str))
            .collect();
        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx))
            .collect();

        // Document frequency per term
        let mut df = vec![0usize; vocabulary.len()];
        for tokens in &tokenized {
            let unique: BTreeSet<usize> = tokens.iter().map(|t| vocabulary[t]).collect();
            for idx in unique {
                df[idx] += 1;
            }
        }

        let n = documents.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let vectors = tokenized
            .iter()
            .map(|tokens| {
                let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
                for token in tokens {
                    *counts.entry(vocabulary[token]).or_insert(0.0) += 1.0;
                }
                let mut row: SparseVector = counts
                    .into_iter()
                    .map(|(idx, tf)| (idx, tf * idf[idx]))
                    .collect();
                normalize(&mut row);
                row
            })
            .collect();

        Self {
            vocabulary,
            idf,
            vectors,
        }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&idx| self.idf[idx])
    }

    pub fn vectors(&self) -> &[SparseVector] {
        &self.vectors
    }

    /// Cosine similarity between documents `i` and `j`
    pub fn similarity(&self, i: usize, j: usize) -> f64 {
        dot(&self.vectors[i], &self.vectors[j])
    }

    /// For each document, the sum of its similarity to every other document
    pub fn aggregate_scores(&self) -> Vec<f64> {
        (0..self.vectors.len())
            .into_par_iter()
            .map(|i| {
                (0..self.vectors.len())
                    .filter(|&j| j != i)
                    .map(|j| self.similarity(i, j))
                    .sum::<f64>()
            })
            .collect()
    }
}

fn normalize(row: &mut SparseVector) {
    let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in row.iter_mut() {
            *w /= norm;
        }
    }
}

/// Dot product of two index-sorted sparse vectors
pub fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("Intro to Rust: ownership, borrowing & the_borrow-checker! A b 2024");
        assert_eq!(
            tokens,
            vec!["intro", "rust", "ownership", "borrowing", "the_borrow", "checker", "2024"]
        );
    }

    #[test]
    fn test_idf_smoothing() {
        let model = TfIdfModel::fit(&["rust rust", "rust python"]);
        // df(rust) = 2, df(python) = 1, n = 2
        assert!((model.idf("rust").unwrap() - 1.0).abs() < 1e-12);
        let expected = (3.0f64 / 2.0).ln() + 1.0;
        assert!((model.idf("python").unwrap() - expected).abs() < 1e-12);
        assert_eq!(model.idf("the"), None);
    }

    #[test]
    fn test_rows_normalised() {
        let model = TfIdfModel::fit(&["machine learning basics", "deep learning", "web design"]);
        for row in model.vectors() {
            let norm: f64 = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
        assert!((model.similarity(0, 0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_properties() {
        let model = TfIdfModel::fit(&["machine learning basics", "deep learning", "web design"]);
        assert!(model.similarity(0, 1) > 0.0);
        assert_eq!(model.similarity(0, 2), 0.0);
        assert!((model.similarity(0, 1) - model.similarity(1, 0)).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_scores_excludes_self() {
        let model = TfIdfModel::fit(&["machine learning", "deep learning", "web design"]);
        let scores = model.aggregate_scores();

        assert_eq!(scores.len(), 3);
        assert!((scores[0] - model.similarity(0, 1)).abs() < 1e-12);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_only_stop_words() {
        let model = TfIdfModel::fit(&["the and of", "a an"]);
        assert_eq!(model.vocabulary_size(), 0);
        assert_eq!(model.aggregate_scores(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_empty_corpus() {
        let model = TfIdfModel::fit::<String>(&[]);
        assert!(model.aggregate_scores().is_empty());
    }
}
