//! Sparse TF-IDF vector space over the flattened chunk corpus.
//!
//! Fitting is always a full refit over every chunk text; the vocabulary
//! is capped at the most frequent terms and query-time vectorization
//! only ever sees the fitted vocabulary, so out-of-vocabulary query
//! terms contribute nothing.

use std::collections::HashMap;

use findex_core::traits::LexicalIndexer;
use findex_core::types::{SearchHit, SourceKind};

use crate::tokenize::terms;

/// Vocabulary cap: the highest-frequency terms across the corpus.
pub const MAX_VOCAB: usize = 5000;

type SparseRow = Vec<(usize, f32)>;

#[derive(Default)]
pub struct TfidfIndex {
    vocab: HashMap<String, usize>,
    idf: Vec<f32>,
    rows: Vec<SparseRow>,
    fitted: bool,
}

impl TfidfIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    fn build_vocab(docs_terms: &[Vec<String>]) -> HashMap<String, usize> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for doc in docs_terms {
            for term in doc {
                *counts.entry(term.clone()).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
        // Most frequent first; lexicographic order decides frequency ties
        // so the cap is reproducible.
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(MAX_VOCAB);
        let mut selected: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        selected.sort();
        selected.into_iter().enumerate().map(|(col, t)| (t, col)).collect()
    }

    fn term_counts(&self, doc_terms: &[String]) -> HashMap<usize, f32> {
        let mut tf: HashMap<usize, f32> = HashMap::new();
        for term in doc_terms {
            if let Some(&col) = self.vocab.get(term) {
                *tf.entry(col).or_insert(0.0) += 1.0;
            }
        }
        tf
    }

    fn weigh(&self, tf: HashMap<usize, f32>) -> SparseRow {
        let mut row: SparseRow = tf.into_iter().map(|(col, tf)| (col, tf * self.idf[col])).collect();
        row.sort_by_key(|&(col, _)| col);
        l2_normalize(&mut row);
        row
    }
}

impl LexicalIndexer for TfidfIndex {
    fn fit(&mut self, texts: &[String]) {
        self.clear();
        if texts.is_empty() {
            return;
        }
        let docs_terms: Vec<Vec<String>> = texts.iter().map(|t| terms(t)).collect();
        self.vocab = Self::build_vocab(&docs_terms);

        let mut df = vec![0usize; self.vocab.len()];
        let mut tf_maps = Vec::with_capacity(docs_terms.len());
        for doc in &docs_terms {
            let tf = self.term_counts(doc);
            for &col in tf.keys() {
                df[col] += 1;
            }
            tf_maps.push(tf);
        }
        let n = texts.len();
        self.idf = df
            .iter()
            .map(|&d| (((1 + n) as f32) / ((1 + d) as f32)).ln() + 1.0)
            .collect();
        let rows: Vec<SparseRow> = tf_maps.into_iter().map(|tf| self.weigh(tf)).collect();
        self.rows = rows;
        self.fitted = true;
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }

    fn search(&self, query: &str, k: usize) -> Vec<SearchHit> {
        if !self.fitted || self.rows.is_empty() {
            return Vec::new();
        }
        let q = self.weigh(self.term_counts(&terms(query)));
        if q.is_empty() {
            return Vec::new();
        }
        let mut scored: Vec<(usize, f32)> = self
            .rows
            .iter()
            .enumerate()
            .map(|(ordinal, row)| (ordinal, sparse_dot(&q, row)))
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored
            .into_iter()
            .filter(|&(_, score)| score > 0.0)
            .take(k)
            .map(|(ordinal, score)| SearchHit { ordinal, score, source: SourceKind::Lexical })
            .collect()
    }

    fn clear(&mut self) {
        self.vocab.clear();
        self.idf.clear();
        self.rows.clear();
        self.fitted = false;
    }
}

fn l2_normalize(row: &mut SparseRow) {
    let norm = row.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for (_, w) in row.iter_mut() {
            *w /= norm;
        }
    }
}

/// Dot product of two column-sorted sparse rows.
fn sparse_dot(a: &SparseRow, b: &SparseRow) -> f32 {
    let (mut i, mut j, mut sum) = (0usize, 0usize, 0f32);
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
