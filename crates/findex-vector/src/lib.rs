//! Flat embedding store, parallel to the corpus chunk order.
//!
//! No approximate-neighbor structure: every query scans all stored
//! vectors and ranking is exact. Unlike the lexical side, zero and
//! negative similarities are legitimate results here.

use findex_core::error::{Error, Result};
use findex_core::traits::VectorIndexer;
use findex_core::types::{SearchHit, SourceKind};

#[derive(Default)]
pub struct FlatVectorIndex {
    vectors: Vec<Vec<f32>>,
    dim: Option<usize>,
}

impl FlatVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl VectorIndexer for FlatVectorIndex {
    /// Replace the store wholesale. The whole batch must share one
    /// dimension; an inconsistent batch leaves the previous store intact.
    fn rebuild(&mut self, embeddings: Vec<Vec<f32>>) -> Result<()> {
        if let Some(first) = embeddings.first() {
            let dim = first.len();
            for v in &embeddings {
                if v.len() != dim {
                    return Err(Error::DimensionMismatch { expected: dim, actual: v.len() });
                }
            }
            self.dim = Some(dim);
        } else {
            self.dim = None;
        }
        self.vectors = embeddings;
        Ok(())
    }

    fn dim(&self) -> Option<usize> {
        self.dim
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if self.vectors.is_empty() {
            return Ok(Vec::new());
        }
        let dim = self.dim.unwrap_or(0);
        if query.len() != dim {
            return Err(Error::DimensionMismatch { expected: dim, actual: query.len() });
        }
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(ordinal, v)| (ordinal, cosine_similarity(query, v)))
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(ordinal, score)| SearchHit { ordinal, score, source: SourceKind::Vector })
            .collect())
    }

    fn clear(&mut self) {
        self.vectors.clear();
        self.dim = None;
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
