//! In-process embedding capability.
//!
//! The actual embedding model is an external collaborator; the engine only
//! consumes the [`Embedder`] trait. This crate ships a deterministic
//! feature-hashing embedder so the whole pipeline runs offline with a
//! fixed, configurable dimension. Swap in a model-backed implementation by
//! implementing the same trait.

use anyhow::Result;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use findex_core::traits::Embedder;

pub const DEFAULT_DIM: usize = 384;

/// Hashes whitespace tokens into a fixed-length bucket vector and
/// L2-normalizes the result. Identical text always yields the identical
/// vector, and texts sharing tokens land in overlapping buckets, which is
/// enough signal for cosine ranking.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Default embedder for the pipeline and CLI. Dimension comes from the
/// `APP_EMBED_DIM` environment variable when set.
pub fn get_default_embedder() -> Result<Box<dyn Embedder>> {
    let dim = std::env::var("APP_EMBED_DIM")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_DIM);
    Ok(Box::new(HashEmbedder::new(dim)))
}
