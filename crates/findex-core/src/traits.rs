use crate::error::Result;
use crate::types::SearchHit;

/// The embedding capability consumed by the pipeline. The model itself
/// lives outside the engine; implementations must produce vectors of a
/// fixed length `dim()` for the lifetime of one corpus.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Sparse term-space index over the flattened chunk corpus. `fit` is a
/// full refit; incremental construction can be substituted behind this
/// seam without touching the fusion or orchestration layers.
pub trait LexicalIndexer: Send + Sync {
    fn fit(&mut self, texts: &[String]);
    fn is_fitted(&self) -> bool;
    fn search(&self, query: &str, k: usize) -> Vec<SearchHit>;
    fn clear(&mut self);
}

/// Dense embedding index parallel to the corpus order.
pub trait VectorIndexer: Send + Sync {
    fn rebuild(&mut self, embeddings: Vec<Vec<f32>>) -> Result<()>;
    fn dim(&self) -> Option<usize>;
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>>;
    fn clear(&mut self);
}
