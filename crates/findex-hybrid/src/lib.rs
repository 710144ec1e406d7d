//! Hybrid retrieval: weighted fusion of the lexical and vector spaces,
//! the corpus pipeline that keeps both indexes in lockstep with the
//! document list, and the query orchestrator on top.

pub mod engine;
pub mod pipeline;

pub use engine::{ContextResponse, ContextualResult, EngineStats, QueryOptions, QueryResponse, RetrievalEngine};
pub use pipeline::{CorpusPipeline, DocumentSummary, IngestReport, InsertReceipt};

use std::collections::HashMap;

use findex_core::error::Result;
use findex_core::traits::{LexicalIndexer, VectorIndexer};
use findex_core::types::SearchHit;

pub const DEFAULT_KEYWORD_WEIGHT: f32 = 0.3;
pub const DEFAULT_VECTOR_WEIGHT: f32 = 0.7;

/// A fused hit before enrichment: flat chunk ordinal, weighted-sum score
/// and 1-based rank.
#[derive(Debug, Clone)]
pub struct FusedHit {
    pub ordinal: usize,
    pub score: f32,
    pub rank: usize,
}

/// Fuses one lexical and one vector index over the same flat chunk
/// ordinals. Generic over the two indexer seams so either side can be
/// swapped (e.g. an incremental lexical build) without touching fusion
/// or orchestration.
pub struct HybridSearchEngine<L, V>
where
    L: LexicalIndexer,
    V: VectorIndexer,
{
    lexical: L,
    vector: V,
}

impl<L, V> HybridSearchEngine<L, V>
where
    L: LexicalIndexer,
    V: VectorIndexer,
{
    pub fn new(lexical: L, vector: V) -> Self {
        Self { lexical, vector }
    }

    /// Full refit of both sides from the flattened corpus. `texts` and
    /// `embeddings` are parallel, in flat ordinal order. The vector side
    /// goes first so a rejected embedding batch leaves the previous state
    /// in place on both sides.
    pub fn rebuild(&mut self, texts: &[String], embeddings: Vec<Vec<f32>>) -> Result<()> {
        self.vector.rebuild(embeddings)?;
        self.lexical.fit(texts);
        Ok(())
    }

    pub fn lexical_search(&self, query: &str, k: usize) -> Vec<SearchHit> {
        self.lexical.search(query, k)
    }

    pub fn vector_search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        self.vector.search(query_embedding, k)
    }

    /// Weighted-sum fusion. Each side is over-fetched at `2 * top_k` so
    /// one starved signal cannot empty the final list; a chunk present in
    /// only one list keeps just that contribution. Ordering is fused
    /// score descending with ascending ordinal as the explicit tie-break.
    pub fn hybrid_search(
        &self,
        query: &str,
        query_embedding: &[f32],
        top_k: usize,
        keyword_weight: f32,
        vector_weight: f32,
    ) -> Result<Vec<FusedHit>> {
        let fetch = top_k.saturating_mul(2);
        let keyword_hits = self.lexical.search(query, fetch);
        let vector_hits = self.vector.search(query_embedding, fetch)?;

        let mut scores: HashMap<usize, f32> = HashMap::new();
        for hit in &keyword_hits {
            *scores.entry(hit.ordinal).or_insert(0.0) += hit.score * keyword_weight;
        }
        for hit in &vector_hits {
            *scores.entry(hit.ordinal).or_insert(0.0) += hit.score * vector_weight;
        }

        let mut fused: Vec<(usize, f32)> = scores.into_iter().collect();
        fused.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        fused.truncate(top_k);
        Ok(fused
            .into_iter()
            .enumerate()
            .map(|(i, (ordinal, score))| FusedHit { ordinal, score, rank: i + 1 })
            .collect())
    }

    pub fn clear(&mut self) {
        self.lexical.clear();
        self.vector.clear();
    }
}
