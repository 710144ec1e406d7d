//! The externally visible query API: synonym-aware hybrid queries,
//! context stitching and stats.

use serde::Serialize;
use std::path::Path;

use findex_core::error::{Error, Result};
use findex_core::traits::{LexicalIndexer, VectorIndexer};
use findex_core::types::{CorpusStats, RankedChunk, SourceDocument};
use findex_synonyms::{QueryExpander, SynonymStats, TermStore};

use crate::pipeline::{CorpusPipeline, DocumentSummary, IngestReport, InsertReceipt};
use crate::{DEFAULT_KEYWORD_WEIGHT, DEFAULT_VECTOR_WEIGHT};

#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub top_k: usize,
    pub use_synonyms: bool,
    pub keyword_weight: f32,
    pub vector_weight: f32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            use_synonyms: true,
            keyword_weight: DEFAULT_KEYWORD_WEIGHT,
            vector_weight: DEFAULT_VECTOR_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub question: String,
    pub expanded_query: Option<String>,
    pub expanded_terms: Vec<(String, Vec<String>)>,
    pub results: Vec<RankedChunk>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextualResult {
    pub result: RankedChunk,
    pub context_before: Vec<String>,
    pub context_after: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextResponse {
    pub question: String,
    pub expanded_query: Option<String>,
    pub expanded_terms: Vec<(String, Vec<String>)>,
    pub results: Vec<ContextualResult>,
}

#[derive(Debug, Serialize)]
pub struct EngineStats {
    pub corpus: CorpusStats,
    pub synonyms: SynonymStats,
    pub is_indexed: bool,
}

/// Composes query expansion, hybrid corpus search and context stitching.
/// Queries fail fast with `Error::NotInitialized` until at least one
/// document has been indexed.
pub struct RetrievalEngine<L, V>
where
    L: LexicalIndexer,
    V: VectorIndexer,
{
    pipeline: CorpusPipeline<L, V>,
    synonyms: TermStore,
    initialized: bool,
}

impl<L, V> RetrievalEngine<L, V>
where
    L: LexicalIndexer,
    V: VectorIndexer,
{
    pub fn new(pipeline: CorpusPipeline<L, V>, synonyms: TermStore) -> Self {
        Self { pipeline, synonyms, initialized: false }
    }

    pub fn synonyms(&self) -> &TermStore {
        &self.synonyms
    }

    pub fn synonyms_mut(&mut self) -> &mut TermStore {
        &mut self.synonyms
    }

    /// Bulk-ingest a directory. The engine counts as initialized once at
    /// least one document made it into the corpus.
    pub fn initialize(&mut self, dir: &Path) -> IngestReport {
        let report = self.pipeline.ingest_dir(dir);
        if report.successful > 0 {
            self.initialized = true;
        }
        report
    }

    pub fn insert(&mut self, source: SourceDocument) -> Result<InsertReceipt> {
        let receipt = self.pipeline.insert(source)?;
        self.initialized = true;
        Ok(receipt)
    }

    pub fn query(&self, question: &str, opts: &QueryOptions) -> Result<QueryResponse> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        let (expanded_terms, expanded_query) = if opts.use_synonyms {
            let expander = QueryExpander::new(&self.synonyms);
            let terms = expander.expand_terms(question);
            let expanded = (!terms.is_empty()).then(|| expander.build_expanded_query(question));
            (terms, expanded)
        } else {
            (Vec::new(), None)
        };
        // The expansion widens only the lexical signal; the vector signal
        // always embeds the original question.
        let lexical_query = expanded_query.as_deref().unwrap_or(question);
        let results = self.pipeline.search(
            lexical_query,
            question,
            opts.top_k,
            opts.keyword_weight,
            opts.vector_weight,
        )?;
        Ok(QueryResponse {
            question: question.to_string(),
            expanded_query,
            expanded_terms,
            results,
        })
    }

    /// Run `query`, then attach up to `window` neighboring chunk texts on
    /// each side of every result, within the result's own document.
    pub fn search_with_context(
        &self,
        question: &str,
        top_k: usize,
        window: usize,
    ) -> Result<ContextResponse> {
        let response = self.query(question, &QueryOptions { top_k, ..QueryOptions::default() })?;
        let results = response
            .results
            .into_iter()
            .map(|result| {
                let (context_before, context_after) =
                    self.pipeline.chunk_context(result.doc_id, result.chunk_index, window);
                ContextualResult { result, context_before, context_after }
            })
            .collect();
        Ok(ContextResponse {
            question: response.question,
            expanded_query: response.expanded_query,
            expanded_terms: response.expanded_terms,
            results,
        })
    }

    pub fn document_summary(&self, doc_id: u64) -> Option<DocumentSummary> {
        self.pipeline.document_summary(doc_id)
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            corpus: self.pipeline.stats(),
            synonyms: self.synonyms.stats(),
            is_indexed: self.initialized,
        }
    }

    pub fn clear(&mut self) {
        self.pipeline.clear();
        self.initialized = false;
    }

    pub fn save_snapshot(&self, path: &Path) -> anyhow::Result<()> {
        self.pipeline.save_snapshot(path)
    }

    /// Rebuild the corpus from a metadata snapshot by re-inserting the
    /// recorded source files.
    pub fn load_snapshot(&mut self, path: &Path) -> anyhow::Result<IngestReport> {
        let report = self.pipeline.load_snapshot(path)?;
        if report.successful > 0 {
            self.initialized = true;
        }
        Ok(report)
    }
}
