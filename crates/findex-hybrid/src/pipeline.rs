//! Corpus ownership and the insert pipeline.
//!
//! The pipeline holds the authoritative document/chunk list; the lexical
//! and vector indexes are derived and rebuilt from the flattened chunk
//! list on every insert. Rebuild-on-write keeps queries consistent at the
//! cost of insert time proportional to total corpus size.

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

use findex_core::chunker::Chunker;
use findex_core::error::{Error, Result};
use findex_core::loader::TextLoader;
use findex_core::traits::{Embedder, LexicalIndexer, VectorIndexer};
use findex_core::types::{
    CorpusStats, DocumentBrief, DocumentRecord, Meta, RankedChunk, SourceDocument, StoredChunk,
};

use crate::HybridSearchEngine;

struct DocumentEntry {
    record: DocumentRecord,
    chunks: Vec<StoredChunk>,
}

/// What a successful insert reports back.
#[derive(Debug, Clone, Serialize)]
pub struct InsertReceipt {
    pub doc_id: u64,
    pub file_name: String,
    pub chunk_count: usize,
    pub processing_secs: f64,
}

/// Per-file outcomes of a bulk ingest. One bad file never aborts the run.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub successful: usize,
    pub failed: usize,
    pub outcomes: Vec<(String, std::result::Result<InsertReceipt, String>)>,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    fn record(&mut self, path: String, outcome: std::result::Result<InsertReceipt, String>) {
        match &outcome {
            Ok(_) => self.successful += 1,
            Err(_) => self.failed += 1,
        }
        self.outcomes.push((path, outcome));
    }
}

/// At-a-glance record for one indexed document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub doc_id: u64,
    pub file_name: String,
    pub file_type: String,
    pub chunk_count: usize,
    pub indexed_at: DateTime<Utc>,
    pub first_chunk: String,
}

/// Metadata-only corpus snapshot; recovery re-runs insert against the
/// recorded source files.
#[derive(Debug, Serialize, Deserialize)]
struct CorpusSnapshot {
    last_update: Option<DateTime<Utc>>,
    documents: Vec<DocumentBrief>,
}

pub struct CorpusPipeline<L, V>
where
    L: LexicalIndexer,
    V: VectorIndexer,
{
    chunker: Chunker,
    embedder: Box<dyn Embedder>,
    engine: HybridSearchEngine<L, V>,
    documents: Vec<DocumentEntry>,
    flat: Vec<(usize, usize)>,
    last_update: Option<DateTime<Utc>>,
}

impl<L, V> CorpusPipeline<L, V>
where
    L: LexicalIndexer,
    V: VectorIndexer,
{
    pub fn new(chunker: Chunker, embedder: Box<dyn Embedder>, engine: HybridSearchEngine<L, V>) -> Self {
        Self {
            chunker,
            embedder,
            engine,
            documents: Vec::new(),
            flat: Vec::new(),
            last_update: None,
        }
    }

    /// Chunk, embed (one batch call), append and refit. A document that
    /// fails at any stage never enters the corpus.
    pub fn insert(&mut self, source: SourceDocument) -> Result<InsertReceipt> {
        let started = Instant::now();

        let mut metadata = Meta::new();
        metadata.insert("file_name".to_string(), source.file_name.clone());
        metadata.insert("file_type".to_string(), source.file_type.clone());
        if let Some(pages) = source.total_pages {
            metadata.insert("total_pages".to_string(), pages.to_string());
        }

        let chunks = self.chunker.chunk(&source.full_text, &metadata);
        if chunks.is_empty() {
            return Err(Error::EmptyDocument(source.file_name));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .map_err(|e| Error::Operation(format!("embedding failed: {e}")))?;
        if embeddings.len() != chunks.len() {
            return Err(Error::Operation(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }
        let dim = self.embedder.dim();
        for embedding in &embeddings {
            if embedding.len() != dim {
                return Err(Error::DimensionMismatch { expected: dim, actual: embedding.len() });
            }
        }

        let doc_id = self.documents.len() as u64;
        let stored: Vec<StoredChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| StoredChunk { chunk, embedding })
            .collect();
        let record = DocumentRecord {
            doc_id,
            file_name: source.file_name,
            file_path: source.file_path,
            file_type: source.file_type,
            chunk_count: stored.len(),
            indexed_at: Utc::now(),
            processing_secs: started.elapsed().as_secs_f64(),
        };
        let receipt = InsertReceipt {
            doc_id,
            file_name: record.file_name.clone(),
            chunk_count: record.chunk_count,
            processing_secs: record.processing_secs,
        };
        self.documents.push(DocumentEntry { record, chunks: stored });
        self.last_update = Some(Utc::now());
        self.rebuild_index()?;
        Ok(receipt)
    }

    /// Full refit of both indexes from the flattened chunk list.
    fn rebuild_index(&mut self) -> Result<()> {
        self.flat.clear();
        let mut texts = Vec::new();
        let mut embeddings = Vec::new();
        for (di, doc) in self.documents.iter().enumerate() {
            for (ci, stored) in doc.chunks.iter().enumerate() {
                self.flat.push((di, ci));
                texts.push(stored.chunk.text.clone());
                embeddings.push(stored.embedding.clone());
            }
        }
        self.engine.rebuild(&texts, embeddings)
    }

    /// Hybrid search over the corpus. `lexical_query` may be a
    /// synonym-expanded variant of the question; the embedded text is
    /// always the caller's original question.
    pub fn search(
        &self,
        lexical_query: &str,
        embed_text: &str,
        top_k: usize,
        keyword_weight: f32,
        vector_weight: f32,
    ) -> Result<Vec<RankedChunk>> {
        let query_embedding = self
            .embedder
            .embed(embed_text)
            .map_err(|e| Error::Operation(format!("embedding failed: {e}")))?;
        let fused = self.engine.hybrid_search(
            lexical_query,
            &query_embedding,
            top_k,
            keyword_weight,
            vector_weight,
        )?;
        Ok(fused
            .into_iter()
            .filter_map(|hit| {
                self.resolve(hit.ordinal).map(|(record, stored)| RankedChunk {
                    doc_id: record.doc_id,
                    chunk_index: stored.chunk.chunk_index,
                    file_name: record.file_name.clone(),
                    text: stored.chunk.text.clone(),
                    score: hit.score,
                    rank: hit.rank,
                })
            })
            .collect())
    }

    fn resolve(&self, ordinal: usize) -> Option<(&DocumentRecord, &StoredChunk)> {
        let &(di, ci) = self.flat.get(ordinal)?;
        let doc = self.documents.get(di)?;
        Some((&doc.record, doc.chunks.get(ci)?))
    }

    /// Ingest every `.txt` file under `dir`, reporting per-file outcomes.
    pub fn ingest_dir(&mut self, dir: &Path) -> IngestReport {
        let mut report = IngestReport::default();
        let files = TextLoader::list_txt_files(dir);
        if files.is_empty() {
            println!("No .txt files found under {}.", dir.display());
            return report;
        }
        let pb = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        for path in &files {
            pb.set_message(path.display().to_string());
            let outcome = TextLoader::load_file(path)
                .map_err(|e| e.to_string())
                .and_then(|source| self.insert(source).map_err(|e| e.to_string()));
            report.record(path.display().to_string(), outcome);
            pb.inc(1);
        }
        pb.finish_with_message("done");
        println!(
            "Ingested {}/{} files into {} chunks",
            report.successful,
            report.total(),
            self.chunk_count()
        );
        report
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn chunk_count(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            total_documents: self.documents.len(),
            total_chunks: self.flat.len(),
            last_update: self.last_update,
            embedding_dimension: self.embedder.dim(),
            documents: self.documents.iter().map(|d| DocumentBrief::from(&d.record)).collect(),
        }
    }

    pub fn clear(&mut self) {
        self.documents.clear();
        self.flat.clear();
        self.engine.clear();
        self.last_update = None;
    }

    /// Brief record plus the first 200 characters of the first chunk.
    pub fn document_summary(&self, doc_id: u64) -> Option<DocumentSummary> {
        let doc = self.documents.get(doc_id as usize)?;
        let first_chunk = doc
            .chunks
            .first()
            .map(|s| s.chunk.text.chars().take(200).collect())
            .unwrap_or_default();
        Some(DocumentSummary {
            doc_id: doc.record.doc_id,
            file_name: doc.record.file_name.clone(),
            file_type: doc.record.file_type.clone(),
            chunk_count: doc.record.chunk_count,
            indexed_at: doc.record.indexed_at,
            first_chunk,
        })
    }

    /// Up to `window` chunk texts immediately before and after the given
    /// chunk, never crossing the document boundary. Out-of-range
    /// references yield empty context rather than an error.
    pub fn chunk_context(
        &self,
        doc_id: u64,
        chunk_index: usize,
        window: usize,
    ) -> (Vec<String>, Vec<String>) {
        let Some(doc) = self.documents.get(doc_id as usize) else {
            return (Vec::new(), Vec::new());
        };
        if chunk_index >= doc.chunks.len() {
            return (Vec::new(), Vec::new());
        }
        let before = doc.chunks[chunk_index.saturating_sub(window)..chunk_index]
            .iter()
            .map(|s| s.chunk.text.clone())
            .collect();
        let end = (chunk_index + window + 1).min(doc.chunks.len());
        let after = doc.chunks[chunk_index + 1..end]
            .iter()
            .map(|s| s.chunk.text.clone())
            .collect();
        (before, after)
    }

    /// Write the metadata-only snapshot. Chunk text and embeddings are
    /// deliberately not persisted; see `load_snapshot`.
    pub fn save_snapshot(&self, path: &Path) -> anyhow::Result<()> {
        let snapshot = CorpusSnapshot {
            last_update: self.last_update,
            documents: self.documents.iter().map(|d| DocumentBrief::from(&d.record)).collect(),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        Ok(())
    }

    /// Re-derive the corpus by re-inserting every document recorded in
    /// the snapshot whose source file still exists.
    pub fn load_snapshot(&mut self, path: &Path) -> anyhow::Result<IngestReport> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot: CorpusSnapshot = serde_json::from_str(&raw)?;
        let mut report = IngestReport::default();
        for brief in snapshot.documents {
            let source_path = Path::new(&brief.file_path);
            if !source_path.exists() {
                report.record(brief.file_path.clone(), Err("source file missing".to_string()));
                continue;
            }
            let outcome = TextLoader::load_file(source_path)
                .map_err(|e| e.to_string())
                .and_then(|source| self.insert(source).map_err(|e| e.to_string()));
            report.record(brief.file_path, outcome);
        }
        Ok(report)
    }
}
