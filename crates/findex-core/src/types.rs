//! Domain types shared by the lexical, vector and hybrid engines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type Meta = HashMap<String, String>;

/// A parsed source document as handed over by the external extraction
/// layer. The engine only ever sees plain text plus light metadata;
/// byte-level parsing happens upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub full_text: String,
    pub total_pages: Option<usize>,
    pub file_size: Option<u64>,
}

/// A fixed-size overlapping window of a document's words, the atomic
/// unit of indexing and retrieval.
///
/// - `chunk_index`: 0-based, contiguous within the parent document
/// - `start_word`/`end_word`: half-open word-offset range covered
/// - `metadata`: display metadata inherited from the source document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub chunk_index: usize,
    pub start_word: usize,
    pub end_word: usize,
    pub word_count: usize,
    pub metadata: Meta,
}

/// A chunk plus the embedding attached to it at insert time. Immutable
/// once it enters the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// Bookkeeping record created when a document is successfully indexed.
/// Never mutated afterwards; removed wholesale on `clear`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub doc_id: u64,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub chunk_count: usize,
    pub indexed_at: DateTime<Utc>,
    pub processing_secs: f64,
}

/// Per-document line in stats output and the recovery snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentBrief {
    pub doc_id: u64,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub chunk_count: usize,
    pub indexed_at: DateTime<Utc>,
}

impl From<&DocumentRecord> for DocumentBrief {
    fn from(r: &DocumentRecord) -> Self {
        Self {
            doc_id: r.doc_id,
            file_name: r.file_name.clone(),
            file_path: r.file_path.clone(),
            file_type: r.file_type.clone(),
            chunk_count: r.chunk_count,
            indexed_at: r.indexed_at,
        }
    }
}

/// Indicates which similarity space produced a hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    Lexical,
    Vector,
}

/// The minimal surface returned by both single-space indexes.
///
/// `ordinal` is the chunk's flat corpus-wide position. `score` is
/// engine-specific but higher is always better. `source` labels the
/// origin engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub ordinal: usize,
    pub score: f32,
    pub source: SourceKind,
}

/// A fused search result enriched with chunk text, ephemeral per query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedChunk {
    pub doc_id: u64,
    pub chunk_index: usize,
    pub file_name: String,
    pub text: String,
    pub score: f32,
    pub rank: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_documents: usize,
    pub total_chunks: usize,
    pub last_update: Option<DateTime<Utc>>,
    pub embedding_dimension: usize,
    pub documents: Vec<DocumentBrief>,
}
