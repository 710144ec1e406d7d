use std::fs;
use tempfile::TempDir;

use findex_core::chunker::Chunker;
use findex_core::error::Error;
use findex_core::traits::Embedder;
use findex_core::types::SourceDocument;
use findex_embed::HashEmbedder;
use findex_hybrid::{CorpusPipeline, HybridSearchEngine};
use findex_text::TfidfIndex;
use findex_vector::FlatVectorIndex;

fn make_pipeline(chunk_size: usize, overlap: usize) -> CorpusPipeline<TfidfIndex, FlatVectorIndex> {
    CorpusPipeline::new(
        Chunker::new(chunk_size, overlap).expect("chunker"),
        Box::new(HashEmbedder::new(32)),
        HybridSearchEngine::new(TfidfIndex::new(), FlatVectorIndex::new()),
    )
}

fn source(name: &str, text: &str) -> SourceDocument {
    SourceDocument {
        file_name: name.to_string(),
        file_path: format!("/tmp/{name}"),
        file_type: "txt".to_string(),
        full_text: text.to_string(),
        total_pages: None,
        file_size: None,
    }
}

#[test]
fn insert_assigns_sequential_ids_and_rebuilds() {
    let mut pipeline = make_pipeline(3, 0);

    let a = pipeline.insert(source("a.txt", "revenue grew strongly this quarter indeed")).unwrap();
    let b = pipeline.insert(source("b.txt", "tax increased sharply")).unwrap();
    assert_eq!(a.doc_id, 0);
    assert_eq!(b.doc_id, 1);
    assert_eq!(a.chunk_count, 2);
    assert_eq!(b.chunk_count, 1);
    assert_eq!(pipeline.document_count(), 2);
    assert_eq!(pipeline.chunk_count(), 3);

    let hits = pipeline.search("tax increased", "tax increased", 3, 0.3, 0.7).unwrap();
    assert!(!hits.is_empty());
    assert_eq!(hits[0].doc_id, 1, "second document's chunk ranks first");
    assert_eq!(hits[0].rank, 1);
}

#[test]
fn blank_document_is_rejected_and_corpus_unchanged() {
    let mut pipeline = make_pipeline(3, 0);
    let err = pipeline.insert(source("empty.txt", "   \n\t "));
    assert!(matches!(err, Err(Error::EmptyDocument(name)) if name == "empty.txt"));
    assert_eq!(pipeline.document_count(), 0);
    assert!(pipeline.stats().last_update.is_none());
}

struct BadEmbedder;

impl Embedder for BadEmbedder {
    fn dim(&self) -> usize {
        8
    }
    fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(vec![1.0; 4])
    }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

#[test]
fn wrong_embedding_dimension_is_rejected() {
    let mut pipeline = CorpusPipeline::new(
        Chunker::new(3, 0).expect("chunker"),
        Box::new(BadEmbedder),
        HybridSearchEngine::new(TfidfIndex::new(), FlatVectorIndex::new()),
    );
    let err = pipeline.insert(source("a.txt", "revenue grew strongly"));
    assert!(matches!(err, Err(Error::DimensionMismatch { expected: 8, actual: 4 })));
    assert_eq!(pipeline.document_count(), 0, "partial documents never enter the corpus");
}

#[test]
fn context_respects_document_boundaries() {
    let mut pipeline = make_pipeline(3, 0);
    // Nine words, three-word windows: exactly three chunks.
    pipeline
        .insert(source("q3.txt", "revenue grew 10% tax increased here profit margin stable"))
        .unwrap();
    pipeline.insert(source("other.txt", "unrelated filler words")).unwrap();

    let (before, after) = pipeline.chunk_context(0, 0, 2);
    assert!(before.is_empty());
    assert_eq!(after, vec!["tax increased here", "profit margin stable"]);

    let (before, after) = pipeline.chunk_context(0, 2, 2);
    assert_eq!(before, vec!["revenue grew 10%", "tax increased here"]);
    assert!(after.is_empty());

    let (before, after) = pipeline.chunk_context(0, 1, 1);
    assert_eq!(before, vec!["revenue grew 10%"]);
    assert_eq!(after, vec!["profit margin stable"]);
}

#[test]
fn out_of_range_context_is_empty_not_an_error() {
    let mut pipeline = make_pipeline(3, 0);
    pipeline.insert(source("a.txt", "revenue grew strongly")).unwrap();

    assert_eq!(pipeline.chunk_context(99, 0, 2), (Vec::new(), Vec::new()));
    assert_eq!(pipeline.chunk_context(0, 99, 2), (Vec::new(), Vec::new()));
}

#[test]
fn document_summary_truncates_first_chunk() {
    let mut pipeline = make_pipeline(500, 50);
    let long_text = "word ".repeat(300);
    pipeline.insert(source("long.txt", &long_text)).unwrap();

    let summary = pipeline.document_summary(0).expect("summary");
    assert_eq!(summary.file_name, "long.txt");
    assert_eq!(summary.first_chunk.chars().count(), 200);
    assert!(pipeline.document_summary(7).is_none());
}

#[test]
fn stats_track_counts_and_dimension() {
    let mut pipeline = make_pipeline(3, 0);
    let stats = pipeline.stats();
    assert_eq!(stats.total_documents, 0);
    assert!(stats.last_update.is_none());
    assert_eq!(stats.embedding_dimension, 32);

    pipeline.insert(source("a.txt", "revenue grew strongly this quarter indeed")).unwrap();
    let stats = pipeline.stats();
    assert_eq!(stats.total_documents, 1);
    assert_eq!(stats.total_chunks, 2);
    assert!(stats.last_update.is_some());
    assert_eq!(stats.documents.len(), 1);
    assert_eq!(stats.documents[0].file_name, "a.txt");
}

#[test]
fn clear_empties_everything() {
    let mut pipeline = make_pipeline(3, 0);
    pipeline.insert(source("a.txt", "revenue grew strongly")).unwrap();
    pipeline.clear();

    assert_eq!(pipeline.document_count(), 0);
    assert_eq!(pipeline.chunk_count(), 0);
    assert!(pipeline.stats().last_update.is_none());
    assert!(pipeline.search("revenue", "revenue", 5, 0.3, 0.7).unwrap().is_empty());
}

#[test]
fn ingest_dir_reports_per_file_outcomes() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("good.txt"), "revenue grew strongly").unwrap();
    fs::write(tmp.path().join("blank.txt"), "   ").unwrap();
    fs::write(tmp.path().join("ignored.pdf"), "binary").unwrap();

    let mut pipeline = make_pipeline(3, 0);
    let report = pipeline.ingest_dir(tmp.path());

    assert_eq!(report.total(), 2, "only .txt files are considered");
    assert_eq!(report.successful, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(pipeline.document_count(), 1);
}

#[test]
fn snapshot_round_trip_rederives_corpus() {
    let tmp = TempDir::new().unwrap();
    let doc_path = tmp.path().join("report.txt");
    fs::write(&doc_path, "revenue grew strongly this quarter indeed").unwrap();
    let snapshot_path = tmp.path().join("index").join("snapshot.json");

    let mut pipeline = make_pipeline(3, 0);
    let doc = findex_core::loader::TextLoader::load_file(&doc_path).unwrap();
    pipeline.insert(doc).unwrap();
    pipeline.save_snapshot(&snapshot_path).unwrap();

    let mut restored = make_pipeline(3, 0);
    let report = restored.load_snapshot(&snapshot_path).unwrap();
    assert_eq!(report.successful, 1);
    assert_eq!(restored.document_count(), 1);
    assert_eq!(restored.chunk_count(), pipeline.chunk_count());

    let hits = restored.search("revenue", "revenue", 5, 0.3, 0.7).unwrap();
    assert!(!hits.is_empty());
}

#[test]
fn snapshot_skips_missing_source_files() {
    let tmp = TempDir::new().unwrap();
    let doc_path = tmp.path().join("gone.txt");
    fs::write(&doc_path, "revenue grew strongly").unwrap();
    let snapshot_path = tmp.path().join("snapshot.json");

    let mut pipeline = make_pipeline(3, 0);
    pipeline.insert(findex_core::loader::TextLoader::load_file(&doc_path).unwrap()).unwrap();
    pipeline.save_snapshot(&snapshot_path).unwrap();
    fs::remove_file(&doc_path).unwrap();

    let mut restored = make_pipeline(3, 0);
    let report = restored.load_snapshot(&snapshot_path).unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(restored.document_count(), 0);
}
