use std::env;
use std::path::PathBuf;

use findex_core::chunker::Chunker;
use findex_core::config::{expand_path, Config};
use findex_core::loader::TextLoader;
use findex_embed::get_default_embedder;
use findex_hybrid::{CorpusPipeline, HybridSearchEngine, QueryOptions, RetrievalEngine};
use findex_synonyms::{JsonFileStorage, TermStore};
use findex_text::TfidfIndex;
use findex_vector::FlatVectorIndex;

type Engine = RetrievalEngine<TfidfIndex, FlatVectorIndex>;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <ingest|add|query|context|summary|stats|clear> [args...]", prog);
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn build_engine(config: &Config) -> anyhow::Result<Engine> {
    let chunk_size: usize = config.get_or("chunking.chunk_size", 500);
    let overlap: usize = config.get_or("chunking.overlap", 50);
    let chunker = Chunker::new(chunk_size, overlap)?;
    let embedder = get_default_embedder()?;
    let hybrid = HybridSearchEngine::new(TfidfIndex::new(), FlatVectorIndex::new());
    let pipeline = CorpusPipeline::new(chunker, embedder, hybrid);
    let synonyms_file = expand_path(config.get_or(
        "data.synonyms_file",
        "data/synonyms/financial_terms.json".to_string(),
    ));
    let synonyms = TermStore::load(Box::new(JsonFileStorage::new(synonyms_file)))?;
    Ok(RetrievalEngine::new(pipeline, synonyms))
}

fn snapshot_path(config: &Config) -> PathBuf {
    expand_path(config.get_or("data.snapshot_file", "data/index/corpus_snapshot.json".to_string()))
}

/// The corpus is in-memory only; query-side commands re-derive it from
/// the metadata snapshot written by `ingest`/`add`.
fn restore(engine: &mut Engine, config: &Config) -> anyhow::Result<()> {
    let path = snapshot_path(config);
    if path.exists() {
        let report = engine.load_snapshot(&path)?;
        if report.failed > 0 {
            eprintln!("Warning: {} snapshot document(s) could not be restored", report.failed);
        }
    }
    Ok(())
}

fn query_options(config: &Config, top_k: Option<usize>) -> QueryOptions {
    QueryOptions {
        top_k: top_k.unwrap_or_else(|| config.get_or("search.top_k", 5)),
        use_synonyms: config.get_or("search.use_synonyms", true),
        keyword_weight: config.get_or("search.keyword_weight", 0.3),
        vector_weight: config.get_or("search.vector_weight", 0.7),
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "ingest" => {
            let data_dir = args.first().map(PathBuf::from).unwrap_or_else(|| {
                expand_path(config.get_or("data.documents_dir", "data/documents".to_string()))
            });
            println!("Ingesting from {}", data_dir.display());
            let mut engine = build_engine(&config)?;
            let report = engine.initialize(&data_dir);
            for (path, outcome) in &report.outcomes {
                if let Err(reason) = outcome {
                    eprintln!("  failed: {} ({})", path, reason);
                }
            }
            engine.save_snapshot(&snapshot_path(&config))?;
            println!("✅ Ingest complete ({} ok, {} failed)", report.successful, report.failed);
        }
        "add" => {
            let file = args.first().map(PathBuf::from).unwrap_or_else(|| {
                eprintln!("Usage: findex add <file.txt>");
                std::process::exit(1)
            });
            let mut engine = build_engine(&config)?;
            restore(&mut engine, &config)?;
            let source = TextLoader::load_file(&file)?;
            let receipt = engine.insert(source)?;
            engine.save_snapshot(&snapshot_path(&config))?;
            println!(
                "Indexed {} as doc {} ({} chunks, {:.2}s)",
                receipt.file_name, receipt.doc_id, receipt.chunk_count, receipt.processing_secs
            );
        }
        "query" => {
            let question = args.first().cloned().unwrap_or_else(|| {
                eprintln!("Usage: findex query \"<question>\" [top_k]");
                std::process::exit(1)
            });
            let top_k = args.get(1).and_then(|s| s.parse().ok());
            let mut engine = build_engine(&config)?;
            restore(&mut engine, &config)?;
            let response = engine.query(&question, &query_options(&config, top_k))?;
            if let Some(expanded) = &response.expanded_query {
                println!("Expanded query: {}", expanded);
            }
            if response.results.is_empty() {
                println!("No matches.");
            }
            for r in &response.results {
                println!("{:>2}. [{:.4}] {} #{}", r.rank, r.score, r.file_name, r.chunk_index);
                println!("    {}", r.text);
            }
        }
        "context" => {
            let question = args.first().cloned().unwrap_or_else(|| {
                eprintln!("Usage: findex context \"<question>\" [top_k] [window]");
                std::process::exit(1)
            });
            let top_k = args
                .get(1)
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(|| config.get_or("search.top_k", 5));
            let window = args
                .get(2)
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(|| config.get_or("search.context_window", 2));
            let mut engine = build_engine(&config)?;
            restore(&mut engine, &config)?;
            let response = engine.search_with_context(&question, top_k, window)?;
            for r in &response.results {
                let hit = &r.result;
                println!("{:>2}. [{:.4}] {} #{}", hit.rank, hit.score, hit.file_name, hit.chunk_index);
                for text in &r.context_before {
                    println!("    ← {}", text);
                }
                println!("    ★ {}", hit.text);
                for text in &r.context_after {
                    println!("    → {}", text);
                }
            }
        }
        "summary" => {
            let doc_id: u64 = args.first().and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                eprintln!("Usage: findex summary <doc_id>");
                std::process::exit(1)
            });
            let mut engine = build_engine(&config)?;
            restore(&mut engine, &config)?;
            match engine.document_summary(doc_id) {
                Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
                None => println!("Document {} not found.", doc_id),
            }
        }
        "stats" => {
            let mut engine = build_engine(&config)?;
            restore(&mut engine, &config)?;
            println!("{}", serde_json::to_string_pretty(&engine.stats())?);
        }
        "clear" => {
            let path = snapshot_path(&config);
            if path.exists() {
                std::fs::remove_file(&path)?;
                println!("Removed snapshot {}", path.display());
            } else {
                println!("Nothing to clear.");
            }
        }
        _ => {
            eprintln!("Unknown command: {}", cmd);
            std::process::exit(1);
        }
    }
    Ok(())
}
