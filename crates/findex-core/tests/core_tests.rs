use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

use findex_core::chunker::Chunker;
use findex_core::loader::TextLoader;

fn words(n: usize) -> String {
    (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
}

#[test]
fn chunker_covers_every_word_with_overlap() {
    let chunker = Chunker::new(500, 50).expect("chunker");
    let text = words(1200);
    let chunks = chunker.chunk(&text, &HashMap::new());

    let starts: Vec<usize> = chunks.iter().map(|c| c.start_word).collect();
    assert_eq!(starts, vec![0, 450, 900]);

    let mut covered = vec![false; 1200];
    for c in &chunks {
        assert_eq!(c.word_count, c.end_word - c.start_word);
        for w in c.start_word..c.end_word {
            covered[w] = true;
        }
    }
    assert!(covered.iter().all(|&c| c), "every word appears in some chunk");
}

#[test]
fn chunker_indexes_are_contiguous() {
    let chunker = Chunker::new(10, 3).expect("chunker");
    let chunks = chunker.chunk(&words(35), &HashMap::new());
    for (i, c) in chunks.iter().enumerate() {
        assert_eq!(c.chunk_index, i);
    }
    let last = chunks.last().expect("at least one chunk");
    assert_eq!(last.end_word, 35, "last window reaches the final word");
    assert!(last.word_count <= 10);
}

#[test]
fn chunker_rejects_blank_text() {
    let chunker = Chunker::default();
    assert!(chunker.chunk("", &HashMap::new()).is_empty());
    assert!(chunker.chunk("   \n\t  ", &HashMap::new()).is_empty());
}

#[test]
fn chunker_rejects_bad_geometry() {
    assert!(Chunker::new(0, 0).is_err());
    assert!(Chunker::new(50, 50).is_err());
    assert!(Chunker::new(50, 80).is_err());
    assert!(Chunker::new(50, 49).is_ok());
}

#[test]
fn loader_reads_file_into_source_document() {
    let tmp = TempDir::new().unwrap();
    let file_path = tmp.path().join("q3_report.txt");
    fs::write(&file_path, "revenue grew 10%").unwrap();

    let doc = TextLoader::load_file(&file_path).expect("load");
    assert_eq!(doc.file_name, "q3_report.txt");
    assert_eq!(doc.file_type, "txt");
    assert_eq!(doc.full_text, "revenue grew 10%");
    assert!(doc.file_size.unwrap() > 0);
}

#[test]
fn loader_lists_only_txt_files_sorted() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("b.txt"), "beta").unwrap();
    fs::write(tmp.path().join("a.txt"), "alpha").unwrap();
    fs::write(tmp.path().join("notes.md"), "skip me").unwrap();

    let files = TextLoader::list_txt_files(tmp.path());
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
}
