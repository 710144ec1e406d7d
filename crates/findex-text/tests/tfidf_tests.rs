use findex_core::traits::LexicalIndexer;
use findex_text::tokenize::{terms, tokenize};
use findex_text::TfidfIndex;

fn corpus() -> Vec<String> {
    vec![
        "revenue grew 10% over the previous quarter".to_string(),
        "tax increased due to new regulation".to_string(),
        "profit margin stable across regions".to_string(),
    ]
}

#[test]
fn tokenizer_lowercases_and_drops_short_tokens() {
    let toks = tokenize("Revenue grew 10% — a LOT!");
    assert_eq!(toks, vec!["revenue", "grew", "10", "lot"]);
}

#[test]
fn terms_include_bigrams_after_stop_removal() {
    let t = terms("the revenue of the quarter");
    assert!(t.contains(&"revenue".to_string()));
    assert!(t.contains(&"quarter".to_string()));
    // "of"/"the" are removed before bigram formation
    assert!(t.contains(&"revenue quarter".to_string()));
}

#[test]
fn unfitted_index_returns_empty() {
    let index = TfidfIndex::new();
    assert!(!index.is_fitted());
    assert!(index.search("revenue", 5).is_empty());
}

#[test]
fn search_matches_are_positive_and_ranked() {
    let mut index = TfidfIndex::new();
    index.fit(&corpus());
    assert!(index.is_fitted());

    let hits = index.search("revenue quarter", 5);
    assert!(!hits.is_empty());
    assert_eq!(hits[0].ordinal, 0, "chunk mentioning revenue ranks first");
    for h in &hits {
        assert!(h.score > 0.0, "lexical hits are strictly positive");
    }
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn out_of_vocabulary_query_returns_empty() {
    let mut index = TfidfIndex::new();
    index.fit(&corpus());
    assert!(index.search("zebra photosynthesis", 5).is_empty());
}

#[test]
fn stop_word_only_query_returns_empty() {
    let mut index = TfidfIndex::new();
    index.fit(&corpus());
    assert!(index.search("the of and", 5).is_empty());
}

#[test]
fn repeated_searches_are_deterministic() {
    let mut index = TfidfIndex::new();
    index.fit(&corpus());
    let a = index.search("tax regulation", 5);
    let b = index.search("tax regulation", 5);
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.ordinal, y.ordinal);
        assert_eq!(x.score, y.score);
    }
}

#[test]
fn ties_break_toward_smaller_ordinal() {
    let mut index = TfidfIndex::new();
    // Identical texts produce identical similarity scores.
    index.fit(&vec![
        "cash flow statement".to_string(),
        "cash flow statement".to_string(),
        "unrelated filler text".to_string(),
    ]);
    let hits = index.search("cash flow", 3);
    assert!(hits.len() >= 2);
    assert_eq!(hits[0].ordinal, 0);
    assert_eq!(hits[1].ordinal, 1);
    assert_eq!(hits[0].score, hits[1].score);
}

#[test]
fn refit_replaces_previous_corpus() {
    let mut index = TfidfIndex::new();
    index.fit(&corpus());
    assert_eq!(index.len(), 3);

    index.fit(&vec!["dividends paid to shareholders".to_string()]);
    assert_eq!(index.len(), 1);
    assert!(index.search("revenue", 5).is_empty());
    assert!(!index.search("dividends", 5).is_empty());
}

#[test]
fn clear_unfits_the_index() {
    let mut index = TfidfIndex::new();
    index.fit(&corpus());
    index.clear();
    assert!(!index.is_fitted());
    assert_eq!(index.len(), 0);
    assert!(index.search("revenue", 5).is_empty());
}

#[test]
fn bigram_query_prefers_exact_phrase() {
    let mut index = TfidfIndex::new();
    index.fit(&vec![
        "net income rose sharply".to_string(),
        "income from net assets".to_string(),
    ]);
    let hits = index.search("net income", 2);
    assert!(!hits.is_empty());
    // Both documents share the unigrams; only the first has the bigram.
    assert_eq!(hits[0].ordinal, 0);
}
