//! Tokenization for the lexical vector space: lower-cased alphanumeric
//! runs of at least two characters, stop words removed, then unigrams
//! plus adjacent bigrams.

use crate::stopwords::is_stop_word;

pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// The index terms of one text: stop-filtered unigrams followed by the
/// bigrams over that same token sequence.
pub fn terms(text: &str) -> Vec<String> {
    let tokens: Vec<String> = tokenize(text).into_iter().filter(|t| !is_stop_word(t)).collect();
    let mut out = tokens.clone();
    for pair in tokens.windows(2) {
        out.push(format!("{} {}", pair[0], pair[1]));
    }
    out
}
