//! Query-side synonym expansion.
//!
//! Detects domain terms in a question (single tokens and multi-word
//! vocabulary phrases) and widens the lexical query with their variants.
//! Expansion only ever feeds the lexical signal; the vector signal always
//! embeds the original question.

use std::collections::HashSet;

use crate::store::TermStore;

const SURROUNDING_PUNCT: &str = ".,!?;:()[]{}\"'-";

pub struct QueryExpander<'a> {
    store: &'a TermStore,
}

impl<'a> QueryExpander<'a> {
    pub fn new(store: &'a TermStore) -> Self {
        Self { store }
    }

    /// Recognized terms of the query with their synonym groups, in order
    /// of first detection: cleaned single tokens first, then canonical
    /// forms of multi-word vocabulary phrases found by substring scan.
    /// Terms whose group has no variants are omitted.
    pub fn expand_terms(&self, query: &str) -> Vec<(String, Vec<String>)> {
        let mut candidates: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for word in query.to_lowercase().split_whitespace() {
            let cleaned = word.trim_matches(|c| SURROUNDING_PUNCT.contains(c));
            if cleaned.is_empty() || !self.store.validate(cleaned) {
                continue;
            }
            if seen.insert(cleaned.to_string()) {
                candidates.push(cleaned.to_string());
            }
        }

        // Phrases that single-token splitting cannot catch.
        let query_lower = query.to_lowercase();
        for entry in self.store.all_terms() {
            let phrase_present = std::iter::once(&entry.canonical)
                .chain(entry.variants.iter())
                .any(|t| t.split_whitespace().nth(1).is_some() && query_lower.contains(&t.to_lowercase()));
            if phrase_present && seen.insert(entry.canonical.clone()) {
                candidates.push(entry.canonical.clone());
            }
        }

        candidates
            .into_iter()
            .filter_map(|term| {
                let synonyms = self.store.synonyms_of(&term);
                (synonyms.len() > 1).then_some((term, synonyms))
            })
            .collect()
    }

    /// The original query followed by one parenthesized ` OR ` group per
    /// expanded term, each holding up to 3 alternatives. Feeds the
    /// lexical search only.
    pub fn build_expanded_query(&self, query: &str) -> String {
        let expanded = self.expand_terms(query);
        if expanded.is_empty() {
            return query.to_string();
        }
        let mut parts = vec![query.to_string()];
        for (term, synonyms) in &expanded {
            let term_lower = term.to_lowercase();
            let alternatives: Vec<&str> = synonyms
                .iter()
                .filter(|s| s.to_lowercase() != term_lower)
                .take(3)
                .map(String::as_str)
                .collect();
            if !alternatives.is_empty() {
                parts.push(format!("({})", alternatives.join(" OR ")));
            }
        }
        parts.join(" ")
    }

    /// Canonical terms whose canonical or variant text starts with the
    /// given prefix, sorted for stable completion lists.
    pub fn suggest_terms(&self, partial: &str) -> Vec<String> {
        let prefix = partial.to_lowercase();
        let mut out: Vec<String> = self
            .store
            .all_terms()
            .iter()
            .filter(|e| {
                e.canonical.starts_with(&prefix)
                    || e.variants.iter().any(|v| v.to_lowercase().starts_with(&prefix))
            })
            .map(|e| e.canonical.clone())
            .collect();
        out.sort();
        out.dedup();
        out
    }
}
