//! Canonical term → variant mappings for domain synonym expansion.
//!
//! The primary map is a flat, insertion-ordered list of entries; the
//! reverse map (any variant, lower-cased, → canonical) is derived state,
//! rebuilt wholesale on load/import and updated in lockstep by every
//! single-entry mutation. Every mutation writes the whole store through
//! to its storage; a failed write rolls the in-memory state back so the
//! store is never half-applied.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use findex_core::error::{Error, Result};

/// One canonical term and its variant spellings. The canonical key is
/// lower-cased and trimmed; variants keep their original casing but are
/// deduplicated case-insensitively, preserving insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    pub canonical: String,
    pub variants: Vec<String>,
}

/// Which operand of a merge survives as the canonical term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKeep {
    First,
    Second,
}

#[derive(Debug, Clone, Serialize)]
pub struct SynonymStats {
    pub canonical_terms: usize,
    pub variant_count: usize,
    pub average_variants: f64,
    pub reverse_mappings: usize,
}

/// Where the store persists itself. The whole store is one document,
/// overwritten wholesale on every mutation.
pub trait TermStorage: Send + Sync {
    fn load(&self) -> anyhow::Result<Vec<TermEntry>>;
    fn save(&self, entries: &[TermEntry]) -> anyhow::Result<()>;
}

/// Pretty-printed JSON document on disk; a missing file is an empty
/// store, not an error.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TermStorage for JsonFileStorage {
    fn load(&self) -> anyhow::Result<Vec<TermEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, entries: &[TermEntry]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

pub struct TermStore {
    entries: Vec<TermEntry>,
    reverse: HashMap<String, String>,
    storage: Box<dyn TermStorage>,
}

impl TermStore {
    pub fn load(storage: Box<dyn TermStorage>) -> Result<Self> {
        let raw = storage.load().map_err(|e| Error::Persistence(e.to_string()))?;
        let mut store = Self { entries: Vec::new(), reverse: HashMap::new(), storage };
        store.entries = normalize_entries(raw);
        store.rebuild_reverse();
        Ok(store)
    }

    pub fn all_terms(&self) -> &[TermEntry] {
        &self.entries
    }

    pub fn export_entries(&self) -> Vec<TermEntry> {
        self.entries.clone()
    }

    /// Resolve a term to its canonical form, or hand the term back
    /// unchanged when it is unknown.
    pub fn get_canonical(&self, term: &str) -> String {
        self.reverse
            .get(&term.trim().to_lowercase())
            .cloned()
            .unwrap_or_else(|| term.to_string())
    }

    /// The full synonym group of a term: canonical first, then variants.
    /// An unknown term yields just itself.
    pub fn synonyms_of(&self, term: &str) -> Vec<String> {
        let key = term.trim().to_lowercase();
        if let Some(canonical) = self.reverse.get(&key) {
            if let Some(entry) = self.entries.iter().find(|e| &e.canonical == canonical) {
                let mut out = vec![entry.canonical.clone()];
                out.extend(entry.variants.iter().cloned());
                return out;
            }
        }
        vec![term.to_string()]
    }

    pub fn validate(&self, term: &str) -> bool {
        self.reverse.contains_key(&term.trim().to_lowercase())
    }

    /// Case-insensitive substring search over canonical and variant text.
    pub fn search(&self, query: &str) -> Vec<TermEntry> {
        let q = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                e.canonical.contains(&q) || e.variants.iter().any(|v| v.to_lowercase().contains(&q))
            })
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> SynonymStats {
        let variant_count: usize = self.entries.iter().map(|e| e.variants.len()).sum();
        let average = if self.entries.is_empty() {
            0.0
        } else {
            variant_count as f64 / self.entries.len() as f64
        };
        SynonymStats {
            canonical_terms: self.entries.len(),
            variant_count,
            average_variants: (average * 100.0).round() / 100.0,
            reverse_mappings: self.reverse.len(),
        }
    }

    /// Add one variant to a canonical term, creating the term if absent.
    /// Returns false when the variant is already present (compared
    /// case-insensitively) or blank.
    pub fn add_variant(&mut self, canonical: &str, variant: &str) -> Result<bool> {
        let canonical = normalize_key(canonical);
        let variant = variant.trim();
        if canonical.is_empty() || variant.is_empty() {
            return Ok(false);
        }
        let variant_lower = variant.to_lowercase();
        let before = self.snapshot();
        match self.position(&canonical) {
            Some(i) => {
                if self.entries[i].variants.iter().any(|v| v.to_lowercase() == variant_lower) {
                    return Ok(false);
                }
                self.entries[i].variants.push(variant.to_string());
            }
            None => {
                self.entries.push(TermEntry {
                    canonical: canonical.clone(),
                    variants: vec![variant.to_string()],
                });
                self.reverse.insert(canonical.clone(), canonical.clone());
            }
        }
        self.reverse.insert(variant_lower, canonical);
        self.persist(before)?;
        Ok(true)
    }

    /// Register a whole new term. Never overwrites: returns false when
    /// the canonical key already exists.
    pub fn add_term(&mut self, canonical: &str, variants: &[String]) -> Result<bool> {
        let canonical = normalize_key(canonical);
        if canonical.is_empty() || self.position(&canonical).is_some() {
            return Ok(false);
        }
        let variants = dedupe_variants(variants);
        let before = self.snapshot();
        self.reverse.insert(canonical.clone(), canonical.clone());
        for v in &variants {
            self.reverse.insert(v.to_lowercase(), canonical.clone());
        }
        self.entries.push(TermEntry { canonical, variants });
        self.persist(before)?;
        Ok(true)
    }

    pub fn remove_variant(&mut self, canonical: &str, variant: &str) -> Result<bool> {
        let canonical = normalize_key(canonical);
        let variant_lower = variant.trim().to_lowercase();
        let Some(i) = self.position(&canonical) else {
            return Ok(false);
        };
        let Some(vi) = self.entries[i].variants.iter().position(|v| v.to_lowercase() == variant_lower)
        else {
            return Ok(false);
        };
        let before = self.snapshot();
        self.entries[i].variants.remove(vi);
        self.reverse.remove(&variant_lower);
        self.persist(before)?;
        Ok(true)
    }

    pub fn remove_term(&mut self, canonical: &str) -> Result<bool> {
        let canonical = normalize_key(canonical);
        let Some(i) = self.position(&canonical) else {
            return Ok(false);
        };
        let before = self.snapshot();
        let entry = self.entries.remove(i);
        self.reverse.remove(&entry.canonical);
        for v in &entry.variants {
            self.reverse.remove(&v.to_lowercase());
        }
        self.persist(before)?;
        Ok(true)
    }

    /// Replace a term's variant list wholesale. Returns false when the
    /// canonical key does not exist.
    pub fn update_term(&mut self, canonical: &str, new_variants: &[String]) -> Result<bool> {
        let canonical = normalize_key(canonical);
        let Some(i) = self.position(&canonical) else {
            return Ok(false);
        };
        let before = self.snapshot();
        for v in &self.entries[i].variants {
            self.reverse.remove(&v.to_lowercase());
        }
        let variants = dedupe_variants(new_variants);
        for v in &variants {
            self.reverse.insert(v.to_lowercase(), canonical.clone());
        }
        self.entries[i].variants = variants;
        self.persist(before)?;
        Ok(true)
    }

    /// Union two terms' variant lists under one surviving canonical. The
    /// losing canonical key disappears and all of its variants repoint to
    /// the survivor. Returns false when either term is absent or both
    /// name the same term.
    pub fn merge_terms(&mut self, term1: &str, term2: &str, keep: MergeKeep) -> Result<bool> {
        let a = normalize_key(term1);
        let b = normalize_key(term2);
        if a == b {
            return Ok(false);
        }
        let (Some(ai), Some(bi)) = (self.position(&a), self.position(&b)) else {
            return Ok(false);
        };
        let (survivor, si, li) = match keep {
            MergeKeep::First => (a, ai, bi),
            MergeKeep::Second => (b, bi, ai),
        };
        let before = self.snapshot();
        let loser_entry = self.entries.remove(li);
        let si = if li < si { si - 1 } else { si };
        self.reverse.remove(&loser_entry.canonical);
        for v in loser_entry.variants {
            let lower = v.to_lowercase();
            self.reverse.insert(lower.clone(), survivor.clone());
            let duplicate = lower == survivor
                || self.entries[si].variants.iter().any(|x| x.to_lowercase() == lower);
            if !duplicate {
                self.entries[si].variants.push(v);
            }
        }
        self.persist(before)?;
        Ok(true)
    }

    /// Wholesale replacement, e.g. from an external import. The reverse
    /// map is recomputed from scratch rather than patched.
    pub fn import_entries(&mut self, entries: Vec<TermEntry>) -> Result<()> {
        let before = self.snapshot();
        self.entries = normalize_entries(entries);
        self.rebuild_reverse();
        self.persist(before)
    }

    fn position(&self, canonical: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.canonical == canonical)
    }

    fn rebuild_reverse(&mut self) {
        let mut reverse = HashMap::new();
        for e in &self.entries {
            reverse.insert(e.canonical.clone(), e.canonical.clone());
            for v in &e.variants {
                reverse.insert(v.to_lowercase(), e.canonical.clone());
            }
        }
        self.reverse = reverse;
    }

    fn snapshot(&self) -> (Vec<TermEntry>, HashMap<String, String>) {
        (self.entries.clone(), self.reverse.clone())
    }

    fn persist(&mut self, before: (Vec<TermEntry>, HashMap<String, String>)) -> Result<()> {
        if let Err(e) = self.storage.save(&self.entries) {
            let (entries, reverse) = before;
            self.entries = entries;
            self.reverse = reverse;
            return Err(Error::Persistence(e.to_string()));
        }
        Ok(())
    }
}

fn normalize_key(canonical: &str) -> String {
    canonical.trim().to_lowercase()
}

fn dedupe_variants(variants: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for v in variants {
        let v = v.trim();
        if v.is_empty() {
            continue;
        }
        let lower = v.to_lowercase();
        if !seen.contains(&lower) {
            seen.push(lower);
            out.push(v.to_string());
        }
    }
    out
}

fn normalize_entries(raw: Vec<TermEntry>) -> Vec<TermEntry> {
    let mut out: Vec<TermEntry> = Vec::new();
    for entry in raw {
        let canonical = normalize_key(&entry.canonical);
        if canonical.is_empty() || out.iter().any(|e| e.canonical == canonical) {
            continue;
        }
        out.push(TermEntry { canonical, variants: dedupe_variants(&entry.variants) });
    }
    out
}
