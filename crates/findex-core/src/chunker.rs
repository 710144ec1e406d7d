use crate::error::{Error, Result};
use crate::types::{Chunk, Meta};

/// Splits document text into overlapping fixed-size word windows.
///
/// Windows advance by `chunk_size - overlap` words per step; the last
/// window may be shorter than `chunk_size`. Blank input produces no
/// chunks at all.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self { chunk_size: 500, overlap: 50 }
    }
}

impl Chunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be positive".to_string()));
        }
        if overlap >= chunk_size {
            return Err(Error::InvalidConfig(format!(
                "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk(&self, text: &str, metadata: &Meta) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let words: Vec<&str> = text.split_whitespace().collect();
        let step = self.chunk_size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let end = (start + self.chunk_size).min(words.len());
            chunks.push(Chunk {
                text: words[start..end].join(" "),
                chunk_index: chunks.len(),
                start_word: start,
                end_word: end,
                word_count: end - start,
                metadata: metadata.clone(),
            });
            start += step;
        }
        chunks
    }
}
