//! Plain-text source adapter.
//!
//! The engine treats document parsing as an external concern; this loader
//! is the one adapter shipped with the workspace. It turns `.txt` files
//! into [`SourceDocument`] values for the pipeline.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::SourceDocument;

pub struct TextLoader;

impl TextLoader {
    /// Read a single text file into a source document. Falls back to a
    /// lossy decode for files that are not valid UTF-8.
    pub fn load_file(path: &Path) -> Result<SourceDocument> {
        let full_text = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => String::from_utf8_lossy(&fs::read(path)?).to_string(),
        };
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let file_type = path
            .extension()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "txt".to_string());
        let file_size = fs::metadata(path).ok().map(|m| m.len());
        Ok(SourceDocument {
            file_name,
            file_path: path.to_string_lossy().to_string(),
            file_type,
            full_text,
            total_pages: None,
            file_size,
        })
    }

    /// All `.txt` files under `root`, sorted for reproducible ingest order.
    pub fn list_txt_files(root: &Path) -> Vec<PathBuf> {
        let mut txt_files = Vec::new();
        for entry in walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("txt") {
                txt_files.push(path.to_path_buf());
            }
        }
        txt_files.sort();
        txt_files
    }
}
