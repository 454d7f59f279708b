//! Folder reader standing in for the external ingestion collaborator. Only
//! plain-text files are understood.

use crate::error::Result;
use crate::index::RawDocument;
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

const TEXT_EXTENSIONS: &[&str] = &["txt", "md"];

/// Reads every `.txt`/`.md` file under `dir`, ordered by file name.
///
/// Non-UTF-8 bytes are decoded as Latin-1. Files with blank text are skipped.
pub fn read_folder<P: AsRef<Path>>(dir: P) -> Result<Vec<RawDocument>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(io::Error::new(io::ErrorKind::NotFound, format!("folder not found: {}", dir.display())).into());
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if !p.is_file() {
            continue;
        }
        let ext = p.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase());
        if !matches!(ext.as_deref(), Some(e) if TEXT_EXTENSIONS.contains(&e)) {
            continue;
        }
        let bytes = fs::read(p)?;
        let text = decode(bytes);
        if text.trim().is_empty() {
            tracing::debug!(path = %p.display(), "skipping blank file");
            continue;
        }
        let filename = p.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        documents.push(RawDocument::new(filename, p.to_string_lossy(), text));
    }
    tracing::info!(dir = %dir.display(), num_docs = documents.len(), "read corpus folder");
    Ok(documents)
}

fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}
