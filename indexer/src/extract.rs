//! Splits a plain-text fable collection into documents.

use anyhow::{anyhow, Context, Result};
use irs_core::cleanup::normalize_text;
use irs_core::{Collection, DocId, Document};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Heading that precedes the first fable title.
pub const START_MARKER: &str = "\n\n\nAesop's Fables";
const SECTION_BREAK: &str = "\n\n\n";

/// Extracts alternating title / body sections following [`START_MARKER`].
/// Ids start at `first_id`; a trailing title without a body is dropped.
pub fn extract_collection(text: &str, first_id: DocId) -> Result<Collection> {
    let text = text.replace("\r\n", "\n");
    let start = text.find(START_MARKER).ok_or_else(|| anyhow!("start marker {START_MARKER:?} not found"))?;
    // skip the marker and the character right after it
    let rest = text[start + START_MARKER.len()..].get(1..).unwrap_or("");
    let sections: Vec<&str> = rest.split(SECTION_BREAK).skip(1).collect();

    let mut collection = Collection::new();
    for pair in sections.chunks_exact(2) {
        let document_id = first_id + collection.len() as DocId;
        collection.push(Document::new(document_id, pair[0].trim(), normalize_text(pair[1])));
    }
    Ok(collection)
}

/// `.txt` files under `input` in sorted path order; a file input is returned as is.
pub fn source_files(input: &Path) -> Vec<PathBuf> {
    if input.is_file() {
        return vec![input.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("txt"))
        .collect();
    files.sort();
    files
}

/// Extracts every source file under `input` into one collection with dense ids.
pub fn extract_path(input: &Path) -> Result<Collection> {
    let mut collection = Collection::new();
    for file in source_files(input) {
        let text = fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
        let docs = extract_collection(&text, collection.len() as DocId)
            .with_context(|| format!("extracting {}", file.display()))?;
        tracing::info!(file = %file.display(), documents = docs.len(), "extracted");
        collection.extend(docs);
    }
    Ok(collection)
}
