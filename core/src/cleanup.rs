//! Symbol stripping and stopword handling.

use crate::Document;
use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref SYMBOLS: Regex = Regex::new(r#"'s|[.?!,;_\-()\[\]"'/]"#).expect("valid regex");
}

pub type StopWords = HashSet<String>;

/// Terms in at most this share of the collection size are stopwords (Crouch).
pub const LOW_FREQUENCY_THRESHOLD: f64 = 0.01;
/// Terms in at least this share of the collection size are stopwords (Crouch).
pub const HIGH_FREQUENCY_THRESHOLD: f64 = 0.6;

/// Removes punctuation and possessive `'s`; newlines become spaces.
pub fn remove_symbols(text: &str) -> String {
    SYMBOLS.replace_all(text, "").replace('\n', " ").trim().to_string()
}

/// Text as stored in a document body: symbols stripped, NFKC, lowercase.
pub fn normalize_text(text: &str) -> String {
    remove_symbols(text).nfkc().collect::<String>().to_lowercase()
}

pub fn is_stop_word(term: &str, stop_words: &StopWords) -> bool {
    stop_words.contains(term)
}

pub fn remove_stop_words(terms: &[String], stop_words: &StopWords) -> Vec<String> {
    terms.iter().filter(|t| !is_stop_word(t, stop_words)).cloned().collect()
}

/// Fills `filtered_terms` of every document; `terms` is left untouched.
pub fn filter_collection(collection: &mut [Document], stop_words: &StopWords) {
    for doc in collection.iter_mut() {
        doc.filtered_terms = remove_stop_words(&doc.terms, stop_words);
    }
}

/// Loads a stopword list from a `.json` array or a `.txt` file with one word per line.
/// Missing files and unknown extensions give an empty list.
pub fn load_stop_word_list(path: impl AsRef<Path>) -> Result<StopWords> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "stopword file not found, using empty list");
            return Ok(StopWords::new());
        }
        Err(e) => return Err(e.into()),
    };
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let words: Vec<String> = serde_json::from_str(&text)?;
            Ok(words.into_iter().collect())
        }
        Some("txt") => Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()),
        _ => Ok(StopWords::new()),
    }
}

/// Crouch's method: every term whose total occurrence count is very low or very
/// high relative to the number of documents.
pub fn stop_words_by_frequency(collection: &[Document]) -> StopWords {
    let mut frequencies: HashMap<&str, usize> = HashMap::new();
    for doc in collection {
        for term in &doc.terms {
            *frequencies.entry(term.as_str()).or_insert(0) += 1;
        }
    }
    let n = collection.len() as f64;
    frequencies
        .into_iter()
        .filter(|&(_, count)| {
            let count = count as f64;
            count <= LOW_FREQUENCY_THRESHOLD * n || count >= HIGH_FREQUENCY_THRESHOLD * n
        })
        .map(|(term, _)| term.to_string())
        .collect()
}
