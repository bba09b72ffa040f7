use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod cleanup;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod models;
pub mod persist;
pub mod porter;
pub mod query;
pub mod ranking;
pub mod search;

pub use config::{EngineConfig, SignatureConfig};
pub use engine::Engine;
pub use error::{EngineError, QueryError};
pub use models::{Model, ModelKind};
pub use search::{SearchHit, SearchOptions};

pub type DocId = u32;
/// Sorted, duplicate-free set of document ids.
pub type DocSet = BTreeSet<DocId>;
pub type Collection = Vec<Document>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Position of the document in its collection; never reassigned.
    pub document_id: DocId,
    pub title: String,
    pub raw_text: String,
    #[serde(default)]
    pub terms: Vec<String>,
    /// Only populated when stopword filtering was requested at extraction.
    #[serde(default)]
    pub filtered_terms: Vec<String>,
    /// Only populated when stemming was requested at extraction.
    #[serde(default)]
    pub stemmed_terms: Vec<String>,
}

impl Document {
    /// Builds a document whose `terms` are the space separated words of `raw_text`.
    pub fn new(document_id: DocId, title: impl Into<String>, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let terms = raw_text
            .split(' ')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self { document_id, title: title.into(), raw_text, terms, ..Default::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f64, // normalized tf-idf weight
}

/// All ids of a collection with `num_docs` documents, `{0..num_docs-1}`.
pub fn universe(num_docs: usize) -> DocSet {
    (0..num_docs as DocId).collect()
}
