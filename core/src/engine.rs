//! Holds the collection, the stopword list and the active model.
//!
//! The engine is single threaded: activating a model builds all of its indexes
//! before returning, and replacing the collection rebuilds the active model.

use crate::cleanup::StopWords;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::metrics::{evaluate_results, Metrics, ReferenceTable};
use crate::models::{Model, ModelKind};
use crate::porter::stem_all;
use crate::search::{
    buckley_lewit_search, inverted_list_search, linear_search, signature_search, SearchHit, SearchOptions,
};
use crate::{Collection, DocId, Document};

pub struct Engine {
    config: EngineConfig,
    collection: Collection,
    stop_words: StopWords,
    model: Option<Model>,
}

/// Ids must equal positions; every model and the Boolean universe rely on it.
fn renumber(collection: &mut [Document]) {
    let mut moved = 0usize;
    for (position, doc) in collection.iter_mut().enumerate() {
        if doc.document_id as usize != position {
            doc.document_id = position as DocId;
            moved += 1;
        }
    }
    if moved > 0 {
        tracing::warn!(moved, num_docs = collection.len(), "document ids did not match positions, renumbered");
    }
}

impl Engine {
    /// Takes a snapshot of the collection; ids are made dense and stemmed
    /// terms are recomputed from `terms`.
    pub fn new(mut collection: Collection, stop_words: StopWords, config: EngineConfig) -> Self {
        renumber(&mut collection);
        stem_all(&mut collection);
        Self { config: config.sanitized(), collection, stop_words, model: None }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn collection(&self) -> &[Document] {
        &self.collection
    }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> {
        self.collection.get(doc_id as usize)
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    pub fn active_model(&self) -> Option<ModelKind> {
        self.model.as_ref().map(Model::kind)
    }

    /// Builds `kind` from the current collection and makes it the active model.
    /// On failure the previously active model stays in place.
    pub fn activate(&mut self, kind: ModelKind) -> Result<()> {
        let model = Model::build(kind, &self.collection, &self.stop_words, &self.config)?;
        self.model = Some(model);
        Ok(())
    }

    /// Swaps in a new collection snapshot and rebuilds the active model, if any.
    pub fn replace_collection(&mut self, collection: Collection, stop_words: StopWords) -> Result<()> {
        let active = self.active_model();
        let mut collection = collection;
        renumber(&mut collection);
        stem_all(&mut collection);
        self.collection = collection;
        self.stop_words = stop_words;
        self.model = None;
        if let Some(kind) = active {
            self.activate(kind)?;
        }
        Ok(())
    }

    /// Runs `query` against the active model. Boolean hits come in document
    /// order with score 1.0; vector hits are ranked.
    pub fn search(&self, query: &str, options: SearchOptions) -> Result<Vec<SearchHit>> {
        let model = self.model.as_ref().ok_or(EngineError::NoActiveModel)?;
        let hits = match model {
            Model::Linear(m) => linear_search(m, &self.collection, &self.stop_words, query, options)?,
            Model::Inverted(m) => inverted_list_search(m, self.collection.len(), &self.stop_words, query, options),
            Model::Signature(m) => signature_search(m, &self.collection, &self.stop_words, query, options),
            Model::Vector(m) => buckley_lewit_search(m, query, options, self.config.gamma),
        };
        Ok(hits)
    }

    /// Precision and recall of `hits` for the raw `query` under the active model.
    pub fn evaluate(&self, reference: &ReferenceTable, query: &str, hits: &[SearchHit]) -> Result<Metrics> {
        let kind = self.active_model().ok_or(EngineError::NoActiveModel)?;
        Ok(evaluate_results(kind, reference, query, hits, self.collection.len()))
    }
}
