use super::RetrievalModel;
use crate::cleanup::{remove_stop_words, StopWords};
use crate::config::EngineConfig;
use crate::porter::stem;
use crate::Document;

/// Boolean model without an index: every query scans all document representations.
pub struct LinearBooleanModel {
    stop_words: StopWords,
}

impl RetrievalModel for LinearBooleanModel {
    type DocumentRepr = Vec<String>;
    type QueryRepr = String;

    fn build(_collection: &[Document], stop_words: &StopWords, _config: &EngineConfig) -> Self {
        Self { stop_words: stop_words.clone() }
    }

    fn document_to_representation(&self, document: &Document, stopword_filtering: bool, stemming: bool) -> Vec<String> {
        let terms = if stopword_filtering {
            remove_stop_words(&document.terms, &self.stop_words)
        } else {
            document.terms.clone()
        };
        if stemming {
            terms.iter().map(|t| stem(t)).collect()
        } else {
            terms
        }
    }

    fn query_to_representation(&self, query: &str) -> String {
        query.to_lowercase()
    }

    fn matches(&self, document: &Vec<String>, query: &String) -> f64 {
        if document.contains(query) { 1.0 } else { 0.0 }
    }
}
