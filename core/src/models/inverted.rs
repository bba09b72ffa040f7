use super::RetrievalModel;
use crate::cleanup::StopWords;
use crate::config::EngineConfig;
use crate::{DocId, DocSet, Document};
use std::collections::HashMap;

/// term -> ids of the documents containing it.
pub type InvertedList = HashMap<String, DocSet>;

pub struct InvertedListBooleanModel {
    stemmed: InvertedList,
    non_stemmed: InvertedList,
}

/// A document as seen by the inverted-list model: its id and which list to consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvertedDocRepr {
    pub doc_id: DocId,
    pub stemming: bool,
}

fn accumulate<'a>(list: &mut InvertedList, doc_id: DocId, terms: impl IntoIterator<Item = &'a String>) {
    for term in terms {
        match list.get_mut(term.as_str()) {
            Some(ids) => {
                ids.insert(doc_id);
            }
            None => {
                list.insert(term.clone(), DocSet::from([doc_id]));
            }
        }
    }
}

impl InvertedListBooleanModel {
    pub fn list(&self, stemming: bool) -> &InvertedList {
        if stemming { &self.stemmed } else { &self.non_stemmed }
    }

    /// Documents containing `term`; empty when the term is unknown.
    pub fn lookup(&self, term: &str, stemming: bool) -> DocSet {
        self.list(stemming).get(term).cloned().unwrap_or_default()
    }
}

impl RetrievalModel for InvertedListBooleanModel {
    type DocumentRepr = InvertedDocRepr;
    type QueryRepr = String;

    fn build(collection: &[Document], _stop_words: &StopWords, _config: &EngineConfig) -> Self {
        let mut stemmed = InvertedList::new();
        let mut non_stemmed = InvertedList::new();
        for doc in collection {
            accumulate(&mut stemmed, doc.document_id, &doc.stemmed_terms);
            accumulate(&mut non_stemmed, doc.document_id, &doc.terms);
        }
        tracing::debug!(stemmed_terms = stemmed.len(), terms = non_stemmed.len(), "inverted lists built");
        Self { stemmed, non_stemmed }
    }

    fn document_to_representation(&self, document: &Document, _stopword_filtering: bool, stemming: bool) -> InvertedDocRepr {
        InvertedDocRepr { doc_id: document.document_id, stemming }
    }

    fn query_to_representation(&self, query: &str) -> String {
        query.to_lowercase()
    }

    fn matches(&self, document: &InvertedDocRepr, query: &String) -> f64 {
        let hit = self
            .list(document.stemming)
            .get(query.as_str())
            .is_some_and(|ids| ids.contains(&document.doc_id));
        if hit { 1.0 } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::porter::stem_all;

    #[test]
    fn lists_are_sorted_and_unique() {
        let mut docs = vec![
            Document::new(0, "a", "fox fox crow"),
            Document::new(1, "b", "foxes and crows"),
            Document::new(2, "c", "crow"),
        ];
        stem_all(&mut docs);
        let model = InvertedListBooleanModel::build(&docs, &StopWords::new(), &EngineConfig::default());
        assert_eq!(model.lookup("fox", false), DocSet::from([0]));
        assert_eq!(model.lookup("fox", true), DocSet::from([0, 1]));
        assert_eq!(model.lookup("crow", true).into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(model.lookup("wolf", false).is_empty());

        let repr = model.document_to_representation(&docs[1], false, true);
        assert_eq!(model.matches(&repr, &"crow".to_string()), 1.0);
        assert_eq!(model.matches(&repr, &"wolf".to_string()), 0.0);
    }
}
