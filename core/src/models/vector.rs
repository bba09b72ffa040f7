//! TF-IDF vector space model.
//!
//! Document weights are `tf(t,d) * ln(N / n_t) / |d|`, where `|d|` is the L2
//! norm of the unnormalized weights of `d`. Postings are kept in descending
//! weight order for the Buckley-Lewit ranking.

use super::RetrievalModel;
use crate::cleanup::{is_stop_word, remove_symbols, StopWords};
use crate::config::EngineConfig;
use crate::porter::stem;
use crate::{Document, Posting};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref SPACES: Regex = Regex::new(r" +").expect("valid regex");
}

/// term -> postings sorted by weight, highest first.
pub type WeightedInvertedList = HashMap<String, Vec<Posting>>;

fn term_frequencies(terms: &[String]) -> HashMap<&str, u32> {
    let mut tf = HashMap::new();
    for t in terms {
        *tf.entry(t.as_str()).or_insert(0) += 1;
    }
    tf
}

/// Weights for one flavour of term lists (stemmed or not).
#[derive(Debug, Default)]
pub struct VectorIndex {
    num_docs: usize,
    /// Number of documents containing each term at least once.
    document_frequency: HashMap<String, u32>,
    norms: Vec<f64>,
    postings: WeightedInvertedList,
}

impl VectorIndex {
    fn build<'a>(term_lists: impl Iterator<Item = &'a [String]> + Clone, num_docs: usize) -> Self {
        let mut document_frequency: HashMap<String, u32> = HashMap::new();
        for terms in term_lists.clone() {
            for term in term_frequencies(terms).into_keys() {
                *document_frequency.entry(term.to_string()).or_insert(0) += 1;
            }
        }
        let mut index = Self { num_docs, document_frequency, norms: Vec::with_capacity(num_docs), postings: HashMap::new() };

        for (doc_id, terms) in term_lists.enumerate() {
            let tf = term_frequencies(terms);
            let raw: Vec<(&str, f64)> = tf.iter().map(|(&t, &f)| (t, f64::from(f) * index.idf(t))).collect();
            let mut norm = raw.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm == 0.0 {
                norm = 1.0;
            }
            index.norms.push(norm);
            for (term, w) in raw {
                index
                    .postings
                    .entry(term.to_string())
                    .or_default()
                    .push(Posting { doc_id: doc_id as u32, weight: w / norm });
            }
        }
        for list in index.postings.values_mut() {
            list.sort_by(|a, b| b.weight.total_cmp(&a.weight).then(a.doc_id.cmp(&b.doc_id)));
        }
        index
    }

    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    /// `ln(N / n_t)`, zero for unknown terms.
    pub fn idf(&self, term: &str) -> f64 {
        match self.document_frequency.get(term) {
            Some(&n) if n > 0 => (self.num_docs as f64 / f64::from(n)).ln(),
            _ => 0.0,
        }
    }

    pub fn postings(&self) -> &WeightedInvertedList {
        &self.postings
    }

    pub fn norm(&self, doc_id: usize) -> Option<f64> {
        self.norms.get(doc_id).copied()
    }

    /// Normalized weight of every distinct term of a document.
    pub fn document_vector(&self, doc_id: usize, terms: &[String]) -> HashMap<String, f64> {
        let norm = self.norm(doc_id).unwrap_or(1.0);
        term_frequencies(terms)
            .into_iter()
            .map(|(t, f)| (t.to_string(), f64::from(f) * self.idf(t) / norm))
            .collect()
    }

    /// `(0.5 + 0.5 * tf / max_tf) * ln(N / df)` over the raw query term frequencies.
    /// Zero when the term is absent from the query or from the collection.
    pub fn query_term_weight(&self, query_terms: &[String], term: &str) -> f64 {
        let tf = term_frequencies(query_terms);
        let max_tf = tf.values().copied().max().unwrap_or(1).max(1);
        let Some(&f) = tf.get(term) else {
            return 0.0;
        };
        let Some(df) = self.postings.get(term).map(Vec::len).filter(|&n| n > 0) else {
            return 0.0;
        };
        (0.5 + 0.5 * f64::from(f) / f64::from(max_tf)) * (self.num_docs as f64 / df as f64).ln()
    }

    /// Distinct query terms with their weights, highest weight first.
    pub fn query_vector(&self, query_terms: &[String]) -> Vec<(String, f64)> {
        let mut seen: Vec<&String> = Vec::new();
        for t in query_terms {
            if !seen.contains(&t) {
                seen.push(t);
            }
        }
        let mut vector: Vec<(String, f64)> =
            seen.into_iter().map(|t| (t.clone(), self.query_term_weight(query_terms, t))).collect();
        vector.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        vector
    }
}

pub struct VectorSpaceModel {
    stop_words: StopWords,
    stemmed: VectorIndex,
    non_stemmed: VectorIndex,
}

/// Weighted terms of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentVector {
    pub weights: HashMap<String, f64>,
    pub stemming: bool,
    pub stopword_filtering: bool,
}

impl VectorSpaceModel {
    pub fn index(&self, stemming: bool) -> &VectorIndex {
        if stemming { &self.stemmed } else { &self.non_stemmed }
    }

    /// Query terms after stopword removal, symbol stripping and optional stemming.
    pub fn query_terms(&self, query: &str, stemming: bool, stopword_filtering: bool) -> Vec<String> {
        let normalized = self.query_to_representation(query);
        normalized
            .split(' ')
            .filter(|raw| !(stopword_filtering && is_stop_word(raw, &self.stop_words)))
            .map(remove_symbols)
            .filter(|t| !t.is_empty())
            .map(|t| if stemming { stem(&t) } else { t })
            .collect()
    }
}

impl RetrievalModel for VectorSpaceModel {
    type DocumentRepr = DocumentVector;
    type QueryRepr = String;

    fn build(collection: &[Document], stop_words: &StopWords, _config: &EngineConfig) -> Self {
        let n = collection.len();
        let stemmed = VectorIndex::build(collection.iter().map(|d| d.stemmed_terms.as_slice()), n);
        let non_stemmed = VectorIndex::build(collection.iter().map(|d| d.terms.as_slice()), n);
        tracing::debug!(
            stemmed_terms = stemmed.postings.len(),
            terms = non_stemmed.postings.len(),
            "weighted inverted lists built"
        );
        Self { stop_words: stop_words.clone(), stemmed, non_stemmed }
    }

    fn document_to_representation(&self, document: &Document, stopword_filtering: bool, stemming: bool) -> DocumentVector {
        let terms = if stemming { &document.stemmed_terms } else { &document.terms };
        DocumentVector {
            weights: self.index(stemming).document_vector(document.document_id as usize, terms),
            stemming,
            stopword_filtering,
        }
    }

    /// Lowercased, trimmed, runs of spaces collapsed.
    fn query_to_representation(&self, query: &str) -> String {
        SPACES.replace_all(query.to_lowercase().trim(), " ").into_owned()
    }

    /// Full dot product of the query vector with the document vector.
    fn matches(&self, document: &DocumentVector, query: &String) -> f64 {
        let terms = self.query_terms(query, document.stemming, document.stopword_filtering);
        self.index(document.stemming)
            .query_vector(&terms)
            .iter()
            .map(|(t, w)| w * document.weights.get(t).copied().unwrap_or(0.0))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::porter::stem_all;

    fn corpus() -> Vec<Document> {
        let mut docs = vec![
            Document::new(0, "a", "fox fox crow"),
            Document::new(1, "b", "crow grapes"),
            Document::new(2, "c", "lion mouse"),
            Document::new(3, "d", "fox grapes grapes grapes"),
        ];
        stem_all(&mut docs);
        docs
    }

    #[test]
    fn weights_follow_tf_idf() {
        let docs = corpus();
        let model = VectorSpaceModel::build(&docs, &StopWords::new(), &EngineConfig::default());
        let idx = model.index(false);
        let ln2 = 2f64.ln();
        assert!((idx.idf("fox") - ln2).abs() < 1e-12);
        assert_eq!(idx.idf("wolf"), 0.0);

        // doc 0: fox tf 2, crow tf 1, both idf ln 2 -> norm = ln2 * sqrt(5)
        let norm0 = ln2 * 5f64.sqrt();
        assert!((idx.norm(0).unwrap() - norm0).abs() < 1e-12);
        let fox = &idx.postings()["fox"];
        assert_eq!(fox.len(), 2);
        assert_eq!(fox[0].doc_id, 0);
        assert!((fox[0].weight - 2.0 * ln2 / norm0).abs() < 1e-12);
        assert!(fox[0].weight >= fox[1].weight);
    }

    #[test]
    fn postings_sorted_by_weight() {
        let docs = corpus();
        let model = VectorSpaceModel::build(&docs, &StopWords::new(), &EngineConfig::default());
        for list in model.index(true).postings().values() {
            assert!(list.windows(2).all(|w| w[0].weight >= w[1].weight));
        }
    }

    #[test]
    fn query_weights() {
        let docs = corpus();
        let model = VectorSpaceModel::build(&docs, &StopWords::new(), &EngineConfig::default());
        let idx = model.index(false);
        let q: Vec<String> = ["fox", "fox", "lion", "wolf"].iter().map(|s| s.to_string()).collect();
        let ln2 = 2f64.ln();
        assert!((idx.query_term_weight(&q, "fox") - ln2).abs() < 1e-12);
        assert!((idx.query_term_weight(&q, "lion") - 0.75 * 4f64.ln()).abs() < 1e-12);
        assert_eq!(idx.query_term_weight(&q, "wolf"), 0.0);
        assert_eq!(idx.query_term_weight(&q, "crow"), 0.0);

        let v = idx.query_vector(&q);
        assert_eq!(v.iter().map(|(t, _)| t.as_str()).collect::<Vec<_>>(), vec!["lion", "fox", "wolf"]);
    }

    #[test]
    fn query_representation_and_terms() {
        let stop_words: StopWords = ["the".to_string()].into_iter().collect();
        let model = VectorSpaceModel::build(&corpus(), &stop_words, &EngineConfig::default());
        assert_eq!(model.query_to_representation("  The   Fox's  GRAPES "), "the fox's grapes");
        assert_eq!(model.query_terms("The Fox's grapes", false, true), vec!["fox", "grapes"]);
        assert_eq!(model.query_terms("The Fox's grapes", true, false), vec!["the", "fox", "grape"]);
    }

    #[test]
    fn matches_is_dot_product() {
        let docs = corpus();
        let model = VectorSpaceModel::build(&docs, &StopWords::new(), &EngineConfig::default());
        let d0 = model.document_to_representation(&docs[0], false, false);
        let d2 = model.document_to_representation(&docs[2], false, false);
        let idx = model.index(false);
        let expected = idx.query_term_weight(&["fox".to_string()], "fox") * d0.weights["fox"];
        assert!((model.matches(&d0, &"fox".to_string()) - expected).abs() < 1e-12);
        assert_eq!(model.matches(&d2, &"fox".to_string()), 0.0);
    }
}
