//! The four search entry points.
//!
//! Parse failures are surfaced differently per path: `linear_search` returns
//! the `QueryError`, the indexed paths log it and return no hits.

use crate::cleanup::{is_stop_word, remove_symbols, StopWords};
use crate::error::QueryError;
use crate::models::{
    InvertedListBooleanModel, LinearBooleanModel, RetrievalModel, SignatureBasedBooleanModel, VectorSpaceModel,
};
use crate::porter::stem;
use crate::query::{evaluate, parse, Expr, Operand};
use crate::ranking::buckley_lewit;
use crate::{universe, DocId, DocSet, Document};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    #[serde(default)]
    pub stopword_filtering: bool,
    #[serde(default)]
    pub stemming: bool,
}

impl SearchOptions {
    pub fn new(stopword_filtering: bool, stemming: bool) -> Self {
        Self { stopword_filtering, stemming }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    /// 1.0 for Boolean matches, the accumulated similarity for ranked results.
    pub score: f64,
}

/// Stopword leaves under filtering are ignored; other leaves are symbol-stripped
/// and optionally stemmed.
fn normalize_leaf(term: &str, stop_words: &StopWords, options: SearchOptions) -> Option<String> {
    if options.stopword_filtering && is_stop_word(term, stop_words) {
        return None;
    }
    let term = remove_symbols(term);
    Some(if options.stemming { stem(&term) } else { term })
}

fn boolean_hits(docs: DocSet) -> Vec<SearchHit> {
    docs.into_iter().map(|doc_id| SearchHit { doc_id, score: 1.0 }).collect()
}

fn evaluate_boolean(
    expr: &Expr,
    num_docs: usize,
    stop_words: &StopWords,
    options: SearchOptions,
    mut resolve: impl FnMut(&str) -> DocSet,
) -> DocSet {
    let mut lookup = |term: &str| -> Result<Operand, Infallible> {
        Ok(match normalize_leaf(term, stop_words, options) {
            Some(t) => Operand::Docs(resolve(&t)),
            None => Operand::Ignored,
        })
    };
    evaluate(expr, &universe(num_docs), &mut lookup)
        .unwrap_or_else(|never| match never {})
        .into_docs()
}

fn parse_or_log(query: &str) -> Option<Expr> {
    match parse(query) {
        Ok(expr) => Some(expr),
        Err(e) => {
            tracing::warn!(query, error = %e, "query rejected");
            None
        }
    }
}

/// Scans every document representation for each query leaf.
pub fn linear_search(
    model: &LinearBooleanModel,
    collection: &[Document],
    stop_words: &StopWords,
    query: &str,
    options: SearchOptions,
) -> Result<Vec<SearchHit>, QueryError> {
    let expr = parse(&model.query_to_representation(query))?;
    let representations: Vec<Vec<String>> = collection
        .iter()
        .map(|d| model.document_to_representation(d, options.stopword_filtering, options.stemming))
        .collect();
    let docs = evaluate_boolean(&expr, collection.len(), stop_words, options, |term| {
        let term = term.to_string();
        collection
            .iter()
            .zip(&representations)
            .filter(|(_, repr)| model.matches(repr, &term) == 1.0)
            .map(|(doc, _)| doc.document_id)
            .collect()
    });
    tracing::debug!(query, hits = docs.len(), "linear search");
    Ok(boolean_hits(docs))
}

pub fn inverted_list_search(
    model: &InvertedListBooleanModel,
    num_docs: usize,
    stop_words: &StopWords,
    query: &str,
    options: SearchOptions,
) -> Vec<SearchHit> {
    let Some(expr) = parse_or_log(&model.query_to_representation(query)) else {
        return Vec::new();
    };
    let docs = evaluate_boolean(&expr, num_docs, stop_words, options, |term| model.lookup(term, options.stemming));
    tracing::debug!(query, hits = docs.len(), "inverted list search");
    boolean_hits(docs)
}

pub fn signature_search(
    model: &SignatureBasedBooleanModel,
    collection: &[Document],
    stop_words: &StopWords,
    query: &str,
    options: SearchOptions,
) -> Vec<SearchHit> {
    let Some(expr) = parse_or_log(&model.query_to_representation(query)) else {
        return Vec::new();
    };
    let docs = evaluate_boolean(&expr, collection.len(), stop_words, options, |term| {
        model.lookup(collection, term, options.stemming, options.stopword_filtering)
    });
    tracing::debug!(query, hits = docs.len(), "signature search");
    boolean_hits(docs)
}

/// Ranked retrieval; returns at most `gamma + 1` hits, best first.
pub fn buckley_lewit_search(
    model: &VectorSpaceModel,
    query: &str,
    options: SearchOptions,
    gamma: usize,
) -> Vec<SearchHit> {
    let terms = model.query_terms(query, options.stemming, options.stopword_filtering);
    let index = model.index(options.stemming);
    let query_vector = index.query_vector(&terms);
    let ranking = buckley_lewit(&query_vector, index.postings(), gamma);
    tracing::debug!(
        query,
        hits = ranking.hits.len(),
        terms_processed = ranking.terms_processed,
        pruned = ranking.pruned,
        "buckley-lewit search"
    );
    ranking.hits.into_iter().map(|(doc_id, score)| SearchHit { doc_id, score }).collect()
}
