//! Buckley & Lewit top-k retrieval over weight-sorted postings.
//!
//! Query terms are processed in descending weight order while a score
//! accumulator is kept per document. Document weights are normalized, so a
//! document can gain at most the sum of the unprocessed query weights. Once
//! the gap between rank `gamma - 1` and rank `gamma` exceeds that bound the
//! membership of the top `gamma` can no longer change and processing stops.

use crate::models::vector::WeightedInvertedList;
use crate::DocId;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// At most `gamma + 1` documents, best first.
    pub hits: Vec<(DocId, f64)>,
    /// Number of query terms whose postings were read.
    pub terms_processed: usize,
    /// Whether the bound ended processing before the last term.
    pub pruned: bool,
}

fn ranked(scores: &HashMap<DocId, f64>) -> Vec<(DocId, f64)> {
    let mut list: Vec<(DocId, f64)> = scores.iter().map(|(&d, &s)| (d, s)).collect();
    list.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    list
}

/// Ranks documents for `query_vector` (terms sorted by weight, highest first).
pub fn buckley_lewit(query_vector: &[(String, f64)], postings: &WeightedInvertedList, gamma: usize) -> Ranking {
    // remaining[i] = sum of the weights after term i
    let mut remaining = vec![0.0; query_vector.len()];
    for i in (0..query_vector.len().saturating_sub(1)).rev() {
        remaining[i] = remaining[i + 1] + query_vector[i + 1].1;
    }

    let mut scores: HashMap<DocId, f64> = HashMap::new();
    let mut top: Vec<(DocId, f64)> = Vec::new();
    let mut terms_processed = 0;
    let mut pruned = false;
    for (i, (term, weight)) in query_vector.iter().enumerate() {
        if *weight <= 0.0 {
            continue;
        }
        if let Some(list) = postings.get(term) {
            for p in list {
                *scores.entry(p.doc_id).or_insert(0.0) += p.weight * weight;
            }
        }
        terms_processed += 1;
        top = ranked(&scores);
        if gamma > 0 && top.len() > gamma && top[gamma - 1].1 > top[gamma].1 + remaining[i] {
            pruned = i + 1 < query_vector.len();
            tracing::debug!(terms_processed, remaining = remaining[i], "buckley-lewit bound reached");
            break;
        }
    }
    top.truncate(gamma + 1);
    Ranking { hits: top, terms_processed, pruned }
}

/// Reference ranking: the `k` best positive scores, ties broken by doc id.
pub fn exhaustive_top_k(scores: impl IntoIterator<Item = (DocId, f64)>, k: usize) -> Vec<(DocId, f64)> {
    let mut list: Vec<(DocId, f64)> = scores.into_iter().filter(|&(_, s)| s > 0.0).collect();
    list.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    list.truncate(k);
    list
}
