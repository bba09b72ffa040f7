//! Precision and recall against a reference relevance table.
//!
//! Both measures return [`NO_REFERENCE`] (-1) when the table has nothing to
//! say about the query and 0.0 when nothing was retrieved.

use crate::models::ModelKind;
use crate::porter::stem;
use crate::query::{evaluate, parse, Operand};
use crate::search::SearchHit;
use crate::{universe, DocId, DocSet};
use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const NO_REFERENCE: f64 = -1.0;

/// Stemmed term -> ids of the documents judged relevant for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceTable {
    entries: HashMap<String, DocSet>,
}

impl ReferenceTable {
    /// Parses `term - id, id, ...` lines with 1-based ids; a blank line ends the table.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = HashMap::new();
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                break;
            }
            let (term, ids) = line
                .split_once('-')
                .ok_or_else(|| anyhow!("line {}: missing '-' separator", line_no + 1))?;
            let mut relevant = DocSet::new();
            for id in ids.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let id: DocId = id.parse().with_context(|| format!("line {}: bad id {id:?}", line_no + 1))?;
                if id == 0 {
                    bail!("line {}: ids are 1-based", line_no + 1);
                }
                relevant.insert(id - 1);
            }
            entries.insert(stem(&term.trim().to_lowercase()), relevant);
        }
        Ok(Self { entries })
    }

    /// Loads the table from disk. A missing file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading reference table {}", path.display()))?;
        let table = Self::parse(&text)?;
        tracing::info!(path = %path.display(), terms = table.len(), "reference table loaded");
        Ok(table)
    }

    /// Relevant documents for a raw query term (stemmed before lookup).
    pub fn relevant(&self, term: &str) -> Option<&DocSet> {
        self.entries.get(&stem(term))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub precision: f64,
    pub recall: f64,
}

struct MissingReference;

/// Relevant set of a Boolean query, evaluated on the reference table the same
/// way the search evaluates it on an index. `None` if the query does not parse,
/// names a term without a reference entry, or has no relevant document.
pub fn boolean_relevant(table: &ReferenceTable, query: &str, num_docs: usize) -> Option<DocSet> {
    let expr = parse(&query.to_lowercase()).ok()?;
    let mut lookup = |term: &str| table.relevant(term).cloned().map(Operand::Docs).ok_or(MissingReference);
    let relevant = evaluate(&expr, &universe(num_docs), &mut lookup).ok()?.into_docs();
    (!relevant.is_empty()).then_some(relevant)
}

fn retrieved(hits: &[SearchHit]) -> DocSet {
    hits.iter().filter(|h| h.score == 1.0).map(|h| h.doc_id).collect()
}

pub fn boolean_precision(table: &ReferenceTable, query: &str, hits: &[SearchHit], num_docs: usize) -> f64 {
    let Some(relevant) = boolean_relevant(table, query, num_docs) else {
        return NO_REFERENCE;
    };
    let retrieved = retrieved(hits);
    if retrieved.is_empty() {
        return 0.0;
    }
    retrieved.intersection(&relevant).count() as f64 / retrieved.len() as f64
}

pub fn boolean_recall(table: &ReferenceTable, query: &str, hits: &[SearchHit], num_docs: usize) -> f64 {
    let Some(relevant) = boolean_relevant(table, query, num_docs) else {
        return NO_REFERENCE;
    };
    let retrieved = retrieved(hits);
    if retrieved.is_empty() {
        return 0.0;
    }
    retrieved.intersection(&relevant).count() as f64 / relevant.len() as f64
}

/// Union of the reference entries of every query word. `None` if any word has
/// no entry or the union is empty.
pub fn vector_relevant(table: &ReferenceTable, query: &str) -> Option<DocSet> {
    let mut relevant = DocSet::new();
    for word in query.to_lowercase().split_whitespace() {
        relevant.extend(table.relevant(word)?);
    }
    (!relevant.is_empty()).then_some(relevant)
}

/// Precision at the last rank of the result list.
pub fn vector_precision(table: &ReferenceTable, query: &str, hits: &[SearchHit]) -> f64 {
    let Some(relevant) = vector_relevant(table, query) else {
        return NO_REFERENCE;
    };
    let mut precision = 0.0;
    let mut relevant_hits = 0usize;
    for (rank, hit) in hits.iter().enumerate() {
        if relevant.contains(&hit.doc_id) {
            relevant_hits += 1;
        }
        precision = relevant_hits as f64 / (rank + 1) as f64;
    }
    precision
}

/// Cumulative recall after each rank.
pub fn recall_curve(hits: &[SearchHit], relevant: &DocSet) -> Vec<f64> {
    let step = 1.0 / relevant.len() as f64;
    let mut total = 0.0;
    hits.iter()
        .map(|hit| {
            if relevant.contains(&hit.doc_id) {
                total += step;
            }
            total
        })
        .collect()
}

/// Recall at the last rank of the result list.
pub fn vector_recall(table: &ReferenceTable, query: &str, hits: &[SearchHit]) -> f64 {
    let Some(relevant) = vector_relevant(table, query) else {
        return NO_REFERENCE;
    };
    recall_curve(hits, &relevant).last().copied().unwrap_or(0.0)
}

/// Precision and recall of `hits` for the raw (unstemmed) `query`.
pub fn evaluate_results(
    kind: ModelKind,
    table: &ReferenceTable,
    query: &str,
    hits: &[SearchHit],
    num_docs: usize,
) -> Metrics {
    if kind.is_boolean() {
        Metrics {
            precision: boolean_precision(table, query, hits, num_docs),
            recall: boolean_recall(table, query, hits, num_docs),
        }
    } else {
        Metrics { precision: vector_precision(table, query, hits), recall: vector_recall(table, query, hits) }
    }
}
