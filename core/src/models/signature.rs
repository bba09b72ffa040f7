//! Signature files: every block of D consecutive terms is summarised by the
//! OR of its term hashes, giving a Bloom-style membership filter per block.

use super::RetrievalModel;
use crate::cleanup::{remove_stop_words, StopWords};
use crate::config::{EngineConfig, SignatureConfig};
use crate::porter::stem;
use crate::{DocId, DocSet, Document};

/// doc id -> block signatures of that document.
pub type SignatureFile = Vec<Vec<u64>>;

/// Ascending primes up to and including `limit` (sieve of Eratosthenes).
pub fn primes_up_to(limit: usize) -> Vec<u64> {
    let mut is_prime = vec![true; limit + 1];
    let mut primes = Vec::new();
    for i in 2..=limit {
        if is_prime[i] {
            primes.push(i as u64);
            let mut multiple = i * i;
            while multiple <= limit {
                is_prime[multiple] = false;
                multiple += i;
            }
        }
    }
    primes
}

/// Term hash of F bits with at least `min_bits` bits set.
#[derive(Debug, Clone)]
pub struct SignatureHasher {
    width: u32,
    min_bits: u32,
    primes: Vec<u64>,
}

impl SignatureHasher {
    pub fn new(config: &SignatureConfig) -> Self {
        Self {
            width: config.width.clamp(1, 64),
            min_bits: config.min_bits.min(config.width.clamp(1, 64)),
            primes: primes_up_to(config.prime_limit),
        }
    }

    pub fn hash(&self, word: &str) -> u64 {
        let width = i64::from(self.width);
        let mut result = 0u64;
        for &p in &self.primes {
            let mut h: i64 = 0;
            for c in word.chars() {
                let letter = c as i64 - 'a' as i64 + 1;
                h = ((h + letter) * p as i64).rem_euclid(width);
            }
            result |= 1u64 << h;
            if result.count_ones() >= self.min_bits {
                return result;
            }
        }
        // Not enough distinct bits from the prime rounds: fill from bit 0 upward.
        for bit in 0..self.width {
            if result.count_ones() >= self.min_bits {
                break;
            }
            result |= 1u64 << bit;
        }
        result
    }

    /// One signature per `block_size` terms; a trailing partial block is kept.
    pub fn block_signatures<'a>(&self, terms: impl IntoIterator<Item = &'a str>, block_size: usize) -> Vec<u64> {
        let mut blocks = Vec::new();
        let mut block = 0u64;
        let mut filled = 0usize;
        for term in terms {
            block |= self.hash(term);
            filled += 1;
            if filled == block_size {
                blocks.push(block);
                block = 0;
                filled = 0;
            }
        }
        if filled > 0 {
            blocks.push(block);
        }
        blocks
    }
}

/// Which of the four signature files to consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureVariant {
    Plain,
    Stemmed,
    Filtered,
    StemmedFiltered,
}

impl SignatureVariant {
    pub fn select(stemming: bool, stopword_filtering: bool) -> Self {
        match (stemming, stopword_filtering) {
            (false, false) => SignatureVariant::Plain,
            (true, false) => SignatureVariant::Stemmed,
            (false, true) => SignatureVariant::Filtered,
            (true, true) => SignatureVariant::StemmedFiltered,
        }
    }
}

pub struct SignatureBasedBooleanModel {
    hasher: SignatureHasher,
    plain: SignatureFile,
    stemmed: SignatureFile,
    filtered: SignatureFile,
    stemmed_filtered: SignatureFile,
}

/// Block signatures of a document plus the stemming flag used for verification.
#[derive(Debug, Clone)]
pub struct SignatureDocRepr {
    pub doc_id: DocId,
    pub blocks: Vec<u64>,
    pub stemming: bool,
}

impl SignatureBasedBooleanModel {
    pub fn hasher(&self) -> &SignatureHasher {
        &self.hasher
    }

    pub fn file(&self, variant: SignatureVariant) -> &SignatureFile {
        match variant {
            SignatureVariant::Plain => &self.plain,
            SignatureVariant::Stemmed => &self.stemmed,
            SignatureVariant::Filtered => &self.filtered,
            SignatureVariant::StemmedFiltered => &self.stemmed_filtered,
        }
    }

    /// Documents whose signatures may contain `term`. No false negatives.
    pub fn candidates(&self, term: &str, variant: SignatureVariant) -> Vec<DocId> {
        let pattern = self.hasher.hash(term);
        self.file(variant)
            .iter()
            .enumerate()
            .filter(|(_, blocks)| blocks_contain(blocks, pattern))
            .map(|(id, _)| id as DocId)
            .collect()
    }

    /// Signature candidates confirmed against the documents' term lists.
    pub fn lookup(&self, collection: &[Document], term: &str, stemming: bool, stopword_filtering: bool) -> DocSet {
        let variant = SignatureVariant::select(stemming, stopword_filtering);
        self.candidates(term, variant)
            .into_iter()
            .filter(|&id| {
                collection.get(id as usize).is_some_and(|doc| {
                    let terms = if stemming { &doc.stemmed_terms } else { &doc.terms };
                    terms.iter().any(|t| t == term)
                })
            })
            .collect()
    }
}

fn blocks_contain(blocks: &[u64], pattern: u64) -> bool {
    blocks.iter().any(|&block| block & pattern == pattern)
}

impl RetrievalModel for SignatureBasedBooleanModel {
    type DocumentRepr = SignatureDocRepr;
    type QueryRepr = String;

    fn build(collection: &[Document], stop_words: &StopWords, config: &EngineConfig) -> Self {
        let hasher = SignatureHasher::new(&config.signature);
        let d = config.signature.block_size.max(1);
        let mut model = Self {
            plain: Vec::with_capacity(collection.len()),
            stemmed: Vec::with_capacity(collection.len()),
            filtered: Vec::with_capacity(collection.len()),
            stemmed_filtered: Vec::with_capacity(collection.len()),
            hasher,
        };
        for doc in collection {
            let filtered = if doc.filtered_terms.is_empty() {
                remove_stop_words(&doc.terms, stop_words)
            } else {
                doc.filtered_terms.clone()
            };
            let stemmed_filtered: Vec<String> = filtered.iter().map(|t| stem(t)).collect();
            model.plain.push(model.hasher.block_signatures(doc.terms.iter().map(String::as_str), d));
            model.stemmed.push(model.hasher.block_signatures(doc.stemmed_terms.iter().map(String::as_str), d));
            model.filtered.push(model.hasher.block_signatures(filtered.iter().map(String::as_str), d));
            model
                .stemmed_filtered
                .push(model.hasher.block_signatures(stemmed_filtered.iter().map(String::as_str), d));
        }
        tracing::debug!(width = config.signature.width, block_size = d, docs = collection.len(), "signature files built");
        model
    }

    fn document_to_representation(&self, document: &Document, stopword_filtering: bool, stemming: bool) -> SignatureDocRepr {
        let variant = SignatureVariant::select(stemming, stopword_filtering);
        SignatureDocRepr {
            doc_id: document.document_id,
            blocks: self.file(variant).get(document.document_id as usize).cloned().unwrap_or_default(),
            stemming,
        }
    }

    fn query_to_representation(&self, query: &str) -> String {
        query.to_lowercase()
    }

    /// Signature filter only; candidates still need verification against the terms.
    fn matches(&self, document: &SignatureDocRepr, query: &String) -> f64 {
        if blocks_contain(&document.blocks, self.hasher.hash(query)) { 1.0 } else { 0.0 }
    }
}
