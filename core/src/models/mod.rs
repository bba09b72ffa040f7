//! Retrieval models. Each model builds its indexes once, when it is activated,
//! and is immutable afterwards.

use crate::cleanup::StopWords;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::Document;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod inverted;
pub mod linear;
pub mod signature;
pub mod vector;

pub use inverted::InvertedListBooleanModel;
pub use linear::LinearBooleanModel;
pub use signature::SignatureBasedBooleanModel;
pub use vector::VectorSpaceModel;

/// Capability shared by every retrieval model.
pub trait RetrievalModel {
    /// Model-specific view of one document.
    type DocumentRepr;
    /// Model-specific view of a query.
    type QueryRepr;

    fn build(collection: &[Document], stop_words: &StopWords, config: &EngineConfig) -> Self
    where
        Self: Sized;

    fn document_to_representation(
        &self,
        document: &Document,
        stopword_filtering: bool,
        stemming: bool,
    ) -> Self::DocumentRepr;

    fn query_to_representation(&self, query: &str) -> Self::QueryRepr;

    /// 1.0 / 0.0 for the Boolean models, a similarity weight for the vector model.
    fn matches(&self, document: &Self::DocumentRepr, query: &Self::QueryRepr) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Linear,
    Inverted,
    Signature,
    Vector,
    Fuzzy,
}

impl ModelKind {
    pub fn is_boolean(self) -> bool {
        !matches!(self, ModelKind::Vector | ModelKind::Fuzzy)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModelKind::Linear => "Boolean Model (Linear)",
            ModelKind::Inverted => "Boolean Model (Inverted List)",
            ModelKind::Signature => "Boolean Model (Signatures)",
            ModelKind::Vector => "Vector Space Model",
            ModelKind::Fuzzy => "Fuzzy Set Model",
        })
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(ModelKind::Linear),
            "inverted" => Ok(ModelKind::Inverted),
            "signature" => Ok(ModelKind::Signature),
            "vector" => Ok(ModelKind::Vector),
            "fuzzy" => Ok(ModelKind::Fuzzy),
            other => Err(format!("unknown model {other:?}")),
        }
    }
}

/// An activated model with its indexes.
pub enum Model {
    Linear(LinearBooleanModel),
    Inverted(InvertedListBooleanModel),
    Signature(SignatureBasedBooleanModel),
    Vector(VectorSpaceModel),
}

impl Model {
    /// Builds the indexes of `kind`. The fuzzy set model has no implementation.
    pub fn build(
        kind: ModelKind,
        collection: &[Document],
        stop_words: &StopWords,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let start = std::time::Instant::now();
        let model = match kind {
            ModelKind::Linear => Model::Linear(LinearBooleanModel::build(collection, stop_words, config)),
            ModelKind::Inverted => {
                Model::Inverted(InvertedListBooleanModel::build(collection, stop_words, config))
            }
            ModelKind::Signature => {
                Model::Signature(SignatureBasedBooleanModel::build(collection, stop_words, config))
            }
            ModelKind::Vector => Model::Vector(VectorSpaceModel::build(collection, stop_words, config)),
            ModelKind::Fuzzy => return Err(EngineError::NotImplemented("fuzzy set model")),
        };
        tracing::info!(model = %kind, num_docs = collection.len(), took_ms = start.elapsed().as_millis() as u64, "model built");
        Ok(model)
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Model::Linear(_) => ModelKind::Linear,
            Model::Inverted(_) => ModelKind::Inverted,
            Model::Signature(_) => ModelKind::Signature,
            Model::Vector(_) => ModelKind::Vector,
        }
    }
}
