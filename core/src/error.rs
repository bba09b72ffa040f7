//! Error types of the retrieval core.

use thiserror::Error;

/// A malformed Boolean query. No partial tree is ever returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("empty query")]
    Empty,
    #[error("unexpected character {found:?} at byte {position}")]
    UnexpectedChar { found: char, position: usize },
    #[error("unexpected {found} at byte {position}")]
    UnexpectedToken { found: String, position: usize },
    #[error("unexpected end of query")]
    UnexpectedEnd,
    #[error("unbalanced parenthesis at byte {position}")]
    UnbalancedParen { position: usize },
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no retrieval model is active")]
    NoActiveModel,

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("invalid query: {0}")]
    Query(#[from] QueryError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
