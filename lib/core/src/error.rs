use thiserror::Error;

use crate::identity::NodeId;
use crate::types::TypeId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unknown type id: {0}")]
    UnknownType(TypeId),

    #[error("Unknown syntax node id: {0}")]
    UnknownNode(NodeId),

    #[error("Syntax node {0} is its own ancestor")]
    CyclicNode(NodeId),

    #[error("Invalid embedding blob: {0}")]
    InvalidEmbedding(String),

    #[error("Invalid embedding length: {len} bytes is not a multiple of 4")]
    InvalidEmbeddingLength { len: usize },
}
