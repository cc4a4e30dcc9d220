use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error in {path:?}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Embedding provider failed for model {model}: {source}")]
    Provider {
        model: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Embedding provider returned {actual} vectors for {expected} phrases (model {model})")]
    ProviderMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },
}
