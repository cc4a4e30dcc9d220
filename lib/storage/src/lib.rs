//! # toolmeta storage
//!
//! Persistence and build orchestration:
//!
//! - [`EmbeddingCache`]: `phrase -> model -> vector`, saved as key-sorted JSON
//! - [`fill_missing`]: one batched [`EmbeddingProvider`] call per model
//! - [`Manifest`]: per-module definitions keyed by identity, mergeable
//! - [`BuildSession`]: ties comments, identities, schemas and both stores
//!   together for one build

pub mod config;
pub mod diagnostic;
pub mod embedding_cache;
pub mod error;
pub mod fill;
pub mod manifest;
mod persistence;
pub mod session;

pub use config::{BuildConfig, DEFAULT_CACHE_PATH};
pub use diagnostic::{Diagnostic, Severity};
pub use embedding_cache::EmbeddingCache;
pub use error::{Result, StorageError};
pub use fill::{fill_missing, EmbeddingProvider, FillReport};
pub use manifest::{
    manifest_path, EmbedDefinition, IdiomDefinition, IndexDefinition, Manifest, PromptDefinition,
    ToolDefinition, MANIFEST_SUFFIX,
};
pub use session::{BuildSession, BuildSummary, Declaration, ModuleBuilder};
