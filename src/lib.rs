//! # toolmeta
//!
//! Derives machine-usable metadata from statically typed declarations so
//! they can be described to, and driven by, a generative model.
//!
//! Given a resolved type and its doc comment, toolmeta produces:
//!
//! - a JSON-Schema-style description of the value's shape,
//! - a deterministic identity used as cache and manifest key,
//! - cached embedding vectors for every phrase the declarations reference,
//! - a per-module manifest of tools, prompts, embeds, idioms and indexes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use toolmeta::prelude::*;
//!
//! # async fn build() -> anyhow::Result<()> {
//! let mut types = TypeArena::new();
//! let string = types.add(TypeKind::String);
//! let signature = Signature {
//!     parameters: vec![Parameter::new("city", string)],
//!     returns: string,
//! };
//!
//! let mut tree = SyntaxTree::new();
//! let root = tree.unit(Some("app"), Some("weather"));
//! let forecast = tree.add(
//!     root,
//!     NodeName::Key { name: "forecast".to_string() },
//!     Some("Get the forecast.\n@param city City name"),
//! )?;
//!
//! let mut session = BuildSession::open(BuildConfig::new("."))?;
//! let mut module = session.module(Some("app/weather"), None, &tree, &types);
//! let id = module.register_tool(Declaration::new(forecast), &signature);
//! assert_eq!(id.as_deref(), Some("app/weather:forecast"));
//! module.finish()?;
//!
//! let summary = session.finish(None).await?;
//! assert!(!summary.has_errors());
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - [`toolmeta-core`](toolmeta_core) - Doc comments, type descriptors, identities, embeddings
//! - [`toolmeta-schema`](toolmeta_schema) - Type to schema compiler
//! - [`toolmeta-storage`](toolmeta_storage) - Embedding cache, manifests, build sessions

// Re-export core types
pub use toolmeta_core::{
    CommentCache, DocComment,
    TypeArena, TypeDescriptor, TypeId, TypeKind,
    Member, Parameter, Signature, TupleElement, Initializer,
    SyntaxTree, NodeId, NodeName, IdentityAssigner, Namespace,
    Embedding,
    Error, Result,
};

// Re-export schema compiler
pub use toolmeta_schema::{FunctionSchema, JsonType, Override, Schema, SchemaCompiler, SchemaError};

// Re-export storage
pub use toolmeta_storage::{
    BuildConfig, BuildSession, BuildSummary, Declaration, Diagnostic, EmbeddingCache,
    EmbeddingProvider, Manifest, ModuleBuilder, Severity, StorageError,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CommentCache, DocComment,
        TypeArena, TypeDescriptor, TypeId, TypeKind,
        Member, Parameter, Signature, TupleElement, Initializer,
        SyntaxTree, NodeId, NodeName, IdentityAssigner, Namespace,
        Embedding,
        FunctionSchema, JsonType, Override, Schema, SchemaCompiler,
        BuildConfig, BuildSession, Declaration, EmbeddingCache, EmbeddingProvider, Manifest,
    };
}
