//! # toolmeta Core
//!
//! Core library for toolmeta.
//!
//! This crate provides the building blocks every other toolmeta crate
//! works on:
//!
//! - [`DocComment`] - Structured doc comments and their merge rules
//! - [`TypeArena`] - Resolved type descriptors handed over by the analyzer
//! - [`IdentityAssigner`] - Deterministic, path-shaped node identities
//! - [`Namespace`] - Per-section identity conflict resolution
//! - [`Embedding`] - Embedding vectors with a bit-exact text codec
//!
//! ## Example
//!
//! ```rust
//! use toolmeta_core::{CommentCache, IdentityAssigner, Namespace, SyntaxTree};
//!
//! let mut tree = SyntaxTree::new();
//! let root = tree.unit(Some("pkg"), Some("mod"));
//! let foo = tree.key(root, "foo").unwrap();
//!
//! let comments = CommentCache::new();
//! let id = IdentityAssigner::new(&tree, &comments).identity(foo).unwrap();
//! assert_eq!(id, "pkg/mod:foo");
//!
//! let mut tools = Namespace::new();
//! assert_eq!(tools.register(&id), "pkg/mod:foo");
//! assert_eq!(tools.register(&id), "pkg/mod:foo#0");
//! ```

pub mod comment;
pub mod error;
pub mod identity;
pub mod initializer;
pub mod types;
pub mod vector;

pub use comment::{CommentCache, DocComment};
pub use error::{Error, Result};
pub use identity::{is_identifier, IdentityAssigner, Namespace, NodeId, NodeName, SyntaxNode, SyntaxTree};
pub use initializer::{json_number, BinaryOp, Initializer, UnaryOp};
pub use types::{
    ElementFlag, Member, Parameter, Signature, TupleElement, TypeArena, TypeDescriptor, TypeId,
    TypeKind,
};
pub use vector::Embedding;
