//! # toolmeta Schema
//!
//! Derives JSON-Schema-like descriptions from resolved type descriptors.
//!
//! ## Overview
//!
//! Tools and prompts exposed to a generative model are described by the
//! shape of their parameters and return values. This crate turns the type
//! descriptors produced by a static analyzer into those descriptions:
//!
//! - [`SchemaCompiler::schema`] - schema of a single type
//! - [`SchemaCompiler::function_schema`] - schema of a declared signature
//! - [`SchemaCompiler::call_site_schema`] - schema of a call site
//!
//! ## Example
//!
//! ```rust
//! use toolmeta_core::{CommentCache, Member, TypeArena, TypeKind};
//! use toolmeta_schema::{Override, SchemaCompiler};
//!
//! let mut arena = TypeArena::new();
//! let string = arena.add(TypeKind::String);
//! let number = arena.add(TypeKind::Number);
//! let person = arena.add(TypeKind::Object {
//!     members: vec![Member::new("name", string), Member::new("age", number).optional()],
//!     callable: false,
//! });
//!
//! let comments = CommentCache::new();
//! let schema = SchemaCompiler::new(&arena, &comments)
//!     .schema(person, None, Override::Inherit, Override::Inherit)
//!     .unwrap();
//! assert_eq!(schema.required, Some(vec!["name".to_string()]));
//! ```
//!
//! ## Dispatch
//!
//! ```text
//! void/undefined/null   -> {type: "null"}
//! literal               -> {const}
//! boolean/number/string -> {type}
//! enum                  -> {anyOf: members}
//! tuple                 -> {type: "array", items, minItems, maxItems} | {prefixItems, items?}
//! array, Set            -> {type: "array", items}
//! Map                   -> {type: "object", additionalProperties}
//! object                -> {type: "object", properties, required}
//! any/unknown           -> {type: [null, boolean, number, string, object]}
//! union                 -> {anyOf} | the single remaining member
//! intersection          -> {allOf}
//! ```

pub mod compiler;
pub mod function;
pub mod schema;

pub use compiler::{Override, SchemaCompiler};
pub use schema::{FunctionSchema, JsonType, Schema, SchemaError, SchemaType, OPEN_TYPES};
