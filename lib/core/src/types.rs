//! Resolved type descriptors
//!
//! The static-analysis engine hands over every type it resolved for a
//! module as a [`TypeArena`]. Descriptors reference each other by
//! [`TypeId`], so self-referential types are representable; consumers are
//! expected to guard against cycles.
//!
//! The arena is read-only for everything in this workspace.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::initializer::Initializer;
use crate::{Error, Result};

/// Index of a descriptor in its [`TypeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural kind of a type
///
/// Closed on purpose: a shape the engine cannot express through one of the
/// structural arms arrives as [`TypeKind::Unsupported`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeKind {
    Void,
    Undefined,
    Null,
    BooleanLiteral { value: bool },
    NumberLiteral { value: f64 },
    StringLiteral { value: String },
    Boolean,
    Number,
    String,
    /// Enum whose members are literal types carrying their own docs
    Enum { members: Vec<TypeId> },
    Tuple { elements: Vec<TupleElement> },
    Array { element: TypeId },
    /// Object type. `callable` marks objects with call signatures.
    Object {
        #[serde(default)]
        members: Vec<Member>,
        #[serde(default)]
        callable: bool,
    },
    Function { signature: Signature },
    Any,
    Unknown,
    Union { types: Vec<TypeId> },
    Intersection { types: Vec<TypeId> },
    /// Unresolved type parameter with its upper bound, if any
    TypeParameter {
        #[serde(default)]
        constraint: Option<TypeId>,
    },
    /// Anything the engine could not classify, with its display text
    Unsupported { text: String },
}

/// A resolved type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    #[serde(flatten)]
    pub kind: TypeKind,

    /// Declared name (`Person`, `Map`, `Promise`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Generic arguments of a named instantiation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<TypeId>,

    /// Raw doc comment of the declaring node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl TypeDescriptor {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            name: None,
            type_arguments: Vec::new(),
            doc: None,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    #[must_use]
    pub fn with_type_arguments(mut self, args: Vec<TypeId>) -> Self {
        self.type_arguments = args;
        self
    }

    /// Human-readable form used in diagnostics
    pub fn display(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match &self.kind {
            TypeKind::Unsupported { text } => text.clone(),
            TypeKind::BooleanLiteral { value } => value.to_string(),
            TypeKind::NumberLiteral { value } => value.to_string(),
            TypeKind::StringLiteral { value } => format!("{value:?}"),
            kind => format!("{kind:?}")
                .split([' ', '{'])
                .next()
                .unwrap_or_default()
                .to_lowercase(),
        }
    }
}

/// Position kind of a tuple element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementFlag {
    #[default]
    Required,
    Optional,
    Rest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleElement {
    #[serde(rename = "type")]
    pub ty: TypeId,
    #[serde(default)]
    pub flag: ElementFlag,
}

impl TupleElement {
    pub fn required(ty: TypeId) -> Self {
        Self { ty, flag: ElementFlag::Required }
    }

    pub fn optional(ty: TypeId) -> Self {
        Self { ty, flag: ElementFlag::Optional }
    }

    pub fn rest(ty: TypeId) -> Self {
        Self { ty, flag: ElementFlag::Rest }
    }
}

/// Named member of an object type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeId,
    #[serde(default)]
    pub optional: bool,
    /// Symbol-keyed members never appear in schemas
    #[serde(default)]
    pub symbol: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<Initializer>,
}

impl Member {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            symbol: false,
            doc: None,
            initializer: None,
        }
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    #[must_use]
    pub fn with_initializer(mut self, initializer: Initializer) -> Self {
        self.initializer = Some(initializer);
        self
    }
}

/// Parameter of a function signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeId,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<Initializer>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            doc: None,
            initializer: None,
        }
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    #[must_use]
    pub fn with_initializer(mut self, initializer: Initializer) -> Self {
        self.initializer = Some(initializer);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub returns: TypeId,
}

/// All descriptors resolved for one module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeArena {
    types: Vec<TypeDescriptor>,
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor and return its id
    pub fn push(&mut self, descriptor: TypeDescriptor) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(descriptor);
        id
    }

    /// Shorthand for pushing an anonymous descriptor of `kind`
    pub fn add(&mut self, kind: TypeKind) -> TypeId {
        self.push(TypeDescriptor::new(kind))
    }

    /// Replace a descriptor in place. Used to tie recursive knots while
    /// building an arena.
    pub fn set(&mut self, id: TypeId, descriptor: TypeDescriptor) -> Result<()> {
        let slot = self
            .types
            .get_mut(id.0 as usize)
            .ok_or(Error::UnknownType(id))?;
        *slot = descriptor;
        Ok(())
    }

    pub fn get(&self, id: TypeId) -> Result<&TypeDescriptor> {
        self.types.get(id.0 as usize).ok_or(Error::UnknownType(id))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether values of this type can be called
    pub fn is_callable(&self, id: TypeId) -> Result<bool> {
        Ok(match &self.get(id)?.kind {
            TypeKind::Function { .. } => true,
            TypeKind::Object { callable, .. } => *callable,
            _ => false,
        })
    }

    /// Unwrap `Promise<T>` / `PromiseLike<T>` down to `T`
    pub fn awaited(&self, mut id: TypeId) -> Result<TypeId> {
        for _ in 0..=self.types.len() {
            let descriptor = self.get(id)?;
            match (descriptor.name.as_deref(), descriptor.type_arguments.as_slice()) {
                (Some("Promise" | "PromiseLike"), [inner]) => id = *inner,
                _ => return Ok(id),
            }
        }
        Ok(id)
    }
}
