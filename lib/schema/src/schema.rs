//! Schema definitions
//!
//! A [`Schema`] mirrors the subset of JSON Schema that generative model
//! APIs accept for tool and prompt descriptions. Values are built by the
//! [`SchemaCompiler`](crate::SchemaCompiler) and never mutated afterwards.

use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use serde_json::Value;

/// JSON Schema primitive type names
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    Null,
    Boolean,
    Number,
    String,
    Object,
    Array,
}

/// The `type` keyword: a single name or a list of alternatives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SchemaType {
    Single(JsonType),
    Multiple(Vec<JsonType>),
}

/// Types accepted where the source type is `any` or `unknown`.
/// Arrays are not part of the set.
pub const OPEN_TYPES: [JsonType; 5] = [
    JsonType::Null,
    JsonType::Boolean,
    JsonType::Number,
    JsonType::String,
    JsonType::Object,
];

/// Derived description of a value's shape
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,

    /// Member schemas in declaration order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_items: Option<Vec<Schema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<Schema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<Schema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Schema {
    /// Schema with just a `type`
    pub fn of_type(json_type: JsonType) -> Self {
        Self {
            schema_type: Some(SchemaType::Single(json_type)),
            ..Default::default()
        }
    }

    /// Schema with just a `const`
    pub fn constant(value: Value) -> Self {
        Self {
            const_value: Some(value),
            ..Default::default()
        }
    }

    /// `{type: "array", items}`
    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of_type(JsonType::Array)
        }
    }

    /// Placeholder for values of unknown shape
    pub fn open() -> Self {
        Self {
            schema_type: Some(SchemaType::Multiple(OPEN_TYPES.to_vec())),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Property schema by name, for object schemas
    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties.as_ref()?.get(name)
    }

    /// Whether `name` is listed in `required`
    pub fn is_required(&self, name: &str) -> bool {
        self.required
            .as_ref()
            .is_some_and(|required| required.iter().any(|r| r == name))
    }
}

/// Description of a callable: its parameters object and return value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Object schema with one property per parameter; absent for
    /// parameterless functions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Schema>,

    pub returns: Schema,
}

/// Fatal derivation failures.
///
/// Each aborts the schema of the declaration being compiled; other
/// declarations are unaffected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("cannot derive schema for type {0}")]
    Unsupported(String),

    #[error("tuple type {0} has more than one rest element")]
    MultipleRestElements(String),

    #[error("type parameter {0} has no constraint")]
    UnconstrainedTypeParameter(String),

    #[error("recursive type {0} cannot be described")]
    RecursiveType(String),

    #[error("literal {0} has no JSON representation")]
    InvalidLiteral(String),

    #[error(transparent)]
    Core(#[from] toolmeta_core::Error),
}
