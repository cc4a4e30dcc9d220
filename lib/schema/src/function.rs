//! Function-level schemas
//!
//! Tools and prompts are described by a [`FunctionSchema`]: an object
//! schema over their parameters plus the schema of the (awaited) return
//! value. It can be built from a declared signature or from a call site
//! whose arguments expression and return type are known statically.

use indexmap::IndexMap;
use std::collections::BTreeMap;
use toolmeta_core::{DocComment, Signature, TypeId};

use crate::compiler::{declared_default, Override, Result, SchemaCompiler};
use crate::schema::{FunctionSchema, JsonType, Schema};

impl SchemaCompiler<'_> {
    /// Schema of a declared function signature
    ///
    /// Parameter descriptions come from each parameter's own doc comment,
    /// else from the function comment's `@param`. The return value is
    /// described by `@returns`.
    pub fn function_schema(
        &self,
        signature: &Signature,
        name: Option<&str>,
        comment: Option<&DocComment>,
    ) -> Result<FunctionSchema> {
        let mut walk = self.walk();

        let parameters = if signature.parameters.is_empty() {
            None
        } else {
            let mut properties = IndexMap::new();
            let mut required = Vec::new();
            for parameter in &signature.parameters {
                let doc = self.comments.get(parameter.doc.as_deref());
                let described = doc
                    .as_ref()
                    .and_then(|d| d.description.as_deref())
                    .or_else(|| {
                        comment.and_then(|c| c.params.get(&parameter.name).map(String::as_str))
                    });

                let mut schema = walk.schema(
                    parameter.ty,
                    doc.as_deref(),
                    Override::Inherit,
                    described.map_or(Override::Inherit, Override::Set),
                )?;
                schema.default = declared_default(doc.as_deref(), parameter.initializer.as_ref());
                let defaulted = schema.default.is_some() || parameter.initializer.is_some();
                if !parameter.optional && !defaulted {
                    required.push(parameter.name.clone());
                }
                properties.insert(parameter.name.clone(), schema);
            }
            Some(Schema {
                properties: Some(properties),
                required: (!required.is_empty()).then_some(required),
                ..Schema::of_type(JsonType::Object)
            })
        };

        let returns = self.returns_schema(signature.returns, comment)?;
        Ok(FunctionSchema {
            name: name.map(str::to_string),
            description: comment.and_then(|c| c.description.clone()),
            parameters,
            returns,
        })
    }

    /// Schema of a call site
    ///
    /// `arguments` is the static type of the arguments expression and
    /// `returns` the explicitly supplied result type. Per-parameter
    /// descriptions come from `descriptions`.
    pub fn call_site_schema(
        &self,
        arguments: TypeId,
        returns: TypeId,
        name: Option<&str>,
        comment: Option<&DocComment>,
        descriptions: &BTreeMap<String, String>,
    ) -> Result<FunctionSchema> {
        let described = DocComment {
            params: descriptions.clone(),
            ..Default::default()
        };
        let parameters =
            self.walk()
                .schema(arguments, Some(&described), Override::Inherit, Override::Inherit)?;
        let returns = self.returns_schema(returns, comment)?;

        Ok(FunctionSchema {
            name: name.map(str::to_string),
            description: comment.and_then(|c| c.description.clone()),
            parameters: Some(parameters),
            returns,
        })
    }

    fn returns_schema(&self, returns: TypeId, comment: Option<&DocComment>) -> Result<Schema> {
        let awaited = self.arena.awaited(returns)?;
        let described = comment.and_then(|c| c.returns.as_deref());
        self.walk().schema(
            awaited,
            None,
            Override::Inherit,
            described.map_or(Override::Inherit, Override::Set),
        )
    }
}
