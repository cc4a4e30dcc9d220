//! Type to schema compilation
//!
//! Walks a resolved type descriptor and produces its [`Schema`]. Titles
//! and descriptions come from explicit overrides, the declaration's doc
//! comment or the type's own declaration, in that order.

use ahash::AHashSet;
use indexmap::IndexMap;
use serde_json::Value;
use toolmeta_core::{
    json_number, CommentCache, DocComment, ElementFlag, Member, TypeArena, TypeDescriptor, TypeId,
    TypeKind,
};

use crate::schema::{JsonType, Schema, SchemaError};

pub type Result<T> = std::result::Result<T, SchemaError>;

/// Caller-supplied title or description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Override<'a> {
    /// Resolve from comments and declarations
    #[default]
    Inherit,
    /// Leave the field out
    Suppress,
    Set(&'a str),
}

impl<'a> Override<'a> {
    fn from_option(value: Option<&'a str>) -> Self {
        value.map_or(Override::Inherit, Override::Set)
    }

    fn pinned(value: Option<&'a str>) -> Self {
        value.map_or(Override::Suppress, Override::Set)
    }
}

/// Compiles type descriptors of one arena into schemas
pub struct SchemaCompiler<'a> {
    pub(crate) arena: &'a TypeArena,
    pub(crate) comments: &'a CommentCache,
}

impl<'a> SchemaCompiler<'a> {
    pub fn new(arena: &'a TypeArena, comments: &'a CommentCache) -> Self {
        Self { arena, comments }
    }

    /// Schema of `ty`.
    ///
    /// `comment` is the merged doc comment of the declaration being
    /// described. Its `params` double as per-name descriptions for object
    /// members and (keyed by index) tuple slots.
    pub fn schema(
        &self,
        ty: TypeId,
        comment: Option<&DocComment>,
        title: Override<'_>,
        description: Override<'_>,
    ) -> Result<Schema> {
        tracing::trace!(%ty, "compiling schema");
        self.walk().schema(ty, comment, title, description)
    }

    pub(crate) fn walk(&self) -> Walk<'_, 'a> {
        Walk {
            compiler: self,
            path: AHashSet::new(),
        }
    }

    fn declared_description(&self, descriptor: &TypeDescriptor) -> Option<String> {
        self.comments
            .get(descriptor.doc.as_deref())
            .and_then(|doc| doc.description.clone())
    }
}

/// One compilation, tracking the types on the current recursion path
pub(crate) struct Walk<'c, 'a> {
    compiler: &'c SchemaCompiler<'a>,
    path: AHashSet<TypeId>,
}

impl Walk<'_, '_> {
    pub(crate) fn schema(
        &mut self,
        ty: TypeId,
        comment: Option<&DocComment>,
        title: Override<'_>,
        description: Override<'_>,
    ) -> Result<Schema> {
        let descriptor = self.compiler.arena.get(ty)?;
        if !self.path.insert(ty) {
            return Err(SchemaError::RecursiveType(descriptor.display()));
        }
        let schema = self.resolve(descriptor, comment, title, description);
        self.path.remove(&ty);
        schema
    }

    fn resolve(
        &mut self,
        descriptor: &TypeDescriptor,
        comment: Option<&DocComment>,
        title: Override<'_>,
        description: Override<'_>,
    ) -> Result<Schema> {
        let arena = self.compiler.arena;
        let constraint = match &descriptor.kind {
            TypeKind::TypeParameter { constraint } => Some(constraint.ok_or_else(|| {
                SchemaError::UnconstrainedTypeParameter(descriptor.display())
            })?),
            _ => None,
        };
        let bound = constraint.map(|c| arena.get(c)).transpose()?;

        let title = match title {
            Override::Set(title) => Some(title.to_string()),
            Override::Suppress => None,
            Override::Inherit => descriptor
                .name
                .clone()
                .or_else(|| bound.and_then(|b| b.name.clone())),
        };
        let description = match description {
            Override::Set(description) => Some(description.to_string()),
            Override::Suppress => None,
            Override::Inherit => comment
                .and_then(|c| c.description.clone())
                .or_else(|| self.compiler.declared_description(descriptor))
                .or_else(|| bound.and_then(|b| self.compiler.declared_description(b))),
        };

        if let Some(constraint) = constraint {
            return self.schema(
                constraint,
                comment,
                Override::pinned(title.as_deref()),
                Override::pinned(description.as_deref()),
            );
        }

        let base = Schema {
            title,
            description,
            ..Default::default()
        };
        self.dispatch(descriptor, comment, base)
    }

    fn dispatch(
        &mut self,
        descriptor: &TypeDescriptor,
        comment: Option<&DocComment>,
        base: Schema,
    ) -> Result<Schema> {
        let arena = self.compiler.arena;
        Ok(match &descriptor.kind {
            TypeKind::Void | TypeKind::Undefined | TypeKind::Null => typed(&base, JsonType::Null),
            TypeKind::BooleanLiteral { value } => Schema {
                const_value: Some(Value::Bool(*value)),
                ..base
            },
            TypeKind::NumberLiteral { value } => Schema {
                const_value: Some(
                    json_number(*value)
                        .ok_or_else(|| SchemaError::InvalidLiteral(value.to_string()))?,
                ),
                ..base
            },
            TypeKind::StringLiteral { value } => Schema {
                const_value: Some(Value::String(value.clone())),
                ..base
            },
            TypeKind::Boolean => typed(&base, JsonType::Boolean),
            TypeKind::Number => typed(&base, JsonType::Number),
            TypeKind::String => typed(&base, JsonType::String),
            TypeKind::Enum { members } => {
                let mut variants = Vec::with_capacity(members.len());
                for &member in members {
                    let doc = self.compiler.comments.get(arena.get(member)?.doc.as_deref());
                    variants.push(self.schema(
                        member,
                        doc.as_deref(),
                        Override::Inherit,
                        Override::Inherit,
                    )?);
                }
                Schema {
                    any_of: Some(variants),
                    ..base
                }
            }
            TypeKind::Tuple { elements } => self.tuple(descriptor, elements, comment, base)?,
            TypeKind::Array { element } => Schema {
                items: Some(Box::new(self.inherit(*element)?)),
                ..typed(&base, JsonType::Array)
            },
            TypeKind::Object { members, .. } => {
                match (descriptor.name.as_deref(), descriptor.type_arguments.as_slice()) {
                    (Some("Set"), [element]) => Schema {
                        items: Some(Box::new(self.inherit(*element)?)),
                        ..typed(&base, JsonType::Array)
                    },
                    (Some("Map"), [_, value]) => Schema {
                        additional_properties: Some(Box::new(self.inherit(*value)?)),
                        ..typed(&base, JsonType::Object)
                    },
                    _ => self.object(members, comment, typed(&base, JsonType::Object))?,
                }
            }
            TypeKind::Any | TypeKind::Unknown => merge(base, Schema::open()),
            TypeKind::Union { types } => {
                let mut variants = Vec::with_capacity(types.len());
                for &alternative in types {
                    if matches!(arena.get(alternative)?.kind, TypeKind::Undefined)
                        || arena.is_callable(alternative)?
                    {
                        continue;
                    }
                    variants.push(self.inherit(alternative)?);
                }
                match variants.len() {
                    0 => typed(&base, JsonType::Null),
                    1 => {
                        let single = variants.pop().unwrap_or_default();
                        merge(single, base)
                    }
                    _ => Schema {
                        any_of: Some(variants),
                        ..base
                    },
                }
            }
            TypeKind::Intersection { types } => {
                let mut parts = Vec::with_capacity(types.len());
                for &part in types {
                    parts.push(self.inherit(part)?);
                }
                Schema {
                    all_of: Some(parts),
                    ..base
                }
            }
            TypeKind::Function { .. }
            | TypeKind::TypeParameter { .. }
            | TypeKind::Unsupported { .. } => {
                return Err(SchemaError::Unsupported(descriptor.display()))
            }
        })
    }

    fn inherit(&mut self, ty: TypeId) -> Result<Schema> {
        self.schema(ty, None, Override::Inherit, Override::Inherit)
    }

    fn tuple(
        &mut self,
        descriptor: &TypeDescriptor,
        elements: &[toolmeta_core::TupleElement],
        comment: Option<&DocComment>,
        base: Schema,
    ) -> Result<Schema> {
        let rest_slots = elements
            .iter()
            .filter(|e| e.flag == ElementFlag::Rest)
            .count();
        if rest_slots > 1 {
            return Err(SchemaError::MultipleRestElements(descriptor.display()));
        }

        let mut fixed = Vec::with_capacity(elements.len());
        let mut rest = None;
        let mut all_required = true;
        for (index, element) in elements.iter().enumerate() {
            if element.flag == ElementFlag::Rest {
                rest = Some(self.inherit(element.ty)?);
                continue;
            }
            all_required &= element.flag == ElementFlag::Required;
            let described = comment.and_then(|c| c.params.get(&index.to_string()));
            fixed.push(self.schema(
                element.ty,
                None,
                Override::Inherit,
                Override::from_option(described.map(String::as_str)),
            )?);
        }

        let array = merge(base, Schema::of_type(JsonType::Array));
        let uniform = fixed.windows(2).all(|pair| pair[0] == pair[1]);
        if rest.is_none() && all_required && uniform {
            if let Some(first) = fixed.first().cloned() {
                return Ok(Schema {
                    items: Some(Box::new(first)),
                    min_items: Some(fixed.len()),
                    max_items: Some(fixed.len()),
                    ..array
                });
            }
        }
        Ok(Schema {
            prefix_items: Some(fixed),
            items: rest.map(Box::new),
            ..array
        })
    }

    fn object(
        &mut self,
        members: &[Member],
        comment: Option<&DocComment>,
        base: Schema,
    ) -> Result<Schema> {
        let mut properties = IndexMap::new();
        let mut required = Vec::new();
        for member in members {
            if member.symbol || self.compiler.arena.is_callable(member.ty)? {
                continue;
            }
            let doc = self.compiler.comments.get(member.doc.as_deref());
            let described = doc
                .as_ref()
                .and_then(|d| d.description.as_deref())
                .or_else(|| comment.and_then(|c| c.params.get(&member.name).map(String::as_str)));

            let mut schema = self.schema(
                member.ty,
                doc.as_deref(),
                Override::Inherit,
                Override::from_option(described),
            )?;
            schema.default = declared_default(doc.as_deref(), member.initializer.as_ref());
            let defaulted = schema.default.is_some() || member.initializer.is_some();
            if !member.optional && !defaulted {
                required.push(member.name.clone());
            }
            properties.insert(member.name.clone(), schema);
        }

        Ok(Schema {
            properties: Some(properties),
            required: (!required.is_empty()).then_some(required),
            ..base
        })
    }
}

/// Default value from a `@default` tag, else from a statically evaluable
/// initializer. Tag text that is not JSON is taken verbatim as a string.
pub(crate) fn declared_default(
    doc: Option<&DocComment>,
    initializer: Option<&toolmeta_core::Initializer>,
) -> Option<Value> {
    doc.and_then(|d| d.tag("default"))
        .map(|text| {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        })
        .or_else(|| initializer.and_then(|init| init.evaluate()))
}

fn typed(base: &Schema, json_type: JsonType) -> Schema {
    merge(base.clone(), Schema::of_type(json_type))
}

/// Overlay the set fields of `top` onto `bottom`
fn merge(bottom: Schema, top: Schema) -> Schema {
    Schema {
        schema_type: top.schema_type.or(bottom.schema_type),
        title: top.title.or(bottom.title),
        description: top.description.or(bottom.description),
        const_value: top.const_value.or(bottom.const_value),
        properties: top.properties.or(bottom.properties),
        required: top.required.or(bottom.required),
        items: top.items.or(bottom.items),
        prefix_items: top.prefix_items.or(bottom.prefix_items),
        min_items: top.min_items.or(bottom.min_items),
        max_items: top.max_items.or(bottom.max_items),
        additional_properties: top.additional_properties.or(bottom.additional_properties),
        any_of: top.any_of.or(bottom.any_of),
        all_of: top.all_of.or(bottom.all_of),
        default: top.default.or(bottom.default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use toolmeta_core::{Initializer, TupleElement};

    fn compile(arena: &TypeArena, ty: TypeId) -> Result<Schema> {
        let comments = CommentCache::new();
        SchemaCompiler::new(arena, &comments).schema(ty, None, Override::Inherit, Override::Inherit)
    }

    fn object(members: Vec<Member>) -> TypeKind {
        TypeKind::Object { members, callable: false }
    }

    #[test]
    fn test_primitives_and_literals() {
        let mut arena = TypeArena::new();
        let s = arena.add(TypeKind::String);
        let t = arena.add(TypeKind::BooleanLiteral { value: true });
        let n = arena.add(TypeKind::NumberLiteral { value: 42.0 });
        let u = arena.add(TypeKind::Undefined);

        assert_eq!(compile(&arena, s).unwrap(), Schema::of_type(JsonType::String));
        assert_eq!(compile(&arena, t).unwrap(), Schema::constant(json!(true)));
        assert_eq!(compile(&arena, n).unwrap(), Schema::constant(json!(42)));
        assert_eq!(compile(&arena, u).unwrap(), Schema::of_type(JsonType::Null));
    }

    #[test]
    fn test_object_required_and_optional() {
        let mut arena = TypeArena::new();
        let s = arena.add(TypeKind::String);
        let n = arena.add(TypeKind::Number);
        let person = arena.add(object(vec![Member::new("name", s), Member::new("age", n).optional()]));

        let schema = compile(&arena, person).unwrap();
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "type": "object",
                "properties": {"name": {"type": "string"}, "age": {"type": "number"}},
                "required": ["name"]
            })
        );
    }

    #[test]
    fn test_properties_keep_declaration_order() {
        let mut arena = TypeArena::new();
        let s = arena.add(TypeKind::String);
        let n = arena.add(TypeKind::Number);
        let person = arena.add(object(vec![
            Member::new("name", s),
            Member::new("age", n).optional(),
            Member::new("city", s),
        ]));

        let schema = compile(&arena, person).unwrap();
        assert_eq!(
            serde_json::to_string(&schema).unwrap(),
            r#"{"type":"object","properties":{"name":{"type":"string"},"age":{"type":"number"},"city":{"type":"string"}},"required":["name","city"]}"#
        );
    }

    #[test]
    fn test_member_defaults() {
        let mut arena = TypeArena::new();
        let n = arena.add(TypeKind::Number);
        let s = arena.add(TypeKind::String);
        let opts = arena.add(object(vec![
            Member::new("limit", n).with_doc("Max results\n@default 10"),
            Member::new("mode", s).with_doc("@default fast"),
            Member::new("scale", n).with_initializer(Initializer::literal(2.5)),
            Member::new("seed", n).with_initializer(Initializer::Expression {
                text: "Math.random()".to_string(),
            }),
            Member::new("query", s),
        ]));

        let schema = compile(&arena, opts).unwrap();
        let limit = schema.property("limit").unwrap();
        assert_eq!(limit.default, Some(json!(10)));
        assert_eq!(limit.description.as_deref(), Some("Max results"));
        assert_eq!(schema.property("mode").unwrap().default, Some(json!("fast")));
        assert_eq!(schema.property("scale").unwrap().default, Some(json!(2.5)));
        assert_eq!(schema.property("seed").unwrap().default, None);
        assert_eq!(schema.required, Some(vec!["query".to_string()]));
    }

    #[test]
    fn test_object_skips_methods_and_symbols() {
        let mut arena = TypeArena::new();
        let s = arena.add(TypeKind::String);
        let method = arena.add(TypeKind::Function {
            signature: toolmeta_core::Signature { parameters: vec![], returns: s },
        });
        let mut symbol = Member::new("iterator", s);
        symbol.symbol = true;
        let obj = arena.add(object(vec![Member::new("name", s), Member::new("greet", method), symbol]));

        let schema = compile(&arena, obj).unwrap();
        let properties = schema.properties.unwrap();
        assert_eq!(properties.keys().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_member_description_falls_back_to_params() {
        let mut arena = TypeArena::new();
        let s = arena.add(TypeKind::String);
        let obj = arena.add(object(vec![
            Member::new("city", s),
            Member::new("country", s).with_doc("Own description"),
        ]));
        let comment = DocComment::parse("@param city The city\n@param country From params");

        let comments = CommentCache::new();
        let schema = SchemaCompiler::new(&arena, &comments)
            .schema(obj, Some(&comment), Override::Inherit, Override::Inherit)
            .unwrap();
        assert_eq!(schema.property("city").unwrap().description.as_deref(), Some("The city"));
        assert_eq!(
            schema.property("country").unwrap().description.as_deref(),
            Some("Own description")
        );
    }

    #[test]
    fn test_uniform_tuple_collapses() {
        let mut arena = TypeArena::new();
        let s = arena.add(TypeKind::String);
        let pair = arena.add(TypeKind::Tuple {
            elements: vec![TupleElement::required(s), TupleElement::required(s)],
        });
        assert_eq!(
            serde_json::to_value(compile(&arena, pair).unwrap()).unwrap(),
            json!({"type": "array", "items": {"type": "string"}, "minItems": 2, "maxItems": 2})
        );
    }

    #[test]
    fn test_mixed_tuple_uses_prefix_items() {
        let mut arena = TypeArena::new();
        let s = arena.add(TypeKind::String);
        let n = arena.add(TypeKind::Number);
        let b = arena.add(TypeKind::Boolean);
        let tuple = arena.add(TypeKind::Tuple {
            elements: vec![
                TupleElement::required(s),
                TupleElement::required(n),
                TupleElement::rest(b),
            ],
        });
        assert_eq!(
            serde_json::to_value(compile(&arena, tuple).unwrap()).unwrap(),
            json!({
                "type": "array",
                "prefixItems": [{"type": "string"}, {"type": "number"}],
                "items": {"type": "boolean"}
            })
        );
    }

    #[test]
    fn test_tuple_with_optional_slot_does_not_collapse() {
        let mut arena = TypeArena::new();
        let s = arena.add(TypeKind::String);
        let tuple = arena.add(TypeKind::Tuple {
            elements: vec![TupleElement::required(s), TupleElement::optional(s)],
        });
        let schema = compile(&arena, tuple).unwrap();
        assert_eq!(schema.prefix_items.map(|p| p.len()), Some(2));
        assert_eq!(schema.min_items, None);
    }

    #[test]
    fn test_tuple_slot_descriptions() {
        let mut arena = TypeArena::new();
        let n = arena.add(TypeKind::Number);
        let point = arena.add(TypeKind::Tuple {
            elements: vec![TupleElement::required(n), TupleElement::required(n)],
        });
        let comment = DocComment::parse("@param 0 latitude\n@param 1 longitude");

        let comments = CommentCache::new();
        let schema = SchemaCompiler::new(&arena, &comments)
            .schema(point, Some(&comment), Override::Inherit, Override::Inherit)
            .unwrap();
        let slots = schema.prefix_items.unwrap();
        assert_eq!(slots[0].description.as_deref(), Some("latitude"));
        assert_eq!(slots[1].description.as_deref(), Some("longitude"));
    }

    #[test]
    fn test_multiple_rest_elements_fail() {
        let mut arena = TypeArena::new();
        let s = arena.add(TypeKind::String);
        let tuple = arena.add(TypeKind::Tuple {
            elements: vec![TupleElement::rest(s), TupleElement::rest(s)],
        });
        assert!(matches!(
            compile(&arena, tuple),
            Err(SchemaError::MultipleRestElements(_))
        ));
    }

    #[test]
    fn test_containers() {
        let mut arena = TypeArena::new();
        let s = arena.add(TypeKind::String);
        let n = arena.add(TypeKind::Number);
        let set = arena.push(
            TypeDescriptor::new(object(vec![]))
                .named("Set")
                .with_type_arguments(vec![s]),
        );
        let map = arena.push(
            TypeDescriptor::new(object(vec![]))
                .named("Map")
                .with_type_arguments(vec![s, n]),
        );
        let list = arena.add(TypeKind::Array { element: n });

        assert_eq!(
            serde_json::to_value(compile(&arena, set).unwrap()).unwrap(),
            json!({"type": "array", "title": "Set", "items": {"type": "string"}})
        );
        assert_eq!(
            serde_json::to_value(compile(&arena, map).unwrap()).unwrap(),
            json!({"type": "object", "title": "Map", "additionalProperties": {"type": "number"}})
        );
        assert_eq!(compile(&arena, list).unwrap(), Schema::array(Schema::of_type(JsonType::Number)));
    }

    #[test]
    fn test_enum_members_carry_docs() {
        let mut arena = TypeArena::new();
        let red = arena.push(
            TypeDescriptor::new(TypeKind::StringLiteral { value: "red".into() }).with_doc("Warm"),
        );
        let blue = arena.add(TypeKind::StringLiteral { value: "blue".into() });
        let color = arena.push(
            TypeDescriptor::new(TypeKind::Enum { members: vec![red, blue] })
                .named("Color")
                .with_doc("A color"),
        );

        assert_eq!(
            serde_json::to_value(compile(&arena, color).unwrap()).unwrap(),
            json!({
                "title": "Color",
                "description": "A color",
                "anyOf": [{"const": "red", "description": "Warm"}, {"const": "blue"}]
            })
        );
    }

    #[test]
    fn test_union_singleton_inlines() {
        let mut arena = TypeArena::new();
        let n = arena.add(TypeKind::Number);
        let u = arena.add(TypeKind::Undefined);
        let maybe = arena.add(TypeKind::Union { types: vec![n, u] });
        assert_eq!(compile(&arena, maybe).unwrap(), Schema::of_type(JsonType::Number));
    }

    #[test]
    fn test_union_drops_callables() {
        let mut arena = TypeArena::new();
        let s = arena.add(TypeKind::String);
        let n = arena.add(TypeKind::Number);
        let f = arena.add(TypeKind::Function {
            signature: toolmeta_core::Signature { parameters: vec![], returns: s },
        });
        let union = arena.add(TypeKind::Union { types: vec![s, f, n] });
        assert_eq!(
            compile(&arena, union).unwrap().any_of,
            Some(vec![Schema::of_type(JsonType::String), Schema::of_type(JsonType::Number)])
        );
    }

    #[test]
    fn test_intersection() {
        let mut arena = TypeArena::new();
        let s = arena.add(TypeKind::String);
        let a = arena.add(object(vec![Member::new("a", s)]));
        let b = arena.add(object(vec![Member::new("b", s)]));
        let both = arena.add(TypeKind::Intersection { types: vec![a, b] });
        assert_eq!(compile(&arena, both).unwrap().all_of.map(|p| p.len()), Some(2));
    }

    #[test]
    fn test_any_is_open() {
        let mut arena = TypeArena::new();
        let any = arena.add(TypeKind::Any);
        let unknown = arena.add(TypeKind::Unknown);
        assert_eq!(compile(&arena, any).unwrap(), Schema::open());
        assert_eq!(compile(&arena, unknown).unwrap(), Schema::open());
    }

    #[test]
    fn test_type_parameter_uses_constraint() {
        let mut arena = TypeArena::new();
        let s = arena.push(TypeDescriptor::new(TypeKind::String).named("Name").with_doc("A name"));
        let t = arena.add(TypeKind::TypeParameter { constraint: Some(s) });
        let free = arena.add(TypeKind::TypeParameter { constraint: None });

        let schema = compile(&arena, t).unwrap();
        assert_eq!(schema.title.as_deref(), Some("Name"));
        assert_eq!(schema.description.as_deref(), Some("A name"));
        assert_eq!(schema.schema_type, Schema::of_type(JsonType::String).schema_type);
        assert!(matches!(
            compile(&arena, free),
            Err(SchemaError::UnconstrainedTypeParameter(_))
        ));
    }

    #[test]
    fn test_title_and_description_overrides() {
        let mut arena = TypeArena::new();
        let s = arena.push(TypeDescriptor::new(TypeKind::String).named("City").with_doc("Declared"));
        let comments = CommentCache::new();
        let compiler = SchemaCompiler::new(&arena, &comments);

        let inherited = compiler.schema(s, None, Override::Inherit, Override::Inherit).unwrap();
        assert_eq!(inherited.title.as_deref(), Some("City"));
        assert_eq!(inherited.description.as_deref(), Some("Declared"));

        let overridden = compiler
            .schema(s, None, Override::Suppress, Override::Set("Given"))
            .unwrap();
        assert_eq!(overridden.title, None);
        assert_eq!(overridden.description.as_deref(), Some("Given"));
    }

    #[test]
    fn test_recursive_type_is_reported() {
        let mut arena = TypeArena::new();
        let node = arena.add(TypeKind::Null);
        let children = arena.add(TypeKind::Array { element: node });
        arena
            .set(
                node,
                TypeDescriptor::new(object(vec![Member::new("children", children)])).named("Tree"),
            )
            .unwrap();

        assert_eq!(
            compile(&arena, node),
            Err(SchemaError::RecursiveType("Tree".to_string()))
        );
    }

    #[test]
    fn test_shared_types_are_not_recursive() {
        let mut arena = TypeArena::new();
        let s = arena.add(TypeKind::String);
        let inner = arena.add(object(vec![Member::new("x", s)]));
        let outer = arena.add(object(vec![Member::new("a", inner), Member::new("b", inner)]));
        assert!(compile(&arena, outer).is_ok());
    }

    #[test]
    fn test_unsupported_kinds() {
        let mut arena = TypeArena::new();
        let big = arena.add(TypeKind::Unsupported { text: "bigint".to_string() });
        assert_eq!(
            compile(&arena, big).unwrap_err().to_string(),
            "cannot derive schema for type bigint"
        );
    }

    #[test]
    fn test_deterministic() {
        let mut arena = TypeArena::new();
        let s = arena.add(TypeKind::String);
        let n = arena.add(TypeKind::Number);
        let obj = arena.add(object(vec![Member::new("b", s), Member::new("a", n).optional()]));
        assert_eq!(compile(&arena, obj).unwrap(), compile(&arena, obj).unwrap());
    }
}
