//! Node identities
//!
//! Every declaration that ends up in a manifest is keyed by a path-shaped
//! identity derived from its syntactic position:
//!
//! ```text
//! my-pkg/src/tools:weather.lookup["display name"][0]
//! ^^^^^^ ^^^^^^^^^ ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^
//! package  module   path of names from the unit root
//! ```
//!
//! Identities are positional: moving or renaming a declaration changes its
//! identity. An explicit `@id` tag overrides the derived path and `@noid`
//! removes a node's own segment while keeping its descendants reachable.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::comment::CommentCache;
use crate::{Error, Result};

/// Index of a node in its [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Local name a node contributes to identities below it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeName {
    /// Root of a compilation unit
    Unit {
        #[serde(default)]
        package: Option<String>,
        #[serde(default)]
        module: Option<String>,
    },
    /// Variable, function, class, property or string key
    Key { name: String },
    /// Array element position or numeric key
    Index { index: usize },
    /// Nodes that are traversed but never named (calls, blocks, ...)
    Anonymous,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
    #[serde(default)]
    pub parent: Option<NodeId>,
    pub name: NodeName,
    /// Raw leading doc comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// Parent-linked view of the syntax positions of one module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a compilation unit root
    pub fn unit(&mut self, package: Option<&str>, module: Option<&str>) -> NodeId {
        self.push(SyntaxNode {
            parent: None,
            name: NodeName::Unit {
                package: package.map(str::to_string),
                module: module.map(str::to_string),
            },
            doc: None,
        })
    }

    /// Add a child of `parent`
    pub fn add(&mut self, parent: NodeId, name: NodeName, doc: Option<&str>) -> Result<NodeId> {
        self.get(parent)?;
        Ok(self.push(SyntaxNode {
            parent: Some(parent),
            name,
            doc: doc.map(str::to_string),
        }))
    }

    /// Add a child named by key
    pub fn key(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        self.add(parent, NodeName::Key { name: name.to_string() }, None)
    }

    fn push(&mut self, node: SyntaxNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Result<&SyntaxNode> {
        self.nodes.get(id.0 as usize).ok_or(Error::UnknownNode(id))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Whether `name` can be written after a `.`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Derives identities for nodes of one syntax tree
pub struct IdentityAssigner<'a> {
    tree: &'a SyntaxTree,
    comments: &'a CommentCache,
}

impl<'a> IdentityAssigner<'a> {
    pub fn new(tree: &'a SyntaxTree, comments: &'a CommentCache) -> Self {
        Self { tree, comments }
    }

    /// Identity of `node`
    ///
    /// The nearest ancestor-or-self with a non-empty `@id` supplies the
    /// prefix; otherwise the path starts at the root.
    pub fn identity(&self, node: NodeId) -> Result<String> {
        let mut visited = AHashSet::new();
        let mut chain = Vec::new();
        let mut path = String::new();

        let mut current = Some(node);
        while let Some(id) = current {
            if !visited.insert(id) {
                return Err(Error::CyclicNode(id));
            }
            let entry = self.tree.get(id)?;
            let doc = self.comments.get(entry.doc.as_deref());
            let explicit = doc
                .as_ref()
                .and_then(|d| d.tag("id"))
                .map(str::trim)
                .filter(|explicit| !explicit.is_empty());
            if let Some(explicit) = explicit {
                path.push_str(explicit);
                break;
            }
            let hidden = doc.as_ref().is_some_and(|d| d.has_tag("noid"));
            chain.push((&entry.name, hidden));
            current = entry.parent;
        }

        for (name, hidden) in chain.into_iter().rev() {
            if !hidden {
                push_segment(&mut path, name);
            }
        }
        Ok(path)
    }

    /// Name suitable for a generated local binding.
    ///
    /// Walks up to the nearest identifier-shaped key, suffixed with the
    /// nearest array index crossed on the way (`tools_2`). Not unique.
    pub fn readable_identifier(&self, node: NodeId) -> Result<Option<String>> {
        let mut index = None;
        let mut visited = AHashSet::new();
        let mut current = Some(node);
        while let Some(id) = current {
            if !visited.insert(id) {
                return Err(Error::CyclicNode(id));
            }
            let entry = self.tree.get(id)?;
            match &entry.name {
                NodeName::Key { name } if is_identifier(name) => {
                    return Ok(Some(match index {
                        Some(i) => format!("{name}_{i}"),
                        None => name.clone(),
                    }));
                }
                NodeName::Index { index: i } if index.is_none() => index = Some(*i),
                _ => {}
            }
            current = entry.parent;
        }
        Ok(None)
    }
}

fn push_segment(path: &mut String, name: &NodeName) {
    match name {
        NodeName::Unit { package, module } => {
            if let Some(package) = package {
                path.push_str(package);
            }
            if let Some(module) = module {
                path.push('/');
                path.push_str(module);
            }
            path.push(':');
        }
        NodeName::Key { name } if is_identifier(name) => {
            if !(path.is_empty() || path.ends_with(':')) {
                path.push('.');
            }
            path.push_str(name);
        }
        NodeName::Key { name } => {
            let quoted = serde_json::to_string(name).unwrap_or_else(|_| format!("\"{name}\""));
            path.push('[');
            path.push_str(&quoted);
            path.push(']');
        }
        NodeName::Index { index } => {
            path.push('[');
            path.push_str(&index.to_string());
            path.push(']');
        }
        NodeName::Anonymous => {}
    }
}

/// Set of identities registered under one manifest section
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    taken: AHashSet<String>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id`, returning the identity actually assigned.
    ///
    /// Taken, empty and bare-root (`pkg/mod:`) identities get the first
    /// free `#n` suffix.
    pub fn register(&mut self, id: &str) -> String {
        let mut assigned = id.to_string();
        if self.taken.contains(id) || id.is_empty() || id.ends_with(':') {
            assigned = (0u64..)
                .map(|n| format!("{id}#{n}"))
                .find(|candidate| !self.taken.contains(candidate))
                .unwrap_or_default();
        }
        self.taken.insert(assigned.clone());
        assigned
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.taken.contains(id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.taken.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}
