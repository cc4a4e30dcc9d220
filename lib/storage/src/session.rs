//! Build session
//!
//! Build-scoped state shared by every module of one build:
//!
//! ```text
//!   open ──→ module(a) ── register_* ── finish ─┐
//!        ──→ module(b) ── register_* ── finish ─┼─→ finish(provider)
//!        ──→ ...                                ┘     fill cache, save
//! ```
//!
//! Each registration resolves the declaration's comment and identity,
//! compiles its schema, and records the definition under its namespace.
//! Failures are reported as diagnostics and skip only that declaration.

use std::collections::{BTreeMap, BTreeSet};
use std::iter;
use std::path::{Path, PathBuf};
use toolmeta_core::{
    CommentCache, DocComment, IdentityAssigner, Namespace, NodeId, Signature, SyntaxTree,
    TypeArena, TypeId,
};
use toolmeta_schema::{SchemaCompiler, SchemaError};

use crate::config::BuildConfig;
use crate::diagnostic::Diagnostic;
use crate::embedding_cache::EmbeddingCache;
use crate::error::Result;
use crate::fill::{fill_missing, EmbeddingProvider, FillReport};
use crate::manifest::{
    manifest_path, EmbedDefinition, IdiomDefinition, IndexDefinition, Manifest, PromptDefinition,
};

/// Identity namespaces; a conflict in one does not affect the others
#[derive(Debug, Default)]
struct Namespaces {
    tools: Namespace,
    prompts: Namespace,
    embeds: Namespace,
    idioms: Namespace,
    indexes: Namespace,
}

pub struct BuildSession {
    config: BuildConfig,
    cache: EmbeddingCache,
    comments: CommentCache,
    namespaces: Namespaces,
    phrases: BTreeSet<String>,
    diagnostics: Vec<Diagnostic>,
    manifests: Vec<PathBuf>,
}

/// Outcome of a finished build
#[derive(Debug)]
pub struct BuildSummary {
    pub fill: FillReport,
    pub diagnostics: Vec<Diagnostic>,
    /// Manifest files written, in module order
    pub manifests: Vec<PathBuf>,
    pub cache: EmbeddingCache,
}

impl BuildSummary {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

impl BuildSession {
    /// Start a build, loading the embedding cache
    pub fn open(config: BuildConfig) -> Result<Self> {
        let cache = EmbeddingCache::load(config.cache_file())?;
        tracing::info!(
            cache = ?config.cache_file(),
            phrases = cache.len(),
            models = config.embedding_models.len(),
            "build session opened"
        );
        Ok(Self {
            config,
            cache,
            comments: CommentCache::new(),
            namespaces: Namespaces::default(),
            phrases: BTreeSet::new(),
            diagnostics: Vec::new(),
            manifests: Vec::new(),
        })
    }

    #[inline]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    #[inline]
    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    #[inline]
    pub fn comments(&self) -> &CommentCache {
        &self.comments
    }

    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Phrases referenced by the modules finished so far
    #[inline]
    pub fn phrases(&self) -> &BTreeSet<String> {
        &self.phrases
    }

    /// Begin a module
    ///
    /// `output` is the module's compiled output file; its manifest is
    /// written next to it on [`ModuleBuilder::finish`]. Without one the
    /// manifest is only returned.
    pub fn module<'s>(
        &'s mut self,
        module_id: Option<&str>,
        output: Option<&Path>,
        tree: &'s SyntaxTree,
        types: &'s TypeArena,
    ) -> ModuleBuilder<'s> {
        let models = (!self.config.embedding_models.is_empty())
            .then(|| self.config.embedding_models.clone());
        ModuleBuilder {
            manifest: Manifest::new(module_id.map(str::to_string), models),
            output: output.map(Path::to_path_buf),
            session: self,
            tree,
            types,
        }
    }

    /// End the build
    ///
    /// Fetches the vectors missing for any referenced phrase through
    /// `provider`, one call per configured model, then saves the cache.
    /// Without a provider, missing vectors are reported and left missing.
    ///
    /// The cache is saved even when the provider fails, so vectors fetched
    /// for earlier models are kept for the next build.
    pub async fn finish(
        mut self,
        provider: Option<&dyn EmbeddingProvider>,
    ) -> Result<BuildSummary> {
        let models = self.config.embedding_models.clone();
        let cache_file = self.config.cache_file();

        let filled = match provider {
            Some(provider) => {
                let phrases = self.phrases.iter().map(String::as_str);
                fill_missing(&mut self.cache, provider, &models, phrases).await
            }
            None => {
                let missing: usize = models
                    .iter()
                    .map(|model| {
                        self.cache
                            .missing(model, self.phrases.iter().map(String::as_str))
                            .len()
                    })
                    .sum();
                if missing > 0 {
                    self.report(Diagnostic::warning(
                        cache_file.display().to_string(),
                        format!("no embedding provider configured; {missing} vectors left missing"),
                    ));
                }
                Ok(FillReport::default())
            }
        };

        self.cache.save(&cache_file)?;
        let fill = filled?;
        tracing::info!(
            fetched = fill.total(),
            manifests = self.manifests.len(),
            diagnostics = self.diagnostics.len(),
            "build finished"
        );

        Ok(BuildSummary {
            fill,
            diagnostics: self.diagnostics,
            manifests: self.manifests,
            cache: self.cache,
        })
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.diagnostics.push(diagnostic);
    }
}

/// A declaration to register
///
/// `related_docs` are the raw doc comments of related sources, such as the
/// initializer expression or the declared type, in increasing precedence.
/// The node's own doc comment ranks above all of them.
#[derive(Debug, Clone, Copy)]
pub struct Declaration<'d> {
    pub node: NodeId,
    pub related_docs: &'d [&'d str],
}

impl<'d> Declaration<'d> {
    pub fn new(node: NodeId) -> Self {
        Self { node, related_docs: &[] }
    }

    #[must_use]
    pub fn with_related_docs(mut self, docs: &'d [&'d str]) -> Self {
        self.related_docs = docs;
        self
    }
}

/// Identity, binding name and merged comment of a declaration
struct Resolved {
    identity: String,
    name: Option<String>,
    comment: Option<DocComment>,
}

/// Registers the declarations of one module
pub struct ModuleBuilder<'s> {
    session: &'s mut BuildSession,
    tree: &'s SyntaxTree,
    types: &'s TypeArena,
    output: Option<PathBuf>,
    manifest: Manifest,
}

impl ModuleBuilder<'_> {
    /// Register a function exposed as a tool; returns its assigned identity
    pub fn register_tool(
        &mut self,
        declaration: Declaration<'_>,
        signature: &Signature,
    ) -> Option<String> {
        let resolved = self.resolve(declaration)?;
        self.check_documented(&resolved, "tool");
        let compiled = SchemaCompiler::new(self.types, &self.session.comments).function_schema(
            signature,
            resolved.name.as_deref(),
            resolved.comment.as_ref(),
        );
        let schema = self.accept(&resolved.identity, compiled)?;

        let id = self.session.namespaces.tools.register(&resolved.identity);
        tracing::debug!(%id, "registered tool");
        self.manifest.tools.insert(id.clone(), schema);
        Some(id)
    }

    /// Register a tool built at a call site from the static type of its
    /// arguments expression and an explicit result type
    pub fn register_call_site_tool(
        &mut self,
        declaration: Declaration<'_>,
        arguments: TypeId,
        returns: TypeId,
        descriptions: &BTreeMap<String, String>,
    ) -> Option<String> {
        let resolved = self.resolve(declaration)?;
        self.check_documented(&resolved, "tool");
        let compiled = SchemaCompiler::new(self.types, &self.session.comments).call_site_schema(
            arguments,
            returns,
            resolved.name.as_deref(),
            resolved.comment.as_ref(),
            descriptions,
        );
        let schema = self.accept(&resolved.identity, compiled)?;

        let id = self.session.namespaces.tools.register(&resolved.identity);
        tracing::debug!(%id, "registered call-site tool");
        self.manifest.tools.insert(id.clone(), schema);
        Some(id)
    }

    /// Register a function implemented by a generative model
    pub fn register_prompt(
        &mut self,
        declaration: Declaration<'_>,
        signature: &Signature,
        instructions: Option<&str>,
    ) -> Option<String> {
        let resolved = self.resolve(declaration)?;
        self.check_documented(&resolved, "prompt");
        let compiled = SchemaCompiler::new(self.types, &self.session.comments).function_schema(
            signature,
            resolved.name.as_deref(),
            resolved.comment.as_ref(),
        );
        let function = self.accept(&resolved.identity, compiled)?;

        let id = self.session.namespaces.prompts.register(&resolved.identity);
        tracing::debug!(%id, "registered prompt");
        self.manifest.prompts.insert(
            id.clone(),
            PromptDefinition {
                function,
                instructions: instructions.map(str::to_string),
            },
        );
        Some(id)
    }

    /// Register a single phrase whose vector is inlined at `declaration`
    pub fn register_embed(
        &mut self,
        declaration: Declaration<'_>,
        phrase: &str,
    ) -> Option<String> {
        let resolved = self.resolve(declaration)?;
        let id = self.session.namespaces.embeds.register(&resolved.identity);
        tracing::debug!(%id, phrase, "registered embed");
        self.manifest
            .embeds
            .insert(id.clone(), EmbedDefinition { phrase: phrase.to_string() });
        Some(id)
    }

    /// Register a value described by the `@idiom` phrases of its comments
    pub fn register_idiom(&mut self, declaration: Declaration<'_>) -> Option<String> {
        let resolved = self.resolve(declaration)?;
        let phrases = resolved
            .comment
            .map(|comment| comment.phrases)
            .unwrap_or_default();
        if phrases.is_empty() {
            self.session.report(Diagnostic::warning(
                resolved.identity.clone(),
                "idiom has no @idiom phrases",
            ));
        }

        let id = self.session.namespaces.idioms.register(&resolved.identity);
        tracing::debug!(%id, phrases = phrases.len(), "registered idiom");
        self.manifest.idioms.insert(id.clone(), IdiomDefinition { phrases });
        Some(id)
    }

    /// Register an index over previously registered idioms
    pub fn register_index(
        &mut self,
        declaration: Declaration<'_>,
        idiom_ids: Vec<String>,
    ) -> Option<String> {
        let resolved = self.resolve(declaration)?;
        let id = self.session.namespaces.indexes.register(&resolved.identity);
        tracing::debug!(%id, idioms = idiom_ids.len(), "registered index");
        self.manifest.indexes.insert(id.clone(), IndexDefinition { idiom_ids });
        Some(id)
    }

    /// Definitions registered so far
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Complete the module: record its phrases with the session and write
    /// its manifest when an output path was given
    pub fn finish(mut self) -> Result<Manifest> {
        let referenced: Vec<String> = self
            .manifest
            .referenced_phrases()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.manifest.phrases.extend(referenced.iter().cloned());
        self.session.phrases.extend(referenced);

        if let Some(output) = &self.output {
            let path = manifest_path(output);
            self.manifest.save(&path)?;
            self.session.manifests.push(path);
        }
        Ok(self.manifest)
    }

    fn resolve(&mut self, declaration: Declaration<'_>) -> Option<Resolved> {
        match self.try_resolve(declaration) {
            Ok(resolved) => Some(resolved),
            Err(err) => {
                self.session
                    .report(Diagnostic::error(declaration.node.to_string(), err.to_string()));
                None
            }
        }
    }

    fn try_resolve(&self, declaration: Declaration<'_>) -> toolmeta_core::Result<Resolved> {
        let comments = &self.session.comments;
        let assigner = IdentityAssigner::new(self.tree, comments);
        let identity = assigner.identity(declaration.node)?;
        let name = assigner.readable_identifier(declaration.node)?;

        let own = self.tree.get(declaration.node)?.doc.as_deref();
        let docs: Vec<_> = declaration
            .related_docs
            .iter()
            .map(|raw| Some(*raw))
            .chain(iter::once(own))
            .map(|raw| comments.get(raw))
            .collect();
        let comment = DocComment::merge(docs.iter().map(|doc| doc.as_deref()));

        Ok(Resolved { identity, name, comment })
    }

    fn check_documented(&mut self, resolved: &Resolved, kind: &str) {
        if !self.session.config.warn_missing_docs {
            return;
        }
        let documented = resolved
            .comment
            .as_ref()
            .is_some_and(|comment| comment.description.is_some());
        if !documented {
            self.session.report(Diagnostic::warning(
                resolved.identity.clone(),
                format!("{kind} has no doc comment"),
            ));
        }
    }

    fn accept<T>(
        &mut self,
        identity: &str,
        compiled: std::result::Result<T, SchemaError>,
    ) -> Option<T> {
        match compiled {
            Ok(value) => Some(value),
            Err(err) => {
                self.session.report(Diagnostic::error(identity, err.to_string()));
                None
            }
        }
    }
}
