//! Manifest store
//!
//! One manifest is written per compiled module, next to its output file.
//! Manifests from several modules merge into one with last-write-wins per
//! identity:
//!
//! ```text
//!   a.manifest.json ─┐
//!   b.manifest.json ─┼─ merge ─→ { tools, prompts, embeds, idioms, indexes, phrases }
//!   c.manifest.json ─┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use toolmeta_schema::FunctionSchema;

use crate::error::Result;
use crate::persistence::{load_json, save_json};

/// File name suffix of per-module manifests
pub const MANIFEST_SUFFIX: &str = ".manifest.json";

pub type ToolDefinition = FunctionSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptDefinition {
    #[serde(flatten)]
    pub function: FunctionSchema,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// A single phrase whose vector is inlined at a call site
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbedDefinition {
    pub phrase: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdiomDefinition {
    pub phrases: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexDefinition {
    pub idiom_ids: Vec<String>,
}

/// Definitions of one module, or of a whole build after [`Manifest::merge`]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(
        rename = "module",
        alias = "moduleId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub module_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_models: Option<Vec<String>>,

    #[serde(default)]
    pub tools: BTreeMap<String, ToolDefinition>,

    #[serde(default)]
    pub prompts: BTreeMap<String, PromptDefinition>,

    #[serde(default)]
    pub embeds: BTreeMap<String, EmbedDefinition>,

    #[serde(default)]
    pub idioms: BTreeMap<String, IdiomDefinition>,

    #[serde(default)]
    pub indexes: BTreeMap<String, IndexDefinition>,

    #[serde(default)]
    pub phrases: BTreeSet<String>,
}

impl Manifest {
    pub fn new(module_id: Option<String>, embedding_models: Option<Vec<String>>) -> Self {
        Self {
            module_id,
            embedding_models,
            ..Default::default()
        }
    }

    /// Combine manifests in order
    ///
    /// A later manifest's definition replaces an earlier one under the same
    /// identity. Phrases are unioned. The result belongs to no single
    /// module, so `module` and `embeddingModels` are cleared.
    pub fn merge<I>(manifests: I) -> Self
    where
        I: IntoIterator<Item = Manifest>,
    {
        let mut merged = Self::default();
        for manifest in manifests {
            merged.tools.extend(manifest.tools);
            merged.prompts.extend(manifest.prompts);
            merged.embeds.extend(manifest.embeds);
            merged.idioms.extend(manifest.idioms);
            merged.indexes.extend(manifest.indexes);
            merged.phrases.extend(manifest.phrases);
        }
        merged
    }

    /// Load and merge the manifests at `paths`; missing files are empty
    pub fn merge_files<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let manifests = paths
            .into_iter()
            .map(|path| Self::load(path))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::merge(manifests))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let manifest: Self = load_json(path)?.unwrap_or_default();
        tracing::debug!(?path, definitions = manifest.len(), "loaded manifest");
        Ok(manifest)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        save_json(path, self)?;
        tracing::info!(?path, definitions = self.len(), phrases = self.phrases.len(), "saved manifest");
        Ok(())
    }

    /// Every phrase an idiom or embed of this manifest refers to, plus the
    /// recorded `phrases`
    pub fn referenced_phrases(&self) -> BTreeSet<&str> {
        let idioms = self
            .idioms
            .values()
            .flat_map(|idiom| idiom.phrases.iter().map(String::as_str));
        let embeds = self.embeds.values().map(|embed| embed.phrase.as_str());
        self.phrases
            .iter()
            .map(String::as_str)
            .chain(idioms)
            .chain(embeds)
            .collect()
    }

    /// Number of definitions across all namespaces
    pub fn len(&self) -> usize {
        self.tools.len()
            + self.prompts.len()
            + self.embeds.len()
            + self.idioms.len()
            + self.indexes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.phrases.is_empty()
    }
}

/// Manifest path of a module compiled to `output`: the output file name
/// with its extension replaced by [`MANIFEST_SUFFIX`]
pub fn manifest_path<P: AsRef<Path>>(output: P) -> PathBuf {
    let output = output.as_ref();
    let stem = output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{stem}{MANIFEST_SUFFIX}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use toolmeta_schema::{JsonType, Schema};

    fn tool(json_type: JsonType) -> ToolDefinition {
        FunctionSchema {
            name: None,
            description: None,
            parameters: None,
            returns: Schema::of_type(json_type),
        }
    }

    #[test]
    fn test_merge_last_write_wins() {
        let mut first = Manifest::new(Some("pkg/a".to_string()), Some(vec!["m".to_string()]));
        first.tools.insert("x".to_string(), tool(JsonType::String));
        first.tools.insert("y".to_string(), tool(JsonType::Null));

        let mut second = Manifest::default();
        second.tools.insert("x".to_string(), tool(JsonType::Number));
        second.phrases.insert("p1".to_string());

        let merged = Manifest::merge([first, second]);
        assert_eq!(merged.tools["x"], tool(JsonType::Number));
        assert_eq!(merged.tools["y"], tool(JsonType::Null));
        assert_eq!(merged.phrases.iter().collect::<Vec<_>>(), vec!["p1"]);
        assert!(merged.module_id.is_none());
        assert!(merged.embedding_models.is_none());
    }

    #[test]
    fn test_merge_is_idempotent_and_empty_safe() {
        let mut manifest = Manifest::default();
        manifest.idioms.insert(
            "pkg/m:sunny".to_string(),
            IdiomDefinition { phrases: vec!["warm".to_string()] },
        );
        manifest.phrases.insert("warm".to_string());

        let once = Manifest::merge([manifest.clone()]);
        let twice = Manifest::merge([once.clone(), once.clone()]);
        assert_eq!(once, twice);
        assert_eq!(Manifest::merge(Vec::new()), Manifest::default());
    }

    #[test]
    fn test_serialized_shape() {
        let mut manifest = Manifest::new(Some("pkg/m".to_string()), None);
        manifest.prompts.insert(
            "pkg/m:summarize".to_string(),
            PromptDefinition {
                function: tool(JsonType::String),
                instructions: Some("Be brief".to_string()),
            },
        );
        manifest.indexes.insert(
            "pkg/m:weather".to_string(),
            IndexDefinition { idiom_ids: vec!["pkg/m:sunny".to_string()] },
        );
        manifest.embeds.insert(
            "pkg/m:query".to_string(),
            EmbedDefinition { phrase: "cold".to_string() },
        );

        assert_eq!(
            serde_json::to_value(&manifest).unwrap(),
            json!({
                "module": "pkg/m",
                "tools": {},
                "prompts": {
                    "pkg/m:summarize": {"returns": {"type": "string"}, "instructions": "Be brief"}
                },
                "embeds": {"pkg/m:query": {"phrase": "cold"}},
                "idioms": {},
                "indexes": {"pkg/m:weather": {"idiomIds": ["pkg/m:sunny"]}},
                "phrases": []
            })
        );
    }

    #[test]
    fn test_load_accepts_sparse_documents() {
        let manifest: Manifest =
            serde_json::from_value(json!({"moduleId": "pkg/m", "phrases": ["b", "a", "b"]})).unwrap();
        assert_eq!(manifest.module_id.as_deref(), Some("pkg/m"));
        assert_eq!(manifest.phrases.len(), 2);
        assert!(manifest.tools.is_empty());
    }

    #[test]
    fn test_save_load_and_merge_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("out/a.manifest.json");
        let b = dir.path().join("out/b.manifest.json");

        let mut first = Manifest::default();
        first.tools.insert("x".to_string(), tool(JsonType::String));
        first.save(&a).unwrap();
        assert_eq!(Manifest::load(&a).unwrap(), first);

        let mut second = Manifest::default();
        second.tools.insert("x".to_string(), tool(JsonType::Boolean));
        second.save(&b).unwrap();

        let missing = dir.path().join("out/none.manifest.json");
        let merged = Manifest::merge_files([&a, &missing, &b]).unwrap();
        assert_eq!(merged.tools["x"], tool(JsonType::Boolean));
    }

    #[test]
    fn test_referenced_phrases() {
        let mut manifest = Manifest::default();
        manifest.idioms.insert(
            "i".to_string(),
            IdiomDefinition { phrases: vec!["a".to_string(), "b".to_string()] },
        );
        manifest.embeds.insert("e".to_string(), EmbedDefinition { phrase: "c".to_string() });
        manifest.phrases.insert("a".to_string());

        let phrases: Vec<_> = manifest.referenced_phrases().into_iter().collect();
        assert_eq!(phrases, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_manifest_path() {
        assert_eq!(
            manifest_path("dist/weather.js"),
            PathBuf::from("dist/weather.manifest.json")
        );
        assert_eq!(manifest_path("main"), PathBuf::from("main.manifest.json"));
    }
}
