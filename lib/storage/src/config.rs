use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::persistence::load_json;

/// Cache location used when none is configured, relative to the project root
pub const DEFAULT_CACHE_PATH: &str = ".toolmeta/embeddings.json";

/// Configuration for a build
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildConfig {
    pub project_root: PathBuf,
    /// Embedding cache file; relative paths resolve against `project_root`
    pub cache_path: PathBuf,
    /// Models every referenced phrase is embedded with
    pub embedding_models: Vec<String>,
    /// Report tools and prompts without a doc comment
    pub warn_missing_docs: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            embedding_models: Vec::new(),
            warn_missing_docs: true,
        }
    }
}

impl BuildConfig {
    pub fn new<P: AsRef<Path>>(project_root: P) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_embedding_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.embedding_models = models.into_iter().map(Into::into).collect();
        self
    }

    /// Read a JSON config file; absent fields and an absent file take
    /// their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(load_json(path.as_ref())?.unwrap_or_default())
    }

    /// Resolved path of the embedding cache file
    pub fn cache_file(&self) -> PathBuf {
        self.project_root.join(&self.cache_path)
    }
}
