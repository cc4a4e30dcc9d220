//! Embedding cache store
//!
//! Maps `phrase -> model -> vector`. The on-disk document is a JSON object
//! with both levels key-sorted so that incremental builds produce small,
//! reviewable diffs:
//!
//! ```text
//! {
//!   "rainy day": { "text-embedding-3-small": "AACAPgAAAL8AAIA/..." },
//!   "sunny day": { "text-embedding-3-small": "zczMPQAAgD8AAAA/..." }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use toolmeta_core::Embedding;

use crate::error::Result;
use crate::persistence::{load_json, save_json};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingCache {
    entries: BTreeMap<String, BTreeMap<String, Embedding>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the cache at `path`; a missing file is an empty cache
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let cache: Self = load_json(path)?.unwrap_or_default();
        tracing::debug!(?path, phrases = cache.len(), "loaded embedding cache");
        Ok(cache)
    }

    /// Write the cache to `path`, creating its directory if needed
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        save_json(path, self)?;
        tracing::debug!(?path, phrases = self.len(), "saved embedding cache");
        Ok(())
    }

    #[inline]
    pub fn get(&self, phrase: &str, model: &str) -> Option<&Embedding> {
        self.entries.get(phrase)?.get(model)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, phrase: &str, model: &str) -> bool {
        self.get(phrase, model).is_some()
    }

    pub fn insert(&mut self, phrase: &str, model: &str, embedding: Embedding) {
        self.entries
            .entry(phrase.to_string())
            .or_default()
            .insert(model.to_string(), embedding);
    }

    /// Distinct phrases among `phrases` with no vector for `model`, sorted
    pub fn missing<'p, I>(&self, model: &str, phrases: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'p str>,
    {
        let mut missing: Vec<String> = phrases
            .into_iter()
            .filter(|phrase| !self.contains(phrase, model))
            .map(str::to_string)
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }

    /// Models with a cached vector for `phrase`
    pub fn models(&self, phrase: &str) -> impl Iterator<Item = &str> {
        self.entries
            .get(phrase)
            .into_iter()
            .flat_map(|models| models.keys().map(String::as_str))
    }

    /// Number of phrases with at least one vector
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
