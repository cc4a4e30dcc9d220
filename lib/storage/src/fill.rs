//! Cache fill protocol
//!
//! At the end of a build every phrase referenced anywhere must have a
//! vector for every configured model. Missing phrases are coalesced per
//! model and requested in a single batched call, so a build issues at most
//! one provider call per model.

use async_trait::async_trait;
use std::collections::BTreeMap;
use toolmeta_core::Embedding;

use crate::embedding_cache::EmbeddingCache;
use crate::error::{Result, StorageError};

/// Source of embedding vectors, usually a remote model API
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `phrases` with `model`, returning one vector per phrase in
    /// input order
    async fn embed(&self, model: &str, phrases: &[String]) -> anyhow::Result<Vec<Embedding>>;
}

/// Phrases requested per model by one fill
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    pub requested: BTreeMap<String, usize>,
}

impl FillReport {
    /// Total number of vectors fetched
    pub fn total(&self) -> usize {
        self.requested.values().sum()
    }
}

/// Fetch every vector in `phrases` × `models` absent from `cache`
pub async fn fill_missing<'p, P, I>(
    cache: &mut EmbeddingCache,
    provider: &P,
    models: &[String],
    phrases: I,
) -> Result<FillReport>
where
    P: EmbeddingProvider + ?Sized,
    I: IntoIterator<Item = &'p str>,
{
    let phrases: Vec<&str> = phrases.into_iter().collect();
    let mut report = FillReport::default();

    for model in models {
        let missing = cache.missing(model, phrases.iter().copied());
        if missing.is_empty() {
            tracing::debug!(%model, "embedding cache complete");
            continue;
        }

        tracing::info!(%model, count = missing.len(), "fetching missing embeddings");
        let vectors = provider
            .embed(model, &missing)
            .await
            .map_err(|source| StorageError::Provider {
                model: model.clone(),
                source,
            })?;
        if vectors.len() != missing.len() {
            return Err(StorageError::ProviderMismatch {
                model: model.clone(),
                expected: missing.len(),
                actual: vectors.len(),
            });
        }

        for (phrase, vector) in missing.iter().zip(vectors) {
            cache.insert(phrase, model, vector);
        }
        report.requested.insert(model.clone(), missing.len());
    }

    Ok(report)
}
