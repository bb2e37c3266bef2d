//! In-memory similarity index over past incidents with optional JSON snapshot

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::embeddings::Embedder;
use crate::errors::RcaError;
use crate::errors::Result;
use crate::models::IndexedIncident;

/// One ranked hit of a similarity query
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedIncident {
    pub incident: IndexedIncident,
    /// Cosine similarity to the query, higher is closer
    pub relevance: f32,
}

/// Ranked hits of a single query, best first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalResult {
    pub incidents: Vec<RetrievedIncident>,
}

impl RetrievalResult {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    /// Identifiers in rank order
    #[must_use]
    pub fn identifiers(&self) -> Vec<String> {
        self.incidents
            .iter()
            .map(|hit| hit.incident.identifier.clone())
            .collect()
    }

    /// Contents in rank order, newline-joined
    #[must_use]
    pub fn joined_content(&self) -> String {
        self.incidents
            .iter()
            .map(|hit| hit.incident.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    #[serde(flatten)]
    incident: IndexedIncident,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexSnapshot {
    model: String,
    incidents: Vec<IndexEntry>,
}

/// Nearest-neighbour retrieval of incident texts
///
/// Reads take a shared lock; writes only happen during seeding.
pub struct SimilarityIndex {
    embedder: Arc<dyn Embedder>,
    entries: RwLock<Vec<IndexEntry>>,
    snapshot_path: Option<PathBuf>,
}

impl SimilarityIndex {
    /// Create an empty, memory-only index
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
            snapshot_path: None,
        }
    }

    /// Open an index backed by a snapshot file, loading it if present
    ///
    /// A snapshot written with a different embedding model is discarded.
    pub async fn open(path: impl AsRef<Path>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut entries = Vec::new();

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let snapshot: IndexSnapshot = serde_json::from_str(&content)?;
                if snapshot.model == embedder.model() {
                    info!(
                        "Loaded {} incidents from index snapshot {}",
                        snapshot.incidents.len(),
                        path.display()
                    );
                    entries = snapshot.incidents;
                } else {
                    warn!(
                        "Index snapshot {} was built with model '{}', current model is '{}'; starting empty",
                        path.display(),
                        snapshot.model,
                        embedder.model()
                    );
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No index snapshot at {}", path.display());
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            embedder,
            entries: RwLock::new(entries),
            snapshot_path: Some(path),
        })
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Stored identifiers in insertion order
    pub async fn identifiers(&self) -> Vec<String> {
        self.entries
            .read()
            .await
            .iter()
            .map(|entry| entry.incident.identifier.clone())
            .collect()
    }

    /// Embed and store incidents, skipping identifiers already present
    ///
    /// Returns the number of incidents inserted. The entries stay in memory
    /// even when writing the snapshot fails; that failure is only logged and
    /// the next start re-seeds from an empty snapshot.
    pub async fn add(&self, items: Vec<IndexedIncident>) -> Result<usize> {
        let fresh = {
            let entries = self.entries.read().await;
            let mut seen: HashSet<String> = entries
                .iter()
                .map(|entry| entry.incident.identifier.clone())
                .collect();
            items
                .into_iter()
                .filter(|item| {
                    let is_new = seen.insert(item.identifier.clone());
                    if !is_new {
                        warn!("Skipping duplicate incident {}", item.identifier);
                    }
                    is_new
                })
                .collect::<Vec<_>>()
        };

        if fresh.is_empty() {
            return Ok(0);
        }

        let texts: Vec<&str> = fresh.iter().map(|item| item.content.as_str()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| RcaError::RetrievalUnavailable(e.to_string()))?;

        if embeddings.len() != fresh.len() {
            return Err(RcaError::RetrievalUnavailable(format!(
                "embedding service returned {} vectors for {} texts",
                embeddings.len(),
                fresh.len()
            )));
        }

        let inserted = {
            let mut entries = self.entries.write().await;
            let mut inserted = 0;
            for (incident, embedding) in fresh.into_iter().zip(embeddings) {
                // Re-check under the write lock in case of a concurrent add
                if entries
                    .iter()
                    .any(|entry| entry.incident.identifier == incident.identifier)
                {
                    continue;
                }
                entries.push(IndexEntry {
                    incident,
                    embedding,
                });
                inserted += 1;
            }
            inserted
        };

        info!("Added {} incidents to the similarity index", inserted);

        if let Err(e) = self.persist().await {
            warn!("Failed to persist index snapshot: {}", e);
        }

        Ok(inserted)
    }

    /// Top-`k` stored incidents most similar to `text`, best first
    pub async fn query(&self, text: &str, k: usize) -> Result<RetrievalResult> {
        if k == 0 {
            return Ok(RetrievalResult::empty());
        }

        let query_embedding = self
            .embedder
            .embed(text)
            .await
            .map_err(|e| RcaError::RetrievalUnavailable(e.to_string()))?;

        let entries = self.entries.read().await;
        let mut scored = Vec::with_capacity(entries.len());
        for entry in entries.iter() {
            if entry.embedding.len() != query_embedding.len() {
                return Err(RcaError::RetrievalUnavailable(format!(
                    "embedding dimension mismatch: index has {}, query has {}",
                    entry.embedding.len(),
                    query_embedding.len()
                )));
            }
            scored.push((entry, cosine_similarity(&query_embedding, &entry.embedding)));
        }

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let incidents = scored
            .into_iter()
            .take(k)
            .map(|(entry, relevance)| RetrievedIncident {
                incident: entry.incident.clone(),
                relevance,
            })
            .collect();

        Ok(RetrievalResult { incidents })
    }

    /// Write the snapshot file (temp file + rename)
    pub async fn persist(&self) -> Result<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let content = {
            let entries = self.entries.read().await;
            serde_json::to_string(&IndexSnapshot {
                model: self.embedder.model().to_string(),
                incidents: entries.clone(),
            })?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, path).await?;

        debug!("Persisted index snapshot to {}", path.display());
        Ok(())
    }
}

/// Cosine similarity; zero-norm vectors score 0
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
