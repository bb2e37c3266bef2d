//! Built-in corpus of past incidents used to bootstrap the index

use tracing::info;

use crate::errors::Result;
use crate::models::IndexedIncident;
use crate::models::SeedTicket;
use crate::rag::SimilarityIndex;

const SEED_TICKETS_JSON: &str = include_str!("../../data/seed_tickets.json");

/// Load the bundled seed tickets with their reference analyses
pub fn seed_corpus() -> Result<Vec<SeedTicket>> {
    Ok(serde_json::from_str(SEED_TICKETS_JSON)?)
}

/// Populate an empty index with the seed corpus
///
/// Does nothing when the index already holds incidents, so restarting
/// against a persisted snapshot never duplicates entries.
pub async fn bootstrap(index: &SimilarityIndex) -> Result<usize> {
    let existing = index.len().await;
    if existing > 0 {
        info!("Index already holds {} incidents, skipping seed", existing);
        return Ok(0);
    }

    let incidents: Vec<IndexedIncident> = seed_corpus()?
        .iter()
        .map(IndexedIncident::from)
        .collect();
    let inserted = index.add(incidents).await?;
    info!("Seeded index with {} incidents", inserted);
    Ok(inserted)
}
