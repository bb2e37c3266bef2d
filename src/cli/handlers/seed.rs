//! Index seeding

use crate::api::server::open_index;
use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::cli::output::print_warning;
use crate::rag::bootstrap;
use crate::rag::seed_corpus;
use crate::AppConfig;
use crate::Result;

pub async fn handle_seed(config: &AppConfig) -> Result<()> {
    if config.index_path().is_none() {
        print_warning("Index persistence is disabled; the seeded index will not outlive this command");
    }

    let corpus = seed_corpus()?;
    print_info(&format!("Seed corpus holds {} tickets", corpus.len()));

    let index = open_index(config).await?;
    let inserted = bootstrap(&index).await?;
    let total = index.len().await;

    if inserted == 0 {
        print_info(&format!("Index already populated ({total} incidents), nothing to do"));
    } else {
        print_success(&format!("Seeded {inserted} incidents ({total} total)"));
    }

    for identifier in index.identifiers().await {
        println!("  - {identifier}");
    }

    Ok(())
}
