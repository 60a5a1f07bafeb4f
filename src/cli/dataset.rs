//! CLI `dataset` commands: per-domain counts and ranked search.

use anyhow::Result;

use mcai::config::McaiConfig;
use mcai::dataset::search::{search as search_bank, SearchConfig};
use mcai::dataset::DatasetBank;

use super::preview;

/// Display dataset example counts in the terminal.
pub fn stats(config: &McaiConfig) -> Result<()> {
    let dir = config.resolved_dataset_dir();
    let bank = DatasetBank::load_dir(&dir)?;
    let stats = bank.stats();

    println!("Dataset Statistics");
    println!("{}", "=".repeat(40));
    println!("  Directory:           {}", dir.display());
    println!("  Total examples:      {}", stats.total_examples);
    println!();

    if stats.by_domain.is_empty() {
        println!("No dataset files found.");
        return Ok(());
    }
    println!("By Domain:");
    for (domain, count) in &stats.by_domain {
        println!("  {:<20} {}", domain, count);
    }

    Ok(())
}

/// Rank dataset records against a query and print the relevant ones.
pub fn search(config: &McaiConfig, query: &str) -> Result<()> {
    let bank = DatasetBank::load_dir(config.resolved_dataset_dir())?;
    let search_config = SearchConfig::from_config(&config.dataset);

    let matches = search_bank(&bank, query, &search_config);
    if matches.is_empty() {
        println!("No relevant records.");
        return Ok(());
    }

    println!("Found {} relevant record(s)\n", matches.len());
    for (i, m) in matches.iter().enumerate() {
        println!(
            "  {}. [{}] {} (score: {}, shared: {})",
            i + 1,
            m.example.domain,
            preview(&m.example.prompt, 80),
            m.score,
            m.shared.join(", ")
        );
        println!("     {}", preview(&m.example.completion, 120));
    }

    Ok(())
}
