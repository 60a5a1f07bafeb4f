//! CLI `ask` command: run one message through the full pipeline.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

use mcai::config::McaiConfig;
use mcai::dataset::DatasetBank;
use mcai::responder::Responder;

pub async fn ask(config: &McaiConfig, message: &str, history: &[String]) -> Result<()> {
    let bank = DatasetBank::load_dir(config.resolved_dataset_dir())?;
    let responder = Responder::from_config(config, Arc::new(bank))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let reply = responder.respond(message, history).await;
    spinner.finish_and_clear();

    println!("{}", reply.response);
    println!();

    let meta = &reply.metadata;
    println!("Route:       {}", meta.route);
    println!("Rule:        {}", meta.rule.unwrap_or("-"));
    println!("Cache:       {}", meta.cache);
    if let Some(source) = meta.source {
        println!("Source:      {source}");
    }
    if !meta.attempted.is_empty() {
        let attempted: Vec<&str> = meta.attempted.iter().map(|s| s.as_str()).collect();
        println!("Attempted:   {}", attempted.join(" -> "));
    }
    if let Some(ref emotion) = meta.emotion {
        println!(
            "Emotion:     {} ({} Hz, {}, {})",
            emotion.emotion_name, emotion.frequency_value, emotion.basis_label, emotion.catalog
        );
    }
    if let Some(handoff) = meta.handoff {
        println!("Handoff:     {handoff}");
    }
    println!("Request ID:  {}", meta.request_id);

    Ok(())
}
