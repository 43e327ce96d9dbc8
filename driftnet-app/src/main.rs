//! CLI entry point: load config, harvest one keyword, print JSON.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use driftnet_common::observability::{init_logging, LogConfig};
use driftnet_config::DriftnetConfigLoader;
use driftnet_social::twitter::Harvester;

#[derive(Parser, Debug)]
#[command(name = "driftnet", about = "Harvest keyword matches from the search API")]
struct Cli {
    /// Keyword to search for.
    keyword: String,

    /// Config file; environment variables override its values.
    #[arg(long, default_value = "driftnet.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LogConfig::default())?;

    // Env wins over the file; the file itself is optional so headless
    // deployments can configure purely through the environment.
    let mut loader = DriftnetConfigLoader::new();
    if cli.config.exists() {
        loader = loader.with_file(&cli.config);
    }
    let cfg = loader.load()?;

    // Precondition gate: missing credential or duration fails here,
    // before any network activity.
    let settings = cfg.search.validate()?;

    let harvester = Harvester::new(&settings)?;
    let posts = harvester.harvest(&cli.keyword).await;

    tracing::info!(keyword = %cli.keyword, collected = posts.len(), "harvest complete");
    println!("{}", serde_json::to_string_pretty(&posts)?);
    Ok(())
}
