// cloudlingo - Quota-aware client for Google Translation, Natural Language and Speech APIs
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use cloudlingo::cli::{self, Args};
use cloudlingo::config::AppConfig;
use cloudlingo::metrics;
use cloudlingo::services::CloudLingo;
use cloudlingo::utils::logging;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Phase 1: Load configuration, CLI flags win
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(&path.to_string_lossy())?,
        None => AppConfig::load()?,
    };
    args.apply(&mut config);
    config.validate()?;

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    debug!("Starting cloudlingo v{}", env!("CARGO_PKG_VERSION"));
    debug!("Rate gate: {:?}", config.rate_limit);

    // Phase 3: Wire transport, gate and clients
    let lingo = CloudLingo::from_config(&config)?;

    // Phase 4: Run the command
    let rows = cli::execute(args.command, &lingo).await?;
    println!("{}", serde_json::to_string_pretty(&rows)?);

    let snapshot = lingo.gate().snapshot().await;
    info!(
        "Quota window: {} characters after {:?}",
        snapshot.accumulated_characters, snapshot.window_elapsed
    );

    if args.print_metrics {
        eprintln!("{}", metrics::gather_metrics());
    }

    Ok(())
}
