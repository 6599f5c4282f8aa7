//! pcapjoin CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pcapjoin::cli::Args;
use pcapjoin::merge::merge;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Logs go to stderr; stdout may be carrying the merged capture
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| args.log_filter().into()),
        )
        .init();

    let config = args.merge_config();
    let output = config.output.to_string();

    let summary = merge(config)
        .await
        .with_context(|| format!("failed to merge into {output}"))?;

    for source in &summary.sources {
        tracing::info!(
            path = %source.path.display(),
            packets = source.packets,
            dropped = source.dropped,
            termination = ?source.termination,
            "input summary"
        );
    }

    Ok(())
}
