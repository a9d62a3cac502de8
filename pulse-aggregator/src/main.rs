use clap::Parser;
use pulse_aggregator::{Pipeline, PulseConfig};
use std::path::PathBuf;
use tracing::info;

/// Collect today's AI papers, models, repositories and news into JSON snapshots.
#[derive(Debug, Parser)]
#[command(name = "pulse-aggregator", version, about)]
struct Cli {
    /// Directory the JSON snapshots are read from and written to
    #[arg(long, env = "PULSE_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    info!("Writing snapshots to {}", cli.data_dir.display());

    let pipeline = Pipeline::new(PulseConfig::new(cli.data_dir))?;
    let report = pipeline.run().await;

    info!(
        "Counts: arxiv={} huggingface={} github_trending={} rss_news={} ai_tools={} dev_tips={}",
        report.counts.arxiv,
        report.counts.huggingface,
        report.counts.github_trending,
        report.counts.rss_news,
        report.counts.ai_tools,
        report.counts.dev_tips,
    );
    Ok(())
}
