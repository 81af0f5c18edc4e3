use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tally::console::{self, ConsolePlatform};
use tally::runtime::TallyRuntime;

/// Counts how often each user says the magic word.
///
/// Reads JSON-line events on stdin and writes responses and reactions as
/// JSON lines on stdout. Logs go to stderr unless configured otherwise.
#[derive(Debug, Parser)]
#[command(name = "tally", version, about)]
struct Cli {
    /// Configuration file (defaults to tally.toml in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. "production"
    #[arg(short, long, env = "TALLY_PROFILE")]
    profile: Option<String>,

    /// Snapshot file overriding `storage.data_file`
    #[arg(short, long)]
    data_file: Option<PathBuf>,
}

async fn serve(cli: Cli) -> anyhow::Result<()> {
    let mut builder = TallyRuntime::builder();
    if let Some(path) = &cli.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &cli.profile {
        builder = builder.profile(profile);
    }
    if let Some(path) = &cli.data_file {
        builder = builder.data_file(path);
    }

    let runtime = builder.build().context("failed to start tally")?;
    runtime
        .run(console::stdin_events(), Arc::new(ConsolePlatform::stdout()))
        .await?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let result = rt.block_on(serve(cli));

    // The stdin reader sits on a blocking thread that never returns on its own.
    rt.shutdown_timeout(Duration::from_millis(500));
    result
}
