//! UDS CLI - Up/Down/Same audio encoder
//!
//! Command-line interface for the UDS encoding pipeline.

use anyhow::{bail, Context};
use clap::Parser;
use env_logger::Env;
use log::debug;

use uds::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    debug!("UDS encoder v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Encode { input, options } => commands::encode(&input, &options)
            .with_context(|| format!("failed to encode {}", input.display()))?,
        Commands::Batch { dir, options } => {
            let summary = commands::batch(&dir, &options)
                .with_context(|| format!("failed to process {}", dir.display()))?;
            if !summary.failed.is_empty() {
                for (path, reason) in &summary.failed {
                    eprintln!("  {}: {}", path.display(), reason);
                }
                bail!("{} file(s) failed to encode", summary.failed.len());
            }
        }
        Commands::Query {
            input,
            split,
            seed,
            output,
        } => commands::query(&input, split, seed, output.as_deref())
            .with_context(|| format!("failed to generate queries from {}", input.display()))?,
    }

    Ok(())
}
