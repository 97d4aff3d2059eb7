//! CLI Module
//!
//! Command-line interface for the UDS encoder.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::codec::ReductionStrategy;
use crate::config::EncoderConfig;
use crate::error::Result;
use crate::query::SplitLength;

/// UDS encoder - reduce mono audio to Up/Down/Same symbol streams
#[derive(Parser, Debug)]
#[command(name = "uds")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode a single WAV file
    #[command(name = "encode")]
    Encode {
        /// Input WAV file (mono, integer PCM)
        input: PathBuf,

        #[command(flatten)]
        options: EncodeArgs,
    },

    /// Encode every WAV file under a directory
    #[command(name = "batch")]
    Batch {
        /// Directory to search for WAV files
        dir: PathBuf,

        #[command(flatten)]
        options: EncodeArgs,
    },

    /// Split a UDS text file into alternating queries
    #[command(name = "query")]
    Query {
        /// UDS text file
        input: PathBuf,

        /// Chunk length: a positive integer, or 'random' for 1-15
        #[arg(short, long)]
        split: SplitLength,

        /// Seed for random chunk lengths
        #[arg(long)]
        seed: Option<u64>,

        /// Output file (default: <input stem>_QUERY.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Encoder options shared by `encode` and `batch`
#[derive(Args, Debug, Clone, Default)]
pub struct EncodeArgs {
    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Samples per reduction block
    #[arg(short = 'r', long, allow_negative_numbers = true)]
    pub block_size: Option<i64>,

    /// Reduction strategy: average (1) or previous (0)
    #[arg(short = 'm', long)]
    pub strategy: Option<ReductionStrategy>,

    /// Similarity threshold in percent
    #[arg(short = 'd', long, allow_negative_numbers = true)]
    pub threshold: Option<f64>,

    /// Seconds to keep from the start of each source
    #[arg(long)]
    pub max_duration: Option<f64>,

    /// Reject sources that are not at this sample rate
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Directory for output files (default: next to the source)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Also write a JSON run manifest
    #[arg(long)]
    pub manifest: bool,
}

impl EncodeArgs {
    /// Resolve the configuration: file (or defaults), then flag overrides
    pub fn to_config(&self) -> Result<EncoderConfig> {
        let mut config = match &self.config {
            Some(path) => EncoderConfig::from_json_file(path)?,
            None => EncoderConfig::default(),
        };

        if let Some(block_size) = self.block_size {
            config = config.with_block_size(block_size);
        }
        if let Some(strategy) = self.strategy {
            config = config.with_strategy(strategy);
        }
        if let Some(threshold) = self.threshold {
            config = config.with_similarity_threshold(threshold);
        }
        if let Some(secs) = self.max_duration {
            config = config.with_max_duration(secs);
        }
        if self.sample_rate.is_some() {
            config = config.with_expected_sample_rate(self.sample_rate);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encode_flags() {
        let cli = Cli::parse_from([
            "uds", "encode", "song.wav", "-r", "10", "-m", "previous", "-d", "2.5",
            "--max-duration", "12",
        ]);
        match cli.command {
            Commands::Encode { input, options } => {
                assert_eq!(input, PathBuf::from("song.wav"));
                let config = options.to_config().unwrap();
                assert_eq!(config.block_size, 10);
                assert_eq!(config.strategy, ReductionStrategy::Previous);
                assert_eq!(config.similarity_threshold, 2.5);
                assert_eq!(config.max_duration_secs, 12.0);
            }
            other => panic!("Expected Encode, got: {:?}", other),
        }
    }

    #[test]
    fn test_negative_block_size_reaches_validation() {
        let cli = Cli::parse_from(["uds", "encode", "song.wav", "--block-size", "-4"]);
        let Commands::Encode { options, .. } = cli.command else {
            panic!("Expected Encode");
        };
        let config = options.to_config().unwrap();
        assert!(matches!(
            config.validate(),
            Err(crate::error::UdsError::ReductionFactorInvalid { block_size: -4 })
        ));
    }

    #[test]
    fn test_parse_query() {
        let cli = Cli::parse_from(["uds", "query", "a.txt", "--split", "rand", "--seed", "3"]);
        match cli.command {
            Commands::Query { split, seed, .. } => {
                assert_eq!(split, SplitLength::Random);
                assert_eq!(seed, Some(3));
            }
            other => panic!("Expected Query, got: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_zero_split() {
        assert!(Cli::try_parse_from(["uds", "query", "a.txt", "--split", "0"]).is_err());
    }
}
