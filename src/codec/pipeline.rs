//! Encoding pipeline
//!
//! Loader → Reducer → Encoder, each stage producing a new value. The reducer
//! is chosen once when the pipeline is built.

use std::path::Path;

use crate::codec::encoder::{Encoder, Encoding};
use crate::codec::reducer::Reducer;
use crate::config::EncoderConfig;
use crate::engine::io::load_samples;
use crate::engine::sequence::{BlockSize, ReducedSequence, SampleSequence};
use crate::error::Result;

/// Everything one run produces before it is written out
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub original: SampleSequence,
    pub reduced: ReducedSequence,
    pub encoding: Encoding,
}

/// A validated, ready-to-run encoding pipeline
#[derive(Debug)]
pub struct Pipeline {
    config: EncoderConfig,
    block_size: BlockSize,
    reducer: Box<dyn Reducer>,
    encoder: Encoder,
}

impl Pipeline {
    /// Validate the configuration and build the stages
    pub fn new(config: EncoderConfig) -> Result<Self> {
        let block_size = config.validate()?;
        let encoder = Encoder::new(config.similarity_threshold)?;
        let reducer = config.strategy.reducer();

        Ok(Self {
            config,
            block_size,
            reducer,
            encoder,
        })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn block_size(&self) -> BlockSize {
        self.block_size
    }

    /// Load a WAV source and encode it
    pub fn run(&self, source: &Path) -> Result<PipelineOutput> {
        let original = load_samples(
            source,
            self.config.max_duration_secs,
            self.config.expected_sample_rate,
        )?;
        Ok(self.process(original))
    }

    /// Reduce and encode samples already in memory
    pub fn process(&self, original: SampleSequence) -> PipelineOutput {
        let reduced = self.reducer.reduce(&original, self.block_size);
        let encoding = self.encoder.encode(&reduced);
        PipelineOutput {
            original,
            reduced,
            encoding,
        }
    }
}
