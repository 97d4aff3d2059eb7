//! Block reduction
//!
//! Collapses a sample sequence into fixed-size blocks, each represented by a
//! single level that is replicated over the block so the reduced sequence keeps
//! the source length. A short final block is reduced on its own samples; it is
//! never dropped or padded.

use std::fmt;
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};

use crate::engine::sequence::{BlockSize, ReducedSequence, SampleSequence};
use crate::error::{Result, UdsError};

// ============================================================================
// Strategy
// ============================================================================

/// Rule used to compute a block's representative value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReductionStrategy {
    /// Arithmetic mean of the block
    Average,
    /// Hold the block's first sample
    Previous,
}

impl ReductionStrategy {
    /// Numeric id used in output file names (`M<id>`)
    pub fn id(self) -> u8 {
        match self {
            ReductionStrategy::Average => 1,
            ReductionStrategy::Previous => 0,
        }
    }

    /// Build the reducer for this strategy
    pub fn reducer(self) -> Box<dyn Reducer> {
        match self {
            ReductionStrategy::Average => Box::new(AverageReducer),
            ReductionStrategy::Previous => Box::new(PreviousReducer),
        }
    }
}

impl Default for ReductionStrategy {
    fn default() -> Self {
        ReductionStrategy::Average
    }
}

impl fmt::Display for ReductionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReductionStrategy::Average => write!(f, "average"),
            ReductionStrategy::Previous => write!(f, "previous"),
        }
    }
}

impl FromStr for ReductionStrategy {
    type Err = UdsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "average" | "avg" | "1" => Ok(ReductionStrategy::Average),
            "previous" | "prev" | "0" => Ok(ReductionStrategy::Previous),
            other => Err(UdsError::InvalidConfig {
                reason: format!("unknown reduction strategy '{}'", other),
            }),
        }
    }
}

// ============================================================================
// Reducer trait
// ============================================================================

/// Computes one representative level per block
pub trait Reducer: fmt::Debug + Send + Sync {
    /// Strategy this reducer implements
    fn strategy(&self) -> ReductionStrategy;

    /// Representative value of a non-empty block
    fn block_level(&self, block: &[i32]) -> f64;

    /// Reduce a whole sequence, keeping its length
    fn reduce(&self, samples: &SampleSequence, block_size: BlockSize) -> ReducedSequence {
        let mut values = Vec::with_capacity(samples.len());
        for block in samples.blocks(block_size) {
            let level = self.block_level(block);
            values.extend(std::iter::repeat(level).take(block.len()));
        }

        info!(
            "WAV file reduced via '{}' mechanism ({} blocks of {})",
            self.strategy(),
            block_size.block_count(samples.len()),
            block_size
        );

        ReducedSequence::from_parts(
            values,
            block_size,
            samples.sample_rate(),
            samples.bits_per_sample(),
        )
    }
}

/// Replaces every block by its exact arithmetic mean
///
/// The mean is kept as `f64`; rounding to integers happens only when a
/// waveform is written, so classification sees the unrounded level.
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageReducer;

impl Reducer for AverageReducer {
    fn strategy(&self) -> ReductionStrategy {
        ReductionStrategy::Average
    }

    fn block_level(&self, block: &[i32]) -> f64 {
        let sum: i64 = block.iter().map(|&s| s as i64).sum();
        sum as f64 / block.len() as f64
    }
}

/// Holds each block's first sample across the block
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviousReducer;

impl Reducer for PreviousReducer {
    fn strategy(&self) -> ReductionStrategy {
        ReductionStrategy::Previous
    }

    fn block_level(&self, block: &[i32]) -> f64 {
        block[0] as f64
    }
}
