//! Sample Sequences
//!
//! The value types that flow between pipeline stages. Every stage produces a
//! fresh sequence; nothing here is mutated after construction.

use std::num::NonZeroUsize;

use crate::error::{Result, UdsError};

// ============================================================================
// Constants
// ============================================================================

/// Every sequence in the pipeline is single-channel
pub const MONO: u16 = 1;

// ============================================================================
// Block Size
// ============================================================================

/// Validated reduction factor (number of samples per block)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockSize(NonZeroUsize);

impl BlockSize {
    /// Validate a raw block size
    ///
    /// # Errors
    /// * `ReductionFactorInvalid` - If `block_size` is zero or negative
    pub fn new(block_size: i64) -> Result<Self> {
        usize::try_from(block_size)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(BlockSize)
            .ok_or(UdsError::ReductionFactorInvalid { block_size })
    }

    /// Number of samples per block
    #[inline]
    pub fn get(self) -> usize {
        self.0.get()
    }

    /// Number of blocks needed to cover `len` samples, counting a short final block
    #[inline]
    pub fn block_count(self, len: usize) -> usize {
        len.div_ceil(self.get())
    }
}

impl std::fmt::Display for BlockSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Quantization
// ============================================================================

/// Inclusive signed range of an integer PCM sample with `bits_per_sample` bits
pub fn sample_range(bits_per_sample: u16) -> (i64, i64) {
    let bits = bits_per_sample.clamp(1, 32) as u32;
    let max = (1i64 << (bits - 1)) - 1;
    (-max - 1, max)
}

/// Convert a block level back to an integer sample
///
/// Rounds half away from zero, then clamps to the bit depth's range.
pub fn quantize(value: f64, bits_per_sample: u16) -> i32 {
    let (min, max) = sample_range(bits_per_sample);
    value.round().clamp(min as f64, max as f64) as i32
}

// ============================================================================
// Sample Sequence
// ============================================================================

/// Integer PCM samples read from a mono source
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSequence {
    samples: Vec<i32>,
    sample_rate: u32,
    bits_per_sample: u16,
}

impl SampleSequence {
    /// Wrap raw samples with their format
    pub fn new(samples: Vec<i32>, sample_rate: u32, bits_per_sample: u16) -> Self {
        Self {
            samples,
            sample_rate,
            bits_per_sample,
        }
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    pub fn channels(&self) -> u16 {
        MONO
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds at the sequence's sample rate
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Iterate over the reduction blocks; the last one may be short
    pub fn blocks(&self, block_size: BlockSize) -> std::slice::Chunks<'_, i32> {
        self.samples.chunks(block_size.get())
    }
}

// ============================================================================
// Block-level Sequences
// ============================================================================

/// Shared accessors for sequences that hold one level per block, replicated
/// across every position of the block
macro_rules! impl_level_sequence {
    ($name:ident) => {
        impl $name {
            pub(crate) fn from_parts(
                values: Vec<f64>,
                block_size: BlockSize,
                sample_rate: u32,
                bits_per_sample: u16,
            ) -> Self {
                Self {
                    values,
                    block_size,
                    sample_rate,
                    bits_per_sample,
                }
            }

            /// Per-position values (full length, not block count)
            pub fn values(&self) -> &[f64] {
                &self.values
            }

            pub fn block_size(&self) -> BlockSize {
                self.block_size
            }

            pub fn sample_rate(&self) -> u32 {
                self.sample_rate
            }

            pub fn bits_per_sample(&self) -> u16 {
                self.bits_per_sample
            }

            pub fn len(&self) -> usize {
                self.values.len()
            }

            pub fn is_empty(&self) -> bool {
                self.values.is_empty()
            }

            pub fn block_count(&self) -> usize {
                self.block_size.block_count(self.values.len())
            }

            /// One value per block, taken from the block's first position
            pub fn levels(&self) -> impl Iterator<Item = f64> + '_ {
                self.values.iter().step_by(self.block_size.get()).copied()
            }

            /// Integer samples ready for serialization at the source bit depth
            pub fn quantized(&self) -> Vec<i32> {
                self.values
                    .iter()
                    .map(|&v| quantize(v, self.bits_per_sample))
                    .collect()
            }
        }
    };
}

/// Output of the reducer: each block's representative value over the block
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedSequence {
    values: Vec<f64>,
    block_size: BlockSize,
    sample_rate: u32,
    bits_per_sample: u16,
}

/// Output of the encoder: the amplitude each UDS symbol stands for
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedSequence {
    values: Vec<f64>,
    block_size: BlockSize,
    sample_rate: u32,
    bits_per_sample: u16,
}

impl_level_sequence!(ReducedSequence);
impl_level_sequence!(ReconstructedSequence);
