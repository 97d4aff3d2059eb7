//! UDS encoder
//!
//! Walks a reduced sequence one block at a time and classifies each block
//! against the one before it by relative percentage difference. Produces the
//! symbol stream and the amplitude each symbol stands for.

use log::debug;

use crate::codec::symbol::{UdsSequence, UdsSymbol};
use crate::engine::sequence::{ReconstructedSequence, ReducedSequence};
use crate::error::{Result, UdsError};

// ============================================================================
// Constants
// ============================================================================

/// Offset added to the divisor of every comparison so a zero level never
/// divides by zero
pub const SIMILARITY_EPSILON: f64 = 0.00001;

// ============================================================================
// Classification
// ============================================================================

/// Relative difference between two levels, in percent of the current level
///
/// Equal levels are always 0, including a level of exactly `-SIMILARITY_EPSILON`
/// where the offset divisor is itself zero.
#[inline]
pub fn percent_difference(prev_level: f64, current: f64) -> f64 {
    if prev_level == current {
        return 0.0;
    }
    ((prev_level - current) / (current + SIMILARITY_EPSILON)).abs() * 100.0
}

/// Classify one block against the previous level
///
/// Returns the symbol and the amplitude the block is reconstructed with.
pub fn classify(prev_level: f64, current: f64, min_diff: f64) -> (UdsSymbol, f64) {
    if percent_difference(prev_level, current) < min_diff {
        (UdsSymbol::Same, prev_level)
    } else if prev_level > current {
        (UdsSymbol::Down, current)
    } else {
        (UdsSymbol::Up, current)
    }
}

// ============================================================================
// Encoder
// ============================================================================

/// Symbols plus the waveform they reconstruct
#[derive(Debug, Clone, PartialEq)]
pub struct Encoding {
    pub symbols: UdsSequence,
    pub reconstructed: ReconstructedSequence,
}

/// Classifies blocks with a fixed similarity threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Encoder {
    min_diff: f64,
}

impl Encoder {
    /// Create an encoder
    ///
    /// # Arguments
    /// * `min_diff` - Similarity threshold in percent; smaller changes are `Same`
    ///
    /// # Errors
    /// * `ThresholdInvalid` - If the threshold is negative or not finite
    pub fn new(min_diff: f64) -> Result<Self> {
        if !min_diff.is_finite() || min_diff < 0.0 {
            return Err(UdsError::ThresholdInvalid {
                threshold: min_diff,
            });
        }
        Ok(Self { min_diff })
    }

    pub fn min_diff(&self) -> f64 {
        self.min_diff
    }

    /// Encode a reduced sequence
    ///
    /// Emits a leading `Base`, then one symbol per block starting with the
    /// first block, which is compared against its own level. The previous
    /// level always moves to the block just classified, so drift is measured
    /// step by step rather than against the last distinct level.
    pub fn encode(&self, reduced: &ReducedSequence) -> Encoding {
        let block_size = reduced.block_size().get();
        let block_count = reduced.block_count();

        let mut symbols = Vec::with_capacity(block_count + 1);
        let mut values = Vec::with_capacity(reduced.len());
        symbols.push(UdsSymbol::Base);

        if let Some(first) = reduced.levels().next() {
            let mut prev_level = first;
            for (k, current) in reduced.levels().enumerate() {
                let (symbol, amplitude) = classify(prev_level, current, self.min_diff);
                symbols.push(symbol);

                let positions = block_size.min(reduced.len() - k * block_size);
                values.extend(std::iter::repeat(amplitude).take(positions));

                prev_level = current;
            }
        }

        debug!(
            "Projected: {}, Actual: {}",
            block_count + 1,
            symbols.len()
        );

        Encoding {
            symbols: UdsSequence::from_symbols(symbols),
            reconstructed: ReconstructedSequence::from_parts(
                values,
                reduced.block_size(),
                reduced.sample_rate(),
                reduced.bits_per_sample(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::reducer::{AverageReducer, PreviousReducer, Reducer};
    use crate::engine::sequence::{BlockSize, SampleSequence};
    use approx::assert_relative_eq;

    fn reduce_previous(samples: &[i32], block_size: i64) -> ReducedSequence {
        let input = SampleSequence::new(samples.to_vec(), 44100, 16);
        PreviousReducer.reduce(&input, BlockSize::new(block_size).unwrap())
    }

    #[test]
    fn test_percent_difference() {
        assert_relative_eq!(percent_difference(110.0, 100.0), 10.0, epsilon = 1e-4);
        assert_relative_eq!(percent_difference(100.0, 50.0), 100.0, epsilon = 1e-3);
        assert_eq!(percent_difference(7.0, 7.0), 0.0);
    }

    #[test]
    fn test_percent_difference_at_zero_is_finite() {
        let diff = percent_difference(1.0, 0.0);
        assert!(diff.is_finite());
        assert_relative_eq!(diff, 100.0 / SIMILARITY_EPSILON, max_relative = 1e-12);
    }

    #[test]
    fn test_percent_difference_is_unsigned_for_negative_levels() {
        let diff = percent_difference(-100.0, -110.0);
        assert!(diff > 0.0);
        assert_relative_eq!(
            diff,
            10.0 / (110.0 - SIMILARITY_EPSILON) * 100.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_classify_branches() {
        assert_eq!(classify(100.0, 102.0, 5.0), (UdsSymbol::Same, 100.0));
        assert_eq!(classify(100.0, 50.0, 5.0), (UdsSymbol::Down, 50.0));
        assert_eq!(classify(50.0, 100.0, 5.0), (UdsSymbol::Up, 100.0));
    }

    #[test]
    fn test_classify_threshold_is_strict() {
        // 10 / (100 + eps) * 100 is just under 10, so it is still Same at 10
        // and becomes Up once the threshold drops below the difference.
        assert_eq!(classify(90.0, 100.0, 10.0).0, UdsSymbol::Same);
        assert_eq!(classify(90.0, 100.0, 9.9).0, UdsSymbol::Up);
        // Identical levels with a zero threshold are not "less than" zero.
        assert_eq!(classify(5.0, 5.0, 0.0).0, UdsSymbol::Up);
    }

    #[test]
    fn test_identical_levels_are_same_for_positive_threshold() {
        for min_diff in [0.001, 1.0, 50.0] {
            assert_eq!(classify(-42.0, -42.0, min_diff).0, UdsSymbol::Same);
        }
    }

    #[test]
    fn test_identical_levels_at_negative_epsilon_are_same() {
        assert_eq!(percent_difference(-SIMILARITY_EPSILON, -SIMILARITY_EPSILON), 0.0);
        assert_eq!(
            classify(-SIMILARITY_EPSILON, -SIMILARITY_EPSILON, 5.0),
            (UdsSymbol::Same, -SIMILARITY_EPSILON)
        );
        // A different level over a zero divisor is an unbounded change.
        assert_eq!(classify(1.0, -SIMILARITY_EPSILON, 5.0).0, UdsSymbol::Down);
    }

    #[test]
    fn test_rejects_invalid_threshold() {
        for bad in [-0.5, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Encoder::new(bad),
                Err(UdsError::ThresholdInvalid { .. })
            ));
        }
        assert!(Encoder::new(0.0).is_ok());
    }

    #[test]
    fn test_flat_signal_is_all_same() {
        let reduced = reduce_previous(&[10, 10, 10, 10], 2);
        let encoding = Encoder::new(5.0).unwrap().encode(&reduced);

        assert_eq!(reduced.values(), &[10.0; 4]);
        assert_eq!(encoding.symbols.to_string(), "BSS");
        assert_eq!(encoding.reconstructed.quantized(), vec![10, 10, 10, 10]);
    }

    #[test]
    fn test_drop_is_down() {
        let reduced = reduce_previous(&[100, 50], 1);
        let encoding = Encoder::new(10.0).unwrap().encode(&reduced);

        assert_eq!(encoding.symbols.to_string(), "BSD");
        assert_eq!(encoding.reconstructed.values(), &[100.0, 50.0]);
    }

    #[test]
    fn test_same_holds_previous_level() {
        let reduced = reduce_previous(&[100, 100, 103, 103, 200, 200], 2);
        let encoding = Encoder::new(5.0).unwrap().encode(&reduced);

        assert_eq!(encoding.symbols.to_string(), "BSSU");
        assert_eq!(
            encoding.reconstructed.values(),
            &[100.0, 100.0, 100.0, 100.0, 200.0, 200.0]
        );
    }

    #[test]
    fn test_slow_drift_stays_same() {
        // Each step is 2%, below the 5% threshold, so drift goes undetected.
        let samples: Vec<i32> = (0..10).map(|k| 1000 + 20 * k).collect();
        let reduced = reduce_previous(&samples, 1);
        let encoding = Encoder::new(5.0).unwrap().encode(&reduced);

        assert_eq!(encoding.symbols.to_string(), "BSSSSSSSSSS");
        // Each Same holds the level of the block immediately before it.
        assert_eq!(encoding.reconstructed.values()[9], 1160.0);
    }

    #[test]
    fn test_short_final_block_keeps_length() {
        let reduced = reduce_previous(&[1, 1, 50, 50, 2], 2);
        let encoding = Encoder::new(5.0).unwrap().encode(&reduced);

        assert_eq!(encoding.reconstructed.len(), 5);
        assert_eq!(encoding.symbols.to_string(), "BSUD");
        assert_eq!(encoding.symbols.len(), 3 + 1);
    }

    #[test]
    fn test_symbol_count_matches_block_count() {
        let input = SampleSequence::new((0..37).map(|i| (i * 7919) % 101).collect(), 8000, 16);
        for b in 1..=10 {
            let reduced = AverageReducer.reduce(&input, BlockSize::new(b).unwrap());
            let encoding = Encoder::new(3.0).unwrap().encode(&reduced);
            assert_eq!(
                encoding.symbols.len(),
                37usize.div_ceil(b as usize) + 1,
                "block size {}",
                b
            );
            assert_eq!(encoding.reconstructed.len(), reduced.len());
        }
    }

    #[test]
    fn test_empty_sequence_is_base_only() {
        let reduced = reduce_previous(&[], 4);
        let encoding = Encoder::new(5.0).unwrap().encode(&reduced);
        assert_eq!(encoding.symbols.to_string(), "B");
        assert!(encoding.reconstructed.is_empty());
    }
}
