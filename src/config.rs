//! Encoder configuration
//!
//! The recognized options for one encoding run. Values are loaded from JSON
//! or built in code, then validated as a whole before any stage runs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::reducer::ReductionStrategy;
use crate::engine::sequence::BlockSize;
use crate::error::{Result, UdsError};

/// Default samples per block
pub const DEFAULT_BLOCK_SIZE: i64 = 100;

/// Default similarity threshold in percent
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 5.0;

/// Default length kept from each source, in seconds
pub const DEFAULT_MAX_DURATION_SECS: f64 = 30.0;

/// Options for one encoding run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Samples per reduction block (at least 1)
    pub block_size: i64,
    /// How each block's representative value is computed
    pub strategy: ReductionStrategy,
    /// Minimum percent change for Up/Down instead of Same
    pub similarity_threshold: f64,
    /// Length kept from the start of the source
    pub max_duration_secs: f64,
    /// Reject sources that are not at this rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_sample_rate: Option<u32>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            block_size: DEFAULT_BLOCK_SIZE,
            strategy: ReductionStrategy::default(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_duration_secs: DEFAULT_MAX_DURATION_SECS,
            expected_sample_rate: None,
        }
    }
}

impl EncoderConfig {
    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(UdsError::SourceNotFound {
                path: path.display().to_string(),
                source: None,
            });
        }
        let contents = fs::read_to_string(path)?;
        let config: EncoderConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn with_block_size(mut self, block_size: i64) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_strategy(mut self, strategy: ReductionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_max_duration(mut self, secs: f64) -> Self {
        self.max_duration_secs = secs;
        self
    }

    pub fn with_expected_sample_rate(mut self, rate: Option<u32>) -> Self {
        self.expected_sample_rate = rate;
        self
    }

    /// Check every option, returning the validated block size
    ///
    /// # Errors
    /// * `ReductionFactorInvalid` - block size below 1
    /// * `ThresholdInvalid` - negative or non-finite threshold
    /// * `InvalidConfig` - non-positive or non-finite duration, or a zero sample rate
    pub fn validate(&self) -> Result<BlockSize> {
        let block_size = BlockSize::new(self.block_size)?;

        if !self.similarity_threshold.is_finite() || self.similarity_threshold < 0.0 {
            return Err(UdsError::ThresholdInvalid {
                threshold: self.similarity_threshold,
            });
        }

        if !self.max_duration_secs.is_finite() || self.max_duration_secs <= 0.0 {
            return Err(UdsError::InvalidConfig {
                reason: format!(
                    "max duration must be a positive number of seconds, got {}",
                    self.max_duration_secs
                ),
            });
        }

        if self.expected_sample_rate == Some(0) {
            return Err(UdsError::InvalidConfig {
                reason: "expected sample rate must be positive".to_string(),
            });
        }

        Ok(block_size)
    }

    /// Threshold as it appears in output names: `5` for 5.0, `2.5` for 2.5
    pub fn threshold_label(&self) -> String {
        format!("{}", self.similarity_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_is_valid() {
        let config = EncoderConfig::default();
        assert_eq!(config.validate().unwrap().get(), 100);
        assert_eq!(config.strategy, ReductionStrategy::Average);
    }

    #[test]
    fn test_validate_block_size() {
        let config = EncoderConfig::default().with_block_size(0);
        assert!(matches!(
            config.validate(),
            Err(UdsError::ReductionFactorInvalid { block_size: 0 })
        ));
    }

    #[test]
    fn test_validate_threshold() {
        let config = EncoderConfig::default().with_similarity_threshold(-1.0);
        assert!(matches!(
            config.validate(),
            Err(UdsError::ThresholdInvalid { .. })
        ));
        assert!(EncoderConfig::default()
            .with_similarity_threshold(0.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_duration() {
        for bad in [0.0, -2.0, f64::NAN] {
            let config = EncoderConfig::default().with_max_duration(bad);
            assert!(matches!(
                config.validate(),
                Err(UdsError::InvalidConfig { .. })
            ));
        }
    }

    #[test]
    fn test_threshold_label() {
        assert_eq!(EncoderConfig::default().threshold_label(), "5");
        assert_eq!(
            EncoderConfig::default()
                .with_similarity_threshold(2.5)
                .threshold_label(),
            "2.5"
        );
    }

    #[test]
    fn test_load_partial_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "block_size": 4, "strategy": "previous" }"#).unwrap();

        let config = EncoderConfig::from_json_file(&path).unwrap();
        assert_eq!(config.block_size, 4);
        assert_eq!(config.strategy, ReductionStrategy::Previous);
        assert_eq!(config.similarity_threshold, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(config.expected_sample_rate, None);
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ block_size: ").unwrap();

        assert!(matches!(
            EncoderConfig::from_json_file(&path),
            Err(UdsError::Serialization(_))
        ));
    }
}
