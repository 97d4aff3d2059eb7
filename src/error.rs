//! Error handling for the UDS encoder
//!
//! Every failure is a configuration or input-data problem; nothing here is
//! transient, so no variant is retried.

use thiserror::Error;

/// Result type alias for UDS operations
pub type Result<T> = std::result::Result<T, UdsError>;

/// Main error type for UDS operations
#[derive(Error, Debug)]
pub enum UdsError {
    // Source Errors
    #[error("Source not found: {path}")]
    SourceNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error(
        "Invalid duration: {requested_secs}s needs {requested_samples} samples but the source only has {available_samples}"
    )]
    InvalidDuration {
        requested_secs: f64,
        requested_samples: usize,
        available_samples: usize,
    },

    // Configuration Errors
    #[error("Reduction factor must be at least 1, got {block_size}")]
    ReductionFactorInvalid { block_size: i64 },

    #[error("Similarity threshold must be a non-negative percentage, got {threshold}")]
    ThresholdInvalid { threshold: f64 },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // Query Errors
    #[error("Invalid split length '{value}' (expected a positive integer or 'random')")]
    InvalidSplitLength { value: String },

    #[error("Invalid UDS symbol '{symbol}' at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl UdsError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            UdsError::SourceNotFound { .. } => "SOURCE_NOT_FOUND",
            UdsError::InvalidAudio { .. } => "INVALID_AUDIO",
            UdsError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            UdsError::InvalidDuration { .. } => "INVALID_DURATION",
            UdsError::ReductionFactorInvalid { .. } => "REDUCTION_FACTOR_INVALID",
            UdsError::ThresholdInvalid { .. } => "THRESHOLD_INVALID",
            UdsError::InvalidConfig { .. } => "INVALID_CONFIG",
            UdsError::InvalidSplitLength { .. } => "INVALID_SPLIT_LENGTH",
            UdsError::InvalidSymbol { .. } => "INVALID_SYMBOL",
            UdsError::Io(_) => "IO_ERROR",
            UdsError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether the error comes from the run configuration rather than the input data
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            UdsError::ReductionFactorInvalid { .. }
                | UdsError::ThresholdInvalid { .. }
                | UdsError::InvalidConfig { .. }
                | UdsError::InvalidSplitLength { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            UdsError::SourceNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            UdsError::InvalidAudio { .. } => vec![
                "Check if the file plays in another application",
                "Re-export the source as a PCM WAV file",
            ],
            UdsError::UnsupportedFormat { .. } => vec![
                "Convert the source to single-channel integer PCM",
                "Resample the source to the corpus sample rate",
            ],
            UdsError::InvalidDuration { .. } => vec![
                "Lower --max-duration to at most the source length",
                "Use a longer source recording",
            ],
            UdsError::ReductionFactorInvalid { .. } => vec!["Use a block size of 1 or more"],
            UdsError::ThresholdInvalid { .. } => {
                vec!["Use a similarity threshold of 0 or more percent"]
            }
            UdsError::InvalidSplitLength { .. } => {
                vec!["Pass a positive split length, or 'random' for lengths 1-15"]
            }
            UdsError::InvalidSymbol { .. } => {
                vec!["UDS text may only contain the characters B, U, D and S"]
            }
            _ => vec![],
        }
    }
}

/// Map a `hound` failure that happened while writing a waveform
pub(crate) fn wav_write_error(e: hound::Error) -> UdsError {
    match e {
        hound::Error::IoError(io) => UdsError::Io(io),
        other => UdsError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            other.to_string(),
        )),
    }
}
