//! UDS - Up/Down/Same audio encoding
//!
//! Converts a mono PCM waveform into a compact symbol stream describing the
//! relative change between successive down-sampled blocks, and reconstructs an
//! audible approximation from it.
//!
//! # Architecture
//!
//! Data flows strictly in one direction:
//! - Loader: reads and truncates a WAV source (`engine::io`)
//! - Reducer: collapses samples into blocks (`codec::reducer`)
//! - Encoder: classifies blocks as Up/Down/Same (`codec::encoder`)
//! - Writer: serializes waveforms and symbols (`output`)
//!
//! The `query` module consumes the emitted UDS text independently.

pub mod cli;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod query;

pub use codec::{Pipeline, PipelineOutput, ReductionStrategy, UdsSequence, UdsSymbol};
pub use config::EncoderConfig;
pub use error::{Result, UdsError};
