//! Audio Engine Module
//!
//! Sample sequence types and WAV/text file I/O.

pub mod io;
pub mod sequence;

pub use io::{load_samples, read_text, write_text, write_waveform};
pub use sequence::{
    quantize, BlockSize, ReconstructedSequence, ReducedSequence, SampleSequence, MONO,
};
