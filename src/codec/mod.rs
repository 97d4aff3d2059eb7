//! UDS Codec
//!
//! Block reduction, Up/Down/Same classification and the pipeline that ties
//! them to the loader.

pub mod encoder;
pub mod pipeline;
pub mod reducer;
pub mod symbol;

pub use encoder::{classify, percent_difference, Encoder, Encoding, SIMILARITY_EPSILON};
pub use pipeline::{Pipeline, PipelineOutput};
pub use reducer::{AverageReducer, PreviousReducer, Reducer, ReductionStrategy};
pub use symbol::{UdsSequence, UdsStats, UdsSymbol};
