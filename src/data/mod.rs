//! Data module - result loading, reshaping and deltas

mod delta;
mod loader;
mod processor;

pub use delta::{DeltaCalculator, DeltaRow, DivergingMatrix, KeySpec, Matrix};
pub use loader::{LoaderError, ResultFile, ResultsLoader};
pub use processor::{
    DataProcessor, NodePoint, Observation, ProcessorError, RegionLevel, ShareRow, ShareTotals,
    StackBy, TransmissionCapacity,
};
