//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod prediction;
mod training;

pub use prediction::{FieldOptions, PredictionService};
pub use training::{encode_table, PredictionContext, TrainingPipeline};
