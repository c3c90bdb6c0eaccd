//! Domain layer: Core types and logic.
//!
//! This module contains pure Rust types with no I/O. The feature schema is
//! the contract every other layer agrees on.

mod encoder;
mod foods;
mod model;
mod prediction;
pub mod schema;
mod symptoms;
mod table;

pub use encoder::{CategoricalEncoder, EncodeError, EncoderBank};
pub use foods::recommended_foods;
pub use model::{ModelError, TrainingSet};
pub use prediction::{rank_top, round_percent, PredictionReport, RankedPrediction, TOP_K};
pub use schema::{ColumnKind, FeatureColumn, FeatureSchema, SchemaError};
pub use symptoms::{flag_value, ordinal_value, FeatureVector, SymptomForm};
pub use table::RawTable;
