//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external libraries:
//! - `csv_dataset`: the `csv` crate for reading the training table
//! - `forest`: random forest classifier (rand + rayon)
//! - `sanitize`: filtering of user-supplied text in logs

pub mod csv_dataset;
pub mod forest;
pub mod sanitize;

// Re-export dataset error for lib.rs
pub use csv_dataset::{CsvDataset, DatasetError};
pub use forest::{ForestParams, ForestTrainer, RandomForest};
