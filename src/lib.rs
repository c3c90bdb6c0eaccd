//! # Nutrisense
//!
//! Nutrient-deficiency prediction from self-reported symptoms and lifestyle
//! factors.
//!
//! This crate provides:
//! - A versioned feature schema shared by training and inference
//! - Categorical encoders with case-insensitive, fail-soft lookup
//! - A random-forest classifier trained once at startup
//! - A small HTML front-end (form + top-3 result page)
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (schema, encoders, form decoding, ranked predictions)
//! - `ports`: Trait definitions for the dataset source and the classifier
//! - `adapters`: Concrete implementations (CSV reader, random forest, log sanitizer)
//! - `application`: Use cases (startup training, per-request prediction)
//! - `web`: HTTP surface (axum router, handlers, pages)

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod web;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use domain::{FeatureSchema, FeatureVector, PredictionReport, RankedPrediction, SymptomForm};

/// Result type for Nutrisense operations
pub type Result<T> = std::result::Result<T, NutrisenseError>;

/// Main error type for Nutrisense
#[derive(Debug, thiserror::Error)]
pub enum NutrisenseError {
    #[error("Dataset could not be loaded: {0}")]
    Dataset(#[from] adapters::DatasetError),

    #[error("Dataset does not match the feature schema: {0}")]
    Schema(#[from] domain::SchemaError),

    #[error("Encoding failed: {0}")]
    Encode(#[from] domain::EncodeError),

    #[error("Model error: {0}")]
    Model(#[from] domain::ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
