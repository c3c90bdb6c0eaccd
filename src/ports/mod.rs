//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and its collaborators (dataset storage, model
//! library).

mod classifier;
mod dataset;

pub use classifier::{Classifier, ClassifierTrainer};
pub use dataset::DatasetSource;
