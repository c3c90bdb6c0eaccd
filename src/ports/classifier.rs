//! Classifier port: Traits for training and querying a multi-class model.
//!
//! The application layer only sees class probabilities; which model family
//! sits behind these traits is an adapter concern.

use crate::domain::{ModelError, TrainingSet};

/// A trained, immutable multi-class classifier.
///
/// Implementations must be safe to share across request handlers without
/// locking.
pub trait Classifier: Send + Sync {
    /// Number of features each input vector must have.
    fn n_features(&self) -> usize;

    /// Number of classes; `predict_proba` returns this many values.
    fn n_classes(&self) -> usize;

    /// Per-class probabilities for one sample, indexed by class code.
    ///
    /// # Errors
    /// Returns `ModelError::FeatureCount` if `features` has the wrong length.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError>;
}

/// Fits a [`Classifier`] on encoded training data.
pub trait ClassifierTrainer {
    /// The model produced by this trainer.
    type Model: Classifier;

    /// Train a model.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidParams` for unusable hyperparameters.
    fn fit(&self, data: &TrainingSet) -> Result<Self::Model, ModelError>;
}
