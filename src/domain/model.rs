//! Encoded training data and model error types.

/// Error type for classifier training and inference.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Row {row} has {found} features, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{rows} feature rows but {labels} labels")]
    LabelCountMismatch { rows: usize, labels: usize },

    #[error("Label {label} at row {row} is out of range for {n_classes} classes")]
    LabelOutOfRange {
        row: usize,
        label: usize,
        n_classes: usize,
    },

    #[error("Expected {expected} features, got {found}")]
    FeatureCount { expected: usize, found: usize },

    #[error("Invalid hyperparameter: {0}")]
    InvalidParams(String),
}

/// Fully numeric training data: one row of features per sample and one class
/// code per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
    n_classes: usize,
}

impl TrainingSet {
    /// Build a training set, checking its shape.
    ///
    /// # Errors
    /// Returns an error if there are no rows, rows differ in width, the label
    /// count differs from the row count, or a label is `>= n_classes`.
    pub fn new(
        features: Vec<Vec<f64>>,
        labels: Vec<usize>,
        n_classes: usize,
    ) -> Result<Self, ModelError> {
        let Some(first) = features.first() else {
            return Err(ModelError::EmptyTrainingSet);
        };
        let width = first.len();

        if let Some((row, r)) = features.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(ModelError::RaggedRow {
                row,
                expected: width,
                found: r.len(),
            });
        }
        if labels.len() != features.len() {
            return Err(ModelError::LabelCountMismatch {
                rows: features.len(),
                labels: labels.len(),
            });
        }
        if let Some((row, &label)) = labels.iter().enumerate().find(|(_, l)| **l >= n_classes) {
            return Err(ModelError::LabelOutOfRange {
                row,
                label,
                n_classes,
            });
        }

        Ok(Self {
            features,
            labels,
            n_classes,
        })
    }

    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.features[0].len()
    }

    #[must_use]
    pub const fn n_classes(&self) -> usize {
        self.n_classes
    }
}
