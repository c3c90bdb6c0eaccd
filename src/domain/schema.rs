//! Feature schema: the ordered column contract between training and inference.
//!
//! The classifier only sees positional vectors, so the order of columns here is
//! the single source of truth. Both the training pipeline and the request-time
//! feature assembly iterate this schema; neither keeps its own column list.
//! Bump [`SCHEMA_VERSION`] whenever a column is added, removed or reordered.

use serde::{Deserialize, Serialize};

/// Version of the column contract below.
pub const SCHEMA_VERSION: u32 = 1;

/// Name of the target column in the dataset.
pub const TARGET_COLUMN: &str = "deficiency";

/// Levels of the ordinal protein-intake column, in code order.
pub const ORDINAL_LEVELS: [&str; 3] = ["low", "medium", "high"];

/// How a feature column is turned into a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Presence flag: "1" is 1, anything else is 0.
    Flag,
    /// Free categorical value, encoded through the fitted encoder bank.
    Categorical,
    /// Fixed three-level scale (see [`ORDINAL_LEVELS`]).
    Ordinal,
}

/// A single named column of the feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureColumn {
    /// Column name (CSV header and HTML form field name)
    pub name: &'static str,
    /// Encoding rule
    pub kind: ColumnKind,
}

const fn flag(name: &'static str) -> FeatureColumn {
    FeatureColumn {
        name,
        kind: ColumnKind::Flag,
    }
}

const fn categorical(name: &'static str) -> FeatureColumn {
    FeatureColumn {
        name,
        kind: ColumnKind::Categorical,
    }
}

/// Symptom flags, in schema order.
pub const SYMPTOM_COLUMNS: [&str; 14] = [
    "fatigue",
    "hair_loss",
    "pale_skin",
    "dizziness",
    "weakness",
    "bone_pain",
    "muscle_cramps",
    "tingling",
    "slow_healing",
    "memory_issues",
    "low_immunity",
    "dry_skin",
    "brittle_nails",
    "loss_appetite",
];

/// The full feature contract, version [`SCHEMA_VERSION`].
pub const FEATURE_COLUMNS: [FeatureColumn; 27] = [
    flag("fatigue"),
    flag("hair_loss"),
    flag("pale_skin"),
    flag("dizziness"),
    flag("weakness"),
    flag("bone_pain"),
    flag("muscle_cramps"),
    flag("tingling"),
    flag("slow_healing"),
    flag("memory_issues"),
    flag("low_immunity"),
    flag("dry_skin"),
    flag("brittle_nails"),
    flag("loss_appetite"),
    categorical("diet_type"),
    FeatureColumn {
        name: "protein_sources_daily",
        kind: ColumnKind::Ordinal,
    },
    flag("milk_daily"),
    flag("fruits_daily"),
    flag("veggies_daily"),
    flag("sunlight"),
    categorical("junk_food"),
    categorical("sleep_hours"),
    categorical("stress"),
    categorical("activity"),
    categorical("digestive_issues"),
    flag("supplements"),
    categorical("medical_conditions"),
];

/// Error type for dataset/schema disagreements.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Target column '{0}' not found")]
    MissingTarget(String),

    #[error("Column '{0}' not found")]
    MissingColumn(String),

    #[error("Expected {expected} feature columns, dataset has {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Feature column {position} should be '{expected}', dataset has '{found}'")]
    ColumnMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("Model has {model} classes, target encoder has {labels}")]
    ClassCountMismatch { model: usize, labels: usize },

    #[error("Column '{column}' line {row}: '{value}' is not numeric")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Column '{column}' line {row}: '{value}' is not one of low/medium/high")]
    UnknownOrdinal {
        column: String,
        row: usize,
        value: String,
    },
}

/// Ordered, versioned description of the classifier input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    version: u32,
    columns: &'static [FeatureColumn],
    target: &'static str,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::standard()
    }
}

impl FeatureSchema {
    /// The schema the service is built against.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            version: SCHEMA_VERSION,
            columns: &FEATURE_COLUMNS,
            target: TARGET_COLUMN,
        }
    }

    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub const fn columns(&self) -> &'static [FeatureColumn] {
        self.columns
    }

    #[must_use]
    pub const fn target(&self) -> &'static str {
        self.target
    }

    /// Number of features the classifier expects.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a feature column, if it is part of the schema.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Columns that need a fitted categorical encoder.
    pub fn categorical_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Categorical)
            .map(|c| c.name)
    }

    /// Check that a dataset header carries exactly the schema's features, in order.
    ///
    /// The target column may appear anywhere; every other column must line up
    /// position by position with the schema.
    ///
    /// # Errors
    /// Returns the first disagreement found.
    pub fn verify_alignment<S: AsRef<str>>(&self, header: &[S]) -> Result<(), SchemaError> {
        if !header.iter().any(|h| h.as_ref() == self.target) {
            return Err(SchemaError::MissingTarget(self.target.to_string()));
        }

        let features: Vec<&str> = header
            .iter()
            .map(AsRef::as_ref)
            .filter(|h| *h != self.target)
            .collect();

        for (position, (column, found)) in self.columns.iter().zip(&features).enumerate() {
            if column.name != *found {
                return Err(SchemaError::ColumnMismatch {
                    position,
                    expected: column.name.to_string(),
                    found: (*found).to_string(),
                });
            }
        }

        if features.len() != self.columns.len() {
            return Err(SchemaError::LengthMismatch {
                expected: self.columns.len(),
                found: features.len(),
            });
        }

        Ok(())
    }
}

/// Code of an ordinal level, matched case-insensitively.
#[must_use]
pub fn ordinal_code(raw: &str) -> Option<u32> {
    let clean = raw.trim().to_lowercase();
    ORDINAL_LEVELS
        .iter()
        .position(|level| *level == clean)
        .map(|p| p as u32)
}
