//! Symptom form input and its conversion into a classifier feature vector.

use std::collections::HashMap;

use serde::Deserialize;

use super::encoder::{EncodeError, EncoderBank};
use super::schema::{ordinal_code, ColumnKind, FeatureSchema};

/// Raw form fields as submitted by the browser.
///
/// Every field is optional; absent fields take the documented defaults when
/// the feature vector is assembled. Deserializes from a flat url-encoded body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SymptomForm {
    fields: HashMap<String, String>,
}

impl SymptomForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, mostly for tests and callers outside HTTP.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Number of submitted fields, known or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Presence flag rule: exactly "1" means present.
#[must_use]
pub fn flag_value(raw: Option<&str>) -> f64 {
    match raw {
        Some("1") => 1.0,
        _ => 0.0,
    }
}

/// Ordinal rule for form input: unrecognized or absent means "low".
#[must_use]
pub fn ordinal_value(raw: Option<&str>) -> f64 {
    raw.and_then(ordinal_code).unwrap_or(0) as f64
}

/// Feature vector in schema order, ready for the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Assemble the feature vector for a form by walking the schema.
    ///
    /// The result always has `schema.len()` entries, whatever fields the form
    /// carries.
    ///
    /// # Errors
    /// Returns `EncodeError::UnknownColumn` if a categorical schema column has
    /// no fitted encoder.
    pub fn assemble(
        schema: &FeatureSchema,
        encoders: &EncoderBank,
        form: &SymptomForm,
    ) -> Result<Self, EncodeError> {
        let mut values = Vec::with_capacity(schema.len());

        for column in schema.columns() {
            let raw = form.get(column.name);
            let value = match column.kind {
                ColumnKind::Flag => flag_value(raw),
                ColumnKind::Ordinal => ordinal_value(raw),
                ColumnKind::Categorical => encoders.encode(column.name, raw)? as f64,
            };
            values.push(value);
        }

        Ok(Self(values))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}
