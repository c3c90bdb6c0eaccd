//! Categorical encoders: string value <-> dense integer code.
//!
//! Codes follow the sorted order of the distinct values seen at fit time,
//! starting at 0. Encoders never change after fitting.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Error type for encoding operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("No encoder registered for column '{0}'")]
    UnknownColumn(String),

    #[error("Column '{0}' has no values to fit an encoder on")]
    EmptyColumn(String),

    #[error("Code {code} is out of range for column '{column}'")]
    UnknownCode { column: String, code: u32 },
}

/// Bijection between the observed values of one column and integer codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalEncoder {
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

impl CategoricalEncoder {
    /// Fit an encoder on the values of `column`.
    ///
    /// Matching is case-sensitive here: "Vegan" and "vegan" become two classes.
    ///
    /// # Errors
    /// Returns `EncodeError::EmptyColumn` if `values` is empty.
    pub fn fit<'a, I>(column: &str, values: I) -> Result<Self, EncodeError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let distinct: BTreeSet<&str> = values.into_iter().collect();
        if distinct.is_empty() {
            return Err(EncodeError::EmptyColumn(column.to_string()));
        }

        let classes: Vec<String> = distinct.into_iter().map(str::to_string).collect();
        let codes = classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.clone(), code as u32))
            .collect();

        Ok(Self { classes, codes })
    }

    /// Fit on `values` and return the code of each value, in input order.
    ///
    /// # Errors
    /// Returns `EncodeError::EmptyColumn` if `values` is empty.
    pub fn fit_transform(column: &str, values: &[&str]) -> Result<(Self, Vec<u32>), EncodeError> {
        let encoder = Self::fit(column, values.iter().copied())?;
        let codes = values.iter().map(|v| encoder.codes[*v]).collect();
        Ok((encoder, codes))
    }

    /// Known classes in code order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Code of an exact (case-sensitive) class value.
    #[must_use]
    pub fn code_of(&self, value: &str) -> Option<u32> {
        self.codes.get(value).copied()
    }

    /// Original value for a code.
    #[must_use]
    pub fn label_of(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    /// First class whose value equals `raw` ignoring case and surrounding whitespace.
    #[must_use]
    pub fn lookup_case_insensitive(&self, raw: &str) -> Option<u32> {
        let clean = raw.trim().to_lowercase();
        self.classes
            .iter()
            .position(|class| class.to_lowercase() == clean)
            .map(|p| p as u32)
    }
}

/// One fitted encoder per categorical column, plus the target column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncoderBank {
    encoders: BTreeMap<String, CategoricalEncoder>,
}

impl EncoderBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the encoder for a column, replacing any previous one.
    pub fn insert(&mut self, column: impl Into<String>, encoder: CategoricalEncoder) {
        self.encoders.insert(column.into(), encoder);
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&CategoricalEncoder> {
        self.encoders.get(column)
    }

    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.encoders.contains_key(column)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    fn encoder(&self, column: &str) -> Result<&CategoricalEncoder, EncodeError> {
        self.encoders
            .get(column)
            .ok_or_else(|| EncodeError::UnknownColumn(column.to_string()))
    }

    /// Encode a raw form value for `column`.
    ///
    /// Never fails for a registered column:
    /// - absent value: code of the first known class
    /// - case-insensitive match: that class's code
    /// - anything else: warning, then code of the first known class
    ///
    /// # Errors
    /// Returns `EncodeError::UnknownColumn` if no encoder was fitted for `column`.
    pub fn encode(&self, column: &str, raw: Option<&str>) -> Result<u32, EncodeError> {
        let encoder = self.encoder(column)?;

        let Some(raw) = raw else {
            return Ok(0);
        };

        if let Some(code) = encoder.lookup_case_insensitive(raw) {
            return Ok(code);
        }

        tracing::warn!(
            column,
            value = raw,
            fallback = encoder.classes[0].as_str(),
            "Unseen categorical value, using fallback class"
        );
        Ok(0)
    }

    /// Decode a code back to the original value.
    ///
    /// # Errors
    /// Returns an error for unknown columns or out-of-range codes.
    pub fn decode(&self, column: &str, code: u32) -> Result<&str, EncodeError> {
        self.encoder(column)?
            .label_of(code)
            .ok_or_else(|| EncodeError::UnknownCode {
                column: column.to_string(),
                code,
            })
    }

    /// Known values of a column, for building form option lists.
    ///
    /// # Errors
    /// Returns `EncodeError::UnknownColumn` if no encoder was fitted for `column`.
    pub fn options(&self, column: &str) -> Result<&[String], EncodeError> {
        Ok(self.encoder(column)?.classes())
    }
}
