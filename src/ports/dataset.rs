//! Dataset port: Trait for reading the training table.

use crate::domain::RawTable;

/// Source of the raw training table.
pub trait DatasetSource {
    /// Error type for load failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short description of where the data comes from, for logs.
    fn describe(&self) -> String;

    /// Read the whole table into memory.
    ///
    /// # Errors
    /// Returns error if the data cannot be read or is not rectangular.
    fn load(&self) -> Result<RawTable, Self::Error>;
}
