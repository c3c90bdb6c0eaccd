//! CSV adapter: Implementation of DatasetSource over a CSV file.
//!
//! The first row is the header. Cells are trimmed; every row must have as
//! many cells as the header.

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;

use crate::domain::RawTable;
use crate::ports::DatasetSource;

/// Error type for dataset loading.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Cannot open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset header is empty")]
    EmptyHeader,

    #[error("Dataset has a header but no data rows")]
    NoRows,

    #[error("Row {row} has {found} cells, header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// CSV file dataset.
#[derive(Debug, Clone)]
pub struct CsvDataset {
    path: PathBuf,
    delimiter: u8,
}

impl CsvDataset {
    /// Create a dataset reader for a comma-separated file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    /// Use a different field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse CSV from any reader.
    ///
    /// # Errors
    /// Returns error on malformed CSV, an empty header, ragged rows or no data rows.
    pub fn read_from<R: std::io::Read>(&self, input: R) -> Result<RawTable, DatasetError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(input);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(String::is_empty) {
            return Err(DatasetError::EmptyHeader);
        }

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != headers.len() {
                return Err(DatasetError::RaggedRow {
                    // 1-based, counting the header line
                    row: i + 2,
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        if rows.is_empty() {
            return Err(DatasetError::NoRows);
        }

        Ok(RawTable::new(headers, rows))
    }
}

impl DatasetSource for CsvDataset {
    type Error = DatasetError;

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<RawTable, DatasetError> {
        let file = std::fs::File::open(&self.path).map_err(|source| DatasetError::Open {
            path: self.path.clone(),
            source,
        })?;
        let table = self.read_from(std::io::BufReader::new(file))?;

        tracing::info!(
            "Loaded dataset {}: {} rows x {} columns",
            self.path.display(),
            table.n_rows(),
            table.n_columns()
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("Should create temp file");
        writeln!(file, "fatigue, diet_type ,deficiency").expect("write");
        writeln!(file, "1,Vegan,iron").expect("write");
        writeln!(file, "0, Non-Veg ,b12").expect("write");
        file.flush().expect("flush");

        let table = CsvDataset::new(file.path()).load().expect("Should load");
        assert_eq!(table.headers(), ["fatigue", "diet_type", "deficiency"]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(
            table.column(1).collect::<Vec<_>>(),
            vec!["Vegan", "Non-Veg"]
        );
    }

    #[test]
    fn test_missing_file() {
        let err = CsvDataset::new("/nonexistent/dataset.csv").load().unwrap_err();
        assert!(matches!(err, DatasetError::Open { .. }));
    }

    #[test]
    fn test_header_only() {
        let err = CsvDataset::new("inline")
            .read_from("a,b,deficiency\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, DatasetError::NoRows));
    }

    #[test]
    fn test_ragged_row() {
        let err = CsvDataset::new("inline")
            .read_from("a,b\n1,2\n3\n".as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            DatasetError::RaggedRow {
                row: 3,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let table = CsvDataset::new("inline")
            .with_delimiter(b';')
            .read_from("a;b\n1;x\n".as_bytes())
            .expect("Should parse");
        assert_eq!(table.headers(), ["a", "b"]);
    }
}
