//! Training pipeline: builds the prediction context once at startup.
//!
//! This service coordinates:
//! - Dataset loading
//! - Schema alignment check
//! - Column encoding
//! - Model fitting

use std::time::Instant;

use crate::adapters::DatasetError;
use crate::domain::schema::ordinal_code;
use crate::domain::{
    CategoricalEncoder, ColumnKind, EncodeError, EncoderBank, FeatureSchema,
    RawTable, SchemaError, TrainingSet,
};
use crate::ports::{Classifier, ClassifierTrainer, DatasetSource};
use crate::NutrisenseError;

/// Everything a request needs to make a prediction.
///
/// Built once by [`TrainingPipeline::run`] and never mutated afterwards.
#[derive(Debug)]
pub struct PredictionContext<C: Classifier> {
    schema: FeatureSchema,
    encoders: EncoderBank,
    classifier: C,
}

impl<C: Classifier> PredictionContext<C> {
    /// Assemble a context, checking that its parts agree with each other.
    ///
    /// # Errors
    /// Returns error if a categorical column or the target has no encoder, the
    /// classifier's input width differs from the schema, or its class count
    /// differs from the target encoder.
    pub fn new(
        schema: FeatureSchema,
        encoders: EncoderBank,
        classifier: C,
    ) -> Result<Self, NutrisenseError> {
        for column in schema.categorical_columns().chain([schema.target()]) {
            if !encoders.contains(column) {
                return Err(EncodeError::UnknownColumn(column.to_string()).into());
            }
        }

        if classifier.n_features() != schema.len() {
            return Err(SchemaError::LengthMismatch {
                expected: schema.len(),
                found: classifier.n_features(),
            }
            .into());
        }

        let labels = encoders.options(schema.target())?.len();
        if classifier.n_classes() != labels {
            return Err(SchemaError::ClassCountMismatch {
                model: classifier.n_classes(),
                labels,
            }
            .into());
        }

        Ok(Self {
            schema,
            encoders,
            classifier,
        })
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn encoders(&self) -> &EncoderBank {
        &self.encoders
    }

    #[must_use]
    pub fn classifier(&self) -> &C {
        &self.classifier
    }
}

fn column_index(table: &RawTable, name: &str) -> Result<usize, SchemaError> {
    table
        .column_index(name)
        .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
}

/// CSV line number of a data row (header is line 1).
const fn line_of(row: usize) -> usize {
    row + 2
}

fn parse_numeric(column: &str, row: usize, cell: &str) -> Result<f64, SchemaError> {
    cell.parse::<f64>().map_err(|_| SchemaError::NonNumeric {
        column: column.to_string(),
        row: line_of(row),
        value: cell.to_string(),
    })
}

/// Encode a raw table into numeric training data following `schema`.
///
/// - flag columns must be numeric
/// - the ordinal column may be numeric or one of low/medium/high, so training
///   sees the same codes request-time assembly produces
/// - categorical columns and the target get fitted encoders
///
/// # Errors
/// Returns error if the header is not aligned with the schema or a cell
/// cannot be encoded.
pub fn encode_table(
    table: &RawTable,
    schema: &FeatureSchema,
) -> Result<(EncoderBank, TrainingSet), NutrisenseError> {
    schema.verify_alignment(table.headers())?;

    let mut encoders = EncoderBank::new();
    let mut rows: Vec<Vec<f64>> = vec![Vec::with_capacity(schema.len()); table.n_rows()];

    for column in schema.columns() {
        let index = column_index(table, column.name)?;
        let cells: Vec<&str> = table.column(index).collect();

        match column.kind {
            ColumnKind::Flag => {
                for (row, cell) in cells.iter().enumerate() {
                    rows[row].push(parse_numeric(column.name, row, cell)?);
                }
            }
            ColumnKind::Ordinal => {
                for (row, cell) in cells.iter().enumerate() {
                    let value = match cell.parse::<f64>() {
                        Ok(v) => v,
                        Err(_) => ordinal_code(cell).map(f64::from).ok_or_else(|| {
                            SchemaError::UnknownOrdinal {
                                column: column.name.to_string(),
                                row: line_of(row),
                                value: (*cell).to_string(),
                            }
                        })?,
                    };
                    rows[row].push(value);
                }
            }
            ColumnKind::Categorical => {
                let (encoder, codes) = CategoricalEncoder::fit_transform(column.name, &cells)?;
                for (row, code) in codes.into_iter().enumerate() {
                    rows[row].push(f64::from(code));
                }
                tracing::debug!(
                    "Column '{}': {} classes {:?}",
                    column.name,
                    encoder.len(),
                    encoder.classes()
                );
                encoders.insert(column.name, encoder);
            }
        }
    }

    let target_index = column_index(table, schema.target())?;
    let target_cells: Vec<&str> = table.column(target_index).collect();
    let (target, codes) = CategoricalEncoder::fit_transform(schema.target(), &target_cells)?;
    let labels: Vec<usize> = codes.into_iter().map(|c| c as usize).collect();
    let n_classes = target.len();
    tracing::info!("Target '{}': {} classes {:?}", schema.target(), n_classes, target.classes());
    encoders.insert(schema.target(), target);

    let data = TrainingSet::new(rows, labels, n_classes)?;
    Ok((encoders, data))
}

/// Startup pipeline: dataset → encoders → trained classifier.
pub struct TrainingPipeline<D, T>
where
    D: DatasetSource,
    T: ClassifierTrainer,
{
    source: D,
    trainer: T,
    schema: FeatureSchema,
}

impl<D, T> TrainingPipeline<D, T>
where
    D: DatasetSource,
    D::Error: Into<DatasetError>,
    T: ClassifierTrainer,
{
    /// Create a pipeline using the standard feature schema.
    pub fn new(source: D, trainer: T) -> Self {
        Self {
            source,
            trainer,
            schema: FeatureSchema::standard(),
        }
    }

    /// Load, encode and train.
    ///
    /// Any failure here is fatal to startup; there is no partial context.
    ///
    /// # Errors
    /// Returns error if the dataset cannot be read, does not match the schema,
    /// or the model cannot be trained.
    pub fn run(&self) -> Result<PredictionContext<T::Model>, NutrisenseError> {
        let started = Instant::now();
        tracing::info!(
            "Training on {} (schema v{}, {} features)",
            self.source.describe(),
            self.schema.version(),
            self.schema.len()
        );

        let table = self
            .source
            .load()
            .map_err(|e| NutrisenseError::Dataset(e.into()))?;
        let (encoders, data) = encode_table(&table, &self.schema)?;
        let classifier = self.trainer.fit(&data)?;
        let context = PredictionContext::new(self.schema.clone(), encoders, classifier)?;

        tracing::info!(
            "Model ready: {} samples, {} classes, {:.2?} total",
            data.n_samples(),
            data.n_classes(),
            started.elapsed()
        );
        Ok(context)
    }
}
