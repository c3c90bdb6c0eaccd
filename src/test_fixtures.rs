//! Synthetic datasets shared by unit tests.
//!
//! Rows are deterministic. Labels cycle with the row index and each label
//! raises the odds of two symptom flags, so small forests have something to
//! learn. Every categorical value and every label appears within the first
//! few rows.

use std::io::Write;
use std::sync::{Arc, Mutex};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tempfile::NamedTempFile;

use crate::adapters::{ForestParams, ForestTrainer, RandomForest};
use crate::application::{encode_table, PredictionContext, PredictionService};
use crate::domain::schema::{ColumnKind, ORDINAL_LEVELS, SYMPTOM_COLUMNS};
use crate::domain::{FeatureSchema, RawTable};
use crate::ports::ClassifierTrainer;

/// In-memory log sink for asserting on emitted events.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Writer factory usable with `fmt::layer().with_writer`.
    pub fn writer_factory(&self) -> impl Fn() -> LogCapture + Send + Sync + 'static {
        let capture = self.clone();
        move || capture.clone()
    }

    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().expect("lock").clone()).expect("UTF-8 logs")
    }

    /// Run `f` under a plain-text subscriber recording every level and
    /// return what it logged.
    pub fn run<F: FnOnce()>(f: F) -> String {
        let capture = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(capture.writer_factory())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        capture.contents()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub const LABELS: [&str; 5] = ["iron", "b12", "vitamin_d", "calcium", "zinc"];

fn values_for(column: &str) -> &'static [&'static str] {
    match column {
        "diet_type" => &["Vegan", "Vegetarian", "Non-Veg"],
        "junk_food" | "stress" => &["Low", "Medium", "High"],
        "sleep_hours" => &["<6", "6-8", ">8"],
        "activity" => &["Sedentary", "Moderate", "Active"],
        "digestive_issues" => &["No", "Yes"],
        "medical_conditions" => &["None", "Diabetes", "Thyroid"],
        _ => &["Unknown"],
    }
}

fn rows(n: usize) -> (Vec<String>, Vec<Vec<String>>) {
    let schema = FeatureSchema::standard();
    let mut rng = ChaCha20Rng::seed_from_u64(7);

    let mut headers: Vec<String> = schema.columns().iter().map(|c| c.name.to_string()).collect();
    headers.push(schema.target().to_string());

    let rows = (0..n)
        .map(|row| {
            let label = row % LABELS.len();
            let mut cells: Vec<String> = schema
                .columns()
                .iter()
                .enumerate()
                .map(|(position, column)| match column.kind {
                    ColumnKind::Flag => {
                        let hot = position < SYMPTOM_COLUMNS.len() && position / 2 == label;
                        let p = if hot { 0.85 } else { 0.15 };
                        if rng.gen_bool(p) { "1" } else { "0" }.to_string()
                    }
                    ColumnKind::Ordinal => ORDINAL_LEVELS[row % ORDINAL_LEVELS.len()].to_string(),
                    ColumnKind::Categorical => {
                        let values = values_for(column.name);
                        values[(row + position) % values.len()].to_string()
                    }
                })
                .collect();
            cells.push(LABELS[label].to_string());
            cells
        })
        .collect();

    (headers, rows)
}

pub fn table(n: usize) -> RawTable {
    let (headers, rows) = rows(n);
    RawTable::new(headers, rows)
}

pub fn csv(n: usize) -> String {
    let (headers, rows) = rows(n);
    let mut out = headers.join(",");
    for row in rows {
        out.push('\n');
        out.push_str(&row.join(","));
    }
    out.push('\n');
    out
}

pub fn csv_file(n: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Create temp file");
    file.write_all(csv(n).as_bytes()).expect("Write fixture");
    file.flush().expect("Flush fixture");
    file
}

pub fn small_forest() -> ForestTrainer {
    ForestTrainer::new(ForestParams {
        n_estimators: 15,
        ..ForestParams::default()
    })
}

pub fn context(n: usize) -> PredictionContext<RandomForest> {
    let schema = FeatureSchema::standard();
    let (encoders, data) = encode_table(&table(n), &schema).expect("Encode fixture");
    let forest = small_forest().fit(&data).expect("Fit fixture forest");
    PredictionContext::new(schema, encoders, forest).expect("Build context")
}

pub fn service() -> PredictionService<RandomForest> {
    PredictionService::new(context(100))
}
