//! Command line configuration using clap.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::adapters::forest::{ClassWeight, MaxFeatures};
use crate::adapters::{CsvDataset, ForestParams};

/// Nutrisense - nutrient deficiency prediction from symptoms
#[derive(Parser, Debug, Clone)]
#[command(name = "nutrisense")]
#[command(about = "Predict likely nutrient deficiencies from symptoms and lifestyle")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct ServerConfig {
    /// Training dataset (CSV with header)
    #[arg(long, default_value = "nutrient_deficiency_realistic_5000.csv")]
    pub dataset: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 180)]
    pub trees: usize,

    /// Seed for bootstrap sampling and feature selection
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Minimum samples required to split a node
    #[arg(long, default_value_t = 3)]
    pub min_samples_split: usize,

    /// Maximum tree depth (unlimited if omitted)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Features considered per split
    #[arg(long, value_enum, default_value_t = MaxFeatures::Sqrt)]
    pub max_features: MaxFeatures,

    /// Per-class sample weighting
    #[arg(long, value_enum, default_value_t = ClassWeight::BalancedSubsample)]
    pub class_weight: ClassWeight,

    /// Grow every tree on the full dataset instead of a bootstrap sample
    #[arg(long)]
    pub no_bootstrap: bool,

    /// Field delimiter of the dataset (single ASCII character)
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Append logs to this file instead of stdout
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Forest hyperparameters selected on the command line.
    #[must_use]
    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_estimators: self.trees,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            seed: self.seed,
            max_features: self.max_features,
            class_weight: self.class_weight,
            bootstrap: !self.no_bootstrap,
            ..ForestParams::default()
        }
    }

    /// Dataset reader for the configured file.
    #[must_use]
    pub fn dataset(&self) -> CsvDataset {
        CsvDataset::new(self.dataset.clone()).with_delimiter(self.delimiter)
    }
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!("'{raw}' is not a single ASCII character")),
    }
}
