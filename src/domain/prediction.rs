//! Prediction result types.
//!
//! Represents the ranked output of the deficiency classifier.

use serde::{Deserialize, Serialize};

/// Number of classes shown to the user.
pub const TOP_K: usize = 3;

/// One ranked class with its probability as a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPrediction {
    /// Deficiency label, uppercased for display
    pub label: String,

    /// Probability scaled to 0-100, rounded to 2 decimals
    pub percent: f64,

    /// Foods rich in the missing nutrient (may be empty)
    pub foods: Vec<String>,
}

/// Complete prediction for one form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Ranked classes, highest probability first
    pub predictions: Vec<RankedPrediction>,

    /// Feature schema version the model was trained against
    pub schema_version: u32,

    /// Timestamp of the prediction
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl PredictionReport {
    #[must_use]
    pub fn new(predictions: Vec<RankedPrediction>, schema_version: u32) -> Self {
        Self {
            predictions,
            schema_version,
            created_at: chrono::Utc::now(),
        }
    }

    /// The most likely class, if any.
    #[must_use]
    pub fn top(&self) -> Option<&RankedPrediction> {
        self.predictions.first()
    }
}

/// Pair class indices with probabilities and keep the `k` largest.
///
/// Sorting is stable, so equal probabilities keep class order.
#[must_use]
pub fn rank_top(probabilities: &[f64], k: usize) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = probabilities.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(k);
    ranked
}

/// Scale a probability to a percentage with 2 decimals.
///
/// Exact ties round half away from zero, so 3.125% becomes 3.13%.
#[must_use]
pub fn round_percent(probability: f64) -> f64 {
    (probability * 100.0 * 100.0).round() / 100.0
}
