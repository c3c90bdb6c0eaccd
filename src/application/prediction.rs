//! Prediction service: form fields in, ranked deficiencies out.

use std::sync::Arc;

use crate::application::PredictionContext;
use crate::domain::{
    rank_top, recommended_foods, round_percent, EncodeError, FeatureVector, PredictionReport,
    RankedPrediction, SymptomForm, TOP_K,
};
use crate::ports::Classifier;
use crate::NutrisenseError;

/// Known option values of one categorical form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOptions<'a> {
    pub name: &'static str,
    pub options: &'a [String],
}

/// Service for running predictions against the shared context.
///
/// Cheap to clone; all clones share one read-only context.
pub struct PredictionService<C: Classifier> {
    context: Arc<PredictionContext<C>>,
}

impl<C: Classifier> Clone for PredictionService<C> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
        }
    }
}

impl<C: Classifier> PredictionService<C> {
    /// Create a new prediction service.
    #[must_use]
    pub fn new(context: PredictionContext<C>) -> Self {
        Self {
            context: Arc::new(context),
        }
    }

    #[must_use]
    pub fn context(&self) -> &PredictionContext<C> {
        &self.context
    }

    /// Option lists for every categorical field, in schema order.
    ///
    /// # Errors
    /// Returns `EncodeError::UnknownColumn` if a categorical column has no encoder.
    pub fn form_options(&self) -> Result<Vec<FieldOptions<'_>>, EncodeError> {
        let encoders = self.context.encoders();
        self.context
            .schema()
            .categorical_columns()
            .map(|name| {
                Ok(FieldOptions {
                    name,
                    options: encoders.options(name)?,
                })
            })
            .collect()
    }

    /// Run the full pipeline for one form submission.
    ///
    /// # Errors
    /// Returns error if the feature vector cannot be assembled or the
    /// classifier rejects it.
    pub fn predict(&self, form: &SymptomForm) -> Result<PredictionReport, NutrisenseError> {
        let features =
            FeatureVector::assemble(self.context.schema(), self.context.encoders(), form)?;
        self.predict_features(&features)
    }

    /// Rank the top classes for an already assembled feature vector.
    ///
    /// # Errors
    /// Returns `ModelError::FeatureCount` if the vector length is wrong.
    pub fn predict_features(
        &self,
        features: &FeatureVector,
    ) -> Result<PredictionReport, NutrisenseError> {
        let proba = self.context.classifier().predict_proba(features.as_slice())?;
        let target = self.context.schema().target();

        let predictions = rank_top(&proba, TOP_K)
            .into_iter()
            .map(|(class, p)| {
                let label = self.context.encoders().decode(target, class as u32)?;
                Ok(RankedPrediction {
                    label: label.to_uppercase(),
                    percent: round_percent(p),
                    foods: recommended_foods(label)
                        .iter()
                        .map(|f| (*f).to_string())
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>, EncodeError>>()?;

        if let Some(top) = predictions.first() {
            tracing::debug!("Top prediction {} ({:.2}%)", top.label, top.percent);
        }

        Ok(PredictionReport::new(
            predictions,
            self.context.schema().version(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::SYMPTOM_COLUMNS;
    use crate::domain::ModelError;
    use crate::test_fixtures;

    fn valid_form() -> SymptomForm {
        let mut form = SymptomForm::new()
            .with("diet_type", "Vegan")
            .with("protein_sources_daily", "high")
            .with("junk_food", "Low")
            .with("sleep_hours", "6-8")
            .with("stress", "Medium")
            .with("activity", "Moderate")
            .with("digestive_issues", "No")
            .with("medical_conditions", "None");
        for symptom in SYMPTOM_COLUMNS {
            form = form.with(symptom, "0");
        }
        form
    }

    #[test]
    fn test_predict_returns_three_ranked_labels() {
        let service = test_fixtures::service();
        let report = service.predict(&valid_form()).expect("Should predict");

        assert_eq!(report.predictions.len(), 3);
        assert_eq!(report.schema_version, 1);
        for pair in report.predictions.windows(2) {
            assert!(pair[0].percent >= pair[1].percent);
        }
        for p in &report.predictions {
            assert!((0.0..=100.0).contains(&p.percent));
            assert_eq!(p.label, p.label.to_uppercase());
            assert!(test_fixtures::LABELS
                .iter()
                .any(|l| l.to_uppercase() == p.label));
            assert_eq!((p.percent * 100.0).round() / 100.0, p.percent);
        }

        let total: f64 = report.predictions.iter().map(|p| p.percent).sum();
        assert!(total <= 100.0 + 0.015);
    }

    #[test]
    fn test_predictions_carry_food_lists() {
        let service = test_fixtures::service();
        let report = service.predict(&valid_form()).expect("Should predict");
        for p in &report.predictions {
            assert_eq!(p.foods.is_empty(), recommended_foods(&p.label).is_empty());
        }
    }

    #[test]
    fn test_unknown_category_still_predicts() {
        let service = test_fixtures::service();
        let form = valid_form().with("diet_type", "XYZ");
        let report = service.predict(&form).expect("Should predict");
        assert_eq!(report.predictions.len(), 3);
    }

    #[test]
    fn test_empty_form_still_predicts() {
        let service = test_fixtures::service();
        let report = service.predict(&SymptomForm::new()).expect("Should predict");
        assert_eq!(report.predictions.len(), 3);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let service = test_fixtures::service();
        let a = service.predict(&valid_form()).expect("Should predict");
        let b = service.predict(&valid_form()).expect("Should predict");
        assert_eq!(a.predictions, b.predictions);
    }

    #[test]
    fn test_wrong_length_vector_is_rejected() {
        let service = test_fixtures::service();
        let err = service
            .predict_features(&FeatureVector::from(vec![0.0; 5]))
            .unwrap_err();
        assert!(matches!(
            err,
            NutrisenseError::Model(ModelError::FeatureCount {
                expected: 27,
                found: 5
            })
        ));
    }

    #[test]
    fn test_form_options_follow_schema() {
        let service = test_fixtures::service();
        let options = service.form_options().expect("Should list options");
        let names: Vec<&str> = options.iter().map(|o| o.name).collect();
        assert_eq!(
            names,
            vec![
                "diet_type",
                "junk_food",
                "sleep_hours",
                "stress",
                "activity",
                "digestive_issues",
                "medical_conditions"
            ]
        );
        assert!(options.iter().all(|o| !o.options.is_empty()));
    }
}
