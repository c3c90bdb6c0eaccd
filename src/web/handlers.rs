//! Request handlers.

use axum::extract::{Form, State};
use axum::response::Html;

use super::error::WebError;
use super::pages;
use crate::application::PredictionService;
use crate::domain::SymptomForm;
use crate::ports::Classifier;

/// `GET /`: the input form.
pub async fn index<C: Classifier + 'static>(
    State(service): State<PredictionService<C>>,
) -> Result<Html<String>, WebError> {
    let options = service.form_options()?;
    Ok(Html(pages::render_form(service.context().schema(), &options)))
}

/// `POST /predict`: top-3 deficiencies for the submitted form.
pub async fn predict<C: Classifier + 'static>(
    State(service): State<PredictionService<C>>,
    Form(form): Form<SymptomForm>,
) -> Result<Html<String>, WebError> {
    tracing::debug!("Prediction request with {} fields", form.len());
    let report = service.predict(&form)?;
    if let Some(top) = report.top() {
        tracing::info!("Predicted {} ({:.2}%)", top.label, top.percent);
    }
    Ok(Html(pages::render_result(&report)))
}
