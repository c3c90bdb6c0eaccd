//! Web layer: axum router serving the form and the prediction page.
//!
//! The trained [`PredictionService`] is the router state; handlers only read
//! from it.

mod error;
mod handlers;
pub mod pages;

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use crate::application::PredictionService;
use crate::ports::Classifier;

pub use error::WebError;

/// Build the application router.
pub fn router<C: Classifier + 'static>(service: PredictionService<C>) -> Router {
    Router::new()
        .route("/", get(handlers::index::<C>))
        .route("/predict", post(handlers::predict::<C>))
        .with_state(service)
}

/// Bind `addr` and serve until Ctrl-C.
///
/// # Errors
/// Returns error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, app: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::SYMPTOM_COLUMNS;
    use crate::domain::SymptomForm;
    use crate::test_fixtures;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Read body");
        String::from_utf8(bytes.to_vec()).expect("UTF-8 body")
    }

    fn post_form(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("Build request")
    }

    fn form_body(diet: &str) -> String {
        let mut fields: Vec<String> = SYMPTOM_COLUMNS.iter().map(|s| format!("{s}=0")).collect();
        fields.extend(
            [
                format!("diet_type={diet}"),
                "protein_sources_daily=high".to_string(),
                "milk_daily=0".to_string(),
                "junk_food=Low".to_string(),
                "sleep_hours=6-8".to_string(),
                "stress=Medium".to_string(),
                "activity=Active".to_string(),
                "digestive_issues=No".to_string(),
                "medical_conditions=None".to_string(),
            ],
        );
        fields.join("&")
    }

    fn result_items(html: &str) -> Vec<&str> {
        html.split("<li class=\"result\"><strong>")
            .skip(1)
            .filter_map(|item| item.split("</strong>").next())
            .collect()
    }

    #[tokio::test]
    async fn test_index_renders_form() {
        let app = router(test_fixtures::service());
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).expect("Build request"))
            .await
            .expect("Response");

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("name=\"fatigue\""));
        assert!(html.contains("<option value=\"Vegan\">Vegan</option>"));
        assert!(html.contains("name=\"protein_sources_daily\""));
    }

    #[tokio::test]
    async fn test_predict_returns_three_uppercase_labels() {
        let app = router(test_fixtures::service());
        let response = app.oneshot(post_form(form_body("Vegan"))).await.expect("Response");

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        let labels = result_items(&html);
        assert_eq!(labels.len(), 3);
        for label in labels {
            assert_eq!(label, label.to_uppercase());
            assert!(test_fixtures::LABELS
                .iter()
                .any(|l| l.to_uppercase() == label));
        }
        assert_eq!(html.matches('%').count(), 3);
    }

    #[tokio::test]
    async fn test_submitted_fields_reach_the_model() {
        let service = test_fixtures::service();
        let body = "fatigue=1&hair_loss=1&diet_type=vegetarian&protein_sources_daily=LOW\
                    &stress=High&sleep_hours=%3C6&unknown_field=ignored";
        let form = SymptomForm::new()
            .with("fatigue", "1")
            .with("hair_loss", "1")
            .with("diet_type", "vegetarian")
            .with("protein_sources_daily", "LOW")
            .with("stress", "High")
            .with("sleep_hours", "<6");
        let expected = service.predict(&form).expect("Should predict");

        let response = router(service)
            .oneshot(post_form(body.to_string()))
            .await
            .expect("Response");
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        for p in &expected.predictions {
            let item = format!("<strong>{}</strong>: {:.2}%", p.label, p.percent);
            assert!(html.contains(&item), "missing {item} in {html}");
        }
    }

    #[tokio::test]
    async fn test_predict_unknown_diet_still_succeeds() {
        let app = router(test_fixtures::service());
        let response = app.oneshot(post_form(form_body("XYZ"))).await.expect("Response");

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert_eq!(result_items(&html).len(), 3);
    }

    #[tokio::test]
    async fn test_predict_empty_form_uses_defaults() {
        let app = router(test_fixtures::service());
        let response = app.oneshot(post_form(String::new())).await.expect("Response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(result_items(&body_text(response).await).len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = router(test_fixtures::service());
        let response = app
            .oneshot(Request::get("/admin").body(Body::empty()).expect("Build request"))
            .await
            .expect("Response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
