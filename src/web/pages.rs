//! HTML pages.
//!
//! Markup is built with plain string formatting; every value that comes from
//! the dataset or the request is escaped first.

use std::fmt::Write;

use crate::application::FieldOptions;
use crate::domain::schema::{ColumnKind, ORDINAL_LEVELS, SYMPTOM_COLUMNS};
use crate::domain::{FeatureSchema, PredictionReport};

const STYLE: &str = "body{font-family:sans-serif;max-width:44rem;margin:2rem auto;padding:0 1rem}\
fieldset{margin-bottom:1rem}label{display:block;margin:.2rem 0}\
.result{border-left:4px solid #2a7;padding:.3rem .8rem;margin:.6rem 0}\
footer{color:#777;font-size:.8rem;margin-top:2rem}";

/// Escape text for use in HTML element content and attribute values.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// "muscle_cramps" -> "Muscle cramps"
fn display_name(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn page(title: &str, body: &str, schema_version: u32) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>{title}</h1>\n{body}\n\
         <footer>Feature schema v{schema_version}. Not a medical diagnosis.</footer>\n\
         </body>\n</html>\n",
        title = escape_html(title),
    )
}

fn select(name: &str, options: &[String]) -> String {
    let mut html = format!(
        "<label>{} <select name=\"{}\">",
        escape_html(&display_name(name)),
        escape_html(name)
    );
    for option in options {
        let value = escape_html(option);
        let _ = write!(html, "<option value=\"{value}\">{value}</option>");
    }
    html.push_str("</select></label>\n");
    html
}

fn checkbox(name: &str) -> String {
    format!(
        "<label><input type=\"checkbox\" name=\"{}\" value=\"1\"> {}</label>\n",
        escape_html(name),
        escape_html(&display_name(name))
    )
}

/// Input form. Fields follow the schema order; categorical option lists come
/// from the fitted encoders.
#[must_use]
pub fn render_form(schema: &FeatureSchema, options: &[FieldOptions<'_>]) -> String {
    let mut symptoms = String::new();
    let mut lifestyle = String::new();

    for column in schema.columns() {
        match column.kind {
            ColumnKind::Flag if SYMPTOM_COLUMNS.contains(&column.name) => {
                symptoms.push_str(&checkbox(column.name));
            }
            ColumnKind::Flag => lifestyle.push_str(&checkbox(column.name)),
            ColumnKind::Ordinal => {
                let levels: Vec<String> = ORDINAL_LEVELS.iter().map(|l| (*l).to_string()).collect();
                lifestyle.push_str(&select(column.name, &levels));
            }
            ColumnKind::Categorical => {
                let known = options
                    .iter()
                    .find(|o| o.name == column.name)
                    .map_or(&[][..], |o| o.options);
                lifestyle.push_str(&select(column.name, known));
            }
        }
    }

    let body = format!(
        "<form method=\"post\" action=\"/predict\">\n\
         <fieldset><legend>Symptoms</legend>\n{symptoms}</fieldset>\n\
         <fieldset><legend>Diet and lifestyle</legend>\n{lifestyle}</fieldset>\n\
         <button type=\"submit\">Predict</button>\n</form>"
    );
    page("Nutrient deficiency check", &body, schema.version())
}

/// Result page with the ranked deficiencies and suggested foods.
#[must_use]
pub fn render_result(report: &PredictionReport) -> String {
    let mut body = String::from("<ol>\n");
    for prediction in &report.predictions {
        let _ = write!(
            body,
            "<li class=\"result\"><strong>{}</strong>: {:.2}%",
            escape_html(&prediction.label),
            prediction.percent
        );
        if !prediction.foods.is_empty() {
            let foods: Vec<String> = prediction.foods.iter().map(|f| escape_html(f)).collect();
            let _ = write!(body, "<br><small>Try: {}</small>", foods.join(", "));
        }
        body.push_str("</li>\n");
    }
    body.push_str("</ol>\n<p><a href=\"/\">Back</a></p>");
    page("Prediction", &body, report.schema_version)
}
