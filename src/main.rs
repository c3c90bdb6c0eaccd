//! Nutrisense: nutrient-deficiency prediction service
//!
//! Trains the classifier on startup, then serves the web form.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nutrisense::adapters::sanitize::SanitizingMakeWriter;
use nutrisense::adapters::ForestTrainer;
use nutrisense::application::{PredictionService, TrainingPipeline};
use nutrisense::config::ServerConfig;
use nutrisense::web;

fn main() -> Result<()> {
    let config = ServerConfig::parse();

    // Logs go to stdout unless a file is given; files get no colour codes.
    let (writer, _guard) = match &config.log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                // Best-effort: opening the file reports the real problem.
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(config.log_file.is_none())
                .with_writer(SanitizingMakeWriter::new(writer)),
        )
        .init();

    tracing::info!("Starting Nutrisense...");

    // Training must finish before the listener binds; any failure is fatal.
    let params = config.forest_params();
    let pipeline = TrainingPipeline::new(config.dataset(), ForestTrainer::new(params));
    let context = pipeline
        .run()
        .with_context(|| format!("Training on {} failed", config.dataset.display()))?;
    let app = web::router(PredictionService::new(context));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Cannot start async runtime")?;
    runtime
        .block_on(web::serve(config.bind, app))
        .with_context(|| format!("Server on {} failed", config.bind))?;

    tracing::info!("Nutrisense shutdown complete.");
    Ok(())
}
