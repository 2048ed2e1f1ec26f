pub mod config;
pub mod error;
pub mod logging;
pub mod pipelines;
pub mod problems;
pub mod routes;
pub mod state;
pub mod views;

use std::sync::Arc;
use anyhow::Context;

use crate::pipelines::tutor::GeminiTutor;
use crate::state::app::TutorController;

/// Start the tutor: logging, config, model client, then the HTTP server.
pub fn run() -> anyhow::Result<()> {
    // Initialize structured logging first
    logging::init_logging();
    tracing::info!("eqtutor starting");

    let config = config::models::get_config();

    let rt = tokio::runtime::Runtime::new()
        .context("Failed to create async runtime")?;

    rt.block_on(async {
        let service = GeminiTutor::new(config)?;
        let controller = TutorController::new(Arc::new(service));

        let listener = tokio::net::TcpListener::bind(&config.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

        tracing::info!(
            addr = %config.bind_addr,
            text_model = %config.text_model,
            image_model = %config.image_model,
            "Tutor listening"
        );

        axum::serve(listener, routes::create_router(controller))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "HTTP server stopped");
                e
            })
            .context("HTTP server failed")
    })
}
