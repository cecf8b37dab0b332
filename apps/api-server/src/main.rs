//! # Inkpost API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use inkpost_core::ports::TokenService;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

#[cfg(feature = "scheduler")]
mod background;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Inkpost API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await?;
    let token_service: Arc<dyn TokenService> = state::token_service();

    #[cfg(feature = "scheduler")]
    let scheduler = start_scheduler(&state).await;

    let result = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(token_service.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    #[cfg(feature = "scheduler")]
    if let Some(mut scheduler) = scheduler {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!(error = %e, "Scheduler did not stop cleanly");
        }
    }

    result
}

/// Start the counter reconciliation job. A failure here only disables the job.
#[cfg(feature = "scheduler")]
async fn start_scheduler(state: &AppState) -> Option<background::Scheduler> {
    use background::{Scheduler, SchedulerConfig};

    let config = SchedulerConfig::from_env();
    if !config.enabled {
        tracing::info!("Scheduler disabled; post counters are not reconciled");
        return None;
    }

    let result = async {
        let scheduler = Scheduler::new(config).await?;
        scheduler.add_reconciliation(state.posts.clone()).await?;
        scheduler.start().await?;
        Ok::<_, tokio_cron_scheduler::JobSchedulerError>(scheduler)
    }
    .await;

    match result {
        Ok(scheduler) => Some(scheduler),
        Err(e) => {
            tracing::error!(error = %e, "Failed to start scheduler");
            None
        }
    }
}
