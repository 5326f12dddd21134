//! HTTP front of the traffic watcher: receives feed deliveries on a webhook
//! and serves the stored batches back.

mod app;
mod auth;
mod config;
mod error;
mod handlers;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::AppState;
use crate::config::Cli;
use crate::error::StartupError;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let config = cli.resolve()?;

    let state = AppState::from_config(&config)?;
    info!(
        "Reference route has {} vertices, corridor {} m",
        state.extractor.route().vertex_count(),
        config.route.corridor_meters
    );
    if state.secret.is_none() {
        warn!("SECRET_TOKEN is not set: every webhook delivery will be rejected");
    }

    let app = app::router(Arc::new(state), &config);
    let listener = TcpListener::bind(config.bind).await?;
    info!(
        "Listening on {} (webhook at {}, data in {})",
        listener.local_addr()?,
        config.webhook_path,
        config.data_dir.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
