//! Roster HTTP server
//!
//! Starts an Axum web server backed by the file record store.

use clap::Parser;
use roster::{
    cli::{Cli, Command, ConfigSource, generate_config_template},
    config::Config,
    handlers::{self, AppState},
    telemetry,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = &cli.command {
        let template = generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(path, template)?;
                eprintln!("Configuration template written to {}", path);
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    let (config, config_origin) = match cli.config_source() {
        ConfigSource::Explicit(path) => {
            let config = Config::from_file(&path)?;
            (config, path.display().to_string())
        }
        ConfigSource::Default(path) if path.exists() => {
            let config = Config::from_file(&path)?;
            (config, path.display().to_string())
        }
        ConfigSource::Default(_) => (Config::default(), "built-in defaults".to_string()),
    };

    telemetry::init(&config.observability.log_level);

    let addr = config.socket_addr()?;
    tracing::info!(
        config = %config_origin,
        storage = %config.storage.path.display(),
        strict_load = config.storage.strict_load,
        "Starting Roster server on {}",
        addr
    );

    let state = AppState::new(Arc::new(config)).await?;
    let app = handlers::router(state);

    tracing::info!("Listening on {}", addr);
    tracing::info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, finishing in-flight requests");
}
