//! chatrelay webhook server and CLI entry point.
//!
//! Binary name: `chatrelay`
//!
//! Parses CLI arguments, initializes tracing, then dispatches to the
//! appropriate command handler or starts the webhook server.

mod cli;
mod http;
mod state;

use clap::Parser;

use chatrelay_infra::config::ENV_LOG_LEVEL;
use chatrelay_infra::filesystem::resolve_data_dir;
use chatrelay_observe::tracing_setup::{init_tracing, resolve_filter, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let rust_log = std::env::var("RUST_LOG").ok();
    let log_level = std::env::var(ENV_LOG_LEVEL).ok();
    let filter = resolve_filter(rust_log.as_deref(), log_level.as_deref(), cli.verbose, cli.quiet);
    let enable_otel = matches!(cli.command, Commands::Serve { otel: true, .. });
    init_tracing(&filter, enable_otel).map_err(|e| anyhow::anyhow!("{e}"))?;

    let data_dir = resolve_data_dir();

    let result = match cli.command {
        Commands::Serve { port, host, .. } => serve(data_dir, host, port, cli.quiet).await,
        Commands::Probe { messages } => cli::probe::run(&data_dir, &messages, cli.json).await,
        Commands::CheckConfig => cli::check_config::run(&data_dir, cli.json).await,
        Commands::Log { user, limit } => {
            cli::log::run(&data_dir, user.as_deref(), limit, cli.json).await
        }
    };

    shutdown_tracing();
    result
}

async fn serve(
    data_dir: std::path::PathBuf,
    host: Option<String>,
    port: Option<u16>,
    quiet: bool,
) -> anyhow::Result<()> {
    let state = AppState::init(data_dir).await?;

    let host = host.unwrap_or_else(|| state.config.server.host.clone());
    let port = port.unwrap_or(state.config.server.port);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        %addr,
        model = %state.config.backend.model,
        data_dir = %state.data_dir.display(),
        "webhook server listening"
    );
    if !quiet {
        println!(
            "  {} chatrelay listening on {}",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}/callback")).cyan()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }

    let tasks = state.tasks.clone();
    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tasks.close();
    if !tasks.is_empty() {
        tracing::info!(pending = tasks.len(), "waiting for in-flight events");
    }
    tasks.wait().await;

    tracing::info!("webhook server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
///
/// If a handler cannot be installed, that branch waits forever and the other
/// one still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
}
