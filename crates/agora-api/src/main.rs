//! Agora CLI and chat server entry point.
//!
//! Binary name: `agora`
//!
//! Parses CLI arguments, initializes tracing and the database, then
//! dispatches to a history command or starts the HTTP/WebSocket server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use agora_infra::filesystem::resolve_static_dir;
use agora_observe::tracing_setup::{filter_for_verbosity, init_tracing, shutdown_tracing};
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "agora", &mut std::io::stdout());
        return Ok(());
    }

    let otel = matches!(cli.command, Commands::Serve { otel: true, .. });
    init_tracing(filter_for_verbosity(cli.verbose, cli.quiet), otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Initialize application state (data dir, config, DB, hub)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { port, host, .. } => {
            let host = host.unwrap_or_else(|| state.config.host.clone());
            let port = port.unwrap_or(state.config.port);
            serve(state, &host, port, cli.quiet).await?;
        }

        Commands::History => {
            cli::history::list_history(&state, cli.json).await?;
        }

        Commands::Delete { id, force } => {
            cli::history::delete_message(&state, id, force, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

async fn serve(state: AppState, host: &str, port: u16, quiet: bool) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    if !quiet {
        println!();
        println!(
            "  {} Agora chat listening on {}",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!(
            "  {}",
            console::style(format!("WebSocket: ws://{addr}/ws/{{username}}/{{client_id}}")).dim()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
        println!();
    }
    tracing::info!(%addr, data_dir = %state.data_dir.display(), "server starting");

    let static_dir = resolve_static_dir(&state.config);
    let hub = state.hub.clone();
    let router = http::router::build_router(state, static_dir.as_deref());

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // End every session so open WebSockets let the server drain.
            hub.shutdown();
        })
        .await?;

    if !quiet {
        println!("\n  Server stopped.");
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {err}");
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
