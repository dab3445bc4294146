//! Colloquy REST API entry point.
//!
//! Binary name: `colloquy`
//!
//! Parses CLI arguments, initializes the database and services, then
//! starts the REST API server or runs a utility command.

mod http;
mod state;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};

use state::AppState;

#[derive(Parser)]
#[command(name = "colloquy", version, about = "Conversational assessment platform")]
struct Cli {
    /// Enable OpenTelemetry span export (stdout exporter).
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server.
    Serve {
        /// Bind address; overrides config.toml.
        #[arg(long)]
        host: Option<String>,
        /// Listen port; overrides config.toml.
        #[arg(long, short)]
        port: Option<u16>,
    },
    /// List the loaded scenario catalog.
    Scenarios,
    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "colloquy", &mut std::io::stdout());
        return Ok(());
    }

    colloquy_observe::tracing_setup::init_tracing(cli.otel)
        .map_err(|e| anyhow::anyhow!("tracing init failed: {e}"))?;

    // Initialize application state (DB, catalog, services)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Colloquy API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            if state.staff_token_hash.is_none() {
                println!(
                    "  {}",
                    console::style("Staff dashboard disabled (COLLOQUY_STAFF_TOKEN not set)")
                        .dim()
                );
            }
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state.clone());

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            // The listener has stopped accepting; drain and close the pool.
            state.db_pool.close().await;
            colloquy_observe::tracing_setup::shutdown_tracing();

            println!("\n  Server stopped.");
        }

        Commands::Scenarios => {
            let catalog = state.sessions.catalog();
            if catalog.is_empty() {
                println!("  No scenarios loaded.");
            }
            for scenario in catalog.list() {
                println!(
                    "  {}  {} -- {}",
                    console::style(&scenario.id).cyan(),
                    console::style(&scenario.name).bold(),
                    scenario.description
                );
            }
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
