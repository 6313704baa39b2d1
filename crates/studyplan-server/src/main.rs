use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use studyplan_core::Config;
use studyplan_server::{router, AppState};
use studyplan_solver::planner_from_config;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// HTTP service computing weekly study plans
#[derive(Parser)]
#[command(name = "studyplan-server")]
#[command(author, version, long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(long, env = "STUDYPLAN_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address, overrides [server] host
    #[arg(long, env = "STUDYPLAN_HOST")]
    host: Option<String>,

    /// Listen port, overrides [server] port
    #[arg(long, env = "STUDYPLAN_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = Config::load_or_default(args.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let planner = planner_from_config(&config.solver).context("failed to set up solver")?;
    let app = router(AppState::new(planner));

    let address = (config.server.host.as_str(), config.server.port);
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to bind {}:{}", config.server.host, config.server.port))?;
    tracing::info!(
        address = %listener.local_addr()?,
        backend = %config.solver.backend,
        time_limit_ms = config.solver.time_limit_ms,
        "studyplan server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
