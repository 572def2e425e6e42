// ============================
// assetreg-backend-bin/src/main.rs
// ============================
//! `assetreg` entry point.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use backend_lib::{
    config::Settings,
    logging,
    router,
    storage::{SqliteStorage, Storage},
    AppState,
};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "assetreg", version, about = "Asset registry web server")]
struct Cli {
    /// TOML config file (defaults to ./assetreg.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run migrations, then serve HTTP
    Serve {
        /// Override `bind_addr`
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Create the database schema and exit
    Migrate,
}

async fn open_storage(settings: &Settings) -> anyhow::Result<SqliteStorage> {
    let storage = SqliteStorage::connect(&settings.database.url, settings.database.max_connections)
        .await
        .with_context(|| format!("opening database {}", settings.database.url))?;
    storage.migrate().await.context("running migrations")?;
    Ok(storage)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("loading configuration")?;
    logging::init_tracing(&settings)?;

    if settings.secret_key.is_development_default() {
        warn!("using the development secret key; set SECRET_KEY before exposing this server");
    }

    match cli.command {
        Command::Migrate => {
            open_storage(&settings).await?;
            info!("database schema is up to date");
        },
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                settings.bind_addr = bind;
            }
            let storage = open_storage(&settings).await?;
            let addr = settings.bind_addr;

            let state = Arc::new(AppState::new(storage, settings));

            // Forget stale login-throttle entries every 15 minutes
            let sweeper = state.clone();
            tokio::spawn(async move {
                let mut interval = interval(Duration::from_secs(15 * 60));
                loop {
                    interval.tick().await;
                    sweeper.login_limiter.cleanup();
                }
            });

            let app = router::create_router(state);

            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("binding {addr}"))?;
            info!(%addr, "listening");

            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        },
    }

    Ok(())
}
