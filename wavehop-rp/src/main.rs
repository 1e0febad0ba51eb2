//! Radio Player (wavehop-rp) - Main entry point
//!
//! Internet-radio shuffle player daemon: discovers stations from the
//! public directory, owns the playback lifecycle, and serves the HTTP/SSE
//! control surface the browser UI consumes.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wavehop_common::config::{resolve_data_folder, BootstrapConfig};
use wavehop_rp::api::{self, AppContext};
use wavehop_rp::db;
use wavehop_rp::directory::RadioDirectoryClient;
use wavehop_rp::playback::{ControllerConfig, HttpAudioSource, PlaybackController, TuningEffect};
use wavehop_rp::state::SharedState;

/// Default HTTP port for the radio player daemon
const DEFAULT_PORT: u16 = 5780;

/// Command-line arguments for wavehop-rp
#[derive(Parser, Debug)]
#[command(name = "wavehop-rp")]
#[command(about = "Radio shuffle player daemon for wavehop")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "WAVEHOP_PORT")]
    port: Option<u16>,

    /// Folder holding the daemon database
    #[arg(short, long, env = "WAVEHOP_DATA_FOLDER")]
    data_folder: Option<String>,

    /// Explicit database file path (overrides the data folder)
    #[arg(long, env = "WAVEHOP_DATABASE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = BootstrapConfig::load().unwrap_or_else(|e| {
        eprintln!("Ignoring config file: {e}");
        BootstrapConfig::default()
    });

    // Initialize tracing
    let default_filter = config
        .logging
        .filter
        .clone()
        .unwrap_or_else(|| "wavehop_rp=debug,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = args.port.or(config.port).unwrap_or(DEFAULT_PORT);

    // Resolve and prepare the data folder
    let data_folder = resolve_data_folder(args.data_folder.as_deref(), "WAVEHOP_DATA_FOLDER");
    std::fs::create_dir_all(&data_folder)
        .with_context(|| format!("Failed to create data folder {}", data_folder.display()))?;

    let database_path = args
        .database
        .or(config.database_path)
        .unwrap_or_else(|| data_folder.join("wavehop.db"));

    info!("Starting wavehop radio player on port {}", port);
    info!("Database: {}", database_path.display());

    // Open database and restore persisted settings
    let pool = db::open_pool(&database_path)
        .await
        .context("Failed to open database")?;
    db::init::initialize_database(&pool)
        .await
        .context("Failed to initialize database")?;
    let volume = db::settings::get_volume(&pool)
        .await
        .context("Failed to load volume setting")?;

    // Wire up the player
    let state = Arc::new(SharedState::new(volume));
    let catalog = Arc::new(RadioDirectoryClient::new());
    let favorites = Arc::new(db::FavoritesStore::new(pool.clone()));
    let controller = PlaybackController::new(
        state.clone(),
        catalog.clone(),
        Box::new(HttpAudioSource::default()),
        TuningEffect::new(),
        favorites,
        pool,
        ControllerConfig::default(),
    );
    info!("Playback controller initialized");

    // Build the application router
    let ctx = AppContext {
        state,
        controller: controller.clone(),
        catalog,
    };
    let app = api::create_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    controller.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
