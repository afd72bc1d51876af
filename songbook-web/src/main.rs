//! songbook-web - Song lyrics collection web service
//!
//! Serves the CRUD API and the installable, offline-capable PWA shell.

use anyhow::Result;
use clap::Parser;
use songbook_common::config::{resolve_root_folder, RootFolder};
use songbook_common::db::init_database;
use songbook_web::{build_router, AppState};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "songbook-web", about = "Song lyrics collection web service")]
struct Args {
    /// Root data folder (overrides SONGBOOK_ROOT and the config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// Port to listen on
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Songbook (songbook-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root = RootFolder::new(resolve_root_folder(args.root_folder.as_deref()));
    root.ensure_directories()?;
    info!("Root folder: {}", root.path().display());

    let db_path = root.database_path();
    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let state = AppState::new(pool, root.uploads_dir());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;
    info!("songbook-web listening on http://0.0.0.0:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
