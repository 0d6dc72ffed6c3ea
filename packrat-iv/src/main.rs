//! packrat-iv (Inventory) - Inventory cataloguing service
//!
//! Items, categories and kits over SQLite with referential consistency
//! enforced at mutation time, thumbnail attachment, and a JSON API plus
//! embedded management page.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;

use packrat_common::api::auth::load_token_hash;
use packrat_common::config;
use packrat_common::db::init_database;
use packrat_iv::thumbs::ThumbnailStore;
use packrat_iv::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "packrat-iv", about = "Packrat inventory service")]
struct Args {
    /// Root folder holding the database and thumbnails
    #[arg(long)]
    root_folder: Option<String>,

    /// HTTP port to listen on
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Packrat Inventory (packrat-iv) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref());
    std::fs::create_dir_all(&root_folder)?;
    info!("Root folder: {}", root_folder.display());

    let db_path = config::database_path(&root_folder);
    let pool = init_database(&db_path).await?;

    // Generated and logged on first run; only the hash is stored
    let token_hash = load_token_hash(&pool).await?;

    let thumbs = ThumbnailStore::new(config::thumbnails_dir(&root_folder))?;

    let state = AppState::new(pool, token_hash, thumbs);
    let app = build_router(state);

    let port = config::resolve_port(args.port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("packrat-iv listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
