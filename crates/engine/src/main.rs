//! Tableforge Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod images;
mod session;
mod store;

use api::{ConnectionManager, WsState};
use images::ImageStore;
use session::RoomRegistry;
use store::FsRoomStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from the working directory, if a .env is present.
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tableforge_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Tableforge Engine");

    // Load configuration
    let host = std::env::var("TABLEFORGE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("TABLEFORGE_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .unwrap_or(3000);
    let data_dir = std::env::var("TABLEFORGE_DATA_DIR").unwrap_or_else(|_| "rooms".into());

    tracing::info!(data_dir = %data_dir, "Room saves directory");

    let state = Arc::new(WsState {
        registry: Arc::new(RoomRegistry::new()),
        connections: Arc::new(ConnectionManager::new()),
        images: Arc::new(ImageStore::new()),
        store: Arc::new(FsRoomStore::new(data_dir)),
    });

    let app = api::router(state);

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    tracing::info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
