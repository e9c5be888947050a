//! Visualization backend for captured articles.
//!
//! Serves the article library over the REST API the SPA consumes:
//! listing with filters, detail, shallow patches, deletion, and index
//! rebuilds. The library root and bind address come from the
//! environment:
//!
//! - `PRISMWEAVE_LIBRARY` — library directory (default `./library`)
//! - `PRISMWEAVE_ADDR` — bind address (default `127.0.0.1:8087`)

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod library;
mod routes;

use library::Library;
use routes::{AppState, router};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let library_root = std::env::var("PRISMWEAVE_LIBRARY").unwrap_or_else(|_| "./library".to_string());
    let addr = std::env::var("PRISMWEAVE_ADDR").unwrap_or_else(|_| "127.0.0.1:8087".to_string());

    let library = Library::open(&library_root)?;
    info!(root = %library_root, articles = library.len(), "library scanned");

    let state = AppState { library: Arc::new(RwLock::new(library)) };

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "listening");

    axum::serve(listener, app).await
}
