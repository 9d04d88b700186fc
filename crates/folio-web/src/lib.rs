//! folio-web - HTTP API for folio using Axum

pub mod error;
pub mod router;
pub mod sse;

pub use error::ApiError;
pub use router::{create_router, AppState};

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

/// Run the API server until the listener fails
pub async fn run(state: AppState, host: &str, port: u16) -> Result<()> {
    let router = create_router(state);

    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;
    let addr = listener.local_addr()?;

    info!("API server listening on http://{}", addr);
    println!("API server listening on http://{}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
