//! Server bootstrap.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::{
    config::ServerArgs,
    signal::shutdown_signal,
    ui::{AppState, create_router},
};

/// Errors that stop the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Bind and serve until a shutdown signal arrives
pub async fn run(args: ServerArgs) -> Result<(), ServerError> {
    let addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!("listening on {}", listener.local_addr()?);

    serve(listener, Arc::new(AppState::in_memory())).await
}

/// Serve the router on an already-bound listener
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), ServerError> {
    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
