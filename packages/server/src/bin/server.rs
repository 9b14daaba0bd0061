//! Collaborative flowchart relay server.
//!
//! Relays chart updates between all connections in the same room and serves
//! the chart store API.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin flowsync-server -- --port 3001
//! ```

use clap::Parser;
use flowsync_server::config::ServerArgs;
use flowsync_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let args = ServerArgs::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Run the server
    if let Err(e) = flowsync_server::run_server(args).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
