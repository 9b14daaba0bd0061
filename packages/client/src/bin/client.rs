//! Collaborative flowchart client.
//!
//! Opens a chart, joins its room on the relay, and runs an interactive
//! editing prompt.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin flowsync-client -- --create "My flow"
//! ```

use std::sync::Arc;

use clap::Parser;
use flowsync_client::{
    ChartSession, RelayLink,
    cli::run_repl,
    config::ClientArgs,
    domain::{ChartRepository, SessionError},
    infrastructure::{HttpChartRepository, LocalFlowStore, RelayConnection, relay_url},
};
use flowsync_shared::logger::setup_logger;

async fn start(args: ClientArgs) -> Result<ChartSession, SessionError> {
    let repository = Arc::new(HttpChartRepository::new(&args.server));

    let chart_id = match args.chart {
        Some(id) => id,
        None => {
            let title = args.create.unwrap_or_default();
            let chart = repository.create_chart(&title).await?;
            println!("created chart {}", chart.id);
            chart.id
        }
    };

    let (connection, events) = RelayConnection::connect(&relay_url(&args.server)).await?;
    ChartSession::open(
        chart_id,
        repository,
        Some(RelayLink { connection, events }),
        LocalFlowStore::new(&args.local_dir),
    )
    .await
}

#[tokio::main]
async fn main() {
    let args = ClientArgs::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let session = match start(args).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to open chart: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_repl(session).await {
        tracing::error!("Prompt error: {}", e);
        std::process::exit(1);
    }
}
