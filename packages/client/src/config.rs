//! Command-line configuration for the chart client.

use clap::{ArgGroup, Parser};

/// Flowsync chart client
#[derive(Debug, Clone, Parser)]
#[command(name = "flowsync-client", version, about)]
#[command(group(ArgGroup::new("target").required(true).args(["chart", "create"])))]
pub struct ClientArgs {
    /// Base URL of the flowsync server
    #[arg(short, long, default_value = "http://127.0.0.1:3001")]
    pub server: String,

    /// Open an existing chart by id
    #[arg(short, long)]
    pub chart: Option<String>,

    /// Create a new chart with this title and open it
    #[arg(long)]
    pub create: Option<String>,

    /// Directory of the local fallback store
    #[arg(long, default_value = ".flowsync")]
    pub local_dir: String,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
