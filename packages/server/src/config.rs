//! Command-line configuration for the relay server.

use clap::Parser;

/// Flowsync relay server
#[derive(Debug, Clone, Parser)]
#[command(name = "flowsync-server", version, about)]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 3001)]
    pub port: u16,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    pub log_level: String,
}
