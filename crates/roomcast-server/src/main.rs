//! Roomcast server binary.
//!
//! # Usage
//!
//! ```bash
//! # Listen on the default port with files under ./ServerFiles
//! roomcast-server
//!
//! # Custom bind address and storage directory
//! roomcast-server --bind 0.0.0.0:12345 --files-root /srv/roomcast
//! ```

use std::path::PathBuf;

use clap::Parser;
use roomcast_server::{Server, ServerConfig, ServerRuntimeConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Roomcast chat and file-relay server
#[derive(Parser, Debug)]
#[command(name = "roomcast-server")]
#[command(about = "Multi-room chat and file-transfer server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:12345")]
    bind: String,

    /// Directory uploaded files are stored under
    #[arg(short, long, default_value = "ServerFiles")]
    files_root: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Operational output goes to stderr; stdout stays clean.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::info!("Roomcast server starting");

    let config = ServerRuntimeConfig {
        bind_address: args.bind,
        server: ServerConfig { files_root: args.files_root, ..ServerConfig::default() },
    };

    let server = Server::bind(config).await?;

    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}
