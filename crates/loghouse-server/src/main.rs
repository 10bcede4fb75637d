//! loghouse server binary.
//!
//! Opens (or creates) a log directory and serves the HTTP produce/consume
//! API over it until interrupted.
//!
//! ```bash
//! RUST_LOG=debug loghouse-server --addr 0.0.0.0:8080 --data-dir ./data/log
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use loghouse_server::{create_router, AppState};
use loghouse_storage::{Log, LogConfig};

#[derive(Debug, Parser)]
#[command(name = "loghouse-server", about = "HTTP front end for the loghouse commit log")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: String,

    /// Directory holding the segment files.
    #[arg(long, default_value = "./data/log")]
    data_dir: PathBuf,

    /// Store file size at which segments roll, in bytes.
    #[arg(long)]
    max_store_bytes: Option<u64>,

    /// Index file size at which segments roll, in bytes.
    #[arg(long)]
    max_index_bytes: Option<u64>,

    /// First offset for a freshly created log directory.
    #[arg(long)]
    initial_offset: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = LogConfig::default();
    if let Some(bytes) = args.max_store_bytes {
        config.max_store_bytes = bytes;
    }
    if let Some(bytes) = args.max_index_bytes {
        config.max_index_bytes = bytes;
    }
    if let Some(offset) = args.initial_offset {
        config.initial_offset = offset;
    }

    let log = Log::new(&args.data_dir, config)?;
    info!(
        addr = %args.addr,
        dir = %args.data_dir.display(),
        lowest = log.lowest_offset(),
        highest = log.highest_offset(),
        "loghouse server starting"
    );

    let state = AppState { log: Arc::new(log) };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&args.addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
