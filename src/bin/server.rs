//! kvsecrets Server Binary
//!
//! Starts the TCP container store server.

use std::sync::Arc;

use clap::Parser;
use kvsecrets::network::Server;
use kvsecrets::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// kvsecrets container store server
#[derive(Parser, Debug)]
#[command(name = "kvsecrets-server")]
#[command(about = "WAL-backed store of namespaced blob containers")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./kvsecrets_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = kvsecrets::config::DEFAULT_ADDR)]
    listen: String,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kvsecrets=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("kvsecrets server v{}", kvsecrets::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .workers(args.workers)
        .max_connections(args.max_connections)
        .build();

    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized with {} containers", engine.container_count());

    let server = match Server::bind(config, engine) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
