// ABOUTME: Server binary: CLI flags, logging, config, and serve loop
// ABOUTME: Flags override the environment-derived configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Liftlog contributors

//! Fitness-tracking REST API server

use clap::Parser;
use liftlog::config::ServerConfig;
use liftlog::logging::{self, LoggingConfig};
use liftlog::server;

#[derive(Parser)]
#[command(
    name = "liftlog-server",
    about = "Fitness-tracking REST API server",
    version
)]
struct Args {
    /// HTTP listen port (overrides HTTP_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Database URL (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logging::init(&LoggingConfig::from_env())?;

    let mut config = ServerConfig::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = database_url;
    }

    tracing::info!(
        port = config.http_port,
        environment = %config.environment,
        "starting liftlog-server"
    );

    server::run(config).await.map_err(|e| anyhow::anyhow!("{e}"))
}
