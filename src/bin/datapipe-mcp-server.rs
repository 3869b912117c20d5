// ABOUTME: Server binary for the authenticated MCP tool-calling endpoint
// ABOUTME: Loads configuration, wires resources, and serves HTTP until shutdown
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Datapipe MCP Server Binary
//!
//! Starts the HTTP server exposing the authenticated `/mcp` endpoint along
//! with the OAuth2 authorization server and health routes.

use anyhow::Result;
use clap::Parser;
use datapipe_mcp_server::{
    config::environment::ServerConfig,
    logging,
    mcp::resources::ServerResources,
    routes::server_router,
    tools::{auth_status::AuthStatusTool, ToolRegistry},
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "datapipe-mcp-server")]
#[command(about = "Datapipe MCP Server - authenticated remote tool-calling endpoint")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Invalid configuration is fatal before the listener binds: an enabled
    // method missing its secret must never be discovered mid-request.
    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting Datapipe MCP Server");
    info!("{}", config.summary());

    let tools = Arc::new(ToolRegistry::new().register(Arc::new(AuthStatusTool)));
    info!("Registered {} tool(s)", tools.len());

    let resources = Arc::new(ServerResources::new(config, tools));
    let app = server_router(resources.clone());

    let addr = format!("0.0.0.0:{}", resources.config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolve when the process receives an interrupt
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install interrupt handler: {e}");
    }
}
