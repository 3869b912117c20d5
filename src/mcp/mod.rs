// ABOUTME: Model Context Protocol implementation for the protected endpoint
// ABOUTME: Groups shared resources, protocol handlers, schema types, and HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// MCP protocol message handlers
pub mod protocol;
/// Shared server resources injected into route handlers
pub mod resources;
/// MCP HTTP route handlers (the protected endpoint adapter)
pub mod routes;
/// MCP schema types (initialize response, capabilities)
pub mod schema;

pub use protocol::ProtocolHandler;
pub use resources::ServerResources;
pub use routes::McpRoutes;
