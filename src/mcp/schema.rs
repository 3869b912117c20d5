// ABOUTME: MCP schema types for protocol handshake responses
// ABOUTME: Defines the initialize response with capabilities and server identity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use serde::Serialize;

/// Response to the `initialize` request
#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    /// Negotiated protocol version
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Server capabilities
    pub capabilities: ServerCapabilities,
    /// Server identity
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

impl InitializeResponse {
    /// Build the handshake response for this server
    #[must_use]
    pub fn new(protocol_version: String, name: String, version: String) -> Self {
        Self {
            protocol_version,
            capabilities: ServerCapabilities {
                tools: ToolsCapability {},
            },
            server_info: ServerInfo { name, version },
        }
    }
}

/// Capabilities advertised during the handshake
#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    /// Tool invocation support
    pub tools: ToolsCapability,
}

/// Marker for tool support (no sub-options yet)
#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

/// Server name and version reported to clients
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    /// Server name
    pub name: String,
    /// Server version
    pub version: String,
}
