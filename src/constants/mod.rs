// ABOUTME: Application constants and default configuration values
// ABOUTME: Groups protocol, OAuth2, and server defaults in namespaced modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// MCP protocol constants
pub mod protocol {
    /// MCP protocol version advertised by `initialize`
    pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

    /// Default server name reported in `serverInfo`
    pub const SERVER_NAME: &str = "datapipe-mcp-server";

    /// Server version (from Cargo.toml)
    pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// OAuth 2.0 protocol constants
pub mod oauth {
    /// The only supported grant type
    pub const GRANT_TYPE_AUTHORIZATION_CODE: &str = "authorization_code";

    /// The only supported response type
    pub const RESPONSE_TYPE_CODE: &str = "code";

    /// Token type reported in token responses
    pub const TOKEN_TYPE_BEARER: &str = "bearer";

    /// Scope granted when the client requests none
    pub const DEFAULT_SCOPE: &str = "mcp";

    /// Random bytes per authorization code (base64url-encoded on the wire)
    pub const AUTHORIZATION_CODE_BYTES: usize = 32;

    /// Random bytes per access token (base64url-encoded on the wire)
    pub const ACCESS_TOKEN_BYTES: usize = 48;

    /// PKCE challenge methods accepted by the authorize endpoint
    pub const CODE_CHALLENGE_METHODS: [&str; 2] = ["S256", "plain"];
}

/// Default configuration values
pub mod defaults {
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 8001;

    /// Authorization codes expire after ten minutes
    pub const AUTHORIZATION_CODE_TTL_SECS: u64 = 600;

    /// Access tokens expire after one hour
    pub const ACCESS_TOKEN_TTL_SECS: u64 = 3600;

    /// Default CORS policy allows every origin
    pub const CORS_ORIGINS: &str = "*";
}
