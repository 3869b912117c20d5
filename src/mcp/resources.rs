// ABOUTME: Shared server resources aggregated for dependency injection
// ABOUTME: One Arc-shared bundle handed to every route handler as axum state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::oauth2::OAuth2AuthorizationServer;
use crate::tools::ToolRegistry;
use std::sync::Arc;

/// Everything the HTTP layer needs, constructed once at startup
///
/// The OAuth2 server owns the only mutable state in the process (the code and
/// token stores); every other field is read-only after construction.
pub struct ServerResources {
    /// Loaded and validated configuration
    pub config: ServerConfig,
    /// Authentication dispatcher gating the protected endpoint
    pub auth_manager: AuthManager,
    /// OAuth2 authorization server (flow controller and stores)
    pub oauth2_server: Arc<OAuth2AuthorizationServer>,
    /// Tools served behind the gate
    pub tools: Arc<ToolRegistry>,
}

impl ServerResources {
    /// Wire the resource graph from validated configuration
    #[must_use]
    pub fn new(config: ServerConfig, tools: Arc<ToolRegistry>) -> Self {
        let oauth2_server = Arc::new(OAuth2AuthorizationServer::new(config.auth.oauth2.clone()));
        let auth_manager = AuthManager::new(config.auth.bearer.clone(), oauth2_server.clone());

        Self {
            config,
            auth_manager,
            oauth2_server,
            tools,
        }
    }
}
