// ABOUTME: HTTP router assembly plus unauthenticated health and index routes
// ABOUTME: Merges health, OAuth2, and MCP routers under shared middleware layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Router assembly for the server.
//!
//! `/health` and `/` are liveness and discovery endpoints: they bypass the
//! authentication dispatcher entirely and must never expose secrets.

use crate::config::SecurityConfig;
use crate::errors::AppError;
use crate::mcp::resources::ServerResources;
use crate::mcp::routes::McpRoutes;
use crate::oauth2::routes::OAuth2Routes;
use axum::{extract::State, routing::get, Json, Router};
use http::{HeaderValue, Uri};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Health and index route handlers
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the unauthenticated liveness and index routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/", get(Self::handle_index))
            .route("/health", get(Self::handle_health))
            .with_state(resources)
    }

    /// Service index with endpoint map and enabled auth methods
    async fn handle_index(
        State(resources): State<Arc<ServerResources>>,
    ) -> Json<serde_json::Value> {
        let config = &resources.config;
        Json(serde_json::json!({
            "message": config.protocol.server_name,
            "version": config.protocol.server_version,
            "mcp_endpoint": "/mcp",
            "health": "/health",
            "authentication": {
                "bearer_enabled": config.auth.bearer.enabled,
                "oauth_enabled": config.auth.oauth2.enabled,
            }
        }))
    }

    /// Liveness probe
    async fn handle_health(
        State(resources): State<Arc<ServerResources>>,
    ) -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "status": "healthy",
            "service": resources.config.protocol.server_name,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }
}

/// Assemble the complete server router
#[must_use]
pub fn server_router(resources: Arc<ServerResources>) -> Router {
    let cors = cors_layer(&resources.config.security);

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(OAuth2Routes::routes(resources.clone()))
        .merge(McpRoutes::routes(resources))
        .fallback(handle_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Uniform JSON error for unknown routes
async fn handle_not_found(uri: Uri) -> AppError {
    AppError::not_found(format!("Route {}", uri.path()))
}

/// Build the CORS layer from configured origins
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = security
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
