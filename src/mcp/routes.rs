// ABOUTME: HTTP route handler for the protected MCP endpoint
// ABOUTME: Extracts the bearer credential, dispatches authentication, short-circuits on deny
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::protocol::ProtocolHandler;
use super::resources::ServerResources;
use crate::auth::bearer_credential;
use crate::jsonrpc::{error_codes, JsonRpcRequest, JsonRpcResponse};
use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use http::{HeaderMap, StatusCode};
use std::sync::Arc;
use tracing::warn;

/// MCP endpoint route handlers
pub struct McpRoutes;

impl McpRoutes {
    /// Create the protected MCP route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/mcp", post(Self::handle_mcp))
            .with_state(resources)
    }

    /// Handle `POST /mcp`
    ///
    /// Authentication runs first; on denial the business handler is never
    /// invoked and the response carries no hint of which check failed.
    async fn handle_mcp(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        let credential = bearer_credential(&headers);
        let auth = match resources.auth_manager.authenticate(credential.as_deref()) {
            Ok(auth) => auth,
            Err(reason) => {
                // The specific cause stays in the logs; the client sees one
                // uniform unauthorized response for every denial.
                warn!(%reason, "MCP request denied");
                return unauthorized_response();
            }
        };

        let request: JsonRpcRequest = match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(e) => {
                warn!("MCP request body is not valid JSON-RPC: {e}");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(JsonRpcResponse::error(
                        None,
                        error_codes::PARSE_ERROR,
                        "Parse error: invalid JSON",
                    )),
                )
                    .into_response();
            }
        };

        let (status, response) = ProtocolHandler::handle(request, &resources, &auth).await;
        (status, Json(response)).into_response()
    }
}

/// The single unauthorized response shape for the protected endpoint
fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(http::header::WWW_AUTHENTICATE, "Bearer")],
        Json(serde_json::json!({ "error": "unauthorized" })),
    )
        .into_response()
}
