// ABOUTME: MCP protocol message handlers for core protocol operations
// ABOUTME: Handles initialize, ping, tools/list, and tools/call dispatch
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # MCP Protocol Handlers
//!
//! Core MCP message handling for the protected endpoint. Every handler here
//! runs strictly after the authentication dispatcher has allowed the request.

use super::resources::ServerResources;
use super::schema::InitializeResponse;
use crate::auth::AuthResult;
use crate::jsonrpc::{error_codes, JsonRpcRequest, JsonRpcResponse};
use crate::tools::{ToolContext, ToolError};
use http::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// MCP protocol handlers
pub struct ProtocolHandler;

/// Default ID for requests that arrived without one
fn default_request_id() -> Value {
    Value::Number(serde_json::Number::from(0))
}

impl ProtocolHandler {
    /// Dispatch an authenticated JSON-RPC request to its method handler
    pub async fn handle(
        request: JsonRpcRequest,
        resources: &Arc<ServerResources>,
        auth: &AuthResult,
    ) -> (StatusCode, JsonRpcResponse) {
        info!(
            method = %request.method,
            auth_method = auth.method.as_str(),
            "MCP request"
        );

        let method = request.method.clone();
        match method.as_str() {
            "initialize" => Self::handle_initialize(request, resources),
            "ping" => Self::handle_ping(request),
            "tools/list" => Self::handle_tools_list(request, resources),
            "tools/call" => Self::handle_tools_call(request, resources, auth).await,
            _ => Self::handle_unknown_method(request),
        }
    }

    /// Handle the `initialize` handshake
    fn handle_initialize(
        request: JsonRpcRequest,
        resources: &Arc<ServerResources>,
    ) -> (StatusCode, JsonRpcResponse) {
        let protocol = &resources.config.protocol;
        let init_response = InitializeResponse::new(
            protocol.mcp_version.clone(),
            protocol.server_name.clone(),
            protocol.server_version.clone(),
        );

        let request_id = request.id.unwrap_or_else(default_request_id);
        match serde_json::to_value(&init_response) {
            Ok(result) => (
                StatusCode::OK,
                JsonRpcResponse::success(Some(request_id), result),
            ),
            Err(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                JsonRpcResponse::error(
                    Some(request_id),
                    error_codes::INTERNAL_ERROR,
                    "Internal error",
                ),
            ),
        }
    }

    /// Handle `ping`
    fn handle_ping(request: JsonRpcRequest) -> (StatusCode, JsonRpcResponse) {
        let request_id = request.id.unwrap_or_else(default_request_id);
        (
            StatusCode::OK,
            JsonRpcResponse::success(Some(request_id), serde_json::json!({})),
        )
    }

    /// Handle `tools/list`
    fn handle_tools_list(
        request: JsonRpcRequest,
        resources: &Arc<ServerResources>,
    ) -> (StatusCode, JsonRpcResponse) {
        let tools = resources.tools.descriptors();
        let request_id = request.id.unwrap_or_else(default_request_id);
        (
            StatusCode::OK,
            JsonRpcResponse::success(Some(request_id), serde_json::json!({ "tools": tools })),
        )
    }

    /// Handle `tools/call`
    async fn handle_tools_call(
        request: JsonRpcRequest,
        resources: &Arc<ServerResources>,
        auth: &AuthResult,
    ) -> (StatusCode, JsonRpcResponse) {
        let request_id = request.id.unwrap_or_else(default_request_id);

        let params = request.params.unwrap_or_else(|| serde_json::json!({}));
        let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
            return (
                StatusCode::BAD_REQUEST,
                JsonRpcResponse::error(
                    Some(request_id),
                    error_codes::INVALID_PARAMS,
                    "Invalid params: tool name is required",
                ),
            );
        };
        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}));

        let context = ToolContext { auth: auth.clone() };
        match resources.tools.call(tool_name, arguments, &context).await {
            Ok(content) => (
                StatusCode::OK,
                JsonRpcResponse::success(
                    Some(request_id),
                    serde_json::json!({ "content": content }),
                ),
            ),
            Err(ToolError::UnknownTool(name)) => (
                StatusCode::BAD_REQUEST,
                JsonRpcResponse::error(
                    Some(request_id),
                    error_codes::INVALID_PARAMS,
                    format!("Unknown tool: {name}"),
                ),
            ),
            Err(ToolError::ExecutionFailed(message)) => {
                error!(tool = tool_name, "Tool execution failed: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    JsonRpcResponse::error(
                        Some(request_id),
                        error_codes::INTERNAL_ERROR,
                        format!("Tool execution failed: {message}"),
                    ),
                )
            }
        }
    }

    /// Handle any unrecognized method
    fn handle_unknown_method(request: JsonRpcRequest) -> (StatusCode, JsonRpcResponse) {
        let request_id = request.id.unwrap_or_else(default_request_id);
        (
            StatusCode::NOT_FOUND,
            JsonRpcResponse::error(
                Some(request_id),
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        )
    }
}
