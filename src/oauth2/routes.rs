// ABOUTME: OAuth 2.0 HTTP route handlers for the axum web framework
// ABOUTME: Serves authorization, token exchange, and discovery metadata endpoints
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::models::{AuthorizeRequest, OAuth2ErrorResponse, TokenRequest};
use crate::mcp::resources::ServerResources;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use http::{header, HeaderMap, StatusCode};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

/// OAuth 2.0 route handlers
pub struct OAuth2Routes;

impl OAuth2Routes {
    /// Create all OAuth 2.0 routes
    ///
    /// `/authorize` and `/token` alias the `/oauth/...` paths because some
    /// MCP clients resolve the short forms from discovery metadata.
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/oauth/authorize", get(Self::handle_authorize))
            .route("/authorize", get(Self::handle_authorize))
            .route("/oauth/token", post(Self::handle_token))
            .route("/token", post(Self::handle_token))
            .route(
                "/.well-known/oauth-authorization-server",
                get(Self::handle_authorization_server_metadata),
            )
            .route(
                "/.well-known/oauth-protected-resource",
                get(Self::handle_protected_resource_metadata),
            )
            .with_state(resources)
    }

    /// Handle an authorization request (GET /oauth/authorize)
    async fn handle_authorize(
        State(resources): State<Arc<ServerResources>>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Response {
        let request = match parse_authorize_request(&params) {
            Ok(request) => request,
            Err(error) => return oauth_error_response(error),
        };

        match resources.oauth2_server.authorize(&request) {
            Ok(grant) => {
                let mut location = format!(
                    "{}?code={}",
                    grant.redirect_uri,
                    urlencoding::encode(&grant.code)
                );
                if let Some(state) = &grant.state {
                    write!(&mut location, "&state={}", urlencoding::encode(state)).ok();
                }

                (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
            }
            Err(error) => oauth_error_response(error),
        }
    }

    /// Handle a token exchange request (POST /oauth/token)
    async fn handle_token(
        State(resources): State<Arc<ServerResources>>,
        Form(request): Form<TokenRequest>,
    ) -> Response {
        match resources.oauth2_server.exchange(&request) {
            Ok(token) => (StatusCode::OK, Json(token)).into_response(),
            Err(error) => oauth_error_response(error),
        }
    }

    /// OAuth 2.0 Authorization Server Metadata (RFC 8414)
    async fn handle_authorization_server_metadata(headers: HeaderMap) -> Json<serde_json::Value> {
        let base_url = base_url(&headers);
        Json(serde_json::json!({
            "issuer": base_url,
            "authorization_endpoint": format!("{base_url}/oauth/authorize"),
            "token_endpoint": format!("{base_url}/oauth/token"),
            "response_types_supported": ["code"],
            "grant_types_supported": ["authorization_code"],
            "token_endpoint_auth_methods_supported": ["client_secret_post"],
            "code_challenge_methods_supported": ["S256", "plain"],
            "scopes_supported": ["mcp"]
        }))
    }

    /// OAuth 2.0 Protected Resource Metadata
    async fn handle_protected_resource_metadata(headers: HeaderMap) -> Json<serde_json::Value> {
        let base_url = base_url(&headers);
        Json(serde_json::json!({
            "resource": format!("{base_url}/mcp"),
            "authorization_servers": [base_url],
            "scopes_supported": ["mcp"]
        }))
    }
}

/// Parse query parameters into an [`AuthorizeRequest`], naming the first
/// missing required field
fn parse_authorize_request(
    params: &HashMap<String, String>,
) -> Result<AuthorizeRequest, OAuth2ErrorResponse> {
    let client_id = params
        .get("client_id")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| OAuth2ErrorResponse::invalid_request("client_id is required"))?;
    let redirect_uri = params
        .get("redirect_uri")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| OAuth2ErrorResponse::invalid_request("redirect_uri is required"))?;
    let response_type = params
        .get("response_type")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| OAuth2ErrorResponse::invalid_request("response_type is required"))?;

    Ok(AuthorizeRequest {
        response_type: response_type.clone(),
        client_id: client_id.clone(),
        redirect_uri: redirect_uri.clone(),
        scope: params.get("scope").cloned(),
        state: params.get("state").cloned(),
        code_challenge: params.get("code_challenge").cloned(),
        code_challenge_method: params.get("code_challenge_method").cloned(),
    })
}

/// Render an OAuth error with its RFC status code
fn oauth_error_response(error: OAuth2ErrorResponse) -> Response {
    let status = error.http_status();
    (status, Json(error)).into_response()
}

/// Derive the externally visible base URL from request headers
///
/// Honors `x-forwarded-proto` when a proxy terminates TLS in front of us.
fn base_url(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{scheme}://{host}")
}
