// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common config, resource, and router builders
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    missing_docs,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

//! Shared test utilities for `datapipe_mcp_server` integration tests.

use axum::body::Body;
use axum::Router;
use datapipe_mcp_server::{
    config::environment::{
        AuthConfig, BearerConfig, LogLevel, OAuth2Config, ProtocolConfig, SecurityConfig,
        ServerConfig,
    },
    constants,
    mcp::resources::ServerResources,
    routes::server_router,
    tools::{auth_status::AuthStatusTool, ToolRegistry},
};
use http::{Request, StatusCode};
use std::sync::{Arc, Once};
use tower::ServiceExt;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Configuration with both authentication methods disabled
pub fn base_config() -> ServerConfig {
    init_test_logging();
    ServerConfig {
        http_port: constants::defaults::HTTP_PORT,
        log_level: LogLevel::Info,
        auth: AuthConfig {
            oauth2: OAuth2Config {
                enabled: false,
                client_id: None,
                client_secret: None,
                authorization_code_ttl_secs: constants::defaults::AUTHORIZATION_CODE_TTL_SECS,
                access_token_ttl_secs: constants::defaults::ACCESS_TOKEN_TTL_SECS,
            },
            bearer: BearerConfig {
                enabled: false,
                token: None,
            },
        },
        security: SecurityConfig {
            cors_origins: vec!["*".into()],
        },
        protocol: ProtocolConfig {
            mcp_version: constants::protocol::MCP_PROTOCOL_VERSION.into(),
            server_name: constants::protocol::SERVER_NAME.into(),
            server_version: constants::protocol::SERVER_VERSION.into(),
        },
    }
}

/// Enable the OAuth2 flow with the standard test client registration
pub fn with_oauth(mut config: ServerConfig) -> ServerConfig {
    config.auth.oauth2.enabled = true;
    config.auth.oauth2.client_id = Some("c1".into());
    config.auth.oauth2.client_secret = Some("s1".into());
    config
}

/// Enable the static bearer method with the given token
pub fn with_bearer(mut config: ServerConfig, token: &str) -> ServerConfig {
    config.auth.bearer.enabled = true;
    config.auth.bearer.token = Some(token.into());
    config
}

/// Build server resources with the built-in tool set
pub fn build_resources(config: ServerConfig) -> Arc<ServerResources> {
    let tools = Arc::new(ToolRegistry::new().register(Arc::new(AuthStatusTool)));
    Arc::new(ServerResources::new(config, tools))
}

/// Build the complete router over fresh resources
pub fn build_router(config: ServerConfig) -> Router {
    server_router(build_resources(config))
}

/// Drive a single request through the router and collect the JSON body
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router call is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, body)
}

/// Build a `POST /mcp` request carrying a JSON-RPC body
pub fn mcp_request(auth_header: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json");
    if let Some(value) = auth_header {
        builder = builder.header("authorization", value);
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Build a `POST /oauth/token` request from form pairs
pub fn token_request(fields: &[(&str, &str)]) -> Request<Body> {
    let body = serde_urlencoded::to_string(fields).unwrap();
    Request::builder()
        .method("POST")
        .uri("/oauth/token")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

/// Extract a query parameter value from a redirect Location URL
pub fn query_param(location: &str, name: &str) -> Option<String> {
    let (_, query) = location.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
}
