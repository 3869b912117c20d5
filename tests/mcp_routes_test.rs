// ABOUTME: Router-level tests for the protected MCP endpoint and OAuth2 HTTP flow
// ABOUTME: Validates uniform 401 behavior, protocol handlers, and the end-to-end exchange
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_health_bypasses_authentication() {
    let router = common::build_router(common::base_config());

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = common::send(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_index_reports_enabled_methods() {
    let config = common::with_bearer(common::base_config(), "abc123");
    let router = common::build_router(config);

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = common::send(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authentication"]["bearer_enabled"], true);
    assert_eq!(body["authentication"]["oauth_enabled"], false);
    assert_eq!(body["mcp_endpoint"], "/mcp");
}

#[tokio::test]
async fn test_mcp_denies_without_credential() {
    let config = common::with_bearer(common::base_config(), "abc123");
    let router = common::build_router(config);

    let body = json!({"jsonrpc": "2.0", "id": 1, "method": "ping"});
    let (status, _) = common::send(&router, common::mcp_request(None, &body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mcp_denial_responses_are_uniform() {
    let config = common::with_bearer(common::base_config(), "abc123");
    let router = common::build_router(config);
    let body = json!({"jsonrpc": "2.0", "id": 1, "method": "ping"});

    // Missing header, wrong scheme, near-miss token: identical responses.
    let (s1, b1) = common::send(&router, common::mcp_request(None, &body)).await;
    let (s2, b2) = common::send(&router, common::mcp_request(Some("Basic abc123"), &body)).await;
    let (s3, b3) = common::send(&router, common::mcp_request(Some("Bearer abc124"), &body)).await;

    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(s3, StatusCode::UNAUTHORIZED);
    assert_eq!(b1, b2);
    assert_eq!(b2, b3);
}

#[tokio::test]
async fn test_mcp_denial_carries_www_authenticate() {
    use tower::ServiceExt;

    let config = common::with_bearer(common::base_config(), "abc123");
    let router = common::build_router(config);
    let body = json!({"jsonrpc": "2.0", "id": 1, "method": "ping"});

    let response = router
        .oneshot(common::mcp_request(None, &body))
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get("www-authenticate")
            .and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );
}

#[tokio::test]
async fn test_mcp_denies_everything_when_no_method_enabled() {
    let router = common::build_router(common::base_config());

    let body = json!({"jsonrpc": "2.0", "id": 1, "method": "ping"});
    let (status, _) = common::send(&router, common::mcp_request(Some("Bearer x"), &body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_initialize_handshake() {
    let config = common::with_bearer(common::base_config(), "abc123");
    let router = common::build_router(config);

    let body = json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}});
    let (status, response) =
        common::send(&router, common::mcp_request(Some("Bearer abc123"), &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(
        response["result"]["serverInfo"]["name"],
        "datapipe-mcp-server"
    );
    assert!(response["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn test_tools_list_and_call() {
    let config = common::with_bearer(common::base_config(), "abc123");
    let router = common::build_router(config);

    let list = json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"});
    let (status, response) =
        common::send(&router, common::mcp_request(Some("Bearer abc123"), &list)).await;
    assert_eq!(status, StatusCode::OK);
    let tools = response["result"]["tools"].as_array().unwrap();
    assert!(tools
        .iter()
        .any(|tool| tool["name"] == "get_auth_status"));

    let call = json!({
        "jsonrpc": "2.0",
        "id": 3,
        "method": "tools/call",
        "params": {"name": "get_auth_status", "arguments": {}}
    });
    let (status, response) =
        common::send(&router, common::mcp_request(Some("Bearer abc123"), &call)).await;
    assert_eq!(status, StatusCode::OK);
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("\"bearer\""));
}

#[tokio::test]
async fn test_tools_call_requires_name() {
    let config = common::with_bearer(common::base_config(), "abc123");
    let router = common::build_router(config);

    let call = json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {}});
    let (status, response) =
        common::send(&router, common::mcp_request(Some("Bearer abc123"), &call)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn test_unknown_method_is_not_found() {
    let config = common::with_bearer(common::base_config(), "abc123");
    let router = common::build_router(config);

    let body = json!({"jsonrpc": "2.0", "id": 5, "method": "resources/list"});
    let (status, response) =
        common::send(&router, common::mcp_request(Some("Bearer abc123"), &body)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"]["code"], -32601);
}

#[tokio::test]
async fn test_invalid_json_body_is_a_parse_error() {
    let config = common::with_bearer(common::base_config(), "abc123");
    let router = common::build_router(config);

    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("authorization", "Bearer abc123")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, response) = common::send(&router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], -32700);
}

#[tokio::test]
async fn test_discovery_metadata_endpoints() {
    let router = common::build_router(common::with_oauth(common::base_config()));

    let request = Request::builder()
        .uri("/.well-known/oauth-authorization-server")
        .header("host", "mcp.example.com")
        .body(Body::empty())
        .unwrap();
    let (status, body) = common::send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["issuer"], "http://mcp.example.com");
    assert_eq!(
        body["authorization_endpoint"],
        "http://mcp.example.com/oauth/authorize"
    );

    let request = Request::builder()
        .uri("/.well-known/oauth-protected-resource")
        .header("host", "mcp.example.com")
        .body(Body::empty())
        .unwrap();
    let (status, body) = common::send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resource"], "http://mcp.example.com/mcp");
}

/// The complete authorization-code flow over HTTP: authorize, exchange,
/// call the protected endpoint, then prove the code is single-use.
#[tokio::test]
async fn test_full_oauth_flow_end_to_end() {
    use tower::ServiceExt;

    let router = common::build_router(common::with_oauth(common::base_config()));

    // Step 1: authorize redirects back with a code and the echoed state.
    let authorize = Request::builder()
        .uri(
            "/oauth/authorize?client_id=c1&redirect_uri=https%3A%2F%2Fclient.example%2Fcb\
             &response_type=code&state=xyz",
        )
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(authorize).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_owned();
    assert!(location.starts_with("https://client.example/cb?"));
    assert_eq!(common::query_param(&location, "state").as_deref(), Some("xyz"));
    let code = common::query_param(&location, "code").unwrap();

    // Step 2: exchange the code for an access token.
    let exchange = common::token_request(&[
        ("grant_type", "authorization_code"),
        ("code", &code),
        ("client_id", "c1"),
        ("client_secret", "s1"),
    ]);
    let (status, token_body) = common::send(&router, exchange).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(token_body["token_type"], "bearer");
    let access_token = token_body["access_token"].as_str().unwrap().to_owned();

    // Step 3: the token opens the protected endpoint.
    let ping = json!({"jsonrpc": "2.0", "id": 1, "method": "ping"});
    let header = format!("Bearer {access_token}");
    let (status, _) = common::send(&router, common::mcp_request(Some(&header), &ping)).await;
    assert_eq!(status, StatusCode::OK);

    // Step 4: the same code cannot be redeemed twice.
    let replay = common::token_request(&[
        ("grant_type", "authorization_code"),
        ("code", &code),
        ("client_id", "c1"),
        ("client_secret", "s1"),
    ]);
    let (status, error_body) = common::send(&router, replay).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_body["error"], "invalid_grant");
}

#[tokio::test]
async fn test_token_endpoint_rejects_bad_client_with_401() {
    let router = common::build_router(common::with_oauth(common::base_config()));

    let exchange = common::token_request(&[
        ("grant_type", "authorization_code"),
        ("code", "whatever"),
        ("client_id", "c1"),
        ("client_secret", "wrong"),
    ]);
    let (status, body) = common::send(&router, exchange).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_client");
}

#[tokio::test]
async fn test_authorize_endpoint_reports_missing_params() {
    let router = common::build_router(common::with_oauth(common::base_config()));

    let request = Request::builder()
        .uri("/oauth/authorize?client_id=c1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = common::send(&router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
    assert!(body["error_description"]
        .as_str()
        .unwrap()
        .contains("redirect_uri"));
}

#[tokio::test]
async fn test_alias_paths_serve_the_same_flow() {
    use tower::ServiceExt;

    let router = common::build_router(common::with_oauth(common::base_config()));

    let authorize = Request::builder()
        .uri("/authorize?client_id=c1&redirect_uri=https%3A%2F%2Fclient.example%2Fcb&response_type=code")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(authorize).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_owned();
    let code = common::query_param(&location, "code").unwrap();

    let body = serde_urlencoded::to_string([
        ("grant_type", "authorization_code"),
        ("code", code.as_str()),
        ("client_id", "c1"),
        ("client_secret", "s1"),
    ])
    .unwrap();
    let exchange = Request::builder()
        .method("POST")
        .uri("/token")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    let (status, token_body) = common::send(&router, exchange).await;
    assert_eq!(status, StatusCode::OK);
    assert!(token_body["access_token"].is_string());
}
