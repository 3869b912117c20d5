// ABOUTME: OAuth 2.0 authorization server for the MCP endpoint
// ABOUTME: Implements the authorize/token exchange flow over in-memory stores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// OAuth 2.0 authorization server endpoints (flow controller)
pub mod endpoints;
/// OAuth 2.0 data models and wire types
pub mod models;
/// OAuth 2.0 HTTP route handlers
pub mod routes;
/// In-memory authorization code and access token stores
pub mod store;

pub use endpoints::{AuthorizeGrant, OAuth2AuthorizationServer};
pub use models::{AuthorizeRequest, OAuth2ErrorResponse, TokenInfo, TokenRequest, TokenResponse};
pub use routes::OAuth2Routes;
pub use store::{AccessToken, AuthorizationCode, CodeConsumeError, CodeStore, TokenStore};
