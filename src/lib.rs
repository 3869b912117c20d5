// ABOUTME: Main library entry point for the Datapipe MCP server
// ABOUTME: Provides an authenticated JSON-RPC tool-calling endpoint over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Datapipe MCP Server
//!
//! A Model Context Protocol (MCP) server exposing data-pipeline tools to LLM
//! clients over HTTP. Every request to the protected `/mcp` endpoint is
//! authenticated before any tool logic runs, using one of two methods:
//!
//! - **Static bearer token**: a long-lived shared secret compared in constant
//!   time against the `Authorization` header.
//! - **`OAuth2` authorization-code flow**: a minimal in-process authorization
//!   server issuing short-lived single-use codes and expiring access tokens.
//!
//! All authorization state (codes, tokens) is held in process memory and is
//! deliberately discarded on restart: clients re-authenticate, and no secret
//! is ever written to disk.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use datapipe_mcp_server::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Datapipe MCP Server configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Authentication dispatcher gating the protected endpoint
pub mod auth;

/// Configuration management
pub mod config;

/// Application constants and default values
pub mod constants;

/// Unified error handling with standard error codes and HTTP responses
pub mod errors;

/// JSON-RPC 2.0 foundation for the MCP protocol
pub mod jsonrpc;

/// Production logging and structured output
pub mod logging;

/// Model Context Protocol endpoint and message handlers
pub mod mcp;

/// OAuth 2.0 authorization server (codes, tokens, flow control)
pub mod oauth2;

/// HTTP router assembly plus health and index routes
pub mod routes;

/// Tool registry and handlers invoked behind the authentication gate
pub mod tools;
