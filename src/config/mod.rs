// ABOUTME: Configuration module for server and authentication settings
// ABOUTME: Re-exports the environment-based configuration loader
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Environment-variable driven server configuration
pub mod environment;

pub use environment::{AuthConfig, BearerConfig, OAuth2Config, SecurityConfig, ServerConfig};
