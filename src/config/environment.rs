// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, validation, and runtime configuration parsing
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Environment-based configuration management for production deployment

use crate::constants::defaults;
use crate::errors::{AppError, AppResult, ErrorCode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Standard operational logging
    #[default]
    Info,
    /// Verbose diagnostics
    Debug,
    /// Everything, including per-request detail
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Security settings
    pub security: SecurityConfig,
    /// Protocol identity settings
    pub protocol: ProtocolConfig,
}

/// Authentication configuration for both supported methods
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// OAuth2 authorization-code flow configuration
    pub oauth2: OAuth2Config,
    /// Static bearer token configuration
    pub bearer: BearerConfig,
}

impl AuthConfig {
    /// True when at least one authentication method is enabled
    #[must_use]
    pub const fn any_method_enabled(&self) -> bool {
        self.oauth2.enabled || self.bearer.enabled
    }
}

/// OAuth2 authorization server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Config {
    /// Enable the OAuth2 authorization-code flow
    pub enabled: bool,
    /// Registered client identifier
    pub client_id: Option<String>,
    /// Registered client secret
    pub client_secret: Option<String>,
    /// Authorization code time-to-live in seconds
    pub authorization_code_ttl_secs: u64,
    /// Access token time-to-live in seconds
    pub access_token_ttl_secs: u64,
}

/// Static bearer token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BearerConfig {
    /// Enable static bearer token authentication
    pub enabled: bool,
    /// The shared secret compared against presented credentials
    pub token: Option<String>,
}

/// Security settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// CORS allowed origins (`*` allows any)
    pub cors_origins: Vec<String>,
}

/// Protocol identity settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// MCP protocol version
    pub mcp_version: String,
    /// Server name
    pub server_name: String,
    /// Server version (from Cargo.toml)
    pub server_version: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when a value fails to parse or when validation
    /// rejects the configuration (an enabled method missing its secret).
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        // Load .env file if it exists
        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let config = Self {
            http_port: env_var_or("HTTP_PORT", &defaults::HTTP_PORT.to_string())?
                .parse()
                .context("Invalid HTTP_PORT value")?,
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")?),

            auth: AuthConfig {
                oauth2: OAuth2Config {
                    enabled: env_var_or("OAUTH_ENABLED", "false")?
                        .parse()
                        .context("Invalid OAUTH_ENABLED value")?,
                    client_id: env::var("OAUTH_CLIENT_ID").ok(),
                    client_secret: env::var("OAUTH_CLIENT_SECRET").ok(),
                    authorization_code_ttl_secs: env_var_or(
                        "AUTH_CODE_TTL_SECS",
                        &defaults::AUTHORIZATION_CODE_TTL_SECS.to_string(),
                    )?
                    .parse()
                    .context("Invalid AUTH_CODE_TTL_SECS value")?,
                    access_token_ttl_secs: env_var_or(
                        "ACCESS_TOKEN_TTL_SECS",
                        &defaults::ACCESS_TOKEN_TTL_SECS.to_string(),
                    )?
                    .parse()
                    .context("Invalid ACCESS_TOKEN_TTL_SECS value")?,
                },
                bearer: BearerConfig {
                    enabled: env_var_or("BEARER_TOKEN_ENABLED", "false")?
                        .parse()
                        .context("Invalid BEARER_TOKEN_ENABLED value")?,
                    token: env::var("BEARER_TOKEN").ok(),
                },
            },

            security: SecurityConfig {
                cors_origins: parse_origins(&env_var_or("CORS_ORIGINS", defaults::CORS_ORIGINS)?),
            },

            protocol: ProtocolConfig {
                mcp_version: env_var_or(
                    "MCP_PROTOCOL_VERSION",
                    crate::constants::protocol::MCP_PROTOCOL_VERSION,
                )?,
                server_name: env_var_or("SERVER_NAME", crate::constants::protocol::SERVER_NAME)?,
                server_version: crate::constants::protocol::SERVER_VERSION.to_owned(),
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// An enabled authentication method with a missing or empty secret is a
    /// startup failure: it must never be discovered mid-request.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value found.
    pub fn validate(&self) -> AppResult<()> {
        if self.auth.oauth2.enabled {
            if !is_present(self.auth.oauth2.client_id.as_deref()) {
                return Err(AppError::new(
                    ErrorCode::ConfigMissing,
                    "OAUTH_ENABLED is true but OAUTH_CLIENT_ID is missing or empty",
                ));
            }
            if !is_present(self.auth.oauth2.client_secret.as_deref()) {
                return Err(AppError::new(
                    ErrorCode::ConfigMissing,
                    "OAUTH_ENABLED is true but OAUTH_CLIENT_SECRET is missing or empty",
                ));
            }
            if self.auth.oauth2.authorization_code_ttl_secs == 0 {
                return Err(AppError::new(
                    ErrorCode::ConfigInvalid,
                    "AUTH_CODE_TTL_SECS must be greater than zero",
                ));
            }
            if self.auth.oauth2.access_token_ttl_secs == 0 {
                return Err(AppError::new(
                    ErrorCode::ConfigInvalid,
                    "ACCESS_TOKEN_TTL_SECS must be greater than zero",
                ));
            }
        }

        if self.auth.bearer.enabled && !is_present(self.auth.bearer.token.as_deref()) {
            return Err(AppError::new(
                ErrorCode::ConfigMissing,
                "BEARER_TOKEN_ENABLED is true but BEARER_TOKEN is missing or empty",
            ));
        }

        if !self.auth.any_method_enabled() {
            // Fail-closed: the dispatcher will deny every protected request.
            warn!(
                "No authentication method is enabled; all requests to the protected endpoint will be denied"
            );
        }

        Ok(())
    }

    /// One-line summary for the boot log
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} log={} oauth2={} bearer={} server={} v{}",
            self.http_port,
            self.log_level,
            self.auth.oauth2.enabled,
            self.auth.bearer.enabled,
            self.protocol.server_name,
            self.protocol.server_version,
        )
    }
}

/// Read an environment variable with a default fallback
fn env_var_or(name: &str, default: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) => Ok(value),
        Err(env::VarError::NotPresent) => Ok(default.to_owned()),
        Err(e) => Err(e).with_context(|| format!("Failed to read {name}")),
    }
}

/// Split a comma-separated origin list
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// A configured secret must be present and non-empty
fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ServerConfig {
        ServerConfig {
            http_port: defaults::HTTP_PORT,
            log_level: LogLevel::Info,
            auth: AuthConfig {
                oauth2: OAuth2Config {
                    enabled: false,
                    client_id: None,
                    client_secret: None,
                    authorization_code_ttl_secs: defaults::AUTHORIZATION_CODE_TTL_SECS,
                    access_token_ttl_secs: defaults::ACCESS_TOKEN_TTL_SECS,
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
                mcp_version: crate::constants::protocol::MCP_PROTOCOL_VERSION.into(),
                server_name: crate::constants::protocol::SERVER_NAME.into(),
                server_version: crate::constants::protocol::SERVER_VERSION.into(),
            },
        }
    }

    #[test]
    fn test_validate_accepts_disabled_methods() {
        let config = base_config();
        assert!(config.validate().is_ok());
        assert!(!config.auth.any_method_enabled());
    }

    #[test]
    fn test_validate_rejects_oauth_without_client_id() {
        let mut config = base_config();
        config.auth.oauth2.enabled = true;
        config.auth.oauth2.client_secret = Some("s1".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_bearer_token() {
        let mut config = base_config();
        config.auth.bearer.enabled = true;
        config.auth.bearer.token = Some("   ".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_complete_oauth() {
        let mut config = base_config();
        config.auth.oauth2.enabled = true;
        config.auth.oauth2.client_id = Some("c1".into());
        config.auth.oauth2.client_secret = Some("s1".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_origins_splits_and_trims() {
        let origins = parse_origins("https://a.example, https://b.example ,");
        assert_eq!(origins, vec!["https://a.example", "https://b.example"]);
    }
}
