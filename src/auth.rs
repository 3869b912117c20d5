// ABOUTME: Authentication dispatcher gating every protected request
// ABOUTME: Evaluates enabled methods in fixed order with short-circuit OR semantics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Authentication Dispatcher
//!
//! The single gate every protected request passes through. Given the raw
//! credential extracted from a request, [`AuthManager::authenticate`] yields
//! an allow decision with the matched method, or a denial reason intended for
//! logs only; the client-facing response must stay uniform regardless of the
//! internal cause.
//!
//! Policy: enabled methods are evaluated in a fixed order (static bearer
//! first, then `OAuth2` token verification) and the first success wins.
//! Enabling both methods therefore requires only one to pass. When no method
//! is enabled the dispatcher fails closed and denies everything.

use crate::config::BearerConfig;
use crate::oauth2::OAuth2AuthorizationServer;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Why a request was denied, for diagnostics only
///
/// None of these are fatal: the caller retries the flow from the appropriate
/// step. The distinction must never reach the protected endpoint's response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The targeted authentication method is not enabled
    #[error("authentication method not enabled")]
    FeatureDisabled,
    /// The presented client identifier does not match the registered client
    #[error("unknown client")]
    InvalidClient,
    /// The presented client id/secret pair does not match the registration
    #[error("client credentials rejected")]
    InvalidClientCredentials,
    /// The authorization code is absent from the store or past its TTL
    #[error("invalid or expired authorization code")]
    InvalidOrExpiredCode,
    /// The authorization code was already redeemed once
    #[error("authorization code already consumed")]
    CodeAlreadyConsumed,
    /// The token request used a grant type other than `authorization_code`
    #[error("unsupported grant type: {0}")]
    UnsupportedGrantType(String),
    /// No credential was presented at all
    #[error("missing credential")]
    MissingCredential,
    /// The presented token matched no enabled method
    #[error("invalid or expired access token")]
    InvalidOrExpiredToken,
}

/// Which method authenticated the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Exact match against the configured static bearer token
    StaticBearer,
    /// A live access token issued by the OAuth2 flow
    OAuth2 {
        /// Client the token is bound to
        client_id: String,
    },
}

impl AuthMethod {
    /// Short name for logs and diagnostics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StaticBearer => "bearer",
            Self::OAuth2 { .. } => "oauth2",
        }
    }
}

/// Successful authentication outcome
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// The method that accepted the credential
    pub method: AuthMethod,
    /// Scope granted at token issuance (OAuth2 only)
    pub scope: Option<String>,
    /// When the accepted token expires (OAuth2 only; bearer never expires)
    pub expires_at: Option<DateTime<Utc>>,
}

/// Authentication dispatcher
pub struct AuthManager {
    bearer: BearerConfig,
    oauth2: Arc<OAuth2AuthorizationServer>,
}

impl AuthManager {
    /// Create a dispatcher over the configured methods
    #[must_use]
    pub fn new(bearer: BearerConfig, oauth2: Arc<OAuth2AuthorizationServer>) -> Self {
        Self { bearer, oauth2 }
    }

    /// True when at least one method can accept a credential
    #[must_use]
    pub fn any_method_enabled(&self) -> bool {
        self.bearer.enabled || self.oauth2.enabled()
    }

    /// Decide whether the presented credential is acceptable
    ///
    /// # Errors
    ///
    /// Returns the denial cause for logging. Callers gating HTTP requests
    /// must translate every variant into the same unauthorized response.
    pub fn authenticate(&self, credential: Option<&str>) -> Result<AuthResult, AuthError> {
        // Fail-closed: with no method enabled, nothing can be accepted.
        if !self.any_method_enabled() {
            return Err(AuthError::FeatureDisabled);
        }

        let credential = match credential {
            Some(value) if !value.is_empty() => value,
            _ => return Err(AuthError::MissingCredential),
        };

        if self.bearer.enabled {
            if let Some(expected) = self.bearer.token.as_deref() {
                if constant_time_eq(expected, credential) {
                    return Ok(AuthResult {
                        method: AuthMethod::StaticBearer,
                        scope: None,
                        expires_at: None,
                    });
                }
            }
        }

        if self.oauth2.enabled() {
            if let Some(info) = self.oauth2.verify_token(credential) {
                return Ok(AuthResult {
                    method: AuthMethod::OAuth2 {
                        client_id: info.client_id,
                    },
                    scope: info.scope,
                    expires_at: Some(info.expires_at),
                });
            }
        }

        Err(AuthError::InvalidOrExpiredToken)
    }
}

/// Extract the bearer credential from an `Authorization` header map
///
/// A missing header, a scheme other than `Bearer`, or an empty credential all
/// count as "no credential presented".
#[must_use]
pub fn bearer_credential(headers: &http::HeaderMap) -> Option<String> {
    let value = headers.get(http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_owned())
    }
}

/// Constant-time string equality for secret comparison
///
/// Differing lengths return early; only the content comparison needs to be
/// timing-safe.
#[must_use]
pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
