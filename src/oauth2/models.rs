// ABOUTME: OAuth 2.0 data models for authorization and token exchange
// ABOUTME: Implements RFC 6749 request/response structures with error helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth 2.0 Authorization Request
#[derive(Debug, Deserialize, Clone)]
pub struct AuthorizeRequest {
    /// Response type (only `code` is supported)
    pub response_type: String,
    /// Client identifier
    pub client_id: String,
    /// Redirect URI for the authorization response
    pub redirect_uri: String,
    /// Requested scopes
    pub scope: Option<String>,
    /// State parameter for CSRF protection, echoed back unchanged
    pub state: Option<String>,
    /// PKCE code challenge (RFC 7636)
    pub code_challenge: Option<String>,
    /// PKCE code challenge method (`plain` or `S256`)
    pub code_challenge_method: Option<String>,
}

/// OAuth 2.0 Token Request
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    /// Grant type (only `authorization_code` is supported)
    pub grant_type: String,
    /// Authorization code being redeemed
    pub code: Option<String>,
    /// Redirect URI (must match the one bound to the code when present)
    pub redirect_uri: Option<String>,
    /// Client ID
    pub client_id: Option<String>,
    /// Client secret
    pub client_secret: Option<String>,
    /// PKCE code verifier (RFC 7636)
    pub code_verifier: Option<String>,
}

/// OAuth 2.0 Token Response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token value
    pub access_token: String,
    /// Token type (always `bearer`)
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    /// Scopes granted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Verified access-token details returned by token verification
#[derive(Debug, Clone)]
pub struct TokenInfo {
    /// Client the token is bound to
    pub client_id: String,
    /// Scopes granted at issuance
    pub scope: Option<String>,
    /// When the token stops being honored
    pub expires_at: DateTime<Utc>,
}

/// OAuth 2.0 Error Response (RFC 6749 §5.2)
#[derive(Debug, Serialize, Deserialize)]
pub struct OAuth2ErrorResponse {
    /// Error code
    pub error: String,
    /// Human-readable error description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
    /// URI for error information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_uri: Option<String>,
}

impl OAuth2ErrorResponse {
    /// Create an `invalid_request` error
    #[must_use]
    pub fn invalid_request(description: &str) -> Self {
        Self {
            error: "invalid_request".to_owned(),
            error_description: Some(description.to_owned()),
            error_uri: Some(
                "https://datatracker.ietf.org/doc/html/rfc6749#section-4.1.2.1".to_owned(),
            ),
        }
    }

    /// Create an `invalid_client` error
    #[must_use]
    pub fn invalid_client() -> Self {
        Self {
            error: "invalid_client".to_owned(),
            error_description: Some("Client authentication failed".to_owned()),
            error_uri: Some("https://datatracker.ietf.org/doc/html/rfc6749#section-5.2".to_owned()),
        }
    }

    /// Create an `invalid_grant` error
    #[must_use]
    pub fn invalid_grant(description: &str) -> Self {
        Self {
            error: "invalid_grant".to_owned(),
            error_description: Some(description.to_owned()),
            error_uri: Some("https://datatracker.ietf.org/doc/html/rfc6749#section-5.2".to_owned()),
        }
    }

    /// Create an `unsupported_grant_type` error
    #[must_use]
    pub fn unsupported_grant_type() -> Self {
        Self {
            error: "unsupported_grant_type".to_owned(),
            error_description: Some("Grant type not supported".to_owned()),
            error_uri: Some("https://datatracker.ietf.org/doc/html/rfc6749#section-5.2".to_owned()),
        }
    }

    /// HTTP status for this error kind
    ///
    /// `invalid_client` is a credential failure (401); everything else is a
    /// malformed or unredeemable request (400).
    #[must_use]
    pub fn http_status(&self) -> http::StatusCode {
        if self.error == "invalid_client" {
            http::StatusCode::UNAUTHORIZED
        } else {
            http::StatusCode::BAD_REQUEST
        }
    }
}

/// Translate an internal denial cause into its RFC 6749 wire form
///
/// The setup-time endpoints are allowed to be specific per field; only the
/// protected endpoint must stay uniform.
impl From<crate::auth::AuthError> for OAuth2ErrorResponse {
    fn from(err: crate::auth::AuthError) -> Self {
        use crate::auth::AuthError;
        match err {
            AuthError::FeatureDisabled => Self::invalid_request("OAuth2 is not enabled"),
            AuthError::InvalidClient | AuthError::InvalidClientCredentials => Self::invalid_client(),
            AuthError::UnsupportedGrantType(_) => Self::unsupported_grant_type(),
            AuthError::InvalidOrExpiredCode => {
                Self::invalid_grant("Invalid or expired authorization code")
            }
            AuthError::CodeAlreadyConsumed => {
                Self::invalid_grant("Authorization code already consumed")
            }
            AuthError::MissingCredential => Self::invalid_request("Missing credential"),
            AuthError::InvalidOrExpiredToken => {
                Self::invalid_grant("Invalid or expired access token")
            }
        }
    }
}
