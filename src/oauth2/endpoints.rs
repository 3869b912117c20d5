// ABOUTME: OAuth 2.0 authorization and token endpoint implementation
// ABOUTME: Drives the authorize/code/token state machine over the in-memory stores
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::models::{AuthorizeRequest, OAuth2ErrorResponse, TokenInfo, TokenRequest, TokenResponse};
use super::store::{AccessToken, AuthorizationCode, CodeConsumeError, CodeStore, TokenStore};
use crate::auth::{constant_time_eq, AuthError};
use crate::config::OAuth2Config;
use crate::constants::oauth;
use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};

/// A granted authorization, ready to be turned into a redirect
#[derive(Debug)]
pub struct AuthorizeGrant {
    /// The issued authorization code
    pub code: String,
    /// State parameter echoed back to the client
    pub state: Option<String>,
    /// Redirect target the code is bound to
    pub redirect_uri: String,
}

/// OAuth 2.0 Authorization Server
///
/// Exclusive owner of the code and token stores; no other component reads or
/// writes them. All state is process-lifetime only.
pub struct OAuth2AuthorizationServer {
    config: OAuth2Config,
    codes: CodeStore,
    tokens: TokenStore,
}

impl OAuth2AuthorizationServer {
    /// Create a server around empty stores
    #[must_use]
    pub fn new(config: OAuth2Config) -> Self {
        Self {
            config,
            codes: CodeStore::new(),
            tokens: TokenStore::new(),
        }
    }

    /// Whether the OAuth2 flow is enabled at all
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Handle an authorization request (GET /oauth/authorize)
    ///
    /// # Errors
    ///
    /// Returns an [`OAuth2ErrorResponse`] when the flow is disabled, the
    /// response type is unsupported, the client is unknown, or the PKCE
    /// parameters are malformed. No code is issued on any failure path.
    pub fn authorize(&self, request: &AuthorizeRequest) -> Result<AuthorizeGrant, OAuth2ErrorResponse> {
        if !self.config.enabled {
            tracing::warn!("Authorization rejected: OAuth2 is not enabled");
            return Err(AuthError::FeatureDisabled.into());
        }

        if request.response_type != oauth::RESPONSE_TYPE_CODE {
            return Err(OAuth2ErrorResponse::invalid_request(
                "response_type must be 'code'",
            ));
        }

        if !self.client_id_matches(&request.client_id) {
            tracing::warn!(
                client_id = %request.client_id,
                "Authorization rejected: unknown client"
            );
            return Err(AuthError::InvalidClient.into());
        }

        if let Some(method) = effective_challenge_method(request) {
            if !oauth::CODE_CHALLENGE_METHODS.contains(&method) {
                return Err(OAuth2ErrorResponse::invalid_request(
                    "code_challenge_method must be 'S256' or 'plain'",
                ));
            }
        }

        let code = Self::generate_random_string(oauth::AUTHORIZATION_CODE_BYTES)?;
        let now = Utc::now();
        let record = AuthorizationCode {
            code: code.clone(),
            client_id: request.client_id.clone(),
            redirect_uri: request.redirect_uri.clone(),
            scope: Some(
                request
                    .scope
                    .clone()
                    .unwrap_or_else(|| oauth::DEFAULT_SCOPE.to_owned()),
            ),
            code_challenge: request.code_challenge.clone(),
            code_challenge_method: effective_challenge_method(request).map(ToOwned::to_owned),
            issued_at: now,
            expires_at: now + ttl(self.config.authorization_code_ttl_secs),
            consumed: false,
        };
        self.codes.insert(record);

        tracing::info!(
            client_id = %request.client_id,
            pkce = request.code_challenge.is_some(),
            "Authorization code issued"
        );

        Ok(AuthorizeGrant {
            code,
            state: request.state.clone(),
            redirect_uri: request.redirect_uri.clone(),
        })
    }

    /// Handle a token exchange request (POST /oauth/token)
    ///
    /// Preconditions are checked in a fixed order: grant type, client
    /// credentials, then the code itself. The code is consumed only after the
    /// client credentials pass, so a wrong secret never burns a valid code.
    /// PKCE verification runs after consumption; a failed verifier does burn
    /// the code, preventing retry-until-match reuse.
    ///
    /// # Errors
    ///
    /// Returns an [`OAuth2ErrorResponse`] naming the failed precondition.
    pub fn exchange(&self, request: &TokenRequest) -> Result<TokenResponse, OAuth2ErrorResponse> {
        if !self.config.enabled {
            tracing::warn!("Token exchange rejected: OAuth2 is not enabled");
            return Err(AuthError::FeatureDisabled.into());
        }

        if request.grant_type != oauth::GRANT_TYPE_AUTHORIZATION_CODE {
            tracing::warn!(grant_type = %request.grant_type, "Token exchange rejected: unsupported grant type");
            return Err(AuthError::UnsupportedGrantType(request.grant_type.clone()).into());
        }

        let code = request
            .code
            .as_deref()
            .ok_or_else(|| OAuth2ErrorResponse::invalid_request("code is required"))?;

        let (client_id, client_secret) = match (
            request.client_id.as_deref(),
            request.client_secret.as_deref(),
        ) {
            (Some(id), Some(secret)) => (id, secret),
            _ => {
                return Err(OAuth2ErrorResponse::invalid_request(
                    "client_id and client_secret are required",
                ))
            }
        };

        if !self.client_credentials_match(client_id, client_secret) {
            tracing::warn!(client_id = %client_id, "Token exchange rejected: invalid client credentials");
            return Err(AuthError::InvalidClientCredentials.into());
        }

        let now = Utc::now();
        let auth_code = self.codes.consume(code, now).map_err(|e| {
            tracing::warn!(client_id = %client_id, cause = ?e, "Token exchange rejected: code not redeemable");
            let cause = match e {
                CodeConsumeError::AlreadyConsumed => AuthError::CodeAlreadyConsumed,
                CodeConsumeError::NotFound | CodeConsumeError::Expired => {
                    AuthError::InvalidOrExpiredCode
                }
            };
            OAuth2ErrorResponse::from(cause)
        })?;

        if let Some(redirect_uri) = request.redirect_uri.as_deref() {
            if redirect_uri != auth_code.redirect_uri {
                return Err(OAuth2ErrorResponse::invalid_grant("redirect_uri mismatch"));
            }
        }

        if auth_code.client_id != client_id {
            return Err(OAuth2ErrorResponse::invalid_grant("client_id mismatch"));
        }

        verify_pkce(&auth_code, request.code_verifier.as_deref())?;

        let token = Self::generate_random_string(oauth::ACCESS_TOKEN_BYTES)?;
        let expires_in = i64::try_from(self.config.access_token_ttl_secs).unwrap_or(i64::MAX);
        self.tokens.insert(AccessToken {
            token: token.clone(),
            client_id: client_id.to_owned(),
            scope: auth_code.scope.clone(),
            issued_at: now,
            expires_at: now + ttl(self.config.access_token_ttl_secs),
        });

        tracing::info!(
            client_id = %client_id,
            expires_in,
            "Access token issued"
        );

        Ok(TokenResponse {
            access_token: token,
            token_type: oauth::TOKEN_TYPE_BEARER.to_owned(),
            expires_in,
            scope: auth_code.scope,
        })
    }

    /// Verify a candidate access token
    ///
    /// Returns the bound client when the token exists and is unexpired.
    /// Absent and expired tokens are indistinguishable by design.
    #[must_use]
    pub fn verify_token(&self, token: &str) -> Option<TokenInfo> {
        self.tokens
            .lookup(token, Utc::now())
            .map(|record| TokenInfo {
                client_id: record.client_id,
                scope: record.scope,
                expires_at: record.expires_at,
            })
    }

    /// Prune expired codes and tokens
    ///
    /// Correctness never depends on this: expiry is enforced at lookup time.
    pub fn purge_expired(&self) {
        let now = Utc::now();
        self.codes.purge_expired(now);
        self.tokens.purge_expired(now);
    }

    fn client_id_matches(&self, candidate: &str) -> bool {
        self.config
            .client_id
            .as_deref()
            .is_some_and(|registered| constant_time_eq(registered, candidate))
    }

    fn client_credentials_match(&self, client_id: &str, client_secret: &str) -> bool {
        let id_ok = self.client_id_matches(client_id);
        let secret_ok = self
            .config
            .client_secret
            .as_deref()
            .is_some_and(|registered| constant_time_eq(registered, client_secret));
        id_ok && secret_ok
    }

    /// Generate a URL-safe random string for codes and tokens
    ///
    /// Sequential or predictable identifiers would make enumeration feasible,
    /// so only the system CSPRNG is acceptable here.
    fn generate_random_string(length: usize) -> Result<String, OAuth2ErrorResponse> {
        let rng = SystemRandom::new();
        let mut bytes = vec![0u8; length];

        rng.fill(&mut bytes).map_err(|e| {
            tracing::error!("System RNG failure - cannot generate secure random bytes: {e}");
            OAuth2ErrorResponse::invalid_request("Failed to generate credential")
        })?;

        Ok(general_purpose::URL_SAFE_NO_PAD.encode(&bytes))
    }
}

/// The challenge method bound to a request, defaulting to `plain` when a
/// challenge is present without one
fn effective_challenge_method(request: &AuthorizeRequest) -> Option<&str> {
    request
        .code_challenge
        .as_deref()
        .map(|_| request.code_challenge_method.as_deref().unwrap_or("plain"))
}

/// Verify a PKCE code verifier against the challenge stored with the code (RFC 7636)
fn verify_pkce(
    auth_code: &AuthorizationCode,
    code_verifier: Option<&str>,
) -> Result<(), OAuth2ErrorResponse> {
    let Some(stored_challenge) = auth_code.code_challenge.as_deref() else {
        if code_verifier.is_some() {
            return Err(OAuth2ErrorResponse::invalid_grant(
                "code_verifier provided but no code_challenge was issued",
            ));
        }
        return Ok(());
    };

    let verifier = code_verifier
        .ok_or_else(|| OAuth2ErrorResponse::invalid_grant("code_verifier is required (PKCE)"))?;

    let method = auth_code.code_challenge_method.as_deref().unwrap_or("plain");
    let matches = match method {
        "S256" => {
            let mut hasher = Sha256::new();
            hasher.update(verifier.as_bytes());
            let computed = general_purpose::URL_SAFE_NO_PAD.encode(hasher.finalize());
            constant_time_eq(&computed, stored_challenge)
        }
        _ => constant_time_eq(verifier, stored_challenge),
    };

    if matches {
        Ok(())
    } else {
        tracing::warn!(
            client_id = %auth_code.client_id,
            method,
            "PKCE verification failed - code_verifier does not match code_challenge"
        );
        Err(OAuth2ErrorResponse::invalid_grant("Invalid code_verifier"))
    }
}

/// Upper bound on configured TTLs; keeps `DateTime` arithmetic in range
const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

fn ttl(secs: u64) -> Duration {
    Duration::seconds(i64::try_from(secs.min(MAX_TTL_SECS)).unwrap_or(0))
}
