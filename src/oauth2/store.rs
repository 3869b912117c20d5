// ABOUTME: In-memory stores for authorization codes and access tokens
// ABOUTME: DashMap-backed keyed records with TTL expiry and single-use consumption
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Ephemeral credential stores.
//!
//! Both stores are process-lifetime only: a restart discards every code and
//! token, and all previously authorized clients must re-authenticate. The
//! volatility is a security property of the design, not an omission; nothing
//! in these stores may ever be persisted.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// An issued authorization code awaiting redemption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationCode {
    /// The code value (primary key)
    pub code: String,
    /// Client the code was issued to
    pub client_id: String,
    /// Redirect URI the code is bound to
    pub redirect_uri: String,
    /// Scopes requested at authorization
    pub scope: Option<String>,
    /// PKCE code challenge, when the client supplied one
    pub code_challenge: Option<String>,
    /// PKCE challenge method (`plain` or `S256`)
    pub code_challenge_method: Option<String>,
    /// When the code was issued
    pub issued_at: DateTime<Utc>,
    /// When the code stops being redeemable
    pub expires_at: DateTime<Utc>,
    /// Set once the code has been redeemed; a consumed code is never honored again
    pub consumed: bool,
}

/// An issued access token
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The token value (primary key)
    pub token: String,
    /// Client the token is bound to
    pub client_id: String,
    /// Scopes granted at issuance
    pub scope: Option<String>,
    /// When the token was issued
    pub issued_at: DateTime<Utc>,
    /// When the token stops being honored
    pub expires_at: DateTime<Utc>,
}

/// Why a code could not be consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeConsumeError {
    /// No record under that code (never issued, expired-and-pruned, or guessed)
    NotFound,
    /// The record exists but its TTL has lapsed
    Expired,
    /// The record exists but was already redeemed once
    AlreadyConsumed,
}

/// Keyed store of issued authorization codes
///
/// Consumption is the only mutation after insert and is atomic: when two
/// exchanges race on the same code, the shard lock guarantees exactly one
/// observes `consumed == false` and wins.
#[derive(Default)]
pub struct CodeStore {
    entries: DashMap<String, AuthorizationCode>,
}

impl CodeStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly issued code
    pub fn insert(&self, record: AuthorizationCode) {
        self.entries.insert(record.code.clone(), record);
    }

    /// Atomically consume a code, enforcing single use
    ///
    /// Consumed records are flagged rather than deleted so a repeat
    /// redemption within the TTL reports [`CodeConsumeError::AlreadyConsumed`]
    /// distinctly; expired records are pruned on touch.
    ///
    /// # Errors
    ///
    /// Returns the specific [`CodeConsumeError`] when the code is absent,
    /// expired, or already redeemed.
    pub fn consume(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthorizationCode, CodeConsumeError> {
        let expired = {
            let Some(mut entry) = self.entries.get_mut(code) else {
                return Err(CodeConsumeError::NotFound);
            };

            if now >= entry.expires_at {
                true
            } else if entry.consumed {
                return Err(CodeConsumeError::AlreadyConsumed);
            } else {
                entry.consumed = true;
                return Ok(entry.value().clone());
            }
        };

        // The guard is dropped before removal; DashMap deadlocks otherwise.
        if expired {
            self.entries.remove(code);
        }
        Err(CodeConsumeError::Expired)
    }

    /// Drop every record whose TTL has lapsed
    pub fn purge_expired(&self, now: DateTime<Utc>) {
        self.entries.retain(|_, record| now < record.expires_at);
    }

    /// Number of live records (diagnostics only)
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no records are held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Keyed store of issued access tokens
///
/// Records are immutable after creation. Expiry is evaluated at lookup time;
/// an expired token is removed and treated exactly like one that never
/// existed.
#[derive(Default)]
pub struct TokenStore {
    entries: DashMap<String, AccessToken>,
}

impl TokenStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly issued token
    pub fn insert(&self, record: AccessToken) {
        self.entries.insert(record.token.clone(), record);
    }

    /// Look up a token, honoring it only strictly before `expires_at`
    ///
    /// Absent and expired are deliberately indistinguishable to the caller.
    #[must_use]
    pub fn lookup(&self, token: &str, now: DateTime<Utc>) -> Option<AccessToken> {
        let expired = {
            let entry = self.entries.get(token)?;
            if now < entry.expires_at {
                return Some(entry.value().clone());
            }
            true
        };

        if expired {
            self.entries.remove(token);
        }
        None
    }

    /// Drop every record whose TTL has lapsed
    pub fn purge_expired(&self, now: DateTime<Utc>) {
        self.entries.retain(|_, record| now < record.expires_at);
    }

    /// Number of live records (diagnostics only)
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no records are held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
