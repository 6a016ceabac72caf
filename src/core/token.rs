//! Access tokens and the sources that produce them
//!
//! A [`ReuseTokenSource`] holds on to the last token it handed out and only
//! goes back to its refresh source once that token has expired. The gcloud
//! credential path wires it to a [`HelperTokenSource`], so the configuration
//! helper is re-run at most once per token lifetime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use crate::core::gcloud::{ConfigHelper, HelperError};

/// An OAuth2 bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expiry: DateTime<Utc>,
}

impl Token {
    /// Create a bearer token expiring at `expiry`
    pub fn bearer(access_token: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            expiry,
        }
    }

    /// A token is usable while it is non-empty and its expiry is strictly after `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && self.expiry > now
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

/// Errors produced while obtaining a token
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token expired at {expiry} and no refresh source is available")]
    Expired { expiry: DateTime<Utc> },

    #[error(transparent)]
    Helper(#[from] HelperError),
}

/// Anything that can hand out a currently valid token
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Result<Token, TokenError>;
}

/// A fixed token, served until it expires
#[derive(Debug, Clone)]
pub struct StaticTokenSource {
    token: Token,
}

impl StaticTokenSource {
    pub fn new(token: Token) -> Self {
        Self { token }
    }
}

impl TokenSource for StaticTokenSource {
    fn token(&self) -> Result<Token, TokenError> {
        if self.token.is_valid() {
            Ok(self.token.clone())
        } else {
            Err(TokenError::Expired {
                expiry: self.token.expiry,
            })
        }
    }
}

/// Fetches a fresh snapshot from the configuration helper on every call
pub struct HelperTokenSource {
    helper: Arc<dyn ConfigHelper>,
}

impl HelperTokenSource {
    pub fn new(helper: Arc<dyn ConfigHelper>) -> Self {
        Self { helper }
    }
}

impl TokenSource for HelperTokenSource {
    fn token(&self) -> Result<Token, TokenError> {
        tracing::debug!("refreshing token from configuration helper");
        let snapshot = self.helper.fetch_snapshot()?;
        Ok(snapshot.token())
    }
}

/// Caches a token and refreshes it through another source once expired
///
/// The validity check and the refresh happen under one lock, so concurrent
/// callers trigger at most one refresh per expiry. Refresh errors are returned
/// as-is and leave the previous (expired) token in place.
pub struct ReuseTokenSource {
    cached: Mutex<Option<Token>>,
    refresh: Box<dyn TokenSource>,
}

impl ReuseTokenSource {
    /// Create a caching source, optionally seeded with an initial token
    pub fn new(seed: Option<Token>, refresh: impl TokenSource + 'static) -> Self {
        Self {
            cached: Mutex::new(seed),
            refresh: Box::new(refresh),
        }
    }

    /// Expiry of the currently cached token, without refreshing
    pub fn cached_expiry(&self) -> Option<DateTime<Utc>> {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|t| t.expiry)
    }
}

impl TokenSource for ReuseTokenSource {
    fn token(&self) -> Result<Token, TokenError> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = cached.as_ref() {
            if token.is_valid() {
                return Ok(token.clone());
            }
        }

        let fresh = self.refresh.token()?;
        tracing::debug!(expiry = %fresh.expiry, "cached refreshed token");
        *cached = Some(fresh.clone());
        Ok(fresh)
    }
}
