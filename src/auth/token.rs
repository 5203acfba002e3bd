use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// A bearer token issued by the identity provider.
///
/// Only `access_token` is interpreted. The other claims are kept so the UI can
/// show them and so nothing the provider sent is lost.
#[derive(Clone, PartialEq)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub scope: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub extra: Map<String, Value>,
}

// Credentials never reach the log: only their presence is shown.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("expires_at", &self.expires_at)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

/// Raw token endpoint success body.
#[derive(Deserialize, Debug)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Token {
    /// Builds a token from a response body, stamping expiry relative to `now`.
    /// Returns `None` when the access token is missing or empty.
    pub(crate) fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Option<Self> {
        let access_token = response.access_token.filter(|t| !t.is_empty())?;
        Some(Self {
            access_token,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
            scope: response.scope,
            // Out-of-range lifetimes leave the expiry unknown
            expires_at: response
                .expires_in
                .and_then(Duration::try_seconds)
                .and_then(|lifetime| now.checked_add_signed(lifetime)),
            refresh_token: response.refresh_token,
            id_token: response.id_token,
            extra: response.extra,
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Holds at most one token for the session.
#[derive(Debug, Default, Clone)]
pub struct TokenStore {
    current: Option<Token>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, token: Token) {
        self.current = Some(token);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn get(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    /// The bearer string, if a usable (non-empty) one is held.
    pub fn access_token(&self) -> Option<&str> {
        self.current
            .as_ref()
            .map(|t| t.access_token.as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn is_present(&self) -> bool {
        self.access_token().is_some()
    }
}
