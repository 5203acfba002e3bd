//! # Authorization-Code Flow
//!
//! Talks to the Microsoft identity platform v2 endpoints:
//!
//! ```text
//! authorization_url()  →  browser  →  redirect_uri?code=..&state=..
//!                                            │
//!                      parse_redirect()  ←───┘ (user pastes the URL)
//!                              │
//!                      exchange_code()  →  POST {authority}/oauth2/v2.0/token
//!                              │
//!                            Token
//! ```
//!
//! Every failure is an [`AuthError`] value. None of them are fatal: the
//! session stays logged out and the user can request a fresh link.

use std::fmt;

use chrono::Utc;
use log::{debug, info, warn};
use serde::Deserialize;
use url::Url;

use super::token::{Token, TokenResponse};

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_SCOPE: &str = "https://cognitiveservices.azure.com/.default";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8400/redirect";

/// Scopes the identity library adds to every interactive request.
const RESERVED_SCOPES: [&str; 3] = ["offline_access", "openid", "profile"];

#[derive(Debug)]
pub enum AuthError {
    /// Client id, tenant or secret missing, or the authority is not a URL.
    Config(String),
    /// Nothing that looks like an authorization code was supplied.
    MissingCode,
    /// The redirect's `state` does not belong to the outstanding request.
    StateMismatch,
    /// The provider refused the request (redirect error or token error payload).
    Rejected {
        error: String,
        description: Option<String>,
    },
    /// Network-level failure talking to the token endpoint.
    Network(String),
    /// The token endpoint answered with something we can't use.
    Malformed(String),
}

impl AuthError {
    /// The human-readable part shown under the login link.
    pub fn description(&self) -> String {
        match self {
            AuthError::Rejected {
                description: Some(description),
                ..
            } => description.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Config(msg) => write!(f, "configuration error: {msg}"),
            AuthError::MissingCode => write!(f, "no authorization code found in the input"),
            AuthError::StateMismatch => {
                write!(f, "the redirect does not match the current login request; request a new link")
            }
            AuthError::Rejected { error, description } => match description {
                Some(description) => write!(f, "{error}: {description}"),
                None => write!(f, "{error}"),
            },
            AuthError::Network(msg) => write!(f, "network error: {msg}"),
            AuthError::Malformed(msg) => write!(f, "unexpected token response: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Identity settings, as resolved from config and environment.
#[derive(Debug, Clone, Default)]
pub struct AuthSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub tenant_id: Option<String>,
    pub authority_host: String,
    pub redirect_uri: String,
    pub scope: String,
}

/// An authorization URL plus the `state` nonce it was issued with.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationRequest {
    pub url: Url,
    pub state: String,
}

/// Token endpoint error body.
#[derive(Deserialize, Debug)]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Confidential client for one tenant.
pub struct AuthFlow {
    settings: AuthSettings,
    client: reqwest::Client,
}

impl AuthFlow {
    pub fn new(settings: AuthSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    fn client_id(&self) -> Result<&str, AuthError> {
        non_blank(&self.settings.client_id)
            .ok_or_else(|| AuthError::Config("CLIENT_ID is not set".to_string()))
    }

    /// `{authority_host}/{tenant}` as a base for the v2 endpoints.
    fn authority(&self) -> Result<String, AuthError> {
        let tenant = non_blank(&self.settings.tenant_id)
            .ok_or_else(|| AuthError::Config("TENANT_ID is not set".to_string()))?;
        Ok(format!(
            "{}/{}",
            self.settings.authority_host.trim_end_matches('/'),
            tenant
        ))
    }

    fn endpoint(&self, leaf: &str) -> Result<Url, AuthError> {
        let raw = format!("{}/oauth2/v2.0/{leaf}", self.authority()?);
        Url::parse(&raw).map_err(|e| AuthError::Config(format!("invalid authority '{raw}': {e}")))
    }

    /// Space-separated scope list sent on both legs of the flow.
    pub fn scopes(&self) -> String {
        let mut scopes = vec![self.settings.scope.as_str()];
        scopes.extend(RESERVED_SCOPES);
        scopes.join(" ")
    }

    /// Builds a fresh authorization URL. Each call issues a new `state`.
    pub fn authorization_url(&self) -> Result<AuthorizationRequest, AuthError> {
        let client_id = self.client_id()?;
        let mut url = self.endpoint("authorize")?;
        let state = uuid::Uuid::new_v4().to_string();

        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.settings.redirect_uri)
            .append_pair("response_mode", "query")
            .append_pair("scope", &self.scopes())
            .append_pair("state", &state);

        debug!("Built authorization URL for scope '{}'", self.settings.scope);
        Ok(AuthorizationRequest { url, state })
    }

    /// Exchanges an authorization code for a token.
    pub async fn exchange_code(&self, code: &str) -> Result<Token, AuthError> {
        let client_id = self.client_id()?;
        let client_secret = non_blank(&self.settings.client_secret)
            .ok_or_else(|| AuthError::Config("CLIENT_SECRET is not set".to_string()))?;
        let url = self.endpoint("token")?;
        let scopes = self.scopes();

        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
            ("scope", scopes.as_str()),
        ];

        info!("Exchanging authorization code (len={}) at {}", code.len(), url);

        let response = self
            .client
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        debug!("Token endpoint status: {}", status);

        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => {
                    warn!("Token exchange rejected: {}", err.error);
                    AuthError::Rejected {
                        error: err.error,
                        description: err.error_description,
                    }
                }
                Err(_) => {
                    warn!("Token exchange failed with HTTP {}", status.as_u16());
                    AuthError::Malformed(format!("HTTP {}", status.as_u16()))
                }
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::Malformed(e.to_string()))?;
        let token = Token::from_response(parsed, Utc::now())
            .ok_or_else(|| AuthError::Malformed("no access_token in response".to_string()))?;

        info!(
            "Token acquired: type={}, scope={:?}, expires_at={:?}",
            token.token_type, token.scope, token.expires_at
        );
        Ok(token)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Extracts the authorization code from what the user pasted.
///
/// Accepts the full redirect URL (`...?code=..&state=..`), a bare query string,
/// or the bare code. When the redirect carries a `state`, it must equal
/// `expected_state`.
pub fn parse_redirect(input: &str, expected_state: Option<&str>) -> Result<String, AuthError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AuthError::MissingCode);
    }

    let query = match Url::parse(input) {
        Ok(url) => url.query().unwrap_or_default().to_string(),
        Err(_) if input.contains('=') => input.trim_start_matches('?').to_string(),
        Err(_) => return Ok(input.to_string()),
    };

    let mut code = None;
    let mut state = None;
    let mut error = None;
    let mut error_description = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => error_description = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(AuthError::Rejected {
            error,
            description: error_description,
        });
    }

    if let (Some(expected), Some(received)) = (expected_state, state.as_deref())
        && expected != received
    {
        return Err(AuthError::StateMismatch);
    }

    code.filter(|c| !c.is_empty()).ok_or(AuthError::MissingCode)
}
