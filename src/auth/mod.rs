//! # Authentication
//!
//! OAuth2 authorization-code flow against the Microsoft identity platform,
//! and the store for the token it yields.
//!
//! - [`flow`]: authorization URL, redirect parsing, code exchange
//! - [`token`]: the `Token` type and the single-slot `TokenStore`

pub mod flow;
pub mod token;

pub use flow::{AuthError, AuthFlow, AuthSettings, AuthorizationRequest, parse_redirect};
pub use token::{Token, TokenStore};
