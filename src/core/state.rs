//! # Session State
//!
//! Everything one signed-in (or signing-in) user owns, in one place.
//! No TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! Session
//! ├── tokens: TokenStore              // bearer token, empty when logged out
//! ├── conversation: Conversation      // transcript, user + assistant turns
//! ├── sampling: SamplingConfig        // applies to the next completion
//! ├── model_name: String              // deployment shown in the sidebar
//! ├── system_prompt: String           // prepended to every request
//! ├── status_message: String          // status bar text
//! ├── pending_login: Option<..>       // outstanding authorization request
//! ├── auth_error: Option<String>      // shown under the login link
//! ├── exchanging: bool                // code exchange in flight
//! ├── is_loading: bool                // completion in flight
//! └── request_generation: u64         // tags the completion in flight
//! ```
//!
//! State changes only happen through `update(session, action)` in action.rs,
//! plus the two teardown methods below which the reducer calls.

use crate::auth::{AuthorizationRequest, TokenStore};
use crate::core::config::ResolvedConfig;
use crate::inference::{Conversation, SamplingConfig};

/// Where the session is in the login state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoToken,
    Exchanging,
    Authenticated,
}

pub struct Session {
    pub tokens: TokenStore,
    pub conversation: Conversation,
    pub sampling: SamplingConfig,
    pub model_name: String,
    pub system_prompt: String,
    pub status_message: String,
    pub pending_login: Option<AuthorizationRequest>,
    pub auth_error: Option<String>,
    pub exchanging: bool,
    pub is_loading: bool,
    /// Bumped by every submitted turn and by logout. A completion result
    /// is only applied if it carries the current value.
    pub request_generation: u64,
}

impl Session {
    /// A fresh session: no token, empty conversation.
    pub fn new(model_name: String, system_prompt: String, sampling: SamplingConfig) -> Self {
        Self {
            tokens: TokenStore::new(),
            conversation: Conversation::new(),
            sampling,
            model_name,
            system_prompt,
            status_message: String::from("Please login to continue"),
            pending_login: None,
            auth_error: None,
            exchanging: false,
            is_loading: false,
            request_generation: 0,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(
            config.deployment.clone(),
            config.system_prompt.clone(),
            config.sampling,
        )
    }

    /// The bearer token for the completion service, if logged in.
    pub fn access_token(&self) -> Option<&str> {
        self.tokens.access_token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_present()
    }

    pub fn phase(&self) -> Phase {
        if self.is_authenticated() {
            Phase::Authenticated
        } else if self.exchanging {
            Phase::Exchanging
        } else {
            Phase::NoToken
        }
    }

    /// True while a network round trip is outstanding; new interactions wait.
    pub fn is_busy(&self) -> bool {
        self.is_loading || self.exchanging
    }

    /// Drops the token and the transcript, and any half-finished login.
    pub fn logout(&mut self) {
        self.tokens.clear();
        self.conversation.clear();
        self.pending_login = None;
        self.auth_error = None;
        self.exchanging = false;
        self.is_loading = false;
        self.request_generation = self.request_generation.wrapping_add(1);
        self.status_message = String::from("Logged out");
    }

    /// Empties the transcript; the token stays.
    pub fn clear_history(&mut self) {
        self.conversation.clear();
        self.status_message = String::from("Chat history cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{authenticated_session, test_session};

    #[test]
    fn test_session_new_defaults() {
        let session = test_session();
        assert_eq!(session.phase(), Phase::NoToken);
        assert!(session.access_token().is_none());
        assert!(session.conversation.is_empty());
        assert!(!session.is_busy());
        assert_eq!(session.model_name, "test-model");
    }

    #[test]
    fn test_logout_clears_everything() {
        let mut session = authenticated_session();
        session.conversation.push(crate::inference::Message::user("hi"));
        session.auth_error = Some("old".to_string());

        session.logout();

        assert_eq!(session.phase(), Phase::NoToken);
        assert!(session.conversation.is_empty());
        assert!(session.auth_error.is_none());
    }

    #[test]
    fn test_clear_history_keeps_token() {
        let mut session = authenticated_session();
        session.conversation.push(crate::inference::Message::user("hi"));

        session.clear_history();

        assert!(session.conversation.is_empty());
        assert_eq!(session.access_token(), Some("test-token"));
    }
}
