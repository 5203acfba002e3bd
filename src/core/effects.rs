//! # Effect Jobs
//!
//! The I/O half of the session controller. Each job snapshots what it needs
//! from the `Session`, performs exactly one network round trip, and turns the
//! outcome into the `Action` that `update()` consumes next.
//!
//! Jobs own their inputs so the TUI can move them onto a tokio task.

use std::sync::Arc;

use log::info;

use crate::auth::AuthFlow;
use crate::core::action::Action;
use crate::core::state::Session;
use crate::inference::{CompletionProvider, CompletionRequest, Message, SamplingConfig};

/// One completion call for the current conversation.
pub struct CompletionJob {
    provider: Arc<dyn CompletionProvider>,
    system_prompt: String,
    history: Vec<Message>,
    sampling: SamplingConfig,
    access_token: String,
    generation: u64,
}

impl CompletionJob {
    /// Snapshots the session. `None` when there is no usable token, so a
    /// completion can never be issued while logged out.
    pub fn from_session(session: &Session, provider: Arc<dyn CompletionProvider>) -> Option<Self> {
        let access_token = session.access_token()?.to_string();
        Some(Self {
            provider,
            system_prompt: session.system_prompt.clone(),
            history: session.conversation.messages().to_vec(),
            sampling: session.sampling,
            access_token,
            generation: session.request_generation,
        })
    }

    pub async fn run(self) -> Action {
        info!(
            "Requesting completion from {} ({} history messages)",
            self.provider.name(),
            self.history.len()
        );
        let request = CompletionRequest {
            system_prompt: &self.system_prompt,
            history: &self.history,
            sampling: self.sampling,
            access_token: &self.access_token,
        };
        Action::CompletionFinished {
            generation: self.generation,
            result: self.provider.complete(request).await,
        }
    }
}

/// One authorization-code exchange.
pub struct ExchangeJob {
    auth: Arc<AuthFlow>,
    code: String,
}

impl ExchangeJob {
    pub fn new(auth: Arc<AuthFlow>, code: String) -> Self {
        Self { auth, code }
    }

    pub async fn run(self) -> Action {
        Action::TokenReceived(self.auth.exchange_code(&self.code).await)
    }
}

/// Builds a login link. Local work only, so it runs inline.
pub fn build_login_url(auth: &AuthFlow) -> Action {
    match auth.authorization_url() {
        Ok(request) => Action::LoginUrlReady(request),
        Err(err) => Action::LoginUrlFailed(err),
    }
}
