//! # Actions
//!
//! Everything that can happen in a session becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! The completion comes back? That's `Action::CompletionFinished { .. }`.
//!
//! The `update()` function takes the session and an action, mutates the
//! session, and returns the `Effect` the caller must run next. No I/O here;
//! network calls happen in `core::effects`, driven by the TUI loop.
//!
//! ```text
//! Session + Action  →  update()  →  Session' + Effect
//!                                              │
//!                        effects::*Job::run() ◄┘  →  Action  →  update() ...
//! ```

use log::{debug, info, warn};

use crate::auth::{AuthError, AuthorizationRequest, Token, parse_redirect};
use crate::core::state::Session;
use crate::inference::{Message, ProviderError};

pub enum Action {
    /// Ask for a (new) login link.
    RequestLogin,
    LoginUrlReady(AuthorizationRequest),
    LoginUrlFailed(AuthError),
    /// The redirect URL (or bare code) the user pasted back.
    SubmitRedirect(String),
    TokenReceived(Result<Token, AuthError>),
    /// A chat line typed by the user.
    Submit(String),
    /// Outcome of the request tagged `generation`.
    CompletionFinished {
        generation: u64,
        result: Result<Message, ProviderError>,
    },
    AdjustTemperature(i32),
    AdjustMaxTokens(i32),
    ClearHistory,
    Logout,
    Quit,
}

impl Action {
    /// Short name for logging. Payloads may hold codes or tokens.
    pub fn name(&self) -> &'static str {
        match self {
            Action::RequestLogin => "RequestLogin",
            Action::LoginUrlReady(_) => "LoginUrlReady",
            Action::LoginUrlFailed(_) => "LoginUrlFailed",
            Action::SubmitRedirect(_) => "SubmitRedirect",
            Action::TokenReceived(_) => "TokenReceived",
            Action::Submit(_) => "Submit",
            Action::CompletionFinished { .. } => "CompletionFinished",
            Action::AdjustTemperature(_) => "AdjustTemperature",
            Action::AdjustMaxTokens(_) => "AdjustMaxTokens",
            Action::ClearHistory => "ClearHistory",
            Action::Logout => "Logout",
            Action::Quit => "Quit",
        }
    }
}

/// Side effect requested by `update()`.
#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Build a fresh authorization URL.
    BuildLoginUrl,
    /// Exchange this authorization code for a token.
    ExchangeCode(String),
    /// Send the current conversation to the completion service.
    RequestCompletion,
    Quit,
}

fn login_failed(session: &mut Session, err: &AuthError) {
    warn!("Login failed: {}", err);
    session.auth_error = Some(format!("❌ Login failed: {}", err.description()));
    session.status_message = String::from("Login failed");
}

pub fn update(session: &mut Session, action: Action) -> Effect {
    debug!("update: {}", action.name());
    match action {
        Action::RequestLogin => {
            if session.is_authenticated() || session.exchanging {
                return Effect::None;
            }
            Effect::BuildLoginUrl
        }
        Action::LoginUrlReady(request) => {
            if session.is_authenticated() {
                return Effect::None;
            }
            session.pending_login = Some(request);
            session.status_message =
                String::from("Open the link, sign in, then paste the address you land on");
            Effect::None
        }
        Action::LoginUrlFailed(err) => {
            session.pending_login = None;
            login_failed(session, &err);
            Effect::None
        }
        Action::SubmitRedirect(input) => {
            if session.is_authenticated() || session.exchanging {
                return Effect::None;
            }
            let expected_state = session.pending_login.as_ref().map(|r| r.state.as_str());
            match parse_redirect(&input, expected_state) {
                Ok(code) => {
                    session.exchanging = true;
                    session.auth_error = None;
                    session.status_message = String::from("Signing in...");
                    Effect::ExchangeCode(code)
                }
                Err(err) => {
                    login_failed(session, &err);
                    Effect::None
                }
            }
        }
        Action::TokenReceived(result) => {
            if !session.exchanging {
                // Logged out (or never asked) while the exchange was in flight.
                warn!("Dropping token result: no exchange outstanding");
                return Effect::None;
            }
            session.exchanging = false;
            match result {
                Ok(token) => {
                    info!("Login succeeded");
                    session.tokens.set(token);
                    session.pending_login = None;
                    session.auth_error = None;
                    session.status_message = String::from("Logged in");
                }
                Err(err) => login_failed(session, &err),
            }
            Effect::None
        }
        Action::Submit(text) => {
            if text.trim().is_empty() {
                return Effect::None;
            }
            if session.is_busy() {
                session.status_message = String::from("Still waiting for the previous reply");
                return Effect::None;
            }
            if !session.is_authenticated() {
                session.status_message = String::from("Please login to continue");
                return Effect::None;
            }
            session.conversation.push(Message::user(text));
            session.is_loading = true;
            session.request_generation = session.request_generation.wrapping_add(1);
            session.status_message = String::from("Thinking...");
            Effect::RequestCompletion
        }
        Action::CompletionFinished { generation, result } => {
            if !session.is_loading || generation != session.request_generation {
                warn!(
                    "Dropping stale completion result (generation {}, current {})",
                    generation, session.request_generation
                );
                return Effect::None;
            }
            session.is_loading = false;
            match result {
                Ok(message) => {
                    session.conversation.push(message);
                    session.status_message = String::new();
                }
                Err(err) => {
                    warn!("Completion failed: {}", err);
                    let expired = session.tokens.get().is_some_and(|t| t.is_expired());
                    session.status_message = if expired {
                        String::from("Token expired: log out (Ctrl+O) and sign in again")
                    } else {
                        String::from("Completion failed")
                    };
                    session.conversation.push(Message::error(err));
                }
            }
            Effect::None
        }
        Action::AdjustTemperature(steps) => {
            session.sampling.step_temperature(steps);
            session.status_message = format!("Temperature: {:.1}", session.sampling.temperature());
            Effect::None
        }
        Action::AdjustMaxTokens(steps) => {
            session.sampling.step_max_tokens(steps);
            session.status_message = format!("Max tokens: {}", session.sampling.max_tokens());
            Effect::None
        }
        Action::ClearHistory => {
            if session.is_loading {
                session.status_message = String::from("Still waiting for the previous reply");
                return Effect::None;
            }
            session.clear_history();
            Effect::None
        }
        Action::Logout => {
            info!("Logging out");
            session.logout();
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Phase;
    use crate::inference::Role;
    use crate::test_support::{authenticated_session, test_request, test_session, test_token};

    /// A result for whatever request is currently in flight.
    fn finished(session: &Session, result: Result<Message, ProviderError>) -> Action {
        Action::CompletionFinished {
            generation: session.request_generation,
            result,
        }
    }

    #[test]
    fn test_submit_empty_is_noop() {
        let mut session = authenticated_session();
        assert_eq!(update(&mut session, Action::Submit(String::new())), Effect::None);
        assert_eq!(update(&mut session, Action::Submit("  \n ".to_string())), Effect::None);
        assert!(session.conversation.is_empty());
        assert!(!session.is_loading);
    }

    #[test]
    fn test_submit_requires_token() {
        let mut session = test_session();
        assert_eq!(update(&mut session, Action::Submit("Hello".to_string())), Effect::None);
        assert!(session.conversation.is_empty());
        assert_eq!(session.status_message, "Please login to continue");
    }

    #[test]
    fn test_successful_turn_adds_two_messages() {
        let mut session = authenticated_session();
        let effect = update(&mut session, Action::Submit("Hello".to_string()));
        assert_eq!(effect, Effect::RequestCompletion);
        assert_eq!(session.conversation.len(), 1);
        assert!(session.is_loading);

        let action = finished(&session, Ok(Message::assistant("Hi there!")));
        update(&mut session, action);

        assert_eq!(
            session.conversation.messages(),
            &[Message::user("Hello"), Message::assistant("Hi there!")]
        );
        assert!(!session.is_loading);
    }

    #[test]
    fn test_failed_turn_adds_error_marked_message() {
        let mut session = authenticated_session();
        update(&mut session, Action::Submit("Hello".to_string()));
        let action = finished(&session, Err(ProviderError::Network("connection refused".into())));
        update(&mut session, action);

        let messages = session.conversation.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::user("Hello"));
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(messages[1].content.starts_with("❌ Error: "));
        assert!(messages[1].content.contains("connection refused"));
    }

    #[test]
    fn test_submit_while_loading_is_refused() {
        let mut session = authenticated_session();
        update(&mut session, Action::Submit("first".to_string()));
        assert_eq!(update(&mut session, Action::Submit("second".to_string())), Effect::None);
        assert_eq!(session.conversation.len(), 1);
    }

    #[test]
    fn test_logout_then_submit_is_rejected() {
        let mut session = authenticated_session();
        update(&mut session, Action::Submit("Hello".to_string()));
        let action = finished(&session, Ok(Message::assistant("Hi")));
        update(&mut session, action);

        update(&mut session, Action::Logout);
        assert_eq!(session.phase(), Phase::NoToken);
        assert!(session.conversation.is_empty());

        assert_eq!(update(&mut session, Action::Submit("again".to_string())), Effect::None);
        assert!(session.conversation.is_empty());
    }

    #[test]
    fn test_late_completion_after_logout_is_dropped() {
        let mut session = authenticated_session();
        update(&mut session, Action::Submit("Hello".to_string()));
        let late = finished(&session, Ok(Message::assistant("late")));
        update(&mut session, Action::Logout);
        update(&mut session, late);
        assert!(session.conversation.is_empty());
    }

    #[test]
    fn test_old_reply_does_not_cross_into_next_login() {
        let mut session = authenticated_session();
        update(&mut session, Action::Submit("question from the first login".to_string()));
        let old_reply = finished(&session, Ok(Message::assistant("answer for the first login")));

        update(&mut session, Action::Logout);
        update(&mut session, Action::LoginUrlReady(test_request("state-2")));
        update(
            &mut session,
            Action::SubmitRedirect("?code=xyz&state=state-2".to_string()),
        );
        update(&mut session, Action::TokenReceived(Ok(test_token("second"))));
        assert_eq!(
            update(&mut session, Action::Submit("B".to_string())),
            Effect::RequestCompletion
        );

        update(&mut session, old_reply);
        assert_eq!(session.conversation.messages(), &[Message::user("B")]);
        assert!(session.is_loading);

        let reply = finished(&session, Ok(Message::assistant("answer for B")));
        update(&mut session, reply);
        assert_eq!(
            session.conversation.messages(),
            &[Message::user("B"), Message::assistant("answer for B")]
        );
        assert!(!session.is_loading);
    }

    #[test]
    fn test_failure_with_expired_token_hints_at_logout() {
        let mut session = test_session();
        let mut token = test_token("stale");
        token.expires_at = Some(chrono::Utc::now() - chrono::Duration::minutes(5));
        session.tokens.set(token);

        update(&mut session, Action::Submit("Hello".to_string()));
        let action = finished(
            &session,
            Err(ProviderError::Api {
                status: 401,
                message: "token expired".to_string(),
            }),
        );
        update(&mut session, action);

        assert_eq!(
            session.status_message,
            "Token expired: log out (Ctrl+O) and sign in again"
        );
        let messages = session.conversation.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].is_error());
        assert!(messages[1].content.starts_with("❌ Error: "));
        assert!(messages[1].content.contains("token expired"));
    }

    #[test]
    fn test_failure_with_live_token_keeps_generic_status() {
        let mut session = authenticated_session();
        update(&mut session, Action::Submit("Hello".to_string()));
        let action = finished(&session, Err(ProviderError::EmptyResponse));
        update(&mut session, action);
        assert_eq!(session.status_message, "Completion failed");
    }

    #[test]
    fn test_clear_history_waits_for_reply() {
        let mut session = authenticated_session();
        update(&mut session, Action::Submit("Hello".to_string()));

        assert_eq!(update(&mut session, Action::ClearHistory), Effect::None);
        assert_eq!(session.conversation.len(), 1);
        assert_eq!(session.status_message, "Still waiting for the previous reply");

        let action = finished(&session, Ok(Message::assistant("Hi")));
        update(&mut session, action);
        update(&mut session, Action::ClearHistory);
        assert!(session.conversation.is_empty());
    }

    #[test]
    fn test_clear_history_keeps_token() {
        let mut session = authenticated_session();
        update(&mut session, Action::Submit("Hello".to_string()));
        let action = finished(&session, Ok(Message::assistant("Hi")));
        update(&mut session, action);

        update(&mut session, Action::ClearHistory);
        assert!(session.conversation.is_empty());
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_login_flow_happy_path() {
        let mut session = test_session();
        assert_eq!(update(&mut session, Action::RequestLogin), Effect::BuildLoginUrl);

        let request = test_request("state-1");
        update(&mut session, Action::LoginUrlReady(request));
        assert!(session.pending_login.is_some());

        let effect = update(
            &mut session,
            Action::SubmitRedirect("http://localhost:8400/redirect?code=abc&state=state-1".to_string()),
        );
        assert_eq!(effect, Effect::ExchangeCode("abc".to_string()));
        assert_eq!(session.phase(), Phase::Exchanging);

        update(&mut session, Action::TokenReceived(Ok(test_token("tok"))));
        assert_eq!(session.phase(), Phase::Authenticated);
        assert_eq!(session.access_token(), Some("tok"));
        assert!(session.pending_login.is_none());
    }

    #[test]
    fn test_exchange_failure_stays_logged_out() {
        let mut session = test_session();
        update(&mut session, Action::LoginUrlReady(test_request("s")));
        update(&mut session, Action::SubmitRedirect("abc".to_string()));

        update(
            &mut session,
            Action::TokenReceived(Err(AuthError::Rejected {
                error: "invalid_grant".to_string(),
                description: Some("AADSTS54005: code was already redeemed".to_string()),
            })),
        );

        assert_eq!(session.phase(), Phase::NoToken);
        assert_eq!(
            session.auth_error.as_deref(),
            Some("❌ Login failed: AADSTS54005: code was already redeemed")
        );
        // The link stays available for a retry.
        assert!(session.pending_login.is_some());
        assert_eq!(update(&mut session, Action::RequestLogin), Effect::BuildLoginUrl);
    }

    #[test]
    fn test_state_mismatch_is_reported_inline() {
        let mut session = test_session();
        update(&mut session, Action::LoginUrlReady(test_request("mine")));
        let effect = update(
            &mut session,
            Action::SubmitRedirect("http://localhost:8400/redirect?code=abc&state=theirs".to_string()),
        );
        assert_eq!(effect, Effect::None);
        assert!(session.auth_error.is_some());
        assert_eq!(session.phase(), Phase::NoToken);
    }

    #[test]
    fn test_sampling_adjustments() {
        let mut session = test_session();
        update(&mut session, Action::AdjustTemperature(-3));
        update(&mut session, Action::AdjustMaxTokens(5));
        assert!((session.sampling.temperature() - 0.7).abs() < 1e-4);
        assert_eq!(session.sampling.max_tokens(), 1500);
        assert_eq!(session.status_message, "Max tokens: 1500");
    }

    #[test]
    fn test_quit() {
        let mut session = test_session();
        assert_eq!(update(&mut session, Action::Quit), Effect::Quit);
    }
}
