//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Loop
//!
//! ```text
//! crossterm event → TuiEvent → Action → update() → Effect
//!                                                    │
//!        BuildLoginUrl: run inline, feed result back ┤
//!    ExchangeCode / RequestCompletion: tokio::spawn ─┘→ mpsc → Action → update()
//! ```
//!
//! The loop redraws after every processed action. While a request is in
//! flight it also redraws every ~80ms to animate the spinner; otherwise it
//! sleeps up to 500ms waiting for input.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use log::{info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;

use crate::auth::AuthFlow;
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::effects::{self, CompletionJob, ExchangeJob};
use crate::core::state::Session;
use crate::inference::{AzureOpenAiProvider, CompletionProvider, ProviderError};
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of the session)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new("", ""),
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Bracketed paste keeps a pasted redirect URL in one event
        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)?;
        info!("Terminal modes enabled (mouse, bracketed paste)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste);
    }
}

/// Long-lived services the effects need.
struct Services {
    provider: Arc<dyn CompletionProvider>,
    auth: Arc<AuthFlow>,
    tx: mpsc::Sender<Action>,
}

impl Services {
    /// Applies `action` and runs whatever it asks for. Returns true on quit.
    fn dispatch(&self, session: &mut Session, action: Action) -> bool {
        let mut next = Some(action);
        while let Some(action) = next.take() {
            match update(session, action) {
                Effect::None => {}
                Effect::Quit => return true,
                // Local work: feed the result straight back in.
                Effect::BuildLoginUrl => next = Some(effects::build_login_url(&self.auth)),
                Effect::ExchangeCode(code) => {
                    info!("Spawning code exchange");
                    self.spawn(ExchangeJob::new(self.auth.clone(), code).run());
                }
                Effect::RequestCompletion => {
                    match CompletionJob::from_session(session, self.provider.clone()) {
                        Some(job) => {
                            info!("Spawning completion request");
                            self.spawn(job.run());
                        }
                        None => {
                            warn!("Completion requested without a token");
                            next = Some(Action::CompletionFinished {
                                generation: session.request_generation,
                                result: Err(ProviderError::Config("not logged in".to_string())),
                            });
                        }
                    }
                }
            }
        }
        false
    }

    fn spawn(&self, job: impl Future<Output = Action> + Send + 'static) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let action = job.await;
            if tx.send(action).is_err() {
                warn!("Failed to deliver job result: receiver dropped");
            }
        });
    }
}

/// Maps a key-level event to a session action. Input editing and scrolling
/// stay in the TUI and map to `None`.
fn event_action(event: &TuiEvent, session: &Session) -> Option<Action> {
    match event {
        TuiEvent::ForceQuit | TuiEvent::Quit => Some(Action::Quit),
        TuiEvent::TemperatureUp => Some(Action::AdjustTemperature(1)),
        TuiEvent::TemperatureDown => Some(Action::AdjustTemperature(-1)),
        TuiEvent::MaxTokensUp => Some(Action::AdjustMaxTokens(1)),
        TuiEvent::MaxTokensDown => Some(Action::AdjustMaxTokens(-1)),
        TuiEvent::ClearHistory if session.is_authenticated() => Some(Action::ClearHistory),
        TuiEvent::Logout if session.is_authenticated() => Some(Action::Logout),
        TuiEvent::NewLoginLink if !session.is_authenticated() => Some(Action::RequestLogin),
        _ => None,
    }
}

/// What Enter means depends on the screen.
fn submit_action(text: String, session: &Session) -> Action {
    if session.is_authenticated() {
        Action::Submit(text)
    } else {
        Action::SubmitRedirect(text)
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let provider: Arc<dyn CompletionProvider> = Arc::new(AzureOpenAiProvider::new(
        config.endpoint.clone(),
        config.deployment.clone(),
        Some(config.api_version.clone()),
    ));
    let auth = Arc::new(AuthFlow::new(config.auth.clone()));
    let mut session = Session::from_config(&config);
    let mut tui = TuiState::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let services = Services { provider, auth, tx };

    services.dispatch(&mut session, Action::RequestLogin);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let start_time = Instant::now();
    let mut needs_redraw = true;

    'main: loop {
        let animating = session.is_busy();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &session, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Drain all pending events before the next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if matches!(event, TuiEvent::Resize) {
                continue;
            }

            if tui.message_list.handle_event(&event).is_some() {
                continue;
            }

            if let Some(action) = event_action(&event, &session) {
                let logging_out = matches!(action, Action::Logout);
                if services.dispatch(&mut session, action) {
                    break 'main;
                }
                if logging_out {
                    tui.message_list = MessageListState::new();
                    services.dispatch(&mut session, Action::RequestLogin);
                }
                continue;
            }

            if let Some(InputEvent::Submit(text)) = tui.input_box.handle_event(&event) {
                let action = submit_action(text, &session);
                if services.dispatch(&mut session, action) {
                    break 'main;
                }
            }
        }

        // Results from background jobs
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            info!("Event loop received: {}", action.name());
            if services.dispatch(&mut session, action) {
                break 'main;
            }
        }
    }

    ratatui::restore();
    Ok(())
}
