use serde::{Deserialize, Serialize};

/// Prefix marking an assistant entry that reports a failed completion.
pub const ERROR_MARKER: &str = "❌ Error:";

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// A single role-tagged turn. Never edited after creation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Assistant entry standing in for a completion that failed.
    pub fn error(reason: impl std::fmt::Display) -> Self {
        Self::assistant(format!("{ERROR_MARKER} {reason}"))
    }

    pub fn is_error(&self) -> bool {
        self.role == Role::Assistant && self.content.starts_with(ERROR_MARKER)
    }
}

/// The transcript: ordered, append-only until cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

pub const TEMPERATURE_MIN: f32 = 0.0;
pub const TEMPERATURE_MAX: f32 = 2.0;
pub const TEMPERATURE_STEP: f32 = 0.1;
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

pub const MAX_TOKENS_MIN: u32 = 100;
pub const MAX_TOKENS_MAX: u32 = 4000;
pub const MAX_TOKENS_STEP: u32 = 100;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// User-adjustable knobs for the next completion call.
///
/// Both fields are kept inside their ranges by the setters; values read from
/// config go through [`SamplingConfig::new`] for the same reason.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    temperature: f32,
    max_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl SamplingConfig {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        let mut config = Self::default();
        config.set_temperature(temperature);
        config.set_max_tokens(max_tokens);
        config
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn set_temperature(&mut self, value: f32) {
        let value = if value.is_nan() { DEFAULT_TEMPERATURE } else { value };
        // Snap to the slider's 0.1 grid so repeated steps don't drift.
        let snapped = (value / TEMPERATURE_STEP).round() * TEMPERATURE_STEP;
        self.temperature = snapped.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX);
    }

    pub fn set_max_tokens(&mut self, value: u32) {
        self.max_tokens = value.clamp(MAX_TOKENS_MIN, MAX_TOKENS_MAX);
    }

    /// Moves temperature by `steps` increments of 0.1.
    pub fn step_temperature(&mut self, steps: i32) {
        self.set_temperature(self.temperature + steps as f32 * TEMPERATURE_STEP);
    }

    /// Moves max tokens by `steps` increments of 100.
    pub fn step_max_tokens(&mut self, steps: i32) {
        let delta = steps.unsigned_abs().saturating_mul(MAX_TOKENS_STEP);
        let next = if steps < 0 {
            self.max_tokens.saturating_sub(delta)
        } else {
            self.max_tokens.saturating_add(delta)
        };
        self.set_max_tokens(next);
    }
}
