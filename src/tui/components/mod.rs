//! # TUI Components
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Built fresh every frame from values copied or borrowed out of the `Session`:
//! - `TitleBar`: app name, deployment and status line
//! - `ChatMessage`: one transcript entry
//! - `SettingsPanel`: sampling values, model and message count
//! - `LoginView`: authorization link and login errors
//!
//! ### Stateful Components (Event-Driven)
//!
//! Live in `TuiState` across frames and consume `TuiEvent`s:
//! - `InputBox`: text field, emits `InputEvent::Submit`
//! - `MessageList` / `MessageListState`: scrollable transcript
//!
//! Components never touch the `Session` directly. Everything they show comes
//! in as props, so each one can be rendered against a `TestBackend` alone.
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── title_bar.rs
//! ├── message.rs
//! ├── message_list.rs
//! ├── input_box.rs
//! ├── settings_panel.rs
//! └── login_view.rs
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod input_box;
pub mod login_view;
pub mod message;
pub mod message_list;
pub mod settings_panel;

pub use input_box::{InputBox, InputEvent};
pub use login_view::LoginView;
pub use message_list::{MessageList, MessageListState};
pub use settings_panel::SettingsPanel;
