//! # Core Application Logic
//!
//! The session controller. It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Session (state)      │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • effect jobs (I/O)    │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │   auth     │      │ inference  │
//!     │  Adapter   │      │ (identity  │      │ (completion│
//!     │ (ratatui)  │      │  provider) │      │  service)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `Session` struct, all session state in one place
//! - [`action`]: The `Action` enum and `update()` reducer
//! - [`effects`]: Jobs that perform the network calls `update()` asks for
//! - [`config`]: Layered configuration

pub mod action;
pub mod config;
pub mod effects;
pub mod state;
