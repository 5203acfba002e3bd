//! # TitleBar Component
//!
//! Single-line bar across the top: app name, deployment, and the session's
//! status message. While a request is in flight the status gets a spinner.
//!
//! Stateless: every field is a prop copied out of the `Session` per frame.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

pub struct TitleBar {
    pub model_name: String,
    pub status_message: String,
    pub is_loading: bool,
    pub spinner_frame: usize,
}

impl TitleBar {
    pub fn new(model_name: String, status_message: String, is_loading: bool, spinner_frame: usize) -> Self {
        Self {
            model_name,
            status_message,
            is_loading,
            spinner_frame,
        }
    }

    fn status_span(&self) -> Option<Span<'static>> {
        if self.status_message.is_empty() {
            return None;
        }
        let text = if self.is_loading {
            let glyph = SPINNER[self.spinner_frame % SPINNER.len()];
            format!("{glyph} {}", self.status_message)
        } else {
            self.status_message.clone()
        };
        Some(Span::styled(text, Style::default().fg(Color::Yellow)))
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(
                "Azure AI Chat",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" (model: {})", self.model_name)),
        ];
        if let Some(status) = self.status_span() {
            spans.push(Span::raw(" | "));
            spans.push(status);
        }
        frame.render_widget(Line::from(spans), area);
    }
}
