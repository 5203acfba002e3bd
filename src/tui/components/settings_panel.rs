//! # SettingsPanel Component
//!
//! Sidebar next to the transcript: sampling values with their key hints,
//! the deployment in use and the message count. Stateless.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph, Wrap};

use crate::inference::SamplingConfig;
use crate::tui::component::Component;

/// Columns the sidebar asks for in the body layout.
pub const PANEL_WIDTH: u16 = 30;

pub struct SettingsPanel {
    pub sampling: SamplingConfig,
    pub model_name: String,
    pub message_count: usize,
}

impl SettingsPanel {
    pub fn new(sampling: SamplingConfig, model_name: String, message_count: usize) -> Self {
        Self {
            sampling,
            model_name,
            message_count,
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let label = Style::default().add_modifier(Modifier::BOLD);
        let value = Style::default().fg(Color::Cyan);
        let hint = Style::default().fg(Color::DarkGray);

        vec![
            Line::from(vec![
                Span::styled("Temperature: ", label),
                Span::styled(format!("{:.1}", self.sampling.temperature()), value),
            ]),
            Line::from(Span::styled("  Ctrl+T up / Ctrl+G down", hint)),
            Line::default(),
            Line::from(vec![
                Span::styled("Max tokens: ", label),
                Span::styled(self.sampling.max_tokens().to_string(), value),
            ]),
            Line::from(Span::styled("  Ctrl+U up / Ctrl+D down", hint)),
            Line::default(),
            Line::from(vec![
                Span::styled("Model: ", label),
                Span::raw(self.model_name.clone()),
            ]),
            Line::from(vec![
                Span::styled("Messages: ", label),
                Span::raw(self.message_count.to_string()),
            ]),
            Line::default(),
            Line::from(Span::styled("Ctrl+L clear history", hint)),
            Line::from(Span::styled("Ctrl+O log out", hint)),
            Line::from(Span::styled("Esc quit", hint)),
        ]
    }
}

impl Component for SettingsPanel {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let panel = Paragraph::new(self.lines())
            .block(
                Block::bordered()
                    .title("Settings")
                    .padding(Padding::horizontal(1)),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(panel, area);
    }
}
