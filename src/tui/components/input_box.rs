//! # InputBox Component
//!
//! One text field used by both screens: the chat prompt and, on the login
//! screen, the place to paste the redirect URL.
//!
//! The buffer is internal state; title, placeholder and `dimmed` are props.
//! Editing is append-only at the end (type, paste, backspace).

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Most content rows shown before the box stops growing.
const MAX_VISIBLE_LINES: u16 = 6;
/// Top + bottom border.
const VERTICAL_OVERHEAD: u16 = 2;
const CARET: &str = "█";

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter pressed); the buffer is now empty
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    pub buffer: String,
    pub title: String,
    pub placeholder: String,
    /// Greys the box out while input would be refused (request in flight).
    pub dimmed: bool,
}

impl InputBox {
    pub fn new(title: &str, placeholder: &str) -> Self {
        Self {
            buffer: String::new(),
            title: title.to_string(),
            placeholder: placeholder.to_string(),
            dimmed: false,
        }
    }

    /// Swaps the props for the other screen, dropping any half-typed text.
    pub fn retarget(&mut self, title: &str, placeholder: &str) {
        if self.title != title {
            self.title = title.to_string();
            self.placeholder = placeholder.to_string();
            self.buffer.clear();
        }
    }

    fn text(&self) -> Text<'static> {
        if self.buffer.is_empty() {
            return Text::from(Line::from(vec![
                Span::raw(CARET),
                Span::styled(
                    self.placeholder.clone(),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                ),
            ]));
        }
        let mut text = Text::raw(self.buffer.clone());
        if self.buffer.ends_with('\n') {
            text.lines.push(Line::default());
        }
        if let Some(last) = text.lines.last_mut() {
            last.spans.push(Span::raw(CARET));
        }
        text
    }

    fn paragraph(&self) -> Paragraph<'static> {
        let style = if self.dimmed {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };
        Paragraph::new(self.text())
            .block(Block::bordered().title(self.title.clone()))
            .style(style)
            .wrap(Wrap { trim: false })
    }

    /// Height for the current buffer at `width`, clamped to the visible maximum.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let content_lines = self
            .paragraph()
            .line_count(width.saturating_sub(2))
            .saturating_sub(VERTICAL_OVERHEAD as usize);
        let visible = u16::try_from(content_lines).unwrap_or(u16::MAX).clamp(1, MAX_VISIBLE_LINES);
        visible + VERTICAL_OVERHEAD
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner_width = area.width.saturating_sub(2);
        let total = self.paragraph().line_count(inner_width).saturating_sub(VERTICAL_OVERHEAD as usize);
        let visible = area.height.saturating_sub(VERTICAL_OVERHEAD) as usize;
        // Keep the caret (last line) in view.
        let scroll = u16::try_from(total.saturating_sub(visible)).unwrap_or(0);
        frame.render_widget(self.paragraph().scroll((scroll, 0)), area);
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<InputEvent> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.push(*c);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Normalize CRLF from Windows terminals
                self.buffer.push_str(&text.replace("\r\n", "\n").replace('\r', "\n"));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                self.buffer.pop()?;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Submit => Some(InputEvent::Submit(std::mem::take(&mut self.buffer))),
            _ => None,
        }
    }
}
