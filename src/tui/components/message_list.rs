//! # MessageList Component
//!
//! Scrollable transcript. Every frame lays out the whole conversation again
//! (no diffing) and renders it into a `tui_scrollview::ScrollView`.
//!
//! ## Stick-to-bottom
//!
//! New turns should be visible without scrolling, but a user reading older
//! turns should not be yanked down. `stick_to_bottom` starts true, is cleared
//! by any upward scroll, and is set again by `End` or by scrolling back to the
//! last row.

use ratatui::Frame;
use ratatui::layout::{Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::inference::Message;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::ChatMessage;
use crate::tui::event::TuiEvent;

/// Persistent presentation state for the transcript.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub stick_to_bottom: bool,
    /// Content height from the last layout, for bottom detection.
    content_height: u16,
    /// Viewport height from the last render.
    viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            stick_to_bottom: true,
            content_height: 0,
            viewport_height: 0,
        }
    }

    fn at_bottom(&self) -> bool {
        let max_offset = self.content_height.saturating_sub(self.viewport_height);
        self.scroll_state.offset().y >= max_offset
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<()> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.stick_to_bottom = self.at_bottom();
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.stick_to_bottom = self.at_bottom();
            }
            TuiEvent::ScrollToBottom => {
                self.scroll_state.scroll_to_bottom();
                self.stick_to_bottom = true;
            }
            _ => return None,
        }
        Some(())
    }
}

/// Props: the transcript and whether a reply is pending.
pub struct MessageList<'a> {
    pub messages: &'a [Message],
    pub is_loading: bool,
    pub state: &'a mut MessageListState,
}

impl<'a> MessageList<'a> {
    pub fn new(messages: &'a [Message], is_loading: bool, state: &'a mut MessageListState) -> Self {
        Self {
            messages,
            is_loading,
            state,
        }
    }
}

impl Component for MessageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        // One column for the scrollbar.
        let content_width = area.width.saturating_sub(1);

        let heights: Vec<u16> = self
            .messages
            .iter()
            .map(|m| ChatMessage::new(m).height(content_width))
            .collect();
        let thinking_rows: u16 = if self.is_loading { 1 } else { 0 };
        let total_height = heights
            .iter()
            .fold(0u16, |acc, h| acc.saturating_add(*h))
            .saturating_add(thinking_rows);

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y: u16 = 0;
        for (message, height) in self.messages.iter().zip(&heights) {
            scroll_view.render_widget(
                ChatMessage::new(message),
                Rect::new(0, y, content_width, *height),
            );
            y = y.saturating_add(*height);
        }
        if self.is_loading {
            scroll_view.render_widget(
                Paragraph::new("Thinking...").style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ),
                Rect::new(1, y, content_width.saturating_sub(1), 1),
            );
        }

        self.state.content_height = total_height;
        self.state.viewport_height = area.height;
        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(messages: &[Message], is_loading: bool, state: &mut MessageListState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal
            .draw(|f| {
                MessageList::new(messages, is_loading, state).render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_renders_every_message() {
        let messages = vec![Message::user("Hello"), Message::assistant("Hi there")];
        let mut state = MessageListState::new();
        let text = draw(&messages, false, &mut state);
        assert!(text.contains("Hello"));
        assert!(text.contains("Hi there"));
        assert!(!text.contains("Thinking..."));
    }

    #[test]
    fn test_thinking_indicator_while_loading() {
        let messages = vec![Message::user("Hello")];
        let mut state = MessageListState::new();
        let text = draw(&messages, true, &mut state);
        assert!(text.contains("Thinking..."));
    }

    #[test]
    fn test_scroll_up_releases_bottom_and_end_restores() {
        let mut state = MessageListState::new();
        assert!(state.stick_to_bottom);

        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);

        state.handle_event(&TuiEvent::ScrollToBottom);
        assert!(state.stick_to_bottom);
    }

    #[test]
    fn test_ignores_non_scroll_events() {
        let mut state = MessageListState::new();
        assert_eq!(state.handle_event(&TuiEvent::InputChar('a')), None);
    }
}
