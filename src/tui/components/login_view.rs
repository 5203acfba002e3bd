//! # LoginView Component
//!
//! Body of the screen while there is no token: the authorization link, what
//! to do with it, and the last login error. The input box under it takes the
//! redirect address.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph, Wrap};

use crate::tui::component::Component;

pub struct LoginView {
    pub login_url: Option<String>,
    pub auth_error: Option<String>,
    pub exchanging: bool,
}

impl LoginView {
    pub fn new(login_url: Option<String>, auth_error: Option<String>, exchanging: bool) -> Self {
        Self {
            login_url,
            auth_error,
            exchanging,
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let hint = Style::default().fg(Color::DarkGray);
        let mut lines = vec![
            Line::from(Span::styled(
                "🔐 Azure AI Chat",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from("Please login to continue"),
            Line::default(),
        ];

        match &self.login_url {
            Some(url) => {
                lines.push(Line::from("Open this link in a browser and sign in:"));
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    url.clone(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
                )));
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    "After signing in the browser lands on the redirect address. \
                     Paste that address (or just the code) below and press Enter.",
                    hint,
                )));
            }
            None => lines.push(Line::from(Span::styled(
                "No login link yet. Press Ctrl+N to create one.",
                hint,
            ))),
        }

        if self.exchanging {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "Signing in...",
                Style::default().fg(Color::Yellow),
            )));
        }

        if let Some(error) = &self.auth_error {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Ctrl+N new link   Esc quit",
            hint,
        )));
        lines
    }
}

impl Component for LoginView {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let view = Paragraph::new(self.lines())
            .block(Block::bordered().padding(Padding::uniform(1)))
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false });
        frame.render_widget(view, area);
    }
}
