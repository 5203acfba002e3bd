use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Text;
use ratatui::widgets::{Block, Padding, Paragraph, Widget, Wrap};

use crate::inference::{Message, Role};
use crate::tui::markdown;

/// Columns taken by the two borders and one column of padding per side.
const HORIZONTAL_OVERHEAD: u16 = 4;

/// A single transcript entry with role-based styling.
///
/// Transient: built fresh per frame from a borrowed `Message`.
/// - **User** (cyan): plain text, exactly as typed
/// - **Assistant** (green): rendered as markdown
/// - **Failed completion** (red): the error-marked assistant entry
/// - **System** (yellow): not normally in the transcript, shown if present
pub struct ChatMessage<'a> {
    pub message: &'a Message,
}

impl<'a> ChatMessage<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self { message }
    }

    fn color(&self) -> Color {
        if self.message.is_error() {
            return Color::Red;
        }
        match self.message.role {
            Role::User => Color::Cyan,
            Role::Assistant => Color::Green,
            Role::System => Color::Yellow,
        }
    }

    fn paragraph(&self) -> Paragraph<'static> {
        let color = self.color();
        let content = self.message.content.trim();
        let text = match self.message.role {
            Role::Assistant if !self.message.is_error() => markdown::render(content, color),
            _ => Text::styled(content.to_owned(), Style::default().fg(color)),
        };
        let border = Style::default().fg(color).add_modifier(Modifier::DIM);

        Paragraph::new(text)
            .block(
                Block::bordered()
                    .title(self.message.role.label())
                    .border_style(border)
                    .title_style(border)
                    .padding(Padding::horizontal(1)),
            )
            .wrap(Wrap { trim: false })
    }

    /// Rows needed at `width`, borders included.
    pub fn height(&self, width: u16) -> u16 {
        let rows = self
            .paragraph()
            .line_count(width.saturating_sub(HORIZONTAL_OVERHEAD));
        u16::try_from(rows).unwrap_or(u16::MAX)
    }
}

impl Widget for ChatMessage<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.paragraph().render(area, buf);
    }
}
