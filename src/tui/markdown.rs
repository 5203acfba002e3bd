//! Markdown → ratatui `Text` for transcript entries.
//!
//! Covers what chat replies actually use: paragraphs, headings, emphasis,
//! inline code, fenced code, lists, block quotes, links and rules.
//! Tables, images and raw HTML fall through as plain text or are skipped.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

const MUTED: Color = Color::DarkGray;

/// Renders `content` with `base` as the body text color.
pub fn render(content: &str, base: Color) -> Text<'static> {
    let mut renderer = Renderer::new(base);
    for event in Parser::new_ext(content, Options::ENABLE_STRIKETHROUGH) {
        renderer.event(event);
    }
    renderer.finish()
}

struct Renderer {
    lines: Vec<Line<'static>>,
    base: Color,
    /// Inline style stack; each entry is already patched onto its parent.
    styles: Vec<Style>,
    /// `│ ` gutters for quotes and code blocks, outermost first.
    gutters: Vec<Span<'static>>,
    /// One entry per open list: `None` bullets, `Some(n)` numbers.
    lists: Vec<Option<u64>>,
    in_code_block: bool,
    pending_link: Option<String>,
    /// A block just ended; the next block starts after a blank line.
    gap: bool,
}

impl Renderer {
    fn new(base: Color) -> Self {
        Self {
            lines: Vec::new(),
            base,
            styles: Vec::new(),
            gutters: Vec::new(),
            lists: Vec::new(),
            in_code_block: false,
            pending_link: None,
            gap: false,
        }
    }

    fn finish(self) -> Text<'static> {
        Text::from(self.lines)
    }

    fn current(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base))
    }

    fn push_style(&mut self, overlay: Style) {
        let next = self.current().patch(overlay);
        self.styles.push(next);
    }

    fn new_line(&mut self) {
        let mut line = Line::default();
        line.spans.extend(self.gutters.iter().cloned());
        self.lines.push(line);
    }

    fn span(&mut self, span: Span<'static>) {
        if self.lines.is_empty() {
            self.new_line();
        }
        if let Some(line) = self.lines.last_mut() {
            line.spans.push(span);
        }
    }

    fn start_block(&mut self) {
        if self.gap {
            self.new_line();
            self.gap = false;
        }
        self.new_line();
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.span(Span::styled(
                code.to_string(),
                Style::default().fg(Color::White).bg(MUTED),
            )),
            Event::SoftBreak => self.span(Span::raw(" ")),
            Event::HardBreak => self.new_line(),
            Event::Rule => {
                self.start_block();
                self.span(Span::styled("─".repeat(40), Style::default().fg(MUTED)));
                self.gap = true;
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                // List items already opened their line with the marker.
                let continues_item =
                    !self.gap && !self.lists.is_empty() && self.last_line_is_marker();
                if !continues_item {
                    self.start_block();
                }
            }
            Tag::Heading { level, .. } => {
                self.start_block();
                let style = heading_style(self.base, level);
                self.span(Span::styled(format!("{} ", "#".repeat(level as usize)), style));
                self.styles.push(style);
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.gutters.push(Span::styled("│ ", Style::default().fg(MUTED)));
                self.push_style(Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM));
                // The quote's first paragraph reuses this line.
                self.gap = false;
                self.lines.pop();
            }
            Tag::CodeBlock(_) => {
                self.start_block();
                self.span(Span::styled("╭──", Style::default().fg(MUTED)));
                self.gutters.push(Span::styled("│ ", Style::default().fg(MUTED)));
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() && self.gap {
                    self.new_line();
                    self.gap = false;
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.new_line();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}- "),
                };
                self.span(Span::styled(marker, Style::default().fg(MUTED)));
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.pending_link = Some(dest_url.to_string());
                self.push_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED));
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) => {
                if matches!(tag, TagEnd::Heading(_)) {
                    self.styles.pop();
                }
                self.gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.gutters.pop();
                self.styles.pop();
                self.gap = true;
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.gutters.pop();
                self.new_line();
                self.span(Span::styled("╰──", Style::default().fg(MUTED)));
                self.gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.gap = true;
            }
            TagEnd::Item => self.gap = false,
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Link => {
                self.styles.pop();
                if let Some(url) = self.pending_link.take() {
                    self.span(Span::styled(format!(" ({url})"), Style::default().fg(MUTED)));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        // ratatui draws '\t' as zero width
        let text = text.replace('\t', "    ");
        if self.in_code_block {
            for line in text.lines() {
                self.new_line();
                self.span(Span::styled(line.to_owned(), Style::default().fg(Color::White)));
            }
            return;
        }
        let style = self.current();
        self.span(Span::styled(text, style));
    }

    fn last_line_is_marker(&self) -> bool {
        self.lines.last().is_some_and(|line| {
            line.spans
                .last()
                .is_some_and(|s| s.content.ends_with("- ") || s.content.ends_with(". "))
        })
    }
}

fn heading_style(base: Color, level: HeadingLevel) -> Style {
    let modifiers = match level {
        HeadingLevel::H1 => Modifier::BOLD | Modifier::UNDERLINED,
        HeadingLevel::H2 => Modifier::BOLD,
        _ => Modifier::BOLD | Modifier::ITALIC,
    };
    Style::default().fg(base).add_modifier(modifiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_lines(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn plain_text_uses_base_color() {
        let text = render("hello", Color::Green);
        assert_eq!(plain_lines(&text), vec!["hello"]);
        assert_eq!(text.lines[0].spans[0].style.fg, Some(Color::Green));
    }

    #[test]
    fn heading_text_is_bold() {
        let text = render("## Title", Color::Blue);
        let span = text.lines[0].spans.iter().find(|s| s.content == "Title").unwrap();
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(span.style.fg, Some(Color::Blue));
    }

    #[test]
    fn paragraphs_are_separated_by_blank_line() {
        let text = render("first\n\nsecond", Color::White);
        assert_eq!(plain_lines(&text), vec!["first", "", "second"]);
    }

    #[test]
    fn bullet_list_items_on_own_lines() {
        let text = render("- one\n- two", Color::White);
        assert_eq!(plain_lines(&text), vec!["- one", "- two"]);
    }

    #[test]
    fn ordered_list_counts_from_start() {
        let text = render("3. c\n4. d", Color::White);
        assert_eq!(plain_lines(&text), vec!["3. c", "4. d"]);
    }

    #[test]
    fn code_block_is_framed() {
        let lines = plain_lines(&render("```rust\nlet x = 1;\n```", Color::White));
        assert_eq!(lines.first().map(String::as_str), Some("╭──"));
        assert!(lines.iter().any(|l| l == "│ let x = 1;"));
        assert_eq!(lines.last().map(String::as_str), Some("╰──"));
    }

    #[test]
    fn link_url_follows_text() {
        let lines = plain_lines(&render("[docs](https://example.com)", Color::White));
        assert_eq!(lines, vec!["docs (https://example.com)"]);
    }

    #[test]
    fn inline_code_is_highlighted() {
        let text = render("call `foo()` now", Color::White);
        let span = text.lines[0].spans.iter().find(|s| s.content == "foo()").unwrap();
        assert_eq!(span.style.bg, Some(MUTED));
    }
}
