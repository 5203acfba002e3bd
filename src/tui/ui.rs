use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph};

use crate::core::state::{Phase, Session};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::settings_panel::PANEL_WIDTH;
use crate::tui::components::{LoginView, MessageList, SettingsPanel, TitleBar};

const CHAT_INPUT_TITLE: &str = "Message";
const CHAT_INPUT_PLACEHOLDER: &str = "Type your message here... (Enter to send)";
const LOGIN_INPUT_TITLE: &str = "Redirect URL";
const LOGIN_INPUT_PLACEHOLDER: &str = "Paste the address you landed on, or the code";

/// Points the input box at the screen the session is on.
fn sync_input_box(session: &Session, tui: &mut TuiState) {
    if session.is_authenticated() {
        tui.input_box.retarget(CHAT_INPUT_TITLE, CHAT_INPUT_PLACEHOLDER);
    } else {
        tui.input_box.retarget(LOGIN_INPUT_TITLE, LOGIN_INPUT_PLACEHOLDER);
    }
    tui.input_box.dimmed = session.is_busy();
}

pub fn draw_ui(frame: &mut Frame, session: &Session, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};

    sync_input_box(session, tui);

    let input_height = tui.input_box.calculate_height(frame.area().width);
    let layout = Layout::vertical([Length(1), Min(0), Length(input_height)]);
    let [title_area, body_area, input_area] = layout.areas(frame.area());

    TitleBar::new(
        session.model_name.clone(),
        session.status_message.clone(),
        session.is_busy(),
        spinner_frame,
    )
    .render(frame, title_area);

    match session.phase() {
        Phase::Authenticated => draw_chat(frame, body_area, session, tui),
        Phase::NoToken | Phase::Exchanging => {
            LoginView::new(
                session.pending_login.as_ref().map(|r| r.url.to_string()),
                session.auth_error.clone(),
                session.exchanging,
            )
            .render(frame, body_area);
        }
    }

    tui.input_box.render(frame, input_area);
}

fn draw_chat(frame: &mut Frame, area: Rect, session: &Session, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let [chat_area, panel_area] = Layout::horizontal([Min(0), Length(PANEL_WIDTH)]).areas(area);

    SettingsPanel::new(
        session.sampling,
        session.model_name.clone(),
        session.conversation.len(),
    )
    .render(frame, panel_area);

    if session.conversation.is_empty() && !session.is_loading {
        draw_empty_chat(frame, chat_area);
        return;
    }

    MessageList::new(
        session.conversation.messages(),
        session.is_loading,
        &mut tui.message_list,
    )
    .render(frame, chat_area);
}

fn draw_empty_chat(frame: &mut Frame, area: Rect) {
    let hint = Paragraph::new("Logged in. Type a message below to start chatting.")
        .style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center)
        .block(Block::default());
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage(45),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);
    frame.render_widget(hint, middle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, update};
    use crate::inference::Message;
    use crate::test_support::{authenticated_session, test_request, test_session};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(session: &Session, tui: &mut TuiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal
            .draw(|f| {
                draw_ui(f, session, tui, 0);
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
    fn test_logged_out_shows_login_screen() {
        let mut session = test_session();
        update(&mut session, Action::LoginUrlReady(test_request("abc")));
        let mut tui = TuiState::new();

        let text = rendered(&session, &mut tui);
        assert!(text.contains("Please login to continue"));
        assert!(text.contains("Redirect URL"));
        assert!(!text.contains("Settings"));
    }

    #[test]
    fn test_logged_in_shows_chat_and_settings() {
        let mut session = authenticated_session();
        session.conversation.push(Message::user("Hello"));
        session.conversation.push(Message::assistant("Hi! How can I help?"));
        let mut tui = TuiState::new();

        let text = rendered(&session, &mut tui);
        assert!(text.contains("Hello"));
        assert!(text.contains("Hi! How can I help?"));
        assert!(text.contains("Settings"));
        assert!(text.contains("Messages: 2"));
        assert!(text.contains(CHAT_INPUT_TITLE));
    }

    #[test]
    fn test_empty_chat_hint() {
        let session = authenticated_session();
        let mut tui = TuiState::new();
        let text = rendered(&session, &mut tui);
        assert!(text.contains("Type a message below"));
    }

    #[test]
    fn test_switching_screens_drops_draft() {
        let mut session = test_session();
        let mut tui = TuiState::new();
        rendered(&session, &mut tui);
        tui.input_box.buffer = "half a code".to_string();

        session = authenticated_session();
        rendered(&session, &mut tui);
        assert!(tui.input_box.buffer.is_empty());
        assert_eq!(tui.input_box.title, CHAT_INPUT_TITLE);
    }
}
