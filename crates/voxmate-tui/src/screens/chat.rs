//! Chat screen: transcript plus input bar.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::App;
use crate::widgets::{TextInput, Transcript};

/// Render the chat screen.
pub fn render(app: &mut App, area: Rect, buf: &mut Buffer) {
    let notice_height = u16::from(app.chat_notice.is_some());
    let [transcript_area, notice_area, input_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(notice_height),
        Constraint::Length(3),
    ])
    .areas(area);

    let App {
        session,
        transcript,
        theme,
        chat_input,
        chat_notice,
        ..
    } = app;

    Transcript::new(&session.conversation().messages, transcript, theme)
        .loading(session.is_loading())
        .focused(true)
        .render(transcript_area, buf);

    if let Some(notice) = chat_notice {
        Paragraph::new(Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(theme.warning),
        )))
        .render(notice_area, buf);
    }

    let placeholder = if session.is_loading() {
        "Waiting for VoxMate..."
    } else {
        "Type your message, or /help for commands"
    };
    TextInput::new(chat_input, theme)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_focused)),
        )
        .focused(!session.is_loading())
        .placeholder(placeholder)
        .render(input_area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use voxmate_engine::{Config, MemoryStore, Message};

    #[test]
    fn test_chat_screen_shows_messages_and_notice() {
        let mut app =
            App::with_store(Config::default(), Arc::new(MemoryStore::new())).unwrap();
        app.session.append_message(Message::user("hi"));
        app.session.append_message(Message::assistant("hello"));
        app.chat_notice = Some("Copied last reply".to_string());

        let mut terminal = Terminal::new(TestBackend::new(70, 20)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(&mut app, area, frame.buffer_mut());
            })
            .unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(content.contains("hi"));
        assert!(content.contains("hello"));
        assert!(content.contains("Copied last reply"));
    }
}
