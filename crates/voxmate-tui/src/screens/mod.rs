//! Screen rendering for the VoxMate TUI.

mod chat;
mod login;
mod speak;
mod summarize;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::app::{App, Screen};
use crate::commands::COMMANDS;
use crate::theme::Theme;
use crate::widgets::{ScreenTabs, StatusBar};

/// Render the whole frame: status bar, tabs, active screen, overlays.
pub fn render(app: &mut App, area: Rect, buf: &mut Buffer) {
    let [status_area, tabs_area, body_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(3),
    ])
    .areas(area);

    let status = app.status_content();
    StatusBar::new(&status, &app.theme).render(status_area, buf);
    ScreenTabs::new(&Screen::TITLES, app.screen.index(), &app.theme).render(tabs_area, buf);

    match app.screen {
        Screen::Login => login::render(app, body_area, buf),
        Screen::Chat => chat::render(app, body_area, buf),
        Screen::Speak => speak::render(app, body_area, buf),
        Screen::Summarize => summarize::render(app, body_area, buf),
    }

    if app.show_help {
        render_help_overlay(area, buf, &app.theme);
    }
}

/// Centered help overlay listing commands and key bindings.
fn render_help_overlay(area: Rect, buf: &mut Buffer, theme: &Theme) {
    let width = area.width.min(56);
    let height = area.height.min(18);
    let overlay = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );

    Clear.render(overlay, buf);

    let key_style = Style::default()
        .fg(theme.secondary)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(theme.text);

    let mut lines = vec![
        Line::from(Span::styled("Keys", key_style)),
        Line::from(Span::styled(
            "  Alt+1..4   switch screen (Chat/Speak/Summarize/Login)",
            text_style,
        )),
        Line::from(Span::styled("  Ctrl+C     quit", text_style)),
        Line::from(Span::styled("  Ctrl+L     clear conversation", text_style)),
        Line::from(Span::styled("  F1         toggle this help", text_style)),
        Line::default(),
        Line::from(Span::styled("Chat commands", key_style)),
    ];
    for command in COMMANDS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<24}", command.usage), text_style),
            Span::styled(
                command.description.to_string(),
                Style::default().fg(theme.subtext),
            ),
        ]));
    }

    Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_focused))
                .style(Style::default().bg(theme.surface)),
        )
        .render(overlay, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use voxmate_engine::{Config, MemoryStore};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn test_app() -> App {
        App::with_store(Config::default(), Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_render_login_screen() {
        let mut app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render(&mut app, area, frame.buffer_mut());
            })
            .unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("Login"));
        assert!(content.contains("Email"));
        assert!(content.contains("Password"));
    }

    #[test]
    fn test_render_help_overlay() {
        let mut app = test_app();
        app.show_help = true;
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render(&mut app, area, frame.buffer_mut());
            })
            .unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("Help"));
        assert!(content.contains("/clear"));
    }

    #[test]
    fn test_render_tiny_terminal_does_not_panic() {
        let mut app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(20, 6)).unwrap();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render(&mut app, area, frame.buffer_mut());
            })
            .unwrap();
    }
}
