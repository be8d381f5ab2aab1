//! Login screen: email and password form.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::{App, LoginFocus};
use crate::widgets::TextInput;

/// Render the login screen.
pub fn render(app: &mut App, area: Rect, buf: &mut Buffer) {
    let width = area.width.min(48);
    let form = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + area.height.saturating_sub(area.height.min(14)) / 2,
        width,
        area.height.min(14),
    );

    let block = Block::default()
        .title(" Login to VoxMate ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border_focused))
        .style(Style::default().bg(app.theme.base));
    let inner = block.inner(form);
    block.render(form, buf);

    if inner.height < 8 {
        return;
    }

    let [intro_area, email_area, password_area, error_area, hint_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(1),
    ])
    .areas(inner);

    let theme = &app.theme;

    if let Some(user) = &app.user {
        Paragraph::new(Line::from(Span::styled(
            format!(" Logged in as {}", user.email),
            Style::default().fg(theme.success),
        )))
        .render(intro_area, buf);
    } else {
        Paragraph::new(Line::from(Span::styled(
            " Enter your credentials to access VoxMate",
            Style::default().fg(theme.subtext),
        )))
        .render(intro_area, buf);
    }

    TextInput::new(&app.email_input, theme)
        .block(
            Block::default()
                .title(" Email ")
                .borders(Borders::ALL)
                .border_style(border_style(app, LoginFocus::Email)),
        )
        .focused(app.login_focus == LoginFocus::Email)
        .placeholder("you@example.com")
        .render(email_area, buf);

    TextInput::new(&app.password_input, theme)
        .block(
            Block::default()
                .title(" Password ")
                .borders(Borders::ALL)
                .border_style(border_style(app, LoginFocus::Password)),
        )
        .focused(app.login_focus == LoginFocus::Password)
        .masked(true)
        .render(password_area, buf);

    if let Some(error) = &app.login_error {
        Paragraph::new(Line::from(Span::styled(
            format!(" {error}"),
            Style::default().fg(theme.error),
        )))
        .render(error_area, buf);
    }

    Paragraph::new(Line::from(Span::styled(
        " Tab switches fields, Enter logs in",
        Style::default().fg(theme.muted).add_modifier(Modifier::DIM),
    )))
    .render(hint_area, buf);
}

fn border_style(app: &App, field: LoginFocus) -> Style {
    if app.login_focus == field {
        Style::default().fg(app.theme.border_focused)
    } else {
        Style::default().fg(app.theme.border)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use voxmate_engine::{Config, MemoryStore};

    #[test]
    fn test_login_error_is_rendered() {
        let mut app =
            App::with_store(Config::default(), Arc::new(MemoryStore::new())).unwrap();
        app.login_error = Some("Please fill in both email and password.".to_string());

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
        assert!(content.contains("Please fill in both email and password."));
    }
}
