//! Speak screen: translate text and synthesize speech.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use voxmate_engine::LANGUAGES;

use crate::app::{App, SpeakFocus};
use crate::text::wrap_plain;
use crate::widgets::TextInput;

/// Render the speak screen.
pub fn render(app: &mut App, area: Rect, buf: &mut Buffer) {
    let [input_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(4),
        Constraint::Length(1),
    ])
    .areas(area);

    let theme = &app.theme;

    TextInput::new(&app.speak_input, theme)
        .block(
            Block::default()
                .title(" Text to translate ")
                .borders(Borders::ALL)
                .border_style(focus_style(app, SpeakFocus::Text)),
        )
        .focused(app.speak_focus == SpeakFocus::Text)
        .placeholder("Type at least 5 characters...")
        .render(input_area, buf);

    let [language_area, result_area] =
        Layout::horizontal([Constraint::Length(34), Constraint::Min(20)]).areas(body_area);

    render_language_list(app, language_area, buf);
    render_result(app, result_area, buf);

    let footer = if let Some(error) = &app.speak_error {
        Line::from(Span::styled(
            format!(" {error}"),
            Style::default().fg(theme.error),
        ))
    } else if app.speak_loading {
        Line::from(Span::styled(
            " Working...",
            Style::default().fg(theme.warning),
        ))
    } else {
        Line::from(Span::styled(
            " Enter translate │ Ctrl+S synthesize │ Ctrl+P play │ Esc stop",
            Style::default().fg(theme.muted).add_modifier(Modifier::DIM),
        ))
    };
    Paragraph::new(footer).render(footer_area, buf);
}

/// Language selector with the selection kept in view.
fn render_language_list(app: &App, area: Rect, buf: &mut Buffer) {
    let theme = &app.theme;
    let block = Block::default()
        .title(" Language ")
        .borders(Borders::ALL)
        .border_style(focus_style(app, SpeakFocus::Language));
    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height == 0 {
        return;
    }

    let visible = inner.height as usize;
    let selected = app.language_index.min(LANGUAGES.len() - 1);
    // Keep the selection centered where possible
    let first = selected
        .saturating_sub(visible / 2)
        .min(LANGUAGES.len().saturating_sub(visible));

    let mut lines = Vec::with_capacity(visible);
    for (offset, option) in LANGUAGES.iter().enumerate().skip(first).take(visible) {
        let style = if offset == selected {
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.subtext)
        };
        let marker = if offset == selected { "▸ " } else { "  " };
        lines.push(Line::from(Span::styled(
            format!("{marker}{}", option.label),
            style,
        )));
    }

    Paragraph::new(lines).render(inner, buf);
}

/// Translated text and audio status.
fn render_result(app: &App, area: Rect, buf: &mut Buffer) {
    let theme = &app.theme;
    let block = Block::default()
        .title(" Translation ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height == 0 {
        return;
    }

    let mut lines = Vec::new();
    match &app.speech.translated_text {
        Some(translated) => {
            for wrapped in wrap_plain(translated, inner.width.max(1) as usize) {
                lines.push(Line::from(Span::styled(
                    wrapped,
                    Style::default().fg(theme.text),
                )));
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                "Nothing translated yet.",
                Style::default().fg(theme.muted),
            )));
        }
    }

    lines.push(Line::default());
    match &app.speech.audio_url {
        Some(url) => lines.push(Line::from(vec![
            Span::styled("♪ ", Style::default().fg(theme.info)),
            Span::styled(url.clone(), Style::default().fg(theme.subtext)),
        ])),
        None => lines.push(Line::from(Span::styled(
            "No audio synthesized yet.",
            Style::default().fg(theme.muted),
        ))),
    }

    Paragraph::new(lines).render(inner, buf);
}

fn focus_style(app: &App, field: SpeakFocus) -> Style {
    if app.speak_focus == field {
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
    fn test_speak_screen_shows_translation() {
        let mut app =
            App::with_store(Config::default(), Arc::new(MemoryStore::new())).unwrap();
        app.speech.translated_text = Some("bonjour le monde".to_string());
        app.speech.audio_url = Some("/audio/42.mp3".to_string());

        let mut terminal = Terminal::new(TestBackend::new(90, 24)).unwrap();
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
        assert!(content.contains("bonjour le monde"));
        assert!(content.contains("/audio/42.mp3"));
        assert!(content.contains("English (US, Aria)"));
    }
}
