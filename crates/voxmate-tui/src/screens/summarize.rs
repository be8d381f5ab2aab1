//! Summarize screen: upload a PDF and show the generated summary.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::{App, SummarizeFocus};
use crate::text::render_markdown;
use crate::widgets::TextInput;

/// Render the summarize screen.
pub fn render(app: &mut App, area: Rect, buf: &mut Buffer) {
    let [file_area, prompt_area, status_area, summary_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(3),
    ])
    .areas(area);

    let theme = &app.theme;

    TextInput::new(&app.file_input, theme)
        .block(
            Block::default()
                .title(" PDF file ")
                .borders(Borders::ALL)
                .border_style(focus_style(app, SummarizeFocus::File)),
        )
        .focused(app.summarize_focus == SummarizeFocus::File)
        .placeholder("Path to a .pdf file")
        .render(file_area, buf);

    TextInput::new(&app.prompt_input, theme)
        .block(
            Block::default()
                .title(" Prompt ")
                .borders(Borders::ALL)
                .border_style(focus_style(app, SummarizeFocus::Prompt)),
        )
        .focused(app.summarize_focus == SummarizeFocus::Prompt)
        .placeholder("e.g. Summarize the document in a few sentences")
        .render(prompt_area, buf);

    let status = if let Some(error) = &app.summary_error {
        Line::from(Span::styled(
            format!(" {error}"),
            Style::default().fg(theme.error),
        ))
    } else if app.summary_loading {
        Line::from(Span::styled(
            " Uploading and summarizing...",
            Style::default().fg(theme.warning),
        ))
    } else {
        Line::from(Span::styled(
            " Enter to upload │ Ctrl+L to clear the last summary",
            Style::default().fg(theme.muted).add_modifier(Modifier::DIM),
        ))
    };
    Paragraph::new(status).render(status_area, buf);

    let title = match &app.summary.filename {
        Some(filename) => format!(" Summary — {filename} "),
        None => " Summary ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(summary_area);
    block.render(summary_area, buf);

    if inner.height == 0 {
        return;
    }

    let lines = match &app.summary.summary_text {
        Some(summary) => render_markdown(summary, theme),
        None => vec![Line::from(Span::styled(
            "Upload a PDF to see its summary here.",
            Style::default().fg(theme.muted),
        ))],
    };
    Paragraph::new(lines).render(inner, buf);
}

fn focus_style(app: &App, field: SummarizeFocus) -> Style {
    if app.summarize_focus == field {
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
    fn test_summarize_screen_shows_summary_and_filename() {
        let mut app =
            App::with_store(Config::default(), Arc::new(MemoryStore::new())).unwrap();
        app.summary.summary_text = Some("A **short** summary.".to_string());
        app.summary.filename = Some("report.pdf".to_string());

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
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
        assert!(content.contains("report.pdf"));
        assert!(content.contains("short"));
    }
}
