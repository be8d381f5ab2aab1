//! Status bar widget for the top of the TUI.
//!
//! Format: `● Screen │ conversation │ backend │ state │ → hint`

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::Theme;

/// Status bar content.
#[derive(Debug, Clone, Default)]
pub struct StatusBarContent {
    /// Current screen name (e.g. "Chat").
    pub screen: String,
    /// Short conversation id.
    pub conversation: String,
    /// Backend base URL.
    pub backend: String,
    /// Pending-request state (e.g. "waiting for reply").
    pub pending: Option<String>,
    /// Next action hint.
    pub hint: Option<String>,
}

impl StatusBarContent {
    /// Shorten a conversation id for display.
    pub fn short_id(id: &str) -> String {
        id.chars().take(8).collect()
    }
}

/// Status bar widget.
pub struct StatusBar<'a> {
    content: &'a StatusBarContent,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar widget.
    pub fn new(content: &'a StatusBarContent, theme: &'a Theme) -> Self {
        Self { content, theme }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let sep = Span::styled(" │ ", Style::default().fg(self.theme.muted));

        let mut spans = vec![
            Span::styled("● ", Style::default().fg(self.theme.primary)),
            Span::styled(
                self.content.screen.clone(),
                Style::default().fg(self.theme.text),
            ),
            sep.clone(),
            Span::styled(
                self.content.conversation.clone(),
                Style::default().fg(self.theme.subtext),
            ),
            sep.clone(),
            Span::styled(
                self.content.backend.clone(),
                Style::default().fg(self.theme.subtext),
            ),
        ];

        if let Some(ref pending) = self.content.pending {
            spans.push(sep.clone());
            spans.push(Span::styled(
                pending.clone(),
                Style::default().fg(self.theme.warning),
            ));
        }

        if let Some(ref hint) = self.content.hint {
            spans.push(sep);
            spans.push(Span::styled(
                format!("→ {hint}"),
                Style::default().fg(self.theme.secondary),
            ));
        }

        let paragraph =
            Paragraph::new(Line::from(spans)).style(Style::default().bg(self.theme.surface));
        paragraph.render(area, buf);
    }
}
