//! Scrollable conversation transcript widget.
//!
//! Renders the message sequence with speaker attribution, markdown for
//! assistant replies, and a typing indicator while a request is in
//! flight.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use voxmate_engine::{MediaRef, Message, Role};

use crate::text::{render_markdown, wrap_plain};
use crate::theme::Theme;

/// Scroll state for the transcript.
#[derive(Debug, Clone)]
pub struct TranscriptState {
    /// Scroll offset in lines from the top.
    pub scroll: usize,
    /// Follow mode: keep the newest content visible.
    pub follow: bool,
}

impl Default for TranscriptState {
    fn default() -> Self {
        Self {
            scroll: 0,
            follow: true,
        }
    }
}

impl TranscriptState {
    /// Create a new transcript state in follow mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scroll up, leaving follow mode.
    pub fn scroll_up(&mut self, amount: usize) {
        self.follow = false;
        self.scroll = self.scroll.saturating_sub(amount);
    }

    /// Scroll down; re-enters follow mode at the bottom in `render`.
    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll = self.scroll.saturating_add(amount);
    }

    /// Jump back to the newest content.
    pub fn follow_latest(&mut self) {
        self.follow = true;
    }
}

/// Conversation transcript widget.
pub struct Transcript<'a> {
    messages: &'a [Message],
    state: &'a mut TranscriptState,
    theme: &'a Theme,
    loading: bool,
    focused: bool,
}

impl<'a> Transcript<'a> {
    /// Create a transcript over the message sequence.
    pub fn new(
        messages: &'a [Message],
        state: &'a mut TranscriptState,
        theme: &'a Theme,
    ) -> Self {
        Self {
            messages,
            state,
            theme,
            loading: false,
            focused: false,
        }
    }

    /// Show the typing indicator.
    #[must_use]
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// Set whether the transcript is focused.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Build the full line list for the given content width.
    fn build_lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        if self.messages.is_empty() && !self.loading {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "  Start a conversation with VoxMate!",
                Style::default().fg(self.theme.muted),
            )));
            return lines;
        }

        for message in self.messages {
            let (speaker, color) = match message.role {
                Role::User => ("You", self.theme.user),
                Role::Assistant => ("VoxMate", self.theme.assistant),
            };

            let timestamp = message
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%H:%M");
            let mut header = vec![
                Span::styled(
                    speaker.to_string(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {timestamp}"),
                    Style::default().fg(self.theme.muted),
                ),
            ];
            match &message.media {
                Some(MediaRef::Audio { .. }) => header.push(Span::styled(
                    "  ♪ audio",
                    Style::default().fg(self.theme.info),
                )),
                Some(MediaRef::Image { name }) => header.push(Span::styled(
                    format!("  🖼 {name}"),
                    Style::default().fg(self.theme.info),
                )),
                None => {}
            }
            lines.push(Line::from(header));

            match message.role {
                Role::Assistant => {
                    lines.extend(render_markdown(&message.content, self.theme));
                }
                Role::User => {
                    for wrapped in wrap_plain(&message.content, width) {
                        lines.push(Line::from(Span::styled(
                            wrapped,
                            Style::default().fg(self.theme.text),
                        )));
                    }
                }
            }
            lines.push(Line::default());
        }

        if self.loading {
            lines.push(Line::from(Span::styled(
                "● ● ●",
                Style::default().fg(self.theme.muted),
            )));
        }

        lines
    }
}

impl Widget for Transcript<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(self.theme.border_focused)
        } else {
            Style::default().fg(self.theme.border)
        };

        let block = Block::default()
            .title(" Conversation ")
            .title_style(Style::default().fg(self.theme.text))
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(self.theme.base));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let lines = self.build_lines(inner.width as usize);
        let height = inner.height as usize;
        let max_scroll = lines.len().saturating_sub(height);

        if self.state.follow || self.state.scroll > max_scroll {
            self.state.scroll = max_scroll;
        }
        if self.state.scroll == max_scroll {
            self.state.follow = true;
        }

        #[allow(clippy::cast_possible_truncation)]
        Paragraph::new(lines)
            .scroll((self.state.scroll as u16, 0))
            .render(inner, buf);
    }
}
