//! Screen tabs rendered under the status bar.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::Theme;

/// Tab row highlighting the active screen.
pub struct ScreenTabs<'a> {
    titles: &'a [&'a str],
    active: usize,
    theme: &'a Theme,
}

impl<'a> ScreenTabs<'a> {
    /// Create a tab row. `active` is the index into `titles`.
    pub fn new(titles: &'a [&'a str], active: usize, theme: &'a Theme) -> Self {
        Self {
            titles,
            active,
            theme,
        }
    }
}

impl Widget for ScreenTabs<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::raw(" ")];
        for (index, title) in self.titles.iter().enumerate() {
            if index > 0 {
                spans.push(Span::styled(
                    " │ ",
                    Style::default().fg(self.theme.muted),
                ));
            }
            let style = if index == self.active {
                Style::default()
                    .fg(self.theme.primary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.subtext)
            };
            spans.push(Span::styled(format!("{} {title}", index + 1), style));
        }

        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(self.theme.base))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_tabs_render_titles() {
        let theme = Theme::default();
        let backend = TestBackend::new(60, 1);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| {
                let tabs = ScreenTabs::new(&["Chat", "Speak", "Summarize"], 1, &theme);
                frame.render_widget(tabs, frame.area());
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(content.contains("Chat"));
        assert!(content.contains("Speak"));
        assert!(content.contains("Summarize"));
    }
}
