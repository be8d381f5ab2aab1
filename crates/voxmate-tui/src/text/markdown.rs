//! Markdown rendering for assistant replies using pulldown-cmark.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::theme::Theme;

/// Render markdown text to styled ratatui lines.
pub fn render_markdown(input: &str, theme: &Theme) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(input, options);
    let mut renderer = MarkdownRenderer::new(theme);
    renderer.run(parser);
    renderer.lines
}

/// Internal renderer that processes pulldown-cmark events.
struct MarkdownRenderer {
    /// Accumulated output lines.
    lines: Vec<Line<'static>>,
    /// Base text style.
    base: Style,
    /// Heading style.
    heading: Style,
    /// Inline and block code style.
    code: Style,
    /// Blockquote style.
    quote: Style,
    /// Stack of active styles for nested formatting.
    style_stack: Vec<Style>,
    /// Current line being built.
    current_spans: Vec<Span<'static>>,
    /// Current indentation level (for nested lists).
    indent_level: usize,
    /// Whether we're inside a code block.
    in_code_block: bool,
    /// Whether we're inside a blockquote.
    in_blockquote: bool,
    /// Pending list marker to prepend to next text.
    pending_list_marker: Option<String>,
}

impl MarkdownRenderer {
    fn new(theme: &Theme) -> Self {
        Self {
            lines: Vec::new(),
            base: Style::default().fg(theme.text),
            heading: Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
            code: Style::default().fg(theme.secondary),
            quote: Style::default().fg(theme.subtext),
            style_stack: Vec::new(),
            current_spans: Vec::new(),
            indent_level: 0,
            in_code_block: false,
            in_blockquote: false,
            pending_list_marker: None,
        }
    }

    fn run<'a>(&mut self, parser: impl Iterator<Item = Event<'a>>) {
        for event in parser {
            self.handle_event(event);
        }
        // Flush any remaining content
        self.flush_line();
    }

    fn handle_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush_line();
                let style = self.heading_style(level);
                self.style_stack.push(style);
            }
            Event::End(TagEnd::Heading(_)) => {
                self.flush_line();
                self.style_stack.pop();
            }

            Event::Start(Tag::Emphasis) => {
                self.style_stack
                    .push(self.base.add_modifier(Modifier::ITALIC));
            }
            Event::Start(Tag::Strong) => {
                self.style_stack.push(self.base.add_modifier(Modifier::BOLD));
            }
            Event::Start(Tag::Strikethrough) => {
                self.style_stack
                    .push(self.base.add_modifier(Modifier::CROSSED_OUT));
            }
            Event::Start(Tag::Link { .. }) => {
                self.style_stack
                    .push(self.base.add_modifier(Modifier::UNDERLINED));
            }
            Event::End(
                TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link,
            ) => {
                self.style_stack.pop();
            }

            Event::Start(Tag::CodeBlock(_)) => {
                self.flush_line();
                self.in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                self.flush_line();
                self.in_code_block = false;
            }

            Event::Start(Tag::BlockQuote) => {
                self.flush_line();
                self.in_blockquote = true;
            }
            Event::End(TagEnd::BlockQuote) => {
                self.flush_line();
                self.in_blockquote = false;
            }

            Event::Start(Tag::List(_)) => {
                self.flush_line();
                self.indent_level += 1;
            }
            Event::End(TagEnd::List(_)) => {
                self.indent_level = self.indent_level.saturating_sub(1);
            }
            Event::Start(Tag::Item) => {
                self.flush_line();
                let indent = "  ".repeat(self.indent_level.saturating_sub(1));
                self.pending_list_marker = Some(format!("{indent}• "));
            }
            Event::End(TagEnd::Item) => {
                self.flush_line();
            }

            Event::Start(Tag::Paragraph) => {
                self.flush_line();
            }
            Event::End(TagEnd::Paragraph) => {
                self.flush_line();
                // Blank line between paragraphs
                self.lines.push(Line::default());
            }

            Event::Text(text) => {
                if self.in_code_block {
                    // Code blocks keep their own line structure
                    for code_line in text.lines() {
                        self.lines.push(Line::from(Span::styled(
                            format!("  {code_line}"),
                            self.code,
                        )));
                    }
                } else {
                    self.push_text(&text);
                }
            }
            Event::Code(code) => {
                self.push_prefix();
                self.current_spans
                    .push(Span::styled(code.into_string(), self.code));
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_prefix();
                self.current_spans.push(Span::styled(
                    marker.to_string(),
                    self.base.add_modifier(Modifier::DIM),
                ));
            }

            Event::SoftBreak | Event::HardBreak => {
                self.flush_line();
            }
            Event::Rule => {
                self.flush_line();
                self.lines
                    .push(Line::from(Span::styled("─".repeat(24), self.quote)));
            }

            _ => {}
        }
    }

    fn heading_style(&self, level: HeadingLevel) -> Style {
        match level {
            HeadingLevel::H1 | HeadingLevel::H2 => self.heading,
            _ => self.heading.add_modifier(Modifier::DIM),
        }
    }

    /// Prepend the blockquote bar and any pending list marker.
    fn push_prefix(&mut self) {
        if self.current_spans.is_empty() && self.in_blockquote {
            self.current_spans
                .push(Span::styled("▎ ".to_string(), self.quote));
        }
        if let Some(marker) = self.pending_list_marker.take() {
            self.current_spans.push(Span::styled(marker, self.base));
        }
    }

    fn push_text(&mut self, text: &str) {
        self.push_prefix();
        let style = self.style_stack.last().copied().unwrap_or(self.base);
        self.current_spans
            .push(Span::styled(text.to_string(), style));
    }

    fn flush_line(&mut self) {
        if !self.current_spans.is_empty() {
            let spans = std::mem::take(&mut self.current_spans);
            self.lines.push(Line::from(spans));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_to_text(input: &str) -> Vec<String> {
        render_markdown(input, &Theme::default())
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn test_plain_paragraph() {
        let lines = render_to_text("hello world");
        assert!(lines.iter().any(|l| l.contains("hello world")));
    }

    #[test]
    fn test_heading_and_list() {
        let lines = render_to_text("# Title\n\n- first\n- second");
        assert!(lines.iter().any(|l| l.contains("Title")));
        assert!(lines.iter().any(|l| l.contains("• first")));
        assert!(lines.iter().any(|l| l.contains("• second")));
    }

    #[test]
    fn test_code_block_is_indented() {
        let lines = render_to_text("```\nlet x = 1;\n```");
        assert!(lines.iter().any(|l| l.contains("  let x = 1;")));
    }

    #[test]
    fn test_inline_code_preserved() {
        let lines = render_to_text("use the `send` function");
        let joined = lines.join("\n");
        assert!(joined.contains("send"));
        assert!(joined.contains("use the "));
    }

    #[test]
    fn test_empty_input_renders_nothing() {
        assert!(render_to_text("").is_empty());
    }
}
