//! Width-aware wrapping for transcript content.

use unicode_width::UnicodeWidthStr;

/// Wrap plain text to `width` columns, preserving empty lines.
pub fn wrap_plain(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        for wrapped in textwrap::wrap(line, width) {
            lines.push(wrapped.into_owned());
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Display width of a prefix string in terminal columns.
pub fn prefix_width(prefix: &str) -> usize {
    UnicodeWidthStr::width(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_preserves_blank_lines() {
        let lines = wrap_plain("first\n\nsecond", 20);
        assert_eq!(lines, vec!["first", "", "second"]);
    }

    #[test]
    fn test_wrap_long_line() {
        let lines = wrap_plain("one two three four five", 9);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(prefix_width(line) <= 9);
        }
    }

    #[test]
    fn test_empty_input_yields_one_line() {
        assert_eq!(wrap_plain("", 10), vec![String::new()]);
    }

    #[test]
    fn test_prefix_width_wide_chars() {
        assert_eq!(prefix_width("abc"), 3);
        assert_eq!(prefix_width("日本"), 4);
    }
}
