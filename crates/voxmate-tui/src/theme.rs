//! Color palette for the TUI.
//!
//! The default palette echoes the original VoxMate look: a dark indigo
//! base with blue accents.

use ratatui::style::Color;

/// Theme color palette.
#[derive(Debug, Clone)]
pub struct Theme {
    // Backgrounds
    pub base: Color,
    pub surface: Color,

    // Foregrounds
    pub text: Color,
    pub subtext: Color,
    pub muted: Color,

    // Accents
    pub primary: Color,
    pub secondary: Color,

    // Semantic
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // Speaker attribution
    pub user: Color,
    pub assistant: Color,

    // Borders
    pub border: Color,
    pub border_focused: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::indigo()
    }
}

impl Theme {
    /// Dark indigo theme (default).
    pub fn indigo() -> Self {
        Self {
            // Backgrounds
            base: Color::Rgb(13, 17, 33),    // deep navy
            surface: Color::Rgb(30, 32, 54), // raised panels

            // Foregrounds
            text: Color::Rgb(229, 231, 245),
            subtext: Color::Rgb(176, 181, 208),
            muted: Color::Rgb(110, 115, 141),

            // Accents
            primary: Color::Rgb(139, 92, 246),   // indigo
            secondary: Color::Rgb(59, 130, 246), // blue

            // Semantic
            success: Color::Rgb(110, 217, 161),
            warning: Color::Rgb(245, 212, 138),
            error: Color::Rgb(244, 120, 142),
            info: Color::Rgb(125, 180, 250),

            // Speaker attribution
            user: Color::Rgb(59, 130, 246),
            assistant: Color::Rgb(139, 92, 246),

            // Borders
            border: Color::Rgb(62, 66, 94),
            border_focused: Color::Rgb(139, 92, 246),
        }
    }

    /// High contrast theme for accessibility.
    pub fn high_contrast() -> Self {
        Self {
            base: Color::Black,
            surface: Color::Rgb(20, 20, 20),

            text: Color::White,
            subtext: Color::Rgb(200, 200, 200),
            muted: Color::Rgb(150, 150, 150),

            primary: Color::Cyan,
            secondary: Color::Magenta,

            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Blue,

            user: Color::LightBlue,
            assistant: Color::LightMagenta,

            border: Color::White,
            border_focused: Color::Cyan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_indigo() {
        let theme = Theme::default();
        assert!(matches!(theme.base, Color::Rgb(13, 17, 33)));
    }

    #[test]
    fn test_high_contrast_theme_creates() {
        let theme = Theme::high_contrast();
        assert!(matches!(theme.base, Color::Black));
    }
}
