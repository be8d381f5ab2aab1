//! Slash command parser for the chat input.

use std::path::PathBuf;

/// A parsed slash command from chat input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the help overlay.
    Help,
    /// Exit the application.
    Quit,
    /// Clear the conversation and start a new one.
    Clear,
    /// Attach an image, with an optional caption, and send it.
    Image { path: PathBuf, caption: String },
    /// Copy the last assistant reply to the clipboard.
    Copy,
    /// Play the newest assistant audio.
    Play,
    /// Stop audio playback.
    Stop,
    /// Unknown command.
    Unknown(String),
}

/// Command metadata for the help overlay.
#[derive(Debug, Clone)]
pub struct CommandInfo {
    /// Primary command name (without the /).
    pub name: &'static str,
    /// Usage hint shown in help.
    pub usage: &'static str,
    /// Brief description for help.
    pub description: &'static str,
}

/// Static registry of chat commands.
pub static COMMANDS: &[CommandInfo] = &[
    CommandInfo {
        name: "help",
        usage: "/help",
        description: "Show available commands",
    },
    CommandInfo {
        name: "quit",
        usage: "/quit",
        description: "Exit VoxMate",
    },
    CommandInfo {
        name: "clear",
        usage: "/clear",
        description: "Start a new conversation",
    },
    CommandInfo {
        name: "image",
        usage: "/image <path> [caption]",
        description: "Send an image with an optional caption",
    },
    CommandInfo {
        name: "copy",
        usage: "/copy",
        description: "Copy the last reply to the clipboard",
    },
    CommandInfo {
        name: "play",
        usage: "/play",
        description: "Play the newest reply audio",
    },
    CommandInfo {
        name: "stop",
        usage: "/stop",
        description: "Stop audio playback",
    },
];

/// Whether the input line is a slash command.
pub fn is_command(input: &str) -> bool {
    input.trim_start().starts_with('/')
}

/// Parse a slash command line. Returns `None` for non-command input.
pub fn parse(input: &str) -> Option<Command> {
    let trimmed = input.trim();
    let rest = trimmed.strip_prefix('/')?;

    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let args = parts.next().unwrap_or("").trim();

    let command = match name.as_str() {
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        "clear" => Command::Clear,
        "copy" => Command::Copy,
        "play" => Command::Play,
        "stop" => Command::Stop,
        "image" => {
            // First arg is the path, the rest is the caption
            let mut words = args.splitn(2, char::is_whitespace);
            let path = words.next().unwrap_or("").trim();
            if path.is_empty() {
                return Some(Command::Unknown("image (missing path)".to_string()));
            }
            Command::Image {
                path: PathBuf::from(path),
                caption: words.next().unwrap_or("").trim().to_string(),
            }
        }
        other => Command::Unknown(other.to_string()),
    };

    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_commands_are_none() {
        assert!(parse("hello there").is_none());
        assert!(!is_command("hello"));
        assert!(is_command("  /clear"));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("/clear"), Some(Command::Clear));
        assert_eq!(parse("/QUIT"), Some(Command::Quit));
        assert_eq!(parse("/?"), Some(Command::Help));
        assert_eq!(parse("/play"), Some(Command::Play));
    }

    #[test]
    fn test_image_command() {
        assert_eq!(
            parse("/image cat.png what is this"),
            Some(Command::Image {
                path: PathBuf::from("cat.png"),
                caption: "what is this".to_string(),
            })
        );
        assert_eq!(
            parse("/image cat.png"),
            Some(Command::Image {
                path: PathBuf::from("cat.png"),
                caption: String::new(),
            })
        );
        assert!(matches!(parse("/image"), Some(Command::Unknown(_))));
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(parse("/frobnicate"), Some(Command::Unknown(_))));
    }
}
