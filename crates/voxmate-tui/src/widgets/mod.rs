//! Shared widgets for the VoxMate TUI.

mod status_bar;
mod tabs;
mod text_input;
mod transcript;

pub use status_bar::{StatusBar, StatusBarContent};
pub use tabs::ScreenTabs;
pub use text_input::{TextInput, TextInputState};
pub use transcript::{Transcript, TranscriptState};
