//! voxmate-engine: Headless engine for the VoxMate assistant client
//!
//! This crate provides the core client logic, including:
//! - Conversation state synchronization with per-conversation persistence
//! - The backend HTTP API client (chat, image search, PDF summary, speech)
//! - Translation / text-to-speech and PDF-summary flows
//! - Login validation and audio playback
//!
//! Frontends (TUI, CLI) sit on top; nothing in here draws or prompts.

pub mod audio;
pub mod auth;
pub mod client;
pub mod config;
pub mod conversation;
pub mod message;
pub mod session;
pub mod speech;
pub mod store;
pub mod summary;

// Re-export commonly used types
pub use audio::{AudioPlayer, PlayerError};
pub use auth::{AuthError, Credentials, UserSession, DEFAULT_USER_ID};
pub use client::{ApiClient, ApiError, AssistantReply, TurnRequest};
pub use config::{Config, ConfigError};
pub use conversation::{Conversation, ConversationStore};
pub use message::{MediaRef, Message, Role};
pub use session::{Attachment, ChatSession, TurnError};
pub use speech::{
    language_label, validate_language, validate_speech_text, LanguageOption, SpeechError,
    SpeechPad, TranslationRecord, LANGUAGES,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use summary::{
    validate_pdf_path, validate_prompt, SummaryError, SummaryPad, DEFAULT_PROMPT,
};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}
