//! Message types for VoxMate conversations.
//!
//! A conversation is an ordered sequence of messages authored by the user
//! or the assistant. Messages are immutable once appended; insertion order
//! is display order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message typed (or dictated) by the user.
    User,
    /// Message produced by the backend assistant.
    Assistant,
}

/// Media attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaRef {
    /// An image submitted alongside a user turn, referenced by file name.
    Image { name: String },
    /// Synthesized speech for an assistant turn. The URL may be a path
    /// relative to the backend base URL.
    Audio { url: String },
}

/// A single turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier (UUID), unique within the conversation.
    pub id: String,

    /// Author of the message.
    pub role: Role,

    /// Message content. Assistant content may contain markdown.
    pub content: String,

    /// Optional attached media reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaRef>,

    /// When the message was appended.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create an assistant message carrying an error description.
    ///
    /// Failures of backend requests are rendered as conversation content
    /// rather than surfaced to the caller.
    pub fn error(detail: impl std::fmt::Display) -> Self {
        Self::new(Role::Assistant, format!("Error: {detail}"))
    }

    /// Attach a media reference to the message.
    #[must_use]
    pub fn with_media(mut self, media: MediaRef) -> Self {
        self.media = Some(media);
        self
    }

    /// URL of the attached audio, if any.
    pub fn audio_url(&self) -> Option<&str> {
        match &self.media {
            Some(MediaRef::Audio { url }) => Some(url),
            _ => None,
        }
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            media: None,
            timestamp: Utc::now(),
        }
    }
}
