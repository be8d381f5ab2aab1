//! Chat session: the conversation state synchronizer.
//!
//! A [`ChatSession`] owns the authoritative in-memory message sequence for
//! the active conversation, mirrors it to durable storage on every append,
//! and runs at most one backend request at a time. Backend failures never
//! escape as errors; they are appended to the conversation as
//! assistant-role error messages.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::client::{
    display_file_name, image_mime, ApiClient, ApiError, AssistantReply, TurnRequest,
};
use crate::conversation::{Conversation, ConversationStore};
use crate::message::{MediaRef, Message};
use crate::store::{KeyValueStore, StoreError};

/// Errors that block a user turn before any request is sent.
#[derive(Debug, Error)]
pub enum TurnError {
    /// Empty text with no attachment; the turn is a no-op.
    #[error("message is empty")]
    EmptyInput,

    /// A request is already in flight; sends are serialized per session.
    #[error("a request is already in flight")]
    RequestInFlight,

    /// The attached file is not an image.
    #[error("not an image file: {0}")]
    NotAnImage(String),
}

/// An image attached to a user turn.
#[derive(Debug, Clone)]
pub struct Attachment {
    path: PathBuf,
}

impl Attachment {
    /// Validate and wrap an image path. Non-image files are rejected
    /// before any request is sent.
    pub fn image(path: impl Into<PathBuf>) -> Result<Self, TurnError> {
        let path = path.into();
        if image_mime(&path).is_none() {
            return Err(TurnError::NotAnImage(display_file_name(&path)));
        }
        Ok(Self { path })
    }

    /// File name shown in the conversation and sent to the backend.
    pub fn file_name(&self) -> String {
        display_file_name(&self.path)
    }
}

/// The active conversation plus its synchronization state.
pub struct ChatSession {
    store: ConversationStore,
    client: ApiClient,
    user_id: String,
    conversation: Conversation,
    loading: bool,
}

impl ChatSession {
    /// Load the session from storage.
    ///
    /// Restores the persisted conversation (or allocates a fresh one).
    /// Idempotent: repeated loads against the same store return the same
    /// conversation id until [`ChatSession::clear`] is called.
    pub fn load(
        store: Arc<dyn KeyValueStore>,
        client: ApiClient,
        user_id: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let store = ConversationStore::new(store);
        let conversation = store.load_active()?;
        Ok(Self {
            store,
            client,
            user_id: user_id.into(),
            conversation,
            loading: false,
        })
    }

    /// The active conversation.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Whether a backend request is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Append a message and persist the full updated sequence.
    ///
    /// Persistence is best-effort: a failed write is logged and the
    /// in-memory sequence stays authoritative for the session.
    pub fn append_message(&mut self, message: Message) {
        self.conversation.append(message);
        if let Err(err) = self.store.save(&self.conversation) {
            warn!(
                conversation_id = %self.conversation.id,
                error = %err,
                "Failed to persist conversation"
            );
        }
    }

    /// Start a user turn: validate, append the user message, set the
    /// loading flag, and return the request to execute.
    ///
    /// The caller runs the request (typically on a background task) and
    /// hands the outcome to [`ChatSession::accept_reply`].
    pub fn begin_user_turn(
        &mut self,
        text: &str,
        attachment: Option<Attachment>,
    ) -> Result<TurnRequest, TurnError> {
        if self.loading {
            return Err(TurnError::RequestInFlight);
        }

        let text = text.trim();
        if text.is_empty() && attachment.is_none() {
            return Err(TurnError::EmptyInput);
        }

        let user_message = match &attachment {
            Some(image) => {
                let name = image.file_name();
                Message::user(format!("{text} (Image: {name})"))
                    .with_media(MediaRef::Image { name })
            }
            None => Message::user(text),
        };
        self.append_message(user_message);
        self.loading = true;

        let request = match attachment {
            Some(image) => TurnRequest::ImageSearch {
                path: image.path,
                message: text.to_string(),
                conversation_id: self.conversation.id.clone(),
                user_id: self.user_id.clone(),
            },
            None => TurnRequest::Chat {
                message: text.to_string(),
                conversation_id: self.conversation.id.clone(),
                user_id: self.user_id.clone(),
            },
        };
        Ok(request)
    }

    /// Complete a turn: append exactly one assistant message (the reply,
    /// or an error description) and clear the loading flag.
    ///
    /// A reply for a conversation that is no longer active is dropped:
    /// after [`ChatSession::clear`] an in-flight response must not mutate
    /// the new conversation.
    pub fn accept_reply(
        &mut self,
        conversation_id: &str,
        outcome: Result<AssistantReply, ApiError>,
    ) -> Option<Message> {
        if conversation_id != self.conversation.id {
            debug!(conversation_id, "Dropping reply for inactive conversation");
            return None;
        }

        let message = match outcome {
            Ok(reply) => {
                let mut message = Message::assistant(reply.content);
                if let Some(url) = reply.audio_url {
                    message = message.with_media(MediaRef::Audio { url });
                }
                message
            }
            Err(err) => Message::error(err),
        };

        self.append_message(message.clone());
        self.loading = false;
        Some(message)
    }

    /// Send a user turn and wait for the assistant reply.
    ///
    /// Appends the user message, issues exactly one request, and appends
    /// exactly one assistant message — the reply on success, an error
    /// description on failure. The loading flag is cleared on every path.
    /// Returns `Ok(None)` when the input was empty (no-op).
    pub async fn send_user_turn(
        &mut self,
        text: &str,
        attachment: Option<Attachment>,
    ) -> Result<Option<Message>, TurnError> {
        let request = match self.begin_user_turn(text, attachment) {
            Ok(request) => request,
            Err(TurnError::EmptyInput) => return Ok(None),
            Err(err) => return Err(err),
        };

        let conversation_id = request.conversation_id().to_string();
        let outcome = self.client.send_turn(request).await;
        Ok(self.accept_reply(&conversation_id, outcome))
    }

    /// Discard the conversation and start a fresh one.
    ///
    /// Removes the persisted message sequence, allocates a new id, and
    /// resets the loading flag. An in-flight reply for the old
    /// conversation will be dropped by [`ChatSession::accept_reply`].
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.conversation = self.store.clear(&self.conversation.id)?;
        self.loading = false;
        Ok(())
    }

    /// Client used for this session's turns.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use crate::store::MemoryStore;

    fn session_with(server: &mockito::ServerGuard) -> ChatSession {
        let client = ApiClient::new(server.url()).unwrap();
        ChatSession::load(Arc::new(MemoryStore::new()), client, "user_123").unwrap()
    }

    #[tokio::test]
    async fn test_send_user_turn_appends_user_then_assistant() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body(r#"{"response": "hello"}"#)
            .create_async()
            .await;

        let mut session = session_with(&server);
        let reply = session.send_user_turn("hi", None).await.unwrap().unwrap();

        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "hello");

        let messages = &session.conversation().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "hi");
        assert_eq!(messages[1].content, "hello");
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_error_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(500)
            .with_body(r#"{"detail": "boom"}"#)
            .create_async()
            .await;

        let mut session = session_with(&server);
        let reply = session.send_user_turn("x", None).await.unwrap().unwrap();

        assert_eq!(reply.role, Role::Assistant);
        assert!(reply.content.contains("boom"), "got: {}", reply.content);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_empty_input_is_a_noop() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .expect(0)
            .create_async()
            .await;

        let mut session = session_with(&server);
        let outcome = session.send_user_turn("   ", None).await.unwrap();

        assert!(outcome.is_none());
        assert!(session.conversation().is_empty());
        assert!(!session.is_loading());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_second_send_rejected_while_in_flight() {
        let server = mockito::Server::new_async().await;
        let mut session = session_with(&server);

        let _request = session.begin_user_turn("first", None).unwrap();
        assert!(session.is_loading());

        let err = session.begin_user_turn("second", None).unwrap_err();
        assert!(matches!(err, TurnError::RequestInFlight));

        // Only the first user message was appended
        assert_eq!(session.conversation().messages.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_reply_is_dropped_after_clear() {
        let server = mockito::Server::new_async().await;
        let mut session = session_with(&server);

        let request = session.begin_user_turn("about to vanish", None).unwrap();
        let old_id = request.conversation_id().to_string();

        session.clear().unwrap();
        assert!(!session.is_loading());

        let dropped = session.accept_reply(
            &old_id,
            Ok(AssistantReply {
                content: "too late".into(),
                audio_url: None,
            }),
        );
        assert!(dropped.is_none());
        assert!(session.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_clear_starts_new_persisted_conversation() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body(r#"{"response": "hello"}"#)
            .create_async()
            .await;

        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let client = ApiClient::new(server.url()).unwrap();
        let mut session =
            ChatSession::load(Arc::clone(&store), client.clone(), "user_123").unwrap();

        session.send_user_turn("hi", None).await.unwrap();
        let old_id = session.conversation().id.clone();

        session.clear().unwrap();
        assert_ne!(session.conversation().id, old_id);
        assert!(session.conversation().is_empty());

        // A fresh load sees the new empty conversation
        let reloaded = ChatSession::load(store, client, "user_123").unwrap();
        assert_eq!(reloaded.conversation().id, session.conversation().id);
        assert!(reloaded.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_reload_restores_message_sequence() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body(r#"{"response": "hello", "audio_url": "/audio/9.mp3"}"#)
            .create_async()
            .await;

        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let client = ApiClient::new(server.url()).unwrap();
        let mut session =
            ChatSession::load(Arc::clone(&store), client.clone(), "user_123").unwrap();

        session.send_user_turn("hi", None).await.unwrap();

        let reloaded = ChatSession::load(store, client, "user_123").unwrap();
        let messages = &reloaded.conversation().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].audio_url(), Some("/audio/9.mp3"));
    }

    #[test]
    fn test_attachment_rejects_non_images() {
        let err = Attachment::image("notes.txt").unwrap_err();
        assert!(matches!(err, TurnError::NotAnImage(_)));

        assert!(Attachment::image("photo.jpg").is_ok());
    }

    #[tokio::test]
    async fn test_image_turn_content_carries_file_name() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/image-search")
            .with_status(200)
            .with_body(r#"{"response": "a cat"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("cat.png");
        std::fs::write(&image_path, b"\x89PNG fake").unwrap();

        let mut session = session_with(&server);
        let attachment = Attachment::image(&image_path).unwrap();
        session
            .send_user_turn("what is this", Some(attachment))
            .await
            .unwrap();

        let messages = &session.conversation().messages;
        assert_eq!(messages[0].content, "what is this (Image: cat.png)");
        assert_eq!(
            messages[0].media,
            Some(MediaRef::Image {
                name: "cat.png".into()
            })
        );
        // Image replies never carry audio
        assert!(messages[1].audio_url().is_none());
    }
}
