//! Conversation model and per-conversation persistence.
//!
//! A [`Conversation`] is the in-memory message sequence; a
//! [`ConversationStore`] mirrors it to a [`KeyValueStore`] under the
//! `conversationId` / `messages_<id>` keys. Writes replace the whole
//! persisted sequence (read-modify-write, best-effort; see the module
//! docs on `store` for the concurrency caveats).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::message::Message;
use crate::store::{keys, KeyValueStore, StoreError};

/// An ordered sequence of messages grouped under one id.
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Opaque conversation identifier (UUID).
    pub id: String,
    /// Messages in insertion order.
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Create a new empty conversation with a fresh id.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
        }
    }

    /// Create a conversation with a known id and message sequence.
    pub fn with_messages(id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            id: id.into(),
            messages,
        }
    }

    /// Append a message. Messages are immutable once appended.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Timestamp of the most recent message.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.messages.last().map(|m| m.timestamp)
    }

    /// Whether the conversation has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Mirrors the active conversation to durable storage.
pub struct ConversationStore {
    store: Arc<dyn KeyValueStore>,
}

impl ConversationStore {
    /// Create a store over the given key-value backend.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the active conversation.
    ///
    /// Reads the persisted conversation id and its message sequence. When
    /// no id is persisted, allocates a fresh empty conversation and
    /// persists the new id, so repeated loads return the same conversation
    /// until [`ConversationStore::clear`] is called.
    pub fn load_active(&self) -> Result<Conversation, StoreError> {
        match self.store.get(keys::CONVERSATION_ID)? {
            Some(id) => {
                let messages = self.load_messages(&id)?;
                Ok(Conversation::with_messages(id, messages))
            }
            None => {
                let conversation = Conversation::new();
                self.store.set(keys::CONVERSATION_ID, &conversation.id)?;
                Ok(conversation)
            }
        }
    }

    /// Persist the full message sequence of a conversation.
    pub fn save(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let json =
            serde_json::to_string(&conversation.messages).map_err(StoreError::Serialize)?;
        self.store.set(&keys::messages(&conversation.id), &json)
    }

    /// Discard the persisted data for `id` and allocate a fresh empty
    /// conversation, persisting its id as the active one.
    pub fn clear(&self, id: &str) -> Result<Conversation, StoreError> {
        self.store.remove(&keys::messages(id))?;
        let conversation = Conversation::new();
        self.store.set(keys::CONVERSATION_ID, &conversation.id)?;
        Ok(conversation)
    }

    fn load_messages(&self, id: &str) -> Result<Vec<Message>, StoreError> {
        let Some(raw) = self.store.get(&keys::messages(id))? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(messages) => Ok(messages),
            Err(err) => {
                warn!(conversation_id = %id, error = %err, "Discarding corrupt message history");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn setup() -> ConversationStore {
        ConversationStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_load_allocates_and_persists_id() {
        let store = setup();

        let first = store.load_active().unwrap();
        assert!(first.is_empty());

        // Repeated loads see the same conversation
        let second = store.load_active().unwrap();
        assert_eq!(second.id, first.id);
    }

    #[test]
    fn test_persisted_sequence_matches_memory() {
        let store = setup();
        let mut conversation = store.load_active().unwrap();

        for content in ["one", "two", "three"] {
            conversation.append(Message::user(content));
            store.save(&conversation).unwrap();
        }

        let reloaded = store.load_active().unwrap();
        assert_eq!(reloaded.id, conversation.id);
        assert_eq!(reloaded.messages.len(), 3);
        let contents: Vec<_> = reloaded.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_clear_allocates_new_empty_conversation() {
        let store = setup();
        let mut conversation = store.load_active().unwrap();
        conversation.append(Message::user("hello"));
        store.save(&conversation).unwrap();

        let old_id = conversation.id.clone();
        let cleared = store.clear(&old_id).unwrap();
        assert_ne!(cleared.id, old_id);
        assert!(cleared.is_empty());

        // Subsequent loads see the new empty conversation
        let reloaded = store.load_active().unwrap();
        assert_eq!(reloaded.id, cleared.id);
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_corrupt_history_is_discarded() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(keys::CONVERSATION_ID, "conv-1").unwrap();
        backend.set(&keys::messages("conv-1"), "not valid json").unwrap();

        let store = ConversationStore::new(backend);
        let conversation = store.load_active().unwrap();
        assert_eq!(conversation.id, "conv-1");
        assert!(conversation.is_empty());
    }

    #[test]
    fn test_updated_at_tracks_last_message() {
        let mut conversation = Conversation::new();
        assert!(conversation.updated_at().is_none());

        conversation.append(Message::user("x"));
        let first = conversation.updated_at().unwrap();

        conversation.append(Message::assistant("y"));
        assert!(conversation.updated_at().unwrap() >= first);
    }
}
