//! Key-value persistence for VoxMate state.
//!
//! All durable client state goes through the [`KeyValueStore`] trait so
//! that storage can be swapped out in tests. [`FileStore`] is the default
//! backend: one file per key under a base directory, written atomically.
//!
//! Values are plain strings; structured values are JSON-serialized by the
//! callers that own them. Concurrent processes sharing a store are
//! last-writer-wins.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Storage keys used by the client.
///
/// These are the exact keys the persisted state lives under; per-id keys
/// embed the owning conversation or upload id.
pub mod keys {
    /// Id of the active conversation.
    pub const CONVERSATION_ID: &str = "conversationId";

    /// Id of the last PDF upload.
    pub const UPLOAD_ID: &str = "uploadId";

    /// History of completed translations.
    pub const TRANSLATIONS: &str = "translations";

    /// Message sequence of a conversation.
    pub fn messages(conversation_id: &str) -> String {
        format!("messages_{conversation_id}")
    }

    /// Source text on the speak screen.
    pub fn text(conversation_id: &str) -> String {
        format!("text_{conversation_id}")
    }

    /// Last synthesized audio URL.
    pub fn audio_url(conversation_id: &str) -> String {
        format!("audioUrl_{conversation_id}")
    }

    /// Selected target language.
    pub fn language(conversation_id: &str) -> String {
        format!("language_{conversation_id}")
    }

    /// Last translation result.
    pub fn translated_text(conversation_id: &str) -> String {
        format!("translatedText_{conversation_id}")
    }

    /// Summary text of an upload.
    pub fn summary_text(upload_id: &str) -> String {
        format!("summaryText_{upload_id}")
    }

    /// Original file name of an upload.
    pub fn filename(upload_id: &str) -> String {
        format!("filename_{upload_id}")
    }

    /// Prompt used for an upload.
    pub fn prompt(upload_id: &str) -> String {
        format!("prompt_{upload_id}")
    }
}

/// String key-value store with synchronous access.
///
/// Implementations must tolerate missing keys (`get` returns `None`,
/// `remove` is a no-op).
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any prior value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the value stored under `key`, if present.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// File-backed store: one file per key under a base directory.
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a new `FileStore`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        atomic_write(&path, value.as_bytes())?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::Io(err)),
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create a new empty `MemoryStore`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Validate a storage key for filesystem safety.
fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key cannot be empty".to_string()));
    }

    if key.contains('/') || key.contains('\\') || key.contains("..") {
        return Err(StoreError::InvalidKey(format!(
            "key cannot contain path components: {key}"
        )));
    }

    for ch in key.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '-' && ch != '_' {
            return Err(StoreError::InvalidKey(format!(
                "key contains invalid character: {ch}"
            )));
        }
    }

    Ok(())
}

/// Write content atomically using temp file + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Generate unique temp filename using timestamp and process ID
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let pid = std::process::id();

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("value");
    let tmp_name = format!("{file_name}.{timestamp}.{pid}.tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let result = (|| {
        let mut file = File::create(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        // Best-effort cleanup
        let _ = fs::remove_file(&tmp_path);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_file_store() -> (TempDir, FileStore) {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path()).unwrap();
        (temp, store)
    }

    #[test]
    fn test_file_store_roundtrip() {
        let (_temp, store) = setup_file_store();

        assert!(store.get("conversationId").unwrap().is_none());

        store.set("conversationId", "abc-123").unwrap();
        assert_eq!(
            store.get("conversationId").unwrap().as_deref(),
            Some("abc-123")
        );

        store.set("conversationId", "def-456").unwrap();
        assert_eq!(
            store.get("conversationId").unwrap().as_deref(),
            Some("def-456")
        );
    }

    #[test]
    fn test_file_store_remove() {
        let (_temp, store) = setup_file_store();

        store.set("uploadId", "u1").unwrap();
        store.remove("uploadId").unwrap();
        assert!(store.get("uploadId").unwrap().is_none());

        // Removing a missing key is not an error
        store.remove("uploadId").unwrap();
    }

    #[test]
    fn test_file_store_no_temp_files_left_behind() {
        let (temp, store) = setup_file_store();

        store.set("translations", "[]").unwrap();

        for entry in fs::read_dir(temp.path()).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(!name.ends_with(".tmp"), "Found temp file: {name}");
        }
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let (_temp, store) = setup_file_store();

        assert!(matches!(
            store.set("", "x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(
            store.get("a/b"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(
            store.set("spaced key", "x"),
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();

        store.set("conversationId", "abc").unwrap();
        assert_eq!(store.get("conversationId").unwrap().as_deref(), Some("abc"));

        store.remove("conversationId").unwrap();
        assert!(store.get("conversationId").unwrap().is_none());
    }

    #[test]
    fn test_key_builders() {
        assert_eq!(keys::messages("c1"), "messages_c1");
        assert_eq!(keys::audio_url("c1"), "audioUrl_c1");
        assert_eq!(keys::translated_text("c1"), "translatedText_c1");
        assert_eq!(keys::summary_text("u1"), "summaryText_u1");
    }
}
