//! Translation and text-to-speech flow.
//!
//! The speak screen translates freeform text into a target language and
//! then synthesizes speech for the translated text. Both halves go through
//! `/speak-translated`; this module owns the client-side state, its
//! persistence, and the input validation that runs before any request.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::store::{keys, KeyValueStore, StoreError};

/// Minimum input length for translation and synthesis.
pub const MIN_SPEECH_CHARS: usize = 5;

/// A selectable target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageOption {
    /// Language code sent to the backend.
    pub code: &'static str,
    /// Display label with the voice name.
    pub label: &'static str,
}

/// Target languages offered by the backend voices.
pub const LANGUAGES: &[LanguageOption] = &[
    LanguageOption { code: "en", label: "English (US, Aria)" },
    LanguageOption { code: "en-gb", label: "English (UK, Libby)" },
    LanguageOption { code: "hi", label: "Hindi (Swara)" },
    LanguageOption { code: "fr", label: "French (Denise)" },
    LanguageOption { code: "de", label: "German (Katja)" },
    LanguageOption { code: "es", label: "Spanish (Spain, Elvira)" },
    LanguageOption { code: "es-mx", label: "Spanish (Mexico, Dalia)" },
    LanguageOption { code: "it", label: "Italian (Elsa)" },
    LanguageOption { code: "ja", label: "Japanese (Nanami)" },
    LanguageOption { code: "ko", label: "Korean (SunHi)" },
    LanguageOption { code: "zh", label: "Chinese (Simplified, Xiaoxiao)" },
    LanguageOption { code: "zh-hk", label: "Chinese (Cantonese, HiuMaan)" },
    LanguageOption { code: "zh-tw", label: "Chinese (Taiwan, HsiaoChen)" },
    LanguageOption { code: "pt", label: "Portuguese (Brazil, Francisca)" },
    LanguageOption { code: "pt-pt", label: "Portuguese (Portugal, Raquel)" },
    LanguageOption { code: "ru", label: "Russian (Svetlana)" },
    LanguageOption { code: "tr", label: "Turkish (Emel)" },
    LanguageOption { code: "ar", label: "Arabic (Egypt, Salma)" },
    LanguageOption { code: "id", label: "Indonesian (Gadis)" },
    LanguageOption { code: "th", label: "Thai (Premwadee)" },
    LanguageOption { code: "vi", label: "Vietnamese (HoaiMy)" },
    LanguageOption { code: "nl", label: "Dutch (Fenna)" },
    LanguageOption { code: "pl", label: "Polish (Zofia)" },
    LanguageOption { code: "sv", label: "Swedish (Sofie)" },
    LanguageOption { code: "no", label: "Norwegian (Iselin)" },
    LanguageOption { code: "fi", label: "Finnish (Selma)" },
    LanguageOption { code: "da", label: "Danish (Christel)" },
    LanguageOption { code: "he", label: "Hebrew (Hila)" },
    LanguageOption { code: "cs", label: "Czech (Vlasta)" },
    LanguageOption { code: "el", label: "Greek (Athina)" },
    LanguageOption { code: "ro", label: "Romanian (Alina)" },
    LanguageOption { code: "hu", label: "Hungarian (Noemi)" },
    LanguageOption { code: "sk", label: "Slovak (Viktoria)" },
    LanguageOption { code: "uk", label: "Ukrainian (Polina)" },
];

/// Look up the display label for a language code.
pub fn language_label(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|option| option.code == code)
        .map(|option| option.label)
}

/// Whether a language code is in the catalog.
pub fn is_supported_language(code: &str) -> bool {
    language_label(code).is_some()
}

/// Validation errors for the speak flow. These block the action before
/// any request is sent.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Please enter at least 5 characters of text.")]
    TextTooShort,

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
}

/// Validate text for translation or synthesis.
pub fn validate_speech_text(text: &str) -> Result<(), SpeechError> {
    if text.trim().len() < MIN_SPEECH_CHARS {
        return Err(SpeechError::TextTooShort);
    }
    Ok(())
}

/// Validate a target language code.
pub fn validate_language(code: &str) -> Result<(), SpeechError> {
    if !is_supported_language(code) {
        return Err(SpeechError::UnsupportedLanguage(code.to_string()));
    }
    Ok(())
}

/// A completed translation, kept in the persisted history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    /// Source text.
    pub text: String,
    /// Target language code.
    pub language: String,
    /// Translated text.
    pub translated: String,
}

/// Per-conversation speak-screen state, mirrored to storage.
pub struct SpeechPad {
    store: Arc<dyn KeyValueStore>,
    conversation_id: String,
    /// Source text.
    pub text: String,
    /// Selected target language code.
    pub language: String,
    /// Last translation result.
    pub translated_text: Option<String>,
    /// Last synthesized audio URL.
    pub audio_url: Option<String>,
}

impl SpeechPad {
    /// Restore the pad for a conversation from storage.
    ///
    /// Missing keys leave the defaults in place (`en`, empty text).
    pub fn load(
        store: Arc<dyn KeyValueStore>,
        conversation_id: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let conversation_id = conversation_id.into();
        let text = store.get(&keys::text(&conversation_id))?.unwrap_or_default();
        let language = store
            .get(&keys::language(&conversation_id))?
            .unwrap_or_else(|| "en".to_string());
        let translated_text = store
            .get(&keys::translated_text(&conversation_id))?
            .filter(|value| !value.is_empty());
        let audio_url = store
            .get(&keys::audio_url(&conversation_id))?
            .filter(|value| !value.is_empty());

        Ok(Self {
            store,
            conversation_id,
            text,
            language,
            translated_text,
            audio_url,
        })
    }

    /// Conversation the pad belongs to.
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Record a successful translation: update the pad, persist the
    /// per-conversation keys, and append to the translation history.
    pub fn record_translation(
        &mut self,
        text: &str,
        translated: &str,
    ) -> Result<(), StoreError> {
        self.text = text.to_string();
        self.translated_text = Some(translated.to_string());

        self.store.set(&keys::text(&self.conversation_id), text)?;
        self.store
            .set(&keys::language(&self.conversation_id), &self.language)?;
        self.store
            .set(&keys::translated_text(&self.conversation_id), translated)?;

        let mut history = self.translations()?;
        history.push(TranslationRecord {
            text: text.to_string(),
            language: self.language.clone(),
            translated: translated.to_string(),
        });
        let json = serde_json::to_string(&history).map_err(StoreError::Serialize)?;
        self.store.set(keys::TRANSLATIONS, &json)
    }

    /// Record a synthesized audio URL for the current translation.
    pub fn record_audio(&mut self, url: &str) -> Result<(), StoreError> {
        self.audio_url = Some(url.to_string());
        self.store.set(&keys::audio_url(&self.conversation_id), url)
    }

    /// The persisted translation history, oldest first.
    pub fn translations(&self) -> Result<Vec<TranslationRecord>, StoreError> {
        let Some(raw) = self.store.get(keys::TRANSLATIONS)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(history) => Ok(history),
            Err(err) => {
                warn!(error = %err, "Discarding corrupt translation history");
                Ok(Vec::new())
            }
        }
    }

    /// Drop the pad's persisted state and rebind it to a new conversation.
    pub fn clear(&mut self, new_conversation_id: impl Into<String>) -> Result<(), StoreError> {
        self.store.remove(&keys::text(&self.conversation_id))?;
        self.store.remove(&keys::audio_url(&self.conversation_id))?;
        self.store.remove(&keys::language(&self.conversation_id))?;
        self.store
            .remove(&keys::translated_text(&self.conversation_id))?;

        self.conversation_id = new_conversation_id.into();
        self.text.clear();
        self.language = "en".to_string();
        self.translated_text = None;
        self.audio_url = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_validate_speech_text() {
        assert!(matches!(
            validate_speech_text("hi"),
            Err(SpeechError::TextTooShort)
        ));
        assert!(matches!(
            validate_speech_text("    a    "),
            Err(SpeechError::TextTooShort)
        ));
        assert!(validate_speech_text("hello world").is_ok());
    }

    #[test]
    fn test_language_catalog() {
        assert!(is_supported_language("en"));
        assert!(is_supported_language("zh-tw"));
        assert!(!is_supported_language("xx"));
        assert_eq!(language_label("fr"), Some("French (Denise)"));
        assert!(matches!(
            validate_language("klingon"),
            Err(SpeechError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn test_pad_roundtrip() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let mut pad = SpeechPad::load(Arc::clone(&store), "conv-1").unwrap();
        pad.language = "fr".to_string();
        pad.record_translation("hello world", "bonjour le monde").unwrap();
        pad.record_audio("/audio/42.mp3").unwrap();

        let restored = SpeechPad::load(store, "conv-1").unwrap();
        assert_eq!(restored.text, "hello world");
        assert_eq!(restored.language, "fr");
        assert_eq!(restored.translated_text.as_deref(), Some("bonjour le monde"));
        assert_eq!(restored.audio_url.as_deref(), Some("/audio/42.mp3"));
    }

    #[test]
    fn test_translation_history_accumulates() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let mut pad = SpeechPad::load(Arc::clone(&store), "conv-1").unwrap();
        pad.language = "fr".to_string();
        pad.record_translation("good morning", "bonjour").unwrap();
        pad.language = "de".to_string();
        pad.record_translation("good morning", "guten Morgen").unwrap();

        let history = pad.translations().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].language, "fr");
        assert_eq!(history[1].translated, "guten Morgen");
    }

    #[test]
    fn test_clear_rebinds_and_resets() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let mut pad = SpeechPad::load(Arc::clone(&store), "conv-1").unwrap();
        pad.language = "ja".to_string();
        pad.record_translation("hello there", "こんにちは").unwrap();
        pad.record_audio("/audio/1.mp3").unwrap();

        pad.clear("conv-2").unwrap();
        assert_eq!(pad.conversation_id(), "conv-2");
        assert!(pad.text.is_empty());
        assert_eq!(pad.language, "en");
        assert!(pad.translated_text.is_none());
        assert!(pad.audio_url.is_none());

        // The old conversation's keys are gone
        let stale = SpeechPad::load(store, "conv-1").unwrap();
        assert!(stale.text.is_empty());
        assert!(stale.translated_text.is_none());
    }

    #[test]
    fn test_corrupt_history_is_discarded() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(keys::TRANSLATIONS, "{broken").unwrap();

        let pad = SpeechPad::load(store, "conv-1").unwrap();
        assert!(pad.translations().unwrap().is_empty());
    }
}
