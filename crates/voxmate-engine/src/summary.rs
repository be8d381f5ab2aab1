//! PDF upload and summary flow.
//!
//! Validates the file and prompt before any request is sent, and mirrors
//! the last successful summary to storage under a per-upload id so it can
//! be restored on the next load.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::client::display_file_name;
use crate::store::{keys, KeyValueStore, StoreError};

/// Default summarization prompt.
pub const DEFAULT_PROMPT: &str = "Summarize the document in a few sentences.";

/// Minimum prompt length.
pub const MIN_PROMPT_CHARS: usize = 5;

/// Validation errors for the upload flow. These block the action before
/// any request is sent.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("Please upload a valid PDF file.")]
    NotAPdf,

    #[error("No file selected.")]
    FileMissing,

    #[error("Please enter a valid summarization prompt (at least 5 characters).")]
    PromptTooShort,
}

/// Validate that a path points at an existing PDF file.
pub fn validate_pdf_path(path: &Path) -> Result<(), SummaryError> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(SummaryError::NotAPdf);
    }
    if !path.is_file() {
        return Err(SummaryError::FileMissing);
    }
    Ok(())
}

/// Validate a summarization prompt.
pub fn validate_prompt(prompt: &str) -> Result<(), SummaryError> {
    if prompt.trim().len() < MIN_PROMPT_CHARS {
        return Err(SummaryError::PromptTooShort);
    }
    Ok(())
}

/// Upload-screen state, mirrored to storage.
///
/// Each successful upload gets a fresh opaque upload id; the summary,
/// file name, and prompt are persisted under it, and restored only when
/// all three are present.
pub struct SummaryPad {
    store: Arc<dyn KeyValueStore>,
    /// Id of the last persisted upload.
    pub upload_id: Option<String>,
    /// Summary returned by the backend.
    pub summary_text: Option<String>,
    /// File name of the uploaded document.
    pub filename: Option<String>,
    /// Prompt the summary was generated with.
    pub prompt: String,
}

impl SummaryPad {
    /// Restore the last upload from storage.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let mut pad = Self {
            store,
            upload_id: None,
            summary_text: None,
            filename: None,
            prompt: DEFAULT_PROMPT.to_string(),
        };

        let Some(upload_id) = pad.store.get(keys::UPLOAD_ID)? else {
            return Ok(pad);
        };
        let summary = pad.store.get(&keys::summary_text(&upload_id))?;
        let filename = pad.store.get(&keys::filename(&upload_id))?;
        let prompt = pad.store.get(&keys::prompt(&upload_id))?;

        // Restore only a complete record
        if let (Some(summary), Some(filename), Some(prompt)) = (summary, filename, prompt) {
            pad.upload_id = Some(upload_id);
            pad.summary_text = Some(summary);
            pad.filename = Some(filename);
            pad.prompt = prompt;
        }
        Ok(pad)
    }

    /// Record a successful upload, allocating a fresh upload id and
    /// persisting the summary, file name, and prompt under it.
    pub fn record_summary(
        &mut self,
        path: &Path,
        prompt: &str,
        summary: &str,
    ) -> Result<(), StoreError> {
        let upload_id = Uuid::new_v4().to_string();
        let filename = display_file_name(path);

        self.store
            .set(&keys::summary_text(&upload_id), summary)?;
        self.store.set(&keys::filename(&upload_id), &filename)?;
        self.store.set(&keys::prompt(&upload_id), prompt)?;
        self.store.set(keys::UPLOAD_ID, &upload_id)?;

        self.upload_id = Some(upload_id);
        self.summary_text = Some(summary.to_string());
        self.filename = Some(filename);
        self.prompt = prompt.to_string();
        Ok(())
    }

    /// Drop the persisted upload and reset the pad.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        if let Some(upload_id) = self.upload_id.take() {
            self.store.remove(&keys::summary_text(&upload_id))?;
            self.store.remove(&keys::filename(&upload_id))?;
            self.store.remove(&keys::prompt(&upload_id))?;
            self.store.remove(keys::UPLOAD_ID)?;
        }
        self.summary_text = None;
        self.filename = None;
        self.prompt = DEFAULT_PROMPT.to_string();
        Ok(())
    }
}
