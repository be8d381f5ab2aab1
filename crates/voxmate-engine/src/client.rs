//! HTTP client for the VoxMate backend.
//!
//! Wraps the four backend endpoints (`/chat`, `/image-search`,
//! `/upload-pdf`, `/speak-translated`) behind typed request and reply
//! shapes. Replies are parsed and validated here, at the boundary; callers
//! never see raw JSON. One request per user action, no retries.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status. `detail` carries the
    /// decoded `{ detail }` payload when present, otherwise the status.
    #[error("{detail}")]
    Backend { status: u16, detail: String },

    /// Transport failure, timeout, or undecodable reply body.
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The reply decoded but is missing a field this call requires.
    #[error("backend reply is missing `{0}`")]
    MalformedReply(&'static str),

    /// Failed to read a local file to upload.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A chat turn ready to be sent to the backend.
///
/// Produced by `ChatSession::begin_user_turn`; carries everything the
/// network call needs so it can run on a background task while the
/// session stays on the UI side.
#[derive(Debug, Clone)]
pub enum TurnRequest {
    /// Plain text turn for `/chat`.
    Chat {
        message: String,
        conversation_id: String,
        user_id: String,
    },
    /// Image-and-caption turn for `/image-search`.
    ImageSearch {
        path: PathBuf,
        message: String,
        conversation_id: String,
        user_id: String,
    },
}

impl TurnRequest {
    /// Conversation the turn belongs to.
    pub fn conversation_id(&self) -> &str {
        match self {
            Self::Chat {
                conversation_id, ..
            }
            | Self::ImageSearch {
                conversation_id, ..
            } => conversation_id,
        }
    }
}

/// Parsed assistant reply to a chat turn.
#[derive(Debug, Clone)]
pub struct AssistantReply {
    /// Reply content (may contain markdown).
    pub content: String,
    /// Synthesized speech for the reply, when the backend provides it.
    /// Only text chat replies carry audio.
    pub audio_url: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    role: &'a str,
    conversation_id: &'a str,
    user_id: &'a str,
}

#[derive(Serialize)]
struct SpeakRequest<'a> {
    text: &'a str,
    target_language: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    response: String,
    #[serde(default)]
    audio_url: Option<String>,
}

#[derive(Deserialize)]
struct ResponseReply {
    response: String,
}

#[derive(Deserialize)]
struct SpeakReply {
    #[serde(default)]
    translated_text: Option<String>,
    #[serde(default)]
    audio_url: Option<String>,
}

#[derive(Deserialize)]
struct ErrorReply {
    #[serde(default)]
    detail: Option<Value>,
}

/// Client for the VoxMate backend HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    /// The configured backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a text chat turn.
    pub async fn chat(
        &self,
        message: &str,
        conversation_id: &str,
        user_id: &str,
    ) -> Result<AssistantReply, ApiError> {
        let body = ChatRequest {
            message,
            role: "user",
            conversation_id,
            user_id,
        };
        debug!(conversation_id, "POST /chat");
        let response = self
            .http
            .post(self.endpoint("/chat"))
            .json(&body)
            .send()
            .await?;
        let reply: ChatReply = decode(response).await?;
        Ok(AssistantReply {
            content: reply.response,
            audio_url: reply.audio_url,
        })
    }

    /// Send an image with a caption for image search.
    pub async fn image_search(
        &self,
        path: &Path,
        message: &str,
        conversation_id: &str,
        user_id: &str,
    ) -> Result<AssistantReply, ApiError> {
        let mime = image_mime(path).unwrap_or("application/octet-stream");
        let form = Form::new()
            .part("file", file_part(path, mime).await?)
            .text("message", message.to_string())
            .text("conversation_id", conversation_id.to_string())
            .text("user_id", user_id.to_string());

        debug!(conversation_id, file = %path.display(), "POST /image-search");
        let response = self
            .http
            .post(self.endpoint("/image-search"))
            .multipart(form)
            .send()
            .await?;
        let reply: ResponseReply = decode(response).await?;
        Ok(AssistantReply {
            content: reply.response,
            audio_url: None,
        })
    }

    /// Upload a PDF for summarization.
    pub async fn upload_pdf(
        &self,
        path: &Path,
        prompt: &str,
        conversation_id: &str,
        user_id: &str,
    ) -> Result<String, ApiError> {
        let form = Form::new()
            .part("file", file_part(path, "application/pdf").await?)
            .text("user_id", user_id.to_string())
            .text("conversation_id", conversation_id.to_string())
            .text("prompt", prompt.to_string());

        debug!(conversation_id, file = %path.display(), "POST /upload-pdf");
        let response = self
            .http
            .post(self.endpoint("/upload-pdf"))
            .multipart(form)
            .send()
            .await?;
        let reply: ResponseReply = decode(response).await?;
        Ok(reply.response)
    }

    /// Translate `text` into `target_language`.
    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, ApiError> {
        let reply = self.speak_translated(text, target_language).await?;
        reply
            .translated_text
            .ok_or(ApiError::MalformedReply("translated_text"))
    }

    /// Synthesize speech for `text` in `target_language`, returning the
    /// audio URL (possibly relative to the base URL).
    pub async fn synthesize(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, ApiError> {
        let reply = self.speak_translated(text, target_language).await?;
        reply.audio_url.ok_or(ApiError::MalformedReply("audio_url"))
    }

    /// Dispatch a prepared chat turn to the right endpoint.
    pub async fn send_turn(&self, request: TurnRequest) -> Result<AssistantReply, ApiError> {
        match request {
            TurnRequest::Chat {
                message,
                conversation_id,
                user_id,
            } => self.chat(&message, &conversation_id, &user_id).await,
            TurnRequest::ImageSearch {
                path,
                message,
                conversation_id,
                user_id,
            } => {
                self.image_search(&path, &message, &conversation_id, &user_id)
                    .await
            }
        }
    }

    async fn speak_translated(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<SpeakReply, ApiError> {
        let body = SpeakRequest {
            text,
            target_language,
        };
        debug!(target_language, "POST /speak-translated");
        let response = self
            .http
            .post(self.endpoint("/speak-translated"))
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Check the status and decode the reply body.
async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Backend {
            status: status.as_u16(),
            detail: extract_detail(status.as_u16(), &body),
        });
    }
    Ok(response.json::<T>().await?)
}

/// Pull a human-readable detail out of an error body.
///
/// String details pass through verbatim; structured details are
/// pretty-printed; anything else falls back to the status code.
fn extract_detail(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorReply>(body) {
        Ok(ErrorReply {
            detail: Some(Value::String(detail)),
        }) => detail,
        Ok(ErrorReply {
            detail: Some(detail),
        }) => serde_json::to_string_pretty(&detail).unwrap_or_else(|_| detail.to_string()),
        _ => format!("HTTP {status}"),
    }
}

async fn file_part(path: &Path, mime: &str) -> Result<Part, ApiError> {
    let bytes = tokio::fs::read(path).await?;
    let part = Part::bytes(bytes)
        .file_name(display_file_name(path))
        .mime_str(mime)?;
    Ok(part)
}

/// File name of a path as shown to the user and the backend.
pub(crate) fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// MIME type for an image file, by extension. `None` for non-images.
pub(crate) fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_chat_parses_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response": "hello", "audio_url": "/audio/1.mp3"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let reply = client.chat("hi", "conv-1", "user_123").await.unwrap();

        assert_eq!(reply.content, "hello");
        assert_eq!(reply.audio_url.as_deref(), Some("/audio/1.mp3"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_backend_error_uses_string_detail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(500)
            .with_body(r#"{"detail": "boom"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let err = client.chat("x", "conv-1", "user_123").await.unwrap_err();

        match err {
            ApiError::Backend { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail, "boom");
            }
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_backend_error_pretty_prints_structured_detail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/speak-translated")
            .with_status(422)
            .with_body(r#"{"detail": [{"loc": ["body", "text"], "msg": "field required"}]}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let err = client.translate("hello there", "fr").await.unwrap_err();

        let rendered = err.to_string();
        assert!(rendered.contains("field required"));
    }

    #[tokio::test]
    async fn test_backend_error_without_detail_falls_back_to_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let err = client.chat("x", "conv-1", "user_123").await.unwrap_err();
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_translate_requires_translated_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/speak-translated")
            .with_status(200)
            .with_body(r#"{"audio_url": "/audio/2.mp3"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let err = client.translate("hello there", "fr").await.unwrap_err();
        assert!(matches!(err, ApiError::MalformedReply("translated_text")));
    }

    #[tokio::test]
    async fn test_synthesize_returns_audio_url() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/speak-translated")
            .with_status(200)
            .with_body(r#"{"translated_text": "bonjour", "audio_url": "/audio/3.mp3"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let url = client.synthesize("bonjour", "fr").await.unwrap();
        assert_eq!(url, "/audio/3.mp3");
    }

    #[tokio::test]
    async fn test_upload_pdf_sends_multipart() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload-pdf")
            .with_status(200)
            .with_body(r#"{"response": "a short summary"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("paper.pdf");
        std::fs::write(&pdf, b"%PDF-1.4 fake").unwrap();

        let client = ApiClient::new(server.url()).unwrap();
        let summary = client
            .upload_pdf(&pdf, "Summarize it", "conv-1", "user_123")
            .await
            .unwrap();

        assert_eq!(summary, "a short summary");
        mock.assert_async().await;
    }

    #[test]
    fn test_image_mime_by_extension() {
        assert_eq!(image_mime(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(image_mime(Path::new("b.jpeg")), Some("image/jpeg"));
        assert_eq!(image_mime(Path::new("c.pdf")), None);
        assert_eq!(image_mime(Path::new("noext")), None);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.endpoint("/chat"), "http://localhost:8000/chat");
    }
}
