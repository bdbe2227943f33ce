// src/clipboard.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::task::JoinHandle;

/// What a copy action puts on the clipboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", rename_all = "camelCase")]
pub enum ClipboardPayload {
    Text { text: String },
    Html { html: String, alt_text: String },
}

impl ClipboardPayload {
    pub fn len(&self) -> usize {
        match self {
            ClipboardPayload::Text { text } => text.len(),
            ClipboardPayload::Html { html, .. } => html.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard is disabled")]
    Disabled,

    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("clipboard write failed: {0}")]
    Write(String),

    #[error("clipboard task failed: {0}")]
    Task(String),
}

/// Best-effort clipboard sink.
#[async_trait]
pub trait ClipboardWriter: Send + Sync {
    async fn write(&self, payload: ClipboardPayload) -> Result<(), ClipboardError>;
}

/// The desktop clipboard of the machine running the server.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[async_trait]
impl ClipboardWriter for SystemClipboard {
    async fn write(&self, payload: ClipboardPayload) -> Result<(), ClipboardError> {
        tokio::task::spawn_blocking(move || {
            let mut clipboard = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            let written = match payload {
                ClipboardPayload::Text { text } => clipboard.set_text(text),
                ClipboardPayload::Html { html, alt_text } => clipboard.set_html(html, Some(alt_text)),
            };
            written.map_err(|e| ClipboardError::Write(e.to_string()))
        })
        .await
        .map_err(|e| ClipboardError::Task(e.to_string()))?
    }
}

/// Used when the clipboard is switched off in the configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledClipboard;

#[async_trait]
impl ClipboardWriter for DisabledClipboard {
    async fn write(&self, _payload: ClipboardPayload) -> Result<(), ClipboardError> {
        Err(ClipboardError::Disabled)
    }
}

/// Fire-and-forget copy. The outcome is only logged.
pub fn spawn_copy(writer: Arc<dyn ClipboardWriter>, payload: ClipboardPayload) -> JoinHandle<()> {
    tokio::spawn(async move {
        let bytes = payload.len();
        match writer.write(payload).await {
            Ok(()) => tracing::info!(bytes, "Copy to clipboard success"),
            Err(e) => tracing::warn!(bytes, "Copy to clipboard failed: {}", e),
        }
    })
}
