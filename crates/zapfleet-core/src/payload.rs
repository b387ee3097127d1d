//! Batch message payloads.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What gets sent to every contact in a batch. Exactly one variant per
/// dispatch request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessagePayload {
    /// Plain text message.
    Text {
        /// Message body.
        body: String,
    },
    /// Image read from local disk, with an optional caption.
    Image {
        /// Path to the image file.
        path: PathBuf,
        /// Caption shown under the image.
        caption: Option<String>,
    },
}

impl MessagePayload {
    /// Text payload.
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text { body: body.into() }
    }

    /// Image payload.
    pub fn image(path: impl Into<PathBuf>, caption: Option<String>) -> Self {
        Self::Image {
            path: path.into(),
            caption,
        }
    }

    /// Short tag for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
        }
    }
}
