//! Request value objects

use serde::{Deserialize, Serialize};

/// A single speech synthesis request
///
/// Created per HTTP call and discarded once the response completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtsRequest {
    /// Text to speak. No length limit and no sanitization.
    pub text: String,
    /// Accent identifier, matched case-insensitively
    pub accent_id: String,
}

impl TtsRequest {
    pub fn new(text: impl Into<String>, accent_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            accent_id: accent_id.into(),
        }
    }

    /// First `max_chars` characters of the text, for log lines
    pub fn preview(&self, max_chars: usize) -> String {
        self.text.chars().take(max_chars).collect()
    }
}
