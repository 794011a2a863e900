//! Processor output units.

use serde::{Deserialize, Serialize};

use super::VirtualFile;

/// A unit of text returned by a processor's preprocess step.
///
/// Older processors return bare strings instead of named blocks; both shapes
/// are accepted. A bare string carries no filename and is passed downstream
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Block {
    /// Bare content string
    Legacy(String),
    /// Named block of extracted text
    Structured {
        /// Block content
        text: String,
        /// Filename used to build the derived path (e.g. "code.js")
        filename: String,
    },
}

impl Block {
    /// Create a named block.
    pub fn new(text: impl Into<String>, filename: impl Into<String>) -> Self {
        Block::Structured {
            text: text.into(),
            filename: filename.into(),
        }
    }

    /// Get the block text regardless of shape.
    pub fn text(&self) -> &str {
        match self {
            Block::Legacy(text) => text,
            Block::Structured { text, .. } => text,
        }
    }
}

impl From<String> for Block {
    fn from(text: String) -> Self {
        Block::Legacy(text)
    }
}

impl From<&str> for Block {
    fn from(text: &str) -> Self {
        Block::Legacy(text.to_string())
    }
}

/// A derived unit produced by preprocessing, in processor block order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProcessedFile {
    /// Legacy string block passed through unchanged
    Legacy(String),
    /// Derived virtual file for a named block
    Virtual(VirtualFile),
}

impl ProcessedFile {
    /// Get the derived virtual file, if this is one.
    pub fn as_virtual(&self) -> Option<&VirtualFile> {
        match self {
            ProcessedFile::Virtual(file) => Some(file),
            ProcessedFile::Legacy(_) => None,
        }
    }
}
