//! Virtual file types.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::processors::ProcessorError;
use crate::{BOM_BYTES, BOM_CHAR};

/// The content of a virtual file, either decoded text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FileBody {
    /// Decoded UTF-8 text
    Text(String),
    /// Raw bytes as read from storage
    Bytes(Vec<u8>),
}

impl FileBody {
    /// Get the body length in bytes.
    pub fn len(&self) -> usize {
        match self {
            FileBody::Text(text) => text.len(),
            FileBody::Bytes(bytes) => bytes.len(),
        }
    }

    /// Check if the body is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the body as text if it is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FileBody::Text(text) => Some(text),
            FileBody::Bytes(_) => None,
        }
    }

    /// Decode the body as UTF-8 text.
    ///
    /// Byte bodies are decoded without copying; invalid UTF-8 is reported as a
    /// [`ProcessorError`] carrying the byte offset of the first bad sequence.
    pub fn to_text(&self) -> Result<Cow<'_, str>, ProcessorError> {
        match self {
            FileBody::Text(text) => Ok(Cow::Borrowed(text)),
            FileBody::Bytes(bytes) => std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|e| {
                    ProcessorError::new(format!(
                        "invalid UTF-8 at byte offset {}",
                        e.valid_up_to()
                    ))
                }),
        }
    }
}

impl From<String> for FileBody {
    fn from(text: String) -> Self {
        FileBody::Text(text)
    }
}

impl From<&str> for FileBody {
    fn from(text: &str) -> Self {
        FileBody::Text(text.to_string())
    }
}

impl From<Vec<u8>> for FileBody {
    fn from(bytes: Vec<u8>) -> Self {
        FileBody::Bytes(bytes)
    }
}

/// A unit of content handed to processors and downstream analysis.
///
/// The logical `path` names the file in diagnostics and is the base for
/// derived block paths. The `physical_path` is the on-disk origin and is
/// shared by every file derived from it. When the loader stripped a leading
/// byte-order mark, `bom` records that so the original body can be rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualFile {
    path: PathBuf,
    physical_path: PathBuf,
    body: FileBody,
    bom: bool,
}

impl VirtualFile {
    /// Create a file whose physical path equals its logical path.
    pub fn new(path: impl Into<PathBuf>, body: impl Into<FileBody>) -> Self {
        let path = path.into();
        Self {
            physical_path: path.clone(),
            path,
            body: body.into(),
            bom: false,
        }
    }

    /// Set the physical path.
    pub fn with_physical_path(mut self, physical_path: impl Into<PathBuf>) -> Self {
        self.physical_path = physical_path.into();
        self
    }

    /// Set the BOM flag without touching the body.
    pub fn with_bom(mut self, bom: bool) -> Self {
        self.bom = bom;
        self
    }

    /// Create a text file, stripping a leading U+FEFF if present.
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        match text.strip_prefix(BOM_CHAR) {
            Some(stripped) => Self::new(path, stripped.to_string()).with_bom(true),
            None => Self::new(path, text),
        }
    }

    /// Create a byte file, stripping a leading UTF-8 BOM if present.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        match bytes.strip_prefix(&BOM_BYTES[..]) {
            Some(stripped) => Self::new(path, stripped.to_vec()).with_bom(true),
            None => Self::new(path, bytes),
        }
    }

    /// Read a file from disk.
    ///
    /// Valid UTF-8 content is kept as text, anything else as bytes.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Ok(match String::from_utf8(bytes) {
            Ok(text) => Self::from_text(path, text),
            Err(e) => Self::from_bytes(path, e.into_bytes()),
        })
    }

    /// Create the virtual file for block `index` of this file.
    ///
    /// The derived path is `<path>/<index>_<filename>`; the physical path is
    /// inherited unchanged.
    pub fn derive(&self, index: usize, filename: &str, text: String) -> Self {
        Self {
            path: self.path.join(format!("{}_{}", index, filename)),
            physical_path: self.physical_path.clone(),
            body: FileBody::Text(text),
            bom: false,
        }
    }

    /// Get the logical path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the physical path.
    pub fn physical_path(&self) -> &Path {
        &self.physical_path
    }

    /// Get the body as stored (without a BOM).
    pub fn body(&self) -> &FileBody {
        &self.body
    }

    /// Check if a BOM was stripped from this file on load.
    pub fn has_bom(&self) -> bool {
        self.bom
    }
}
