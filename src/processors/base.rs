//! Base traits for all processors.

use std::path::Path;

use anyhow::Result;
use thiserror::Error;

use crate::types::{Block, FileBody, LintMessage};

/// The core trait that all processors must implement.
///
/// A processor takes the full original body of a file (BOM included, exactly
/// as stored) and splits it into blocks that are analyzed as separate
/// virtual files. The return type is a plain value: processors run to
/// completion on the caller's stack.
pub trait Processor: Send + Sync {
    /// Get the name of this processor.
    fn name(&self) -> &'static str;

    /// Get the description of this processor.
    fn description(&self) -> &'static str {
        "A file processor"
    }

    /// Whether fixes computed on blocks can be applied to the parent file.
    fn supports_autofix(&self) -> bool {
        false
    }

    /// Split a file body into blocks.
    ///
    /// # Arguments
    /// * `body` - The file body with its byte-order mark restored
    /// * `path` - The logical path of the file
    ///
    /// Return a [`ProcessorError`] to attach a line/column to a failure.
    fn preprocess(&self, body: &FileBody, path: &Path) -> Result<Vec<Block>>;

    /// Get the postprocess capability, if this processor has one.
    fn postprocessor(&self) -> Option<&dyn Postprocessor> {
        None
    }
}

/// Optional capability that merges per-block diagnostics.
pub trait Postprocessor {
    /// Merge the diagnostics of each block into one list for the parent file.
    ///
    /// `messages[i]` holds the diagnostics of block `i` as returned by
    /// preprocess. Implementations own remapping of block-local positions to
    /// parent coordinates.
    fn postprocess(&self, messages: Vec<Vec<LintMessage>>, path: &Path)
        -> Result<Vec<LintMessage>>;
}

/// A processor failure with an optional source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProcessorError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl ProcessorError {
    /// Create an error without a position.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Attach a position.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}
