//! Passthrough processor that keeps a file whole.

use std::path::Path;

use anyhow::Result;

use super::base::{Postprocessor, Processor};
use crate::types::{Block, FileBody, LintMessage};

/// Processor that hands the whole body downstream as a single block.
///
/// This is the behaviour of a file with no dedicated processor: one legacy
/// block in, one message group out.
pub struct PassthroughProcessor;

impl PassthroughProcessor {
    /// Create a new passthrough processor.
    pub fn new() -> Self {
        Self
    }
}

impl Default for PassthroughProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for PassthroughProcessor {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn description(&self) -> &'static str {
        "Passes the file through as a single block"
    }

    fn supports_autofix(&self) -> bool {
        true
    }

    fn preprocess(&self, body: &FileBody, _path: &Path) -> Result<Vec<Block>> {
        let text = body.to_text()?;
        Ok(vec![Block::Legacy(text.into_owned())])
    }

    fn postprocessor(&self) -> Option<&dyn Postprocessor> {
        Some(self)
    }
}

impl Postprocessor for PassthroughProcessor {
    fn postprocess(&self, messages: Vec<Vec<LintMessage>>, _path: &Path) -> Result<Vec<LintMessage>> {
        Ok(messages.into_iter().flatten().collect())
    }
}
