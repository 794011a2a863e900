//! Postprocessing: fold per-block diagnostics back into the parent file.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::processors::Processor;
use crate::types::{LintMessage, ProcessorConfig, VirtualFile};

/// Diagnostics after postprocessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PostprocessOutput {
    /// Result of the processor's postprocess step, returned verbatim
    Merged(Vec<LintMessage>),
    /// Per-block groups, untouched because the processor has no postprocess step
    Unmerged(Vec<Vec<LintMessage>>),
}

impl PostprocessOutput {
    /// Flatten into a single list, keeping block order.
    pub fn into_flat(self) -> Vec<LintMessage> {
        match self {
            PostprocessOutput::Merged(messages) => messages,
            PostprocessOutput::Unmerged(groups) => groups.into_iter().flatten().collect(),
        }
    }
}

/// Merge per-block diagnostics for `file` with the configured processor.
///
/// `messages[i]` must hold the diagnostics of block `i` in the order produced
/// by preprocessing. Errors from the processor are returned as-is.
pub fn postprocess(
    file: &VirtualFile,
    messages: Vec<Vec<LintMessage>>,
    config: &ProcessorConfig,
) -> Result<PostprocessOutput> {
    let processor = &config.processor;

    let Some(postprocessor) = processor.postprocessor() else {
        debug!(
            path = %file.path().display(),
            processor = processor.name(),
            "No postprocess step, returning block messages unchanged"
        );
        return Ok(PostprocessOutput::Unmerged(messages));
    };

    let merged = postprocessor.postprocess(messages, file.path())?;

    debug!(
        path = %file.path().display(),
        processor = processor.name(),
        messages = merged.len(),
        "Postprocessed file"
    );

    Ok(PostprocessOutput::Merged(merged))
}
