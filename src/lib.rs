//! Processor Adapter Library
//!
//! Runs pluggable file processors around an analysis pipeline. A processor
//! splits one file into derived virtual files (for example the fenced code
//! blocks of a markdown document) and later merges the per-block diagnostics
//! back into one ordered list for the original file.

pub mod processing;
pub mod processors;
pub mod types;

pub use processing::{postprocess, preprocess, with_bom, PostprocessOutput, PreprocessOutcome};
pub use processors::{MarkdownProcessor, PassthroughProcessor, Postprocessor, Processor, ProcessorError};
pub use types::{Block, FileBody, LintMessage, ProcessedFile, ProcessorConfig, Severity, VirtualFile};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::processing::*;
    pub use crate::processors::{Postprocessor, Processor, ProcessorError};
    pub use crate::types::*;
}

/// Unicode byte-order mark
pub const BOM_CHAR: char = '\u{FEFF}';

/// UTF-8 encoding of the byte-order mark
pub const BOM_BYTES: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Prefix of the fatal message reported when preprocessing fails
pub const PREPROCESSING_ERROR_PREFIX: &str = "Preprocessing error: ";

/// Processor used when none is configured
pub const DEFAULT_PROCESSOR: &str = "passthrough";
