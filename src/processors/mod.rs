//! Processor traits and the bundled processors.

mod base;
mod markdown;
mod passthrough;

use std::sync::Arc;

pub use base::{Postprocessor, Processor, ProcessorError};
pub use markdown::MarkdownProcessor;
pub use passthrough::PassthroughProcessor;

/// Get a bundled processor by name.
pub fn by_name(name: &str) -> Option<Arc<dyn Processor>> {
    match name.trim().to_lowercase().as_str() {
        "passthrough" | "default" => Some(Arc::new(PassthroughProcessor::new())),
        "markdown" | "md" => Some(Arc::new(MarkdownProcessor::new())),
        _ => None,
    }
}

/// List the names of the bundled processors.
pub fn available() -> Vec<&'static str> {
    vec!["passthrough", "markdown"]
}
