//! Core types for the processor adapter.

mod block;
mod config;
mod file;
mod message;

pub use block::{Block, ProcessedFile};
pub use config::{AdapterSettings, ProcessorConfig, SettingsError};
pub use file::{FileBody, VirtualFile};
pub use message::{LintMessage, Severity};
