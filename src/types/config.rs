//! Configuration types for the adapter.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::processors::{self, PassthroughProcessor, Processor};
use crate::DEFAULT_PROCESSOR;

/// The configuration value handed to the orchestrators.
///
/// Only the processor capability is consumed; the adapter never looks at
/// anything else a caller's configuration might carry.
#[derive(Clone)]
pub struct ProcessorConfig {
    /// Processor that splits and merges file content
    pub processor: Arc<dyn Processor>,
}

impl ProcessorConfig {
    /// Create a config for the given processor.
    pub fn new(processor: Arc<dyn Processor>) -> Self {
        Self { processor }
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self::new(Arc::new(PassthroughProcessor::new()))
    }
}

impl fmt::Debug for ProcessorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorConfig")
            .field("processor", &self.processor.name())
            .finish()
    }
}

/// Errors raised while turning settings into a [`ProcessorConfig`].
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unknown processor '{0}' (available: {1})")]
    UnknownProcessor(String, String),
}

/// Settings for the inspection binary, read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterSettings {
    /// Name of the bundled processor to run
    pub processor: String,

    /// Pretty-print JSON output
    pub pretty_json: bool,

    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            processor: DEFAULT_PROCESSOR.to_string(),
            pretty_json: true,
            log_json: false,
        }
    }
}

impl AdapterSettings {
    /// Load settings from environment variables.
    pub fn from_env() -> Self {
        Self {
            processor: std::env::var("PROCESSOR")
                .unwrap_or_else(|_| DEFAULT_PROCESSOR.to_string()),
            pretty_json: std::env::var("PRETTY_JSON")
                .ok()
                .map(|s| parse_flag(&s))
                .unwrap_or(true),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .map(|s| parse_flag(&s))
                .unwrap_or(false),
        }
    }

    /// Resolve the configured processor.
    pub fn build_config(&self) -> Result<ProcessorConfig, SettingsError> {
        processors::by_name(&self.processor)
            .map(ProcessorConfig::new)
            .ok_or_else(|| {
                SettingsError::UnknownProcessor(
                    self.processor.clone(),
                    processors::available().join(", "),
                )
            })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
