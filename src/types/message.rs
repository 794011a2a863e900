//! Diagnostic message types.

use serde::{Deserialize, Serialize};

use crate::PREPROCESSING_ERROR_PREFIX;

/// Severity of a diagnostic, serialized as its numeric level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Severity {
    Warning = 1,
    Error = 2,
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity as u8
    }
}

impl TryFrom<u8> for Severity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        match value {
            1 => Ok(Severity::Warning),
            2 => Ok(Severity::Error),
            other => Err(format!("invalid severity: {}", other)),
        }
    }
}

/// A single diagnostic reported against a file.
///
/// Line and column are 1-based. Messages reported against a derived block are
/// in block coordinates until a processor's postprocess step remaps them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintMessage {
    /// Rule that produced this message, `None` for fatal/parser errors
    pub rule_id: Option<String>,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,

    /// Whether analysis of the file was aborted
    #[serde(default)]
    pub fatal: bool,

    /// Syntax node type the message points at
    pub node_type: Option<String>,
}

impl LintMessage {
    /// Create a non-fatal message for a rule.
    pub fn new(rule_id: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id: Some(rule_id.to_string()),
            severity,
            message: message.into(),
            line: None,
            column: None,
            end_line: None,
            end_column: None,
            fatal: false,
            node_type: None,
        }
    }

    /// Create the fatal message reported when a processor fails to preprocess.
    pub fn preprocessing_error(
        detail: &str,
        line: Option<usize>,
        column: Option<usize>,
    ) -> Self {
        Self {
            rule_id: None,
            severity: Severity::Error,
            message: format!("{}{}", PREPROCESSING_ERROR_PREFIX, detail),
            line,
            column,
            end_line: None,
            end_column: None,
            fatal: true,
            node_type: None,
        }
    }

    /// Set the start position.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Set the end position.
    pub fn until(mut self, end_line: usize, end_column: usize) -> Self {
        self.end_line = Some(end_line);
        self.end_column = Some(end_column);
        self
    }

    /// Set the node type.
    pub fn with_node_type(mut self, node_type: &str) -> Self {
        self.node_type = Some(node_type.to_string());
        self
    }
}
