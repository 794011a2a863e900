//! Preprocessing: split a file into derived blocks through its processor.

use lazy_static::lazy_static;
use regex::Regex;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::{debug, warn};

use super::bom::with_bom;
use crate::processors::{Processor, ProcessorError};
use crate::types::{Block, LintMessage, ProcessedFile, ProcessorConfig, VirtualFile};

lazy_static! {
    static ref LINE_PREFIX: Regex = Regex::new(r"(?i)^line \d+:").unwrap();
}

/// Result of preprocessing a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreprocessOutcome {
    /// The processor split the file; derived units are in block order
    Processed { files: Vec<ProcessedFile> },
    /// The processor failed; `errors` holds one fatal message
    Failed { errors: Vec<LintMessage> },
}

impl PreprocessOutcome {
    /// Check if preprocessing succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, PreprocessOutcome::Processed { .. })
    }

    /// Get the derived files, empty on failure.
    pub fn files(&self) -> &[ProcessedFile] {
        match self {
            PreprocessOutcome::Processed { files } => files,
            PreprocessOutcome::Failed { .. } => &[],
        }
    }

    /// Get the fatal messages, empty on success.
    pub fn errors(&self) -> &[LintMessage] {
        match self {
            PreprocessOutcome::Processed { .. } => &[],
            PreprocessOutcome::Failed { errors } => errors,
        }
    }
}

impl Serialize for PreprocessOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PreprocessOutcome", 2)?;
        match self {
            PreprocessOutcome::Processed { files } => {
                state.serialize_field("ok", &true)?;
                state.serialize_field("files", files)?;
            }
            PreprocessOutcome::Failed { errors } => {
                state.serialize_field("ok", &false)?;
                state.serialize_field("errors", errors)?;
            }
        }
        state.end()
    }
}

/// Split `file` into derived units with the configured processor.
///
/// The processor receives the body with its BOM restored. Any error it
/// returns degrades the whole file to a single fatal diagnostic; there is no
/// partial result and no retry. A processor that panics is not caught.
pub fn preprocess(file: &VirtualFile, config: &ProcessorConfig) -> PreprocessOutcome {
    let processor = &config.processor;
    let body = with_bom(file);

    let blocks = match processor.preprocess(&body, file.path()) {
        Ok(blocks) => blocks,
        Err(e) => {
            warn!(
                path = %file.path().display(),
                processor = processor.name(),
                error = %e,
                "Processor failed to preprocess file"
            );
            let location = e.chain().find_map(|cause| cause.downcast_ref::<ProcessorError>());
            let message = LintMessage::preprocessing_error(
                &normalize_error_message(&e.to_string()),
                location.and_then(|l| l.line),
                location.and_then(|l| l.column),
            );
            return PreprocessOutcome::Failed {
                errors: vec![message],
            };
        }
    };

    debug!(
        path = %file.path().display(),
        processor = processor.name(),
        blocks = blocks.len(),
        "Preprocessed file"
    );

    let files = blocks
        .into_iter()
        .enumerate()
        .map(|(index, block)| match block {
            Block::Legacy(text) => ProcessedFile::Legacy(text),
            Block::Structured { text, filename } => {
                ProcessedFile::Virtual(file.derive(index, &filename, text))
            }
        })
        .collect();

    PreprocessOutcome::Processed { files }
}

/// Strip a leading `line N:` marker from a processor error and trim it.
pub fn normalize_error_message(message: &str) -> String {
    LINE_PREFIX.replace(message, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use anyhow::{anyhow, Context, Result};
    use pretty_assertions::assert_eq;

    use crate::processors::{MarkdownProcessor, PassthroughProcessor};
    use crate::types::{FileBody, Severity};

    /// Processor returning a fixed set of blocks and recording its input.
    struct FixedProcessor {
        blocks: Vec<Block>,
        seen: Mutex<Vec<(FileBody, String)>>,
    }

    impl FixedProcessor {
        fn new(blocks: Vec<Block>) -> Self {
            Self {
                blocks,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Processor for FixedProcessor {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn preprocess(&self, body: &FileBody, path: &Path) -> Result<Vec<Block>> {
            self.seen
                .lock()
                .unwrap()
                .push((body.clone(), path.display().to_string()));
            Ok(self.blocks.clone())
        }
    }

    /// Processor that always fails with the given error.
    struct FailingProcessor(fn() -> anyhow::Error);

    impl Processor for FailingProcessor {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn preprocess(&self, _body: &FileBody, _path: &Path) -> Result<Vec<Block>> {
            Err((self.0)())
        }
    }

    fn config(processor: impl Processor + 'static) -> ProcessorConfig {
        ProcessorConfig::new(Arc::new(processor))
    }

    #[test]
    fn test_legacy_string_passes_through() {
        let file = VirtualFile::new("/a/foo.md", "plain text");
        let outcome = preprocess(&file, &config(FixedProcessor::new(vec!["plain text".into()])));

        assert_eq!(
            outcome,
            PreprocessOutcome::Processed {
                files: vec![ProcessedFile::Legacy("plain text".to_string())]
            }
        );
    }

    #[test]
    fn test_structured_blocks_become_virtual_files() {
        let file = VirtualFile::new("/a/foo.md", "").with_physical_path("/disk/foo.md");
        let blocks = vec![Block::new("a", "x.js"), Block::new("b", "y.js")];
        let outcome = preprocess(&file, &config(FixedProcessor::new(blocks)));

        assert!(outcome.is_ok());
        let files: Vec<&VirtualFile> =
            outcome.files().iter().filter_map(|f| f.as_virtual()).collect();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path(), Path::new("/a/foo.md/0_x.js"));
        assert_eq!(files[1].path(), Path::new("/a/foo.md/1_y.js"));
        assert_eq!(files[0].body().as_text(), Some("a"));
        assert_eq!(files[1].body().as_text(), Some("b"));
        for derived in files {
            assert_eq!(derived.physical_path(), Path::new("/disk/foo.md"));
            assert!(!derived.has_bom());
        }
    }

    #[test]
    fn test_mixed_shapes_keep_order_and_index() {
        let file = VirtualFile::new("/a/foo.md", "");
        let blocks = vec!["legacy".into(), Block::new("b", "y.js")];
        let outcome = preprocess(&file, &config(FixedProcessor::new(blocks)));

        let files = outcome.files();
        assert_eq!(files[0], ProcessedFile::Legacy("legacy".to_string()));
        assert_eq!(
            files[1].as_virtual().map(|f| f.path()),
            Some(Path::new("/a/foo.md/1_y.js"))
        );
    }

    #[test]
    fn test_processor_receives_bom_and_path() {
        let processor = Arc::new(FixedProcessor::new(vec![]));
        let config = ProcessorConfig::new(processor.clone());
        let file = VirtualFile::from_text("/a/foo.md", "\u{feff}body");

        let outcome = preprocess(&file, &config);
        assert_eq!(outcome.files(), &[] as &[ProcessedFile]);

        let seen = processor.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            (FileBody::Text("\u{feff}body".to_string()), "/a/foo.md".to_string())
        );
    }

    #[test]
    fn test_processor_receives_bytes_with_bom() {
        let processor = Arc::new(FixedProcessor::new(vec![]));
        let config = ProcessorConfig::new(processor.clone());
        let file = VirtualFile::from_bytes("/a/data.bin", vec![0xEF, 0xBB, 0xBF, 0x00, 0xFF, 0x41]);
        assert_eq!(file.body(), &FileBody::Bytes(vec![0x00, 0xFF, 0x41]));

        assert!(preprocess(&file, &config).is_ok());

        let seen = processor.seen.lock().unwrap();
        assert_eq!(
            seen[0].0,
            FileBody::Bytes(vec![0xEF, 0xBB, 0xBF, 0x00, 0xFF, 0x41])
        );
    }

    #[test]
    fn test_invalid_utf8_bytes_become_fatal_message() {
        let file = VirtualFile::from_bytes("/a/README.md", vec![b'o', b'k', 0xC3, 0x28]);
        let expected = vec![LintMessage::preprocessing_error(
            "invalid UTF-8 at byte offset 2",
            None,
            None,
        )];

        let processors: Vec<Arc<dyn Processor>> = vec![
            Arc::new(PassthroughProcessor::new()),
            Arc::new(MarkdownProcessor::new()),
        ];
        for processor in processors {
            let outcome = preprocess(&file, &ProcessorConfig::new(processor));
            assert_eq!(
                outcome,
                PreprocessOutcome::Failed {
                    errors: expected.clone()
                }
            );

            let error = &outcome.errors()[0];
            assert_eq!(error.message, "Preprocessing error: invalid UTF-8 at byte offset 2");
            assert_eq!(error.rule_id, None);
            assert_eq!(u8::from(error.severity), 2);
            assert!(error.fatal);
        }
    }

    #[test]
    fn test_bom_offsets_invalid_utf8_position() {
        let file = VirtualFile::from_bytes("/a/notes.md", vec![0xEF, 0xBB, 0xBF, b'#', 0xFF]);
        let outcome = preprocess(&file, &config(PassthroughProcessor::new()));

        assert_eq!(
            outcome.errors()[0].message,
            "Preprocessing error: invalid UTF-8 at byte offset 4"
        );
    }

    #[test]
    fn test_error_becomes_fatal_message() {
        let file = VirtualFile::new("/a/foo.md", "");
        let outcome = preprocess(
            &file,
            &config(FailingProcessor(|| ProcessorError::new("line 4: bad token").into())),
        );

        assert!(!outcome.is_ok());
        assert!(outcome.files().is_empty());
        let errors = outcome.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Preprocessing error: bad token");
        assert_eq!(errors[0].rule_id, None);
        assert!(errors[0].fatal);
        assert_eq!(errors[0].severity, Severity::Error);
        assert_eq!(errors[0].line, None);
        assert_eq!(errors[0].column, None);
    }

    #[test]
    fn test_error_location_copied() {
        let file = VirtualFile::new("/a/foo.md", "");
        let outcome = preprocess(
            &file,
            &config(FailingProcessor(|| {
                ProcessorError::new("Unexpected token").at(7, 3).into()
            })),
        );

        let error = &outcome.errors()[0];
        assert_eq!(error.message, "Preprocessing error: Unexpected token");
        assert_eq!((error.line, error.column), (Some(7), Some(3)));
    }

    #[test]
    fn test_error_location_found_through_context() {
        let file = VirtualFile::new("/a/foo.md", "");
        let outcome = preprocess(
            &file,
            &config(FailingProcessor(|| {
                Err::<(), _>(ProcessorError::new("inner").at(2, 1))
                    .context("LINE 12:  template failed  ")
                    .unwrap_err()
            })),
        );

        let error = &outcome.errors()[0];
        assert_eq!(error.message, "Preprocessing error: template failed");
        assert_eq!((error.line, error.column), (Some(2), Some(1)));
    }

    #[test]
    fn test_plain_error_has_no_location() {
        let file = VirtualFile::new("/a/foo.md", "");
        let outcome = preprocess(&file, &config(FailingProcessor(|| anyhow!("boom"))));

        assert_eq!(
            outcome,
            PreprocessOutcome::Failed {
                errors: vec![LintMessage::preprocessing_error("boom", None, None)]
            }
        );
    }

    #[test]
    fn test_normalize_error_message() {
        assert_eq!(normalize_error_message("line 4: bad token"), "bad token");
        assert_eq!(normalize_error_message("Line 10:oops "), "oops");
        assert_eq!(normalize_error_message(" line 4: kept"), "line 4: kept");
        assert_eq!(normalize_error_message("at line 4: kept"), "at line 4: kept");
        assert_eq!(normalize_error_message("line x: kept"), "line x: kept");
    }

    #[test]
    fn test_outcome_serializes_with_ok_flag() {
        let outcome = PreprocessOutcome::Processed {
            files: vec![ProcessedFile::Legacy("plain".to_string())],
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({"ok": true, "files": ["plain"]})
        );
    }
}
