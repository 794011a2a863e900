//! Markdown processor that extracts fenced code blocks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::base::{Postprocessor, Processor};
use crate::types::{Block, FileBody, LintMessage};
use crate::BOM_CHAR;

lazy_static! {
    /// Opening fence: up to 3 spaces, 3+ backticks or tildes, optional info word.
    static ref FENCE_OPEN: Regex = Regex::new(r"^( {0,3})(`{3,}|~{3,})[ \t]*([^\s`]*)").unwrap();
}

/// Where a block sits inside its parent file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BlockOffset {
    /// Lines preceding the block's first content line
    line: usize,
    /// Indentation of the opening fence
    fence_indent: usize,
    /// Spaces actually stripped from each content line
    indents: Vec<usize>,
}

impl BlockOffset {
    /// Column shift for a 1-based line of the block.
    fn indent_at(&self, line: usize) -> usize {
        line.checked_sub(1)
            .and_then(|i| self.indents.get(i))
            .copied()
            .unwrap_or(self.fence_indent)
    }
}

/// An open fence while scanning.
struct OpenFence<'a> {
    marker: char,
    len: usize,
    indent: usize,
    lang: &'a str,
    start_line: usize,
    lines: Vec<&'a str>,
    indents: Vec<usize>,
}

impl<'a> OpenFence<'a> {
    /// Turn the fence into a block, or `None` for untagged fences.
    fn into_block(self) -> Option<(Block, BlockOffset)> {
        if self.lang.is_empty() {
            return None;
        }

        let body: String = self.lines.iter().map(|l| format!("{}\n", l)).collect();
        let filename = format!("code.{}", extension_for(self.lang));
        let offset = BlockOffset {
            line: self.start_line + 1,
            fence_indent: self.indent,
            indents: self.indents,
        };
        Some((Block::new(body, filename), offset))
    }
}

/// Markdown processor for linting fenced code blocks.
///
/// Every fenced block that carries a language tag becomes a named block
/// (`code.js`, `code.rs`, ...). Untagged blocks are prose and are skipped.
/// A fence left open runs to the end of the document.
///
/// Block positions are remembered per path between preprocess and
/// postprocess so diagnostics can be moved back to file coordinates.
/// Preprocessing a path again replaces its entry; a caller that preprocesses
/// a file and never postprocesses it should call [`MarkdownProcessor::discard`],
/// otherwise the entry lives as long as the processor.
pub struct MarkdownProcessor {
    offsets: Mutex<HashMap<PathBuf, Vec<BlockOffset>>>,
}

impl MarkdownProcessor {
    /// Create a new markdown processor.
    pub fn new() -> Self {
        Self {
            offsets: Mutex::new(HashMap::new()),
        }
    }

    /// Drop the recorded block positions of a file that will not be postprocessed.
    pub fn discard(&self, path: &Path) -> Result<()> {
        self.offsets
            .lock()
            .map_err(|_| anyhow!("markdown block table is poisoned"))?
            .remove(path);
        Ok(())
    }

    /// Number of files preprocessed but not yet postprocessed.
    pub fn pending(&self) -> usize {
        self.offsets.lock().map(|table| table.len()).unwrap_or(0)
    }

    /// Scan markdown text for tagged code blocks.
    fn extract(&self, text: &str) -> Vec<(Block, BlockOffset)> {
        let mut blocks = Vec::new();
        let mut open: Option<OpenFence<'_>> = None;

        for (index, line) in text.lines().enumerate() {
            match open.take() {
                None => {
                    if let Some(caps) = FENCE_OPEN.captures(line) {
                        let fence = &caps[2];
                        open = Some(OpenFence {
                            marker: fence.chars().next().unwrap_or('`'),
                            len: fence.len(),
                            indent: caps[1].len(),
                            lang: caps.get(3).map_or("", |m| m.as_str()),
                            start_line: index,
                            lines: Vec::new(),
                            indents: Vec::new(),
                        });
                    }
                }
                Some(mut fence) => {
                    if is_closing_fence(line, fence.marker, fence.len) {
                        blocks.extend(fence.into_block());
                    } else {
                        let content = strip_indent(line, fence.indent);
                        fence.indents.push(line.len() - content.len());
                        fence.lines.push(content);
                        open = Some(fence);
                    }
                }
            }
        }

        if let Some(fence) = open {
            blocks.extend(fence.into_block());
        }

        blocks
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for MarkdownProcessor {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn description(&self) -> &'static str {
        "Extracts fenced code blocks with a language tag from markdown"
    }

    fn preprocess(&self, body: &FileBody, path: &Path) -> Result<Vec<Block>> {
        let text = body.to_text()?;
        let text = text.strip_prefix(BOM_CHAR).unwrap_or(text.as_ref());

        let (blocks, offsets): (Vec<Block>, Vec<BlockOffset>) =
            self.extract(text).into_iter().unzip();

        debug!(path = %path.display(), blocks = blocks.len(), "Extracted code blocks");

        self.offsets
            .lock()
            .map_err(|_| anyhow!("markdown block table is poisoned"))?
            .insert(path.to_path_buf(), offsets);

        Ok(blocks)
    }

    fn postprocessor(&self) -> Option<&dyn Postprocessor> {
        Some(self)
    }
}

impl Postprocessor for MarkdownProcessor {
    fn postprocess(&self, messages: Vec<Vec<LintMessage>>, path: &Path) -> Result<Vec<LintMessage>> {
        let offsets = self
            .offsets
            .lock()
            .map_err(|_| anyhow!("markdown block table is poisoned"))?
            .remove(path)
            .ok_or_else(|| anyhow!("no code blocks recorded for {}", path.display()))?;

        if offsets.len() != messages.len() {
            bail!(
                "expected {} message groups for {}, got {}",
                offsets.len(),
                path.display(),
                messages.len()
            );
        }

        let mut merged = Vec::new();
        for (group, offset) in messages.into_iter().zip(offsets) {
            merged.extend(group.into_iter().map(|message| remap(message, &offset)));
        }

        Ok(merged)
    }
}

/// Move a block-local message to parent file coordinates.
///
/// Columns are shifted by the indentation stripped from the line they sit on.
fn remap(mut message: LintMessage, offset: &BlockOffset) -> LintMessage {
    if let (Some(line), Some(column)) = (message.line, message.column) {
        message.column = Some(column + offset.indent_at(line));
    }
    if let (Some(line), Some(column)) = (message.end_line, message.end_column) {
        message.end_column = Some(column + offset.indent_at(line));
    }
    message.line = message.line.map(|l| l + offset.line);
    message.end_line = message.end_line.map(|l| l + offset.line);
    message
}

fn is_closing_fence(line: &str, marker: char, min_len: usize) -> bool {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return false;
    }

    let run = trimmed.chars().take_while(|&c| c == marker).count();
    run >= min_len && trimmed[run * marker.len_utf8()..].trim().is_empty()
}

/// Remove up to `indent` leading spaces.
fn strip_indent(line: &str, indent: usize) -> &str {
    let spaces = line.bytes().take(indent).take_while(|&b| b == b' ').count();
    &line[spaces..]
}

fn extension_for(lang: &str) -> String {
    let lang = lang.to_lowercase();
    match lang.as_str() {
        "javascript" | "node" => "js".to_string(),
        "typescript" => "ts".to_string(),
        "rust" => "rs".to_string(),
        "python" => "py".to_string(),
        "bash" | "shell" => "sh".to_string(),
        "markdown" => "md".to_string(),
        _ => lang,
    }
}
