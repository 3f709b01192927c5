//! Anchor-based idempotent text patches
//!
//! A patch is a marker check followed by an anchored insertion. The marker
//! check runs first, so a file that already carries the edit is never
//! touched again. Patches never parse the target grammar.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};

use crate::error::Result;

/// Result of a single patch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The file was changed
    Applied,
    /// The marker was found; nothing to do
    AlreadyPresent,
    /// No recognized anchor; the file was left unchanged
    AnchorNotFound,
}

impl PatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, PatchOutcome::Applied)
    }

    pub fn is_anchor_miss(&self) -> bool {
        matches!(self, PatchOutcome::AnchorNotFound)
    }
}

impl fmt::Display for PatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchOutcome::Applied => f.write_str("applied"),
            PatchOutcome::AlreadyPresent => f.write_str("already present"),
            PatchOutcome::AnchorNotFound => f.write_str("anchor not found"),
        }
    }
}

/// Which kind of edit a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchKind {
    /// Plugin, classpath, pod or package declaration
    Dependency,
    /// Import of the Firebase module
    Import,
    /// Initialization call
    Initialization,
    /// Delegate adaptor or push notification wiring
    Wiring,
}

impl fmt::Display for PatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchKind::Dependency => f.write_str("dependency"),
            PatchKind::Import => f.write_str("import"),
            PatchKind::Initialization => f.write_str("initialization"),
            PatchKind::Wiring => f.write_str("wiring"),
        }
    }
}

/// One patch attempt against one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRecord {
    pub path: PathBuf,
    pub kind: PatchKind,
    pub outcome: PatchOutcome,
}

/// Apply `transform` to the file at `path` unless any of `markers` is present
///
/// Read and write failures are returned as errors; an anchor miss is an
/// `Ok(AnchorNotFound)` and leaves the file byte-identical.
pub fn patch_file(
    path: &Path,
    markers: &[&str],
    transform: impl FnOnce(&str) -> Option<String>,
) -> Result<PatchOutcome> {
    let content = fs::read_to_string(path)?;
    let outcome = patch_content(&content, markers, transform);

    match outcome {
        (PatchOutcome::Applied, Some(updated)) => {
            fs::write(path, updated)?;
            debug!("Patched {:?}", path);
            Ok(PatchOutcome::Applied)
        }
        (PatchOutcome::AnchorNotFound, _) => {
            warn!("No insertion anchor found in {:?}", path);
            Ok(PatchOutcome::AnchorNotFound)
        }
        (outcome, _) => Ok(outcome),
    }
}

/// In-memory form of [`patch_file`]
pub fn patch_content(
    content: &str,
    markers: &[&str],
    transform: impl FnOnce(&str) -> Option<String>,
) -> (PatchOutcome, Option<String>) {
    if contains_any(content, markers) {
        return (PatchOutcome::AlreadyPresent, None);
    }
    match transform(content) {
        Some(updated) if updated != content => (PatchOutcome::Applied, Some(updated)),
        Some(_) => (PatchOutcome::AlreadyPresent, None),
        None => (PatchOutcome::AnchorNotFound, None),
    }
}

pub fn contains_any(content: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| content.contains(m))
}

/// Byte offset of the start of the line following the one containing `offset`
///
/// Returns `content.len()` when `offset` is on the last line.
fn next_line_start(content: &str, offset: usize) -> usize {
    match content[offset..].find('\n') {
        Some(i) => offset + i + 1,
        None => content.len(),
    }
}

fn line_start(content: &str, offset: usize) -> usize {
    content[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}

/// Insert `lines` on new lines after the line holding byte `offset`
fn insert_lines_at(content: &str, offset: usize, lines: &[String]) -> String {
    let at = next_line_start(content, offset);
    let mut out = String::with_capacity(content.len() + lines.iter().map(|l| l.len() + 1).sum::<usize>() + 1);
    out.push_str(&content[..at]);
    if at == content.len() && !content.is_empty() && !content.ends_with('\n') {
        out.push('\n');
    }
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&content[at..]);
    out
}

/// Insert `lines` verbatim after the line containing the first `anchor` match
pub fn insert_after_anchor(content: &str, anchor: &Regex, lines: &[&str]) -> Option<String> {
    let m = anchor.find(content)?;
    let owned: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    Some(insert_lines_at(content, m.end().saturating_sub(1).max(m.start()), &owned))
}

/// Insert `statements` as the first lines of the block opened by `anchor`
///
/// `anchor` must end at (or just after) the opening brace. Statements are
/// indented like the first existing body line, or one level deeper than the
/// anchor line for an empty body.
pub fn insert_block_start(content: &str, anchor: &Regex, statements: &[&str]) -> Option<String> {
    let m = anchor.find(content)?;
    let brace_offset = m.end().saturating_sub(1).max(m.start());
    insert_block_start_at(content, brace_offset, statements)
}

/// [`insert_block_start`] for a known opening brace offset
pub fn insert_block_start_at(content: &str, brace_offset: usize, statements: &[&str]) -> Option<String> {
    let body_start = next_line_start(content, brace_offset);

    let brace_line = &content[line_start(content, brace_offset)..];
    let anchor_indent = leading_whitespace(brace_line.lines().next().unwrap_or(""));

    let indent = content[body_start..]
        .lines()
        .find(|l| !l.trim().is_empty())
        .filter(|l| !l.trim_start().starts_with(['}', ']', ')']))
        .map(|l| leading_whitespace(l).to_string())
        .unwrap_or_else(|| format!("{}    ", anchor_indent));

    let lines: Vec<String> = statements
        .iter()
        .map(|s| if s.is_empty() { String::new() } else { format!("{}{}", indent, s) })
        .collect();
    Some(insert_lines_at(content, brace_offset, &lines))
}

/// Offset of the `}` closing the block whose `{` is at `open`
///
/// Braces inside single- or double-quoted strings and `//` comments are
/// ignored. Returns `None` for an unbalanced block.
pub fn matching_brace(content: &str, open: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    i = next_line_start(content, i);
                    continue;
                }
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Whether the `{` at `open` ends its line
pub fn opens_multiline_block(content: &str, open: usize) -> bool {
    let end = next_line_start(content, open);
    content[open + 1..end].trim().is_empty()
}

/// Insert `lines` after the line containing the last match of `anchor`
pub fn insert_after_last(content: &str, anchor: &Regex, lines: &[&str]) -> Option<String> {
    let m = anchor.find_iter(content).last()?;
    let owned: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    Some(insert_lines_at(content, m.start(), &owned))
}

/// Prepend `block` to the file
pub fn prepend(content: &str, block: &str) -> String {
    format!("{}{}", block, content)
}
