//! Inline code span scanning for Markdown documents
//!
//! Macro invocations are written as inline code, e.g. `` `greet{Ann}` ``.
//! This module finds inline code spans the way CommonMark delimits them
//! (a run of N backticks is closed only by a run of exactly N) and replaces
//! every span whose content expands. Code blocks are copied as is.

use std::ops::Range;

use crate::core::expand::try_expand_with_report;
use crate::core::table::MacroTable;
use crate::utils::error::ExpansionWarning;

/// An inline code span found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSpan {
    /// Byte range of the span in the document, backticks included
    pub range: Range<usize>,
    /// Span content after CommonMark normalization
    pub content: String,
}

/// Result of expanding a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutput {
    pub content: String,
    /// Number of spans replaced by an expansion
    pub expanded: usize,
    pub warnings: Vec<ExpansionWarning>,
}

impl DocumentOutput {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Opening line of a fenced code block
#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: u8,
    len: usize,
}

impl Fence {
    fn opening(line: &str) -> Option<Fence> {
        let rest = strip_indent(line)?;
        let marker = *rest.as_bytes().first()?;
        if marker != b'`' && marker != b'~' {
            return None;
        }
        let len = run_length(rest.as_bytes(), 0, marker);
        if len < 3 {
            return None;
        }
        // Backtick fences may not carry backticks in their info string.
        if marker == b'`' && rest[len..].contains('`') {
            return None;
        }
        Some(Fence { marker, len })
    }

    fn closes(&self, line: &str) -> bool {
        let Some(rest) = strip_indent(line) else {
            return false;
        };
        let len = run_length(rest.as_bytes(), 0, self.marker);
        len >= self.len && rest[len..].trim().is_empty()
    }
}

/// Strip up to three leading spaces. `None` if the line is indented further.
fn strip_indent(line: &str) -> Option<&str> {
    if is_code_indented(line) {
        None
    } else {
        Some(line.trim_start_matches(' '))
    }
}

/// Four spaces or a tab before any content.
fn is_code_indented(line: &str) -> bool {
    let indent = line.bytes().take_while(|b| *b == b' ').count();
    indent > 3 || line.as_bytes().get(indent) == Some(&b'\t')
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn run_length(bytes: &[u8], start: usize, byte: u8) -> usize {
    bytes[start..].iter().take_while(|b| **b == byte).count()
}

/// Find all inline code spans outside code blocks.
///
/// Spans never cross a blank line. Fenced blocks and indented blocks that
/// do not continue a paragraph are skipped.
pub fn find_code_spans(text: &str) -> Vec<CodeSpan> {
    let mut spans = Vec::new();
    let mut fence: Option<Fence> = None;
    let mut paragraph: Option<usize> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        if let Some(open) = fence {
            if open.closes(line) {
                fence = None;
            }
            continue;
        }
        if is_blank(line) {
            if let Some(start) = paragraph.take() {
                scan_prose(text, start..line_start, &mut spans);
            }
            continue;
        }
        if paragraph.is_none() && is_code_indented(line) {
            continue;
        }
        if let Some(open) = Fence::opening(line) {
            if let Some(start) = paragraph.take() {
                scan_prose(text, start..line_start, &mut spans);
            }
            fence = Some(open);
        } else if paragraph.is_none() {
            paragraph = Some(line_start);
        }
    }
    if let Some(start) = paragraph {
        scan_prose(text, start..text.len(), &mut spans);
    }
    spans
}

fn scan_prose(text: &str, range: Range<usize>, spans: &mut Vec<CodeSpan>) {
    let base = range.start;
    let prose = &text[range];
    let bytes = prose.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' if bytes.get(i + 1).is_some_and(u8::is_ascii_punctuation) => i += 2,
            b'`' => {
                let open = run_length(bytes, i, b'`');
                let content_start = i + open;
                match find_closing_run(bytes, content_start, open) {
                    Some(close) => {
                        let end = close + open;
                        spans.push(CodeSpan {
                            range: base + i..base + end,
                            content: normalize_span(&prose[content_start..close]),
                        });
                        i = end;
                    }
                    // No closer: the run is literal text.
                    None => i = content_start,
                }
            }
            _ => i += 1,
        }
    }
}

/// Start of the next backtick run of exactly `len` at or after `from`.
fn find_closing_run(bytes: &[u8], from: usize, len: usize) -> Option<usize> {
    let mut j = from;
    while j < bytes.len() {
        if bytes[j] == b'`' {
            let run = run_length(bytes, j, b'`');
            if run == len {
                return Some(j);
            }
            j += run;
        } else {
            j += 1;
        }
    }
    None
}

/// Line endings become spaces, then one surrounding space is stripped from
/// each side when both are present and the content is not only spaces.
fn normalize_span(raw: &str) -> String {
    let content = raw.replace("\r\n", " ").replace('\n', " ");
    let bytes = content.as_bytes();
    let padded = bytes.len() >= 2 && bytes[0] == b' ' && bytes[bytes.len() - 1] == b' ';
    if padded && !content.bytes().all(|b| b == b' ') {
        content[1..content.len() - 1].to_string()
    } else {
        content
    }
}

/// Replace every inline code span that is an invocation of a known macro
/// with its expansion. Everything else is copied unchanged.
pub fn expand_code_spans(text: &str, table: &MacroTable) -> DocumentOutput {
    let mut content = String::with_capacity(text.len());
    let mut warnings = Vec::new();
    let mut expanded = 0;
    let mut copied = 0;

    for span in find_code_spans(text) {
        let Some(expansion) = try_expand_with_report(&span.content, table) else {
            continue;
        };
        content.push_str(&text[copied..span.range.start]);
        content.push_str(&expansion.content);
        copied = span.range.end;
        expanded += 1;
        warnings.extend(expansion.warnings);
    }
    content.push_str(&text[copied..]);

    tracing::debug!(expanded, warnings = warnings.len(), "document expanded");
    DocumentOutput {
        content,
        expanded,
        warnings,
    }
}
