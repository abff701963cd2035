//! String and comment detection for a single line.
//!
//! The engines only ever ask the questions in [`SyntaxState`]; a host with
//! its own incremental scanner can implement the trait and hand it to
//! [`crate::Editor::with_syntax`]. [`NasmSyntax`] is the stock scanner.

use std::ops::Range;

/// Characters that continue a NASM symbol (identifier, number, keyword).
pub fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '#' | '@' | '~' | '.' | '?' | '%')
}

pub fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Byte offset of the first non-blank character of `line`.
pub fn indentation_end(line: &str) -> usize {
    line.len() - line.trim_start_matches(is_blank).len()
}

/// Byte ranges of maximal symbol runs in `line`.
pub fn symbol_runs(line: &str) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, c) in line.char_indices() {
        match (is_symbol_char(c), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(s..line.len());
    }
    runs
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringSpan {
    /// From the opening quote to one past the closing quote (or end of line).
    pub range: Range<usize>,
    pub closed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSyntax {
    pub strings: Vec<StringSpan>,
    /// Offset of the `;` that opens the trailing comment.
    pub comment: Option<usize>,
}

/// Oracle answering "is this offset inside a string/comment".
///
/// Offsets follow the usual editor convention: a column is inside a region
/// when the character *before* it belongs to the region's body, so the
/// column right after `;` is in the comment and the column of `;` is not.
pub trait SyntaxState {
    fn scan(&self, line: &str) -> LineSyntax;

    fn in_string(&self, line: &str, column: usize) -> bool {
        self.scan(line).strings.iter().any(|span| {
            span.range.start < column
                && (column < span.range.end || (!span.closed && column <= span.range.end))
        })
    }

    fn in_comment(&self, line: &str, column: usize) -> bool {
        self.scan(line).comment.is_some_and(|start| column > start)
    }

    fn comment_start(&self, line: &str) -> Option<usize> {
        self.scan(line).comment
    }
}

impl<S: SyntaxState + ?Sized> SyntaxState for &S {
    fn scan(&self, line: &str) -> LineSyntax {
        (**self).scan(line)
    }
}

/// NASM lexical rules: `;` to end of line is a comment; `"`, `'` and `` ` ``
/// delimit strings, and only backquoted strings honour backslash escapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NasmSyntax;

impl SyntaxState for NasmSyntax {
    fn scan(&self, line: &str) -> LineSyntax {
        let bytes = line.as_bytes();
        let mut syntax = LineSyntax::default();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b';' => {
                    syntax.comment = Some(i);
                    break;
                }
                quote @ (b'"' | b'\'' | b'`') => {
                    let start = i;
                    let mut closed = false;
                    i += 1;
                    while i < bytes.len() {
                        if quote == b'`' && bytes[i] == b'\\' {
                            i += 2;
                            continue;
                        }
                        i += 1;
                        if bytes[i - 1] == quote {
                            closed = true;
                            break;
                        }
                    }
                    let end = i.min(bytes.len());
                    syntax.strings.push(StringSpan {
                        range: start..end,
                        closed,
                    });
                    i = end;
                }
                _ => i += 1,
            }
        }
        syntax
    }
}
