use crate::{
    buffer::{display_width, padding, Buffer},
    config::Config,
    syntax::{is_blank, SyntaxState},
    Pos,
};

pub const COMMENT_START: &str = ";";

/// Inserted after [`COMMENT_START`] when a new gutter comment is opened.
pub const COMMENT_PADDING: &str = " ";

/// Saved code positions for gutter round trips. Only the newest frame is
/// ever returned to; the bound keeps abandoned jumps from piling up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkStack {
    marks: Vec<Pos>,
}

impl MarkStack {
    pub const MAX: usize = 16;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pos: Pos) {
        if self.marks.len() == Self::MAX {
            self.marks.remove(0);
        }
        self.marks.push(pos);
    }

    pub fn pop(&mut self) -> Option<Pos> {
        self.marks.pop()
    }

    /// Carries every saved position across the edits the buffer has logged
    /// since the last call, so a return lands on the same text.
    pub fn follow(&mut self, buffer: &mut Buffer) {
        for edit in buffer.take_edits() {
            for mark in &mut self.marks {
                *mark = edit.apply(*mark);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    /// A bare comment delimiter was inserted at point.
    Inserted,
    /// Point went back to the saved code position.
    Returned(Pos),
    /// Point was in a gutter comment but there was nowhere to return to.
    NoMark,
    /// Point's old position was saved and point moved into the gutter.
    Jumped(Pos),
}

fn is_blank_line(line: &str) -> bool {
    line.chars().all(is_blank)
}

/// The comment key.
pub fn comment<S: SyntaxState + ?Sized>(
    buffer: &mut Buffer,
    syntax: &S,
    marks: &mut MarkStack,
    config: &Config,
) -> CommentAction {
    marks.follow(buffer);
    let line = buffer.current_line();
    let point = buffer.point();
    let indentation = buffer.indentation();

    if is_blank_line(line) || syntax.in_string(line, point.column) {
        buffer.insert(COMMENT_START);
        return CommentAction::Inserted;
    }
    // in the indentation: comment out the whole line
    if point.column <= indentation {
        buffer.insert(COMMENT_START);
        return CommentAction::Inserted;
    }
    let has_comment = syntax.in_comment(line, line.len());
    let has_code = syntax.comment_start(line) != Some(indentation);
    if has_comment && has_code && syntax.in_comment(line, point.column) {
        return match marks.pop() {
            Some(mark) => {
                tracing::debug!("returning from gutter to {mark}");
                buffer.set_point(mark);
                CommentAction::Returned(mark)
            }
            None => {
                tracing::debug!("no saved position to return to from {point}");
                CommentAction::NoMark
            }
        };
    }
    if has_code {
        marks.push(point);
        tracing::debug!("saved {point}, {} mark(s)", marks.len());
        comment_indent(buffer, syntax, config);
        marks.follow(buffer);
        return CommentAction::Jumped(point);
    }
    buffer.insert(COMMENT_START);
    CommentAction::Inserted
}

/// Aligns the line's trailing comment to the gutter, creating one if
/// needed, and puts point at the start of the comment text.
fn comment_indent<S: SyntaxState + ?Sized>(buffer: &mut Buffer, syntax: &S, config: &Config) {
    let line = buffer.current_line();
    let start = syntax.comment_start(line);
    let gap_end = start.unwrap_or(line.len());
    let code_end = line[..gap_end].trim_end_matches(is_blank).len();
    let code_column = display_width(&line[..code_end], config.tab_width);
    let gutter = config.comment_column.max(code_column + 1);
    // `;` run plus the blanks after it
    let leader = start.map(|start| {
        let comment = &line[start..];
        let text = comment.trim_start_matches(';').trim_start_matches(is_blank);
        comment.len() - text.len()
    });

    buffer.set_column(code_end);
    buffer.delete_range(code_end..gap_end);
    buffer.insert(&padding(
        code_column,
        gutter,
        config.tab_width,
        config.indent_tabs,
    ));
    match leader {
        Some(leader) => buffer.set_column(buffer.point().column + leader),
        None => {
            buffer.insert(COMMENT_START);
            buffer.insert(COMMENT_PADDING);
        }
    }
}

/// Removes the current line's trailing comment and the blanks before it.
pub fn kill_comment<S: SyntaxState + ?Sized>(buffer: &mut Buffer, syntax: &S) -> bool {
    let line = buffer.current_line();
    let Some(start) = syntax.comment_start(line) else {
        return false;
    };
    let code_end = line[..start].trim_end_matches(is_blank).len();
    let end = line.len();
    tracing::trace!("killing comment on line {}", buffer.point().line + 1);
    buffer.delete_range(code_end..end);
    true
}
