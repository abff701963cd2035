use std::{mem, ops::Range};

use crate::{
    syntax::{indentation_end, is_blank},
    Pos,
};

/// Display column reached after `text`, starting from column 0.
pub fn display_width(text: &str, tab_width: usize) -> usize {
    text.chars().fold(0, |column, c| {
        if c == '\t' {
            next_tab_stop(column, tab_width)
        } else {
            column + 1
        }
    })
}

fn next_tab_stop(column: usize, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    (column / tab_width + 1) * tab_width
}

/// Whitespace that advances the display column from `from` to `to`.
pub fn padding(from: usize, to: usize, tab_width: usize, use_tabs: bool) -> String {
    let mut out = String::new();
    let mut column = from;
    if use_tabs {
        while next_tab_stop(column, tab_width) <= to {
            out.push('\t');
            column = next_tab_stop(column, tab_width);
        }
    }
    while column < to {
        out.push(' ');
        column += 1;
    }
    out
}

fn clamp_to_boundary(line: &str, column: usize) -> usize {
    let mut column = column.min(line.len());
    while !line.is_char_boundary(column) {
        column -= 1;
    }
    column
}

/// One change to the buffer text, with enough detail to carry a saved
/// position across it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// `len` bytes inserted at `at`. A position exactly at `at` stays put.
    Insert { at: Pos, len: usize },
    /// `len` bytes removed from `at`, within one line.
    Delete { at: Pos, len: usize },
    /// The leading whitespace of `line` went from `old` to `new` bytes.
    Reindent { line: usize, old: usize, new: usize },
    /// Line `line + 1` was appended to `line`. The upper line was cut to
    /// `head` bytes, and the lower line, less its `dropped` leading bytes,
    /// now starts at `tail`.
    Join {
        line: usize,
        head: usize,
        tail: usize,
        dropped: usize,
    },
}

impl Edit {
    /// Where `pos` ends up once this edit is made.
    pub fn apply(self, pos: Pos) -> Pos {
        match self {
            Self::Insert { at, len } if pos.line == at.line && pos.column > at.column => {
                Pos::new(pos.line, pos.column + len)
            }
            Self::Delete { at, len } if pos.line == at.line && pos.column > at.column => {
                Pos::new(pos.line, pos.column.saturating_sub(len).max(at.column))
            }
            Self::Reindent { line, old, new } if pos.line == line => {
                let column = if pos.column >= old {
                    pos.column - old + new
                } else {
                    pos.column.min(new)
                };
                Pos::new(line, column)
            }
            Self::Join {
                line,
                head,
                tail,
                dropped,
            } => {
                if pos.line == line {
                    Pos::new(line, pos.column.min(head))
                } else if pos.line == line + 1 {
                    Pos::new(line, tail + pos.column.saturating_sub(dropped))
                } else if pos.line > line + 1 {
                    Pos::new(pos.line - 1, pos.column)
                } else {
                    pos
                }
            }
            _ => pos,
        }
    }
}

/// A line-addressed text buffer with a single point. Every change to the
/// text is logged as an [`Edit`] until [`Buffer::take_edits`] drains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    lines: Vec<String>,
    point: Pos,
    trailing_newline: bool,
    crlf: bool,
    edits: Vec<Edit>,
}

impl Buffer {
    pub fn new(text: &str) -> Self {
        let trailing_newline = text.ends_with('\n');
        // the first line break decides how lines are written back
        let crlf = text
            .find('\n')
            .is_some_and(|end| text[..end].ends_with('\r'));
        let body = text.strip_suffix('\n').unwrap_or(text);
        let lines = body
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        Self {
            lines,
            point: Pos::default(),
            trailing_newline,
            crlf,
            edits: Vec::new(),
        }
    }

    pub fn text(&self) -> String {
        let newline = if self.crlf { "\r\n" } else { "\n" };
        let mut text = self.lines.join(newline);
        if self.trailing_newline {
            text.push_str(newline);
        }
        text
    }

    /// Edits made since the last call, oldest first.
    pub fn take_edits(&mut self) -> Vec<Edit> {
        mem::take(&mut self.edits)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn current_line(&self) -> &str {
        &self.lines[self.point.line]
    }

    pub fn point(&self) -> Pos {
        self.point
    }

    /// Moves point, clamping it into the buffer.
    pub fn set_point(&mut self, pos: Pos) {
        let line = pos.line.min(self.lines.len() - 1);
        self.point = Pos {
            line,
            column: clamp_to_boundary(&self.lines[line], pos.column),
        };
    }

    pub fn set_column(&mut self, column: usize) {
        self.set_point(Pos::new(self.point.line, column));
    }

    /// Display column of point.
    pub fn current_column(&self, tab_width: usize) -> usize {
        display_width(&self.current_line()[..self.point.column], tab_width)
    }

    pub fn indentation(&self) -> usize {
        indentation_end(self.current_line())
    }

    pub fn char_before(&self) -> Option<char> {
        self.current_line()[..self.point.column].chars().next_back()
    }

    /// Inserts `text` (no newlines) at point, leaving point after it.
    pub fn insert(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let Pos { line, column } = self.point;
        self.lines[line].insert_str(column, text);
        self.edits.push(Edit::Insert {
            at: self.point,
            len: text.len(),
        });
        self.point.column += text.len();
    }

    /// Deletes the character after point, if any.
    pub fn delete_char(&mut self) -> Option<char> {
        let Pos { line, column } = self.point;
        if column >= self.lines[line].len() {
            return None;
        }
        let c = self.lines[line].remove(column);
        self.edits.push(Edit::Delete {
            at: self.point,
            len: c.len_utf8(),
        });
        Some(c)
    }

    /// Deletes `range` of the current line. Point stays where it was in the
    /// surviving text.
    pub fn delete_range(&mut self, range: Range<usize>) {
        let line = self.point.line;
        let end = clamp_to_boundary(&self.lines[line], range.end);
        let start = clamp_to_boundary(&self.lines[line], range.start).min(end);
        if start == end {
            return;
        }
        self.lines[line].replace_range(start..end, "");
        let edit = Edit::Delete {
            at: Pos::new(line, start),
            len: end - start,
        };
        self.point = edit.apply(self.point);
        self.edits.push(edit);
    }

    /// Replaces the leading whitespace of the current line so the text
    /// starts at display `column`, leaving point at the end of indentation.
    pub fn indent_line_to(&mut self, column: usize, tab_width: usize, use_tabs: bool) {
        let line = &self.lines[self.point.line];
        let old = indentation_end(line);
        let indent = padding(0, column, tab_width, use_tabs);
        let new = indent.len();
        if line[..old] != indent {
            self.lines[self.point.line].replace_range(..old, &indent);
            self.edits.push(Edit::Reindent {
                line: self.point.line,
                old,
                new,
            });
        }
        self.point.column = new;
    }

    /// Joins the current line onto the previous one, or the next line onto
    /// the current one when `next` is set. The whitespace around the join
    /// collapses to one space, or none when either side is empty or the
    /// join sits inside brackets. Point ends at the join, before the space.
    ///
    /// Returns `None` when there is no line to join, otherwise whether a
    /// space was inserted.
    pub fn join_line(&mut self, next: bool) -> Option<bool> {
        let upper = if next {
            self.point.line
        } else {
            self.point.line.checked_sub(1)?
        };
        if upper + 1 >= self.lines.len() {
            return None;
        }
        let lower = self.lines.remove(upper + 1);
        let tail = lower.trim_start_matches(is_blank);
        let head = &mut self.lines[upper];
        head.truncate(head.trim_end_matches(is_blank).len());
        let column = head.len();
        let space = !head.is_empty()
            && !tail.is_empty()
            && !tail.starts_with([')', ']', '}'])
            && !head.ends_with(['(', '[', '{']);
        if space {
            head.push(' ');
        }
        let edit = Edit::Join {
            line: upper,
            head: column,
            tail: head.len(),
            dropped: lower.len() - tail.len(),
        };
        head.push_str(tail);
        self.edits.push(edit);
        self.point = Pos::new(upper, column);
        Some(space)
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trips() {
        for text in ["", "\n", "a\nb", "a\nb\n", "  mov eax, 1\n\n"] {
            assert_eq!(Buffer::new(text).text(), text);
        }
        for text in ["a\r\nb\r\n", "a\r\nb", "\r\n"] {
            assert_eq!(Buffer::new(text).text(), text);
        }
        assert_eq!(Buffer::new("a\r\nb\r\n").lines(), ["a", "b"]);
        // mixed endings are written back in the first line's style
        assert_eq!(Buffer::new("a\nb\r\nc").text(), "a\nb\nc");
        assert_eq!(Buffer::new("").line_count(), 1);
    }

    #[test]
    fn display_columns_expand_tabs() {
        assert_eq!(display_width("", 8), 0);
        assert_eq!(display_width("abc", 8), 3);
        assert_eq!(display_width("\t", 8), 8);
        assert_eq!(display_width("ab\tc", 4), 5);
        assert_eq!(display_width("foo:\t", 8), 8);
    }

    #[test]
    fn padding_with_and_without_tabs() {
        assert_eq!(padding(0, 8, 8, false), "        ");
        assert_eq!(padding(0, 8, 8, true), "\t");
        assert_eq!(padding(3, 10, 4, true), "\t\t  ");
        assert_eq!(padding(5, 5, 8, true), "");
        assert_eq!(padding(9, 5, 8, false), "");
    }

    #[test]
    fn point_is_clamped() {
        let mut buffer = Buffer::new("ab\ncd");
        buffer.set_point(Pos::new(7, 9));
        assert_eq!(buffer.point(), Pos::new(1, 2));
        let mut buffer = Buffer::new("é");
        buffer.set_point(Pos::new(0, 1));
        assert_eq!(buffer.point(), Pos::new(0, 0));
    }

    #[test]
    fn insert_and_delete_at_point() {
        let mut buffer = Buffer::new("mov eax");
        buffer.set_column(3);
        buffer.insert("\t");
        assert_eq!(buffer.current_line(), "mov\t eax");
        assert_eq!(buffer.point().column, 4);
        assert_eq!(buffer.delete_char(), Some(' '));
        assert_eq!(buffer.current_line(), "mov\teax");
        buffer.set_column(7);
        assert_eq!(buffer.delete_char(), None);
    }

    #[test]
    fn indent_line_to_replaces_leading_whitespace() {
        let mut buffer = Buffer::new(" \t mov eax, 1");
        buffer.indent_line_to(8, 8, false);
        assert_eq!(buffer.current_line(), "        mov eax, 1");
        assert_eq!(buffer.point().column, 8);
        buffer.indent_line_to(0, 8, false);
        assert_eq!(buffer.current_line(), "mov eax, 1");
        buffer.indent_line_to(8, 8, true);
        assert_eq!(buffer.current_line(), "\tmov eax, 1");
    }

    #[test]
    fn join_with_previous_line() {
        let mut buffer = Buffer::new("foo:  \n    mov eax, 1\nret");
        buffer.set_point(Pos::new(1, 6));
        assert_eq!(buffer.join_line(false), Some(true));
        assert_eq!(buffer.lines(), ["foo: mov eax, 1", "ret"]);
        assert_eq!(buffer.point(), Pos::new(0, 4));
        assert_eq!(buffer.char_before(), Some(':'));
        assert_eq!(&buffer.current_line()[4..], " mov eax, 1");
    }

    #[test]
    fn join_with_next_line() {
        let mut buffer = Buffer::new("push rax\n   \npop rax");
        assert_eq!(buffer.join_line(true), Some(false));
        assert_eq!(buffer.lines(), ["push rax", "pop rax"]);
        assert_eq!(buffer.point(), Pos::new(0, 8));
        assert_eq!(buffer.join_line(true), Some(true));
        assert_eq!(buffer.lines(), ["push rax pop rax"]);
        assert_eq!(buffer.join_line(true), None);
        assert_eq!(buffer.join_line(false), None);
    }

    fn follow(buffer: &mut Buffer, pos: Pos) -> Pos {
        buffer.take_edits().into_iter().fold(pos, |pos, edit| edit.apply(pos))
    }

    #[test]
    fn saved_positions_follow_edits() {
        let mut buffer = Buffer::new("main:\n  mov eax, 1\nret");
        // `eax` on the second line, `ret` on the third
        let eax = Pos::new(1, 6);
        let ret = Pos::new(2, 0);

        buffer.set_point(Pos::new(1, 0));
        buffer.indent_line_to(8, 8, false);
        let eax = follow(&mut buffer, eax);
        assert_eq!(&buffer.lines()[1][eax.column..], "eax, 1");

        buffer.set_column(buffer.current_line().len());
        buffer.insert("   ; x");
        buffer.set_column(0);
        buffer.delete_char();
        buffer.insert("\t");
        let eax = follow(&mut buffer, eax);
        assert_eq!(buffer.lines()[1], "\t       mov eax, 1   ; x");
        assert_eq!(&buffer.lines()[1][eax.column..], "eax, 1   ; x");

        buffer.join_line(false);
        let (eax, ret) = {
            let edits = buffer.take_edits();
            let apply = |pos: Pos| edits.iter().fold(pos, |pos, edit| edit.apply(pos));
            (apply(eax), apply(ret))
        };
        assert_eq!(&buffer.lines()[0][eax.column..], "eax, 1   ; x");
        assert_eq!(ret, Pos::new(1, 0));

        buffer.set_point(Pos::new(0, 0));
        buffer.delete_range(13..buffer.current_line().len());
        let eax = follow(&mut buffer, eax);
        assert_eq!(buffer.current_line(), "main: mov eax");
        assert_eq!(&buffer.current_line()[eax.column..], "eax");
        assert!(buffer.take_edits().is_empty());
    }

    #[test]
    fn unchanged_indentation_is_not_an_edit() {
        let mut buffer = Buffer::new("        ret");
        buffer.indent_line_to(8, 8, false);
        buffer.insert("");
        buffer.delete_range(3..3);
        assert!(buffer.take_edits().is_empty());
    }

    #[test]
    fn join_does_not_pad_inside_brackets() {
        let mut buffer = Buffer::new("mov eax, [\n  rbx]");
        buffer.set_point(Pos::new(1, 0));
        assert_eq!(buffer.join_line(false), Some(false));
        assert_eq!(buffer.current_line(), "mov eax, [rbx]");
    }
}
