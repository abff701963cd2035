use std::ops::Range;

use crate::{
    buffer::Buffer,
    classify::Classifier,
    config::{AfterMnemonic, Config},
    syntax::SyntaxState,
    Pos,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentAction {
    /// Point sat right after a mnemonic; operand whitespace was inserted
    /// (or not, for [`AfterMnemonic::None`]).
    AfterMnemonic(AfterMnemonic),
    /// The whole line moved to this display column.
    Reindented(usize),
}

/// The indent key: operand whitespace after a bare mnemonic, otherwise a
/// re-indent of the whole line.
pub fn indent<S: SyntaxState + ?Sized>(
    buffer: &mut Buffer,
    classifier: &Classifier<'_, S>,
    config: &Config,
) -> IndentAction {
    let line = buffer.current_line();
    let start = buffer.indentation();
    let point = buffer.point().column;
    let before = line.get(start..point).unwrap_or_default();
    if classifier.patterns().is_full_instruction(before) {
        tracing::trace!("point {} follows mnemonic `{before}`", buffer.point());
        match config.after_mnemonic_whitespace {
            AfterMnemonic::Tab => buffer.insert("\t"),
            AfterMnemonic::Space => buffer.insert(&" ".repeat(config.basic_offset)),
            AfterMnemonic::None => {}
        }
        return IndentAction::AfterMnemonic(config.after_mnemonic_whitespace);
    }
    IndentAction::Reindented(reindent(buffer, classifier, config))
}

/// Display column the current line's text belongs at.
pub fn target_column<S: SyntaxState + ?Sized>(
    line: &str,
    classifier: &Classifier<'_, S>,
    config: &Config,
) -> usize {
    if classifier.leading(line).is_flush_left() {
        0
    } else {
        config.basic_offset
    }
}

/// Re-indents the current line, keeping point the same distance from the
/// end of the line. Point inside the old indentation lands on the text.
pub fn reindent<S: SyntaxState + ?Sized>(
    buffer: &mut Buffer,
    classifier: &Classifier<'_, S>,
    config: &Config,
) -> usize {
    let from_end = buffer.current_line().len() - buffer.point().column;
    let column = target_column(buffer.current_line(), classifier, config);
    tracing::trace!(
        "line {} indents to column {column} ({:?})",
        buffer.point().line + 1,
        classifier.leading(buffer.current_line())
    );
    buffer.indent_line_to(column, config.tab_width, config.indent_tabs);
    let restored = buffer.current_line().len().saturating_sub(from_end);
    if restored > buffer.point().column {
        buffer.set_column(restored);
    }
    column
}

/// Re-indents every non-empty line in `lines`, restoring point afterwards.
pub fn indent_region<S: SyntaxState + ?Sized>(
    buffer: &mut Buffer,
    classifier: &Classifier<'_, S>,
    config: &Config,
    lines: Range<usize>,
) {
    let saved = buffer.point();
    let end = lines.end.min(buffer.line_count());
    for line in lines.start..end {
        buffer.set_point(Pos::new(line, 0));
        if buffer.current_line().is_empty() {
            continue;
        }
        reindent(buffer, classifier, config);
    }
    tracing::debug!("re-indented lines {}..{end}", lines.start + 1);
    buffer.set_point(saved);
}
