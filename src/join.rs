use crate::{
    buffer::Buffer,
    classify::Classifier,
    config::Config,
    indent::{self, IndentAction},
    syntax::SyntaxState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinAction {
    /// No adjacent line to join.
    Nothing,
    /// A label ended short of the basic offset; the join space became a tab.
    LabelTab,
    /// A colon-terminated label ended exactly at the basic offset; the join
    /// space was dropped.
    LabelUnpadded,
    /// A label ended past the basic offset; the join space stays.
    LabelKept,
    Indented(IndentAction),
}

/// Joins the current line onto the previous one (or the next line onto
/// this one), then lines up code that now follows a label.
pub fn join_line<S: SyntaxState + ?Sized>(
    buffer: &mut Buffer,
    classifier: &Classifier<'_, S>,
    config: &Config,
    next: bool,
) -> JoinAction {
    let Some(spaced) = buffer.join_line(next) else {
        return JoinAction::Nothing;
    };
    let before = &buffer.current_line()[..buffer.point().column];
    if !classifier.patterns().ends_with_label(before) {
        return JoinAction::Indented(indent::indent(buffer, classifier, config));
    }
    if !spaced {
        return JoinAction::LabelKept;
    }
    let column = buffer.current_column(config.tab_width);
    tracing::trace!("joined after a label at column {column}");
    if column < config.basic_offset {
        buffer.delete_char();
        buffer.insert("\t");
        JoinAction::LabelTab
    } else if column == config.basic_offset && buffer.char_before() == Some(':') {
        buffer.delete_char();
        JoinAction::LabelUnpadded
    } else {
        JoinAction::LabelKept
    }
}
