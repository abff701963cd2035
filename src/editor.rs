use std::ops::Range;

use crate::{
    buffer::Buffer,
    classify::{Classifier, Region},
    comment::{self, CommentAction, MarkStack},
    config::Config,
    indent::{self, IndentAction},
    join::{self, JoinAction},
    outline::{self, OutlineEntry},
    patterns::PatternSet,
    syntax::{NasmSyntax, SyntaxState},
};

/// One editing session over one document. Patterns are shared; the buffer,
/// settings and the comment mark stack belong to the session.
pub struct Editor<'p, S = NasmSyntax> {
    buffer: Buffer,
    patterns: &'p PatternSet,
    config: Config,
    syntax: S,
    marks: MarkStack,
}

impl<'p> Editor<'p, NasmSyntax> {
    pub fn new(text: &str, patterns: &'p PatternSet, config: Config) -> Self {
        Self::with_syntax(text, patterns, config, NasmSyntax)
    }
}

impl<'p, S: SyntaxState> Editor<'p, S> {
    pub fn with_syntax(text: &str, patterns: &'p PatternSet, config: Config, syntax: S) -> Self {
        Self {
            buffer: Buffer::new(text),
            patterns,
            config,
            syntax,
            marks: MarkStack::new(),
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    pub fn classifier(&self) -> Classifier<'_, S> {
        Classifier::new(self.patterns, &self.syntax)
    }

    pub fn indent(&mut self) -> IndentAction {
        let classifier = Classifier::new(self.patterns, &self.syntax);
        let action = indent::indent(&mut self.buffer, &classifier, &self.config);
        self.marks.follow(&mut self.buffer);
        action
    }

    pub fn indent_region(&mut self, lines: Range<usize>) {
        let classifier = Classifier::new(self.patterns, &self.syntax);
        indent::indent_region(&mut self.buffer, &classifier, &self.config, lines);
        self.marks.follow(&mut self.buffer);
    }

    pub fn comment(&mut self) -> CommentAction {
        comment::comment(&mut self.buffer, &self.syntax, &mut self.marks, &self.config)
    }

    pub fn kill_comment(&mut self) -> bool {
        let killed = comment::kill_comment(&mut self.buffer, &self.syntax);
        self.marks.follow(&mut self.buffer);
        killed
    }

    pub fn join_line(&mut self, next: bool) -> JoinAction {
        let classifier = Classifier::new(self.patterns, &self.syntax);
        let action = join::join_line(&mut self.buffer, &classifier, &self.config, next);
        self.marks.follow(&mut self.buffer);
        action
    }

    /// Classified regions of every line.
    pub fn highlight(&self) -> Vec<Vec<Region>> {
        let classifier = self.classifier();
        self.buffer
            .lines()
            .iter()
            .map(|line| classifier.regions(line))
            .collect()
    }

    pub fn outline(&self) -> Vec<OutlineEntry> {
        outline::outline(&self.buffer, self.patterns, &self.syntax)
    }

    /// Ends the session, dropping any saved gutter positions.
    pub fn into_text(mut self) -> String {
        self.marks.clear();
        self.buffer.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, LineSyntax, Pos};

    #[test]
    fn typing_session() {
        let mut editor = Editor::new("main:\nmov\n", PatternSet::nasm(), Config::default());
        editor.buffer_mut().set_point(Pos::new(1, 3));

        // tab right after the mnemonic adds operand whitespace
        assert!(matches!(editor.indent(), IndentAction::AfterMnemonic(_)));
        editor.buffer_mut().insert("eax, 1");
        assert_eq!(editor.buffer().current_line(), "mov\teax, 1");

        // tab again re-indents the line, keeping point at the end
        assert_eq!(editor.indent(), IndentAction::Reindented(8));
        assert_eq!(editor.buffer().current_line(), "        mov\teax, 1");
        assert_eq!(editor.buffer().point(), Pos::new(1, 18));

        // out to the gutter and back
        assert!(matches!(editor.comment(), CommentAction::Jumped(_)));
        editor.buffer_mut().insert("exit code");
        assert_eq!(
            editor.comment(),
            CommentAction::Returned(Pos::new(1, 18))
        );

        // pull the instruction up next to its label
        assert_eq!(editor.join_line(false), JoinAction::LabelTab);
        assert!(editor.kill_comment());
        assert_eq!(editor.into_text(), "main:\tmov\teax, 1\n");
    }

    fn text_at_point<'a>(editor: &'a Editor<'_>) -> &'a str {
        &editor.buffer().current_line()[editor.buffer().point().column..]
    }

    #[test]
    fn return_lands_on_code_after_reindent() {
        let mut editor = Editor::new("  mov eax, 1", PatternSet::nasm(), Config::default());
        editor.buffer_mut().set_point(Pos::new(0, 6));
        assert!(matches!(editor.comment(), CommentAction::Jumped(_)));
        // tab from the gutter re-indents the whole line
        assert_eq!(editor.indent(), IndentAction::Reindented(8));
        assert_eq!(
            editor.comment(),
            CommentAction::Returned(Pos::new(0, 12))
        );
        assert!(text_at_point(&editor).starts_with("eax, 1"));
    }

    #[test]
    fn return_lands_on_code_after_join() {
        let mut editor = Editor::new("main:\n  mov eax, 1", PatternSet::nasm(), Config::default());
        editor.buffer_mut().set_point(Pos::new(1, 6));
        assert!(matches!(editor.comment(), CommentAction::Jumped(_)));
        assert_eq!(editor.join_line(false), JoinAction::LabelTab);
        assert_eq!(editor.buffer().line_count(), 1);
        editor
            .buffer_mut()
            .set_point(Pos::new(0, usize::MAX));
        assert_eq!(
            editor.comment(),
            CommentAction::Returned(Pos::new(0, 10))
        );
        assert!(text_at_point(&editor).starts_with("eax, 1"));
    }

    #[test]
    fn highlight_every_line() {
        let editor = Editor::new("section .data\nmsg: db 'hi'", PatternSet::nasm(), Config::default());
        let categories: Vec<Vec<Category>> = editor
            .highlight()
            .into_iter()
            .map(|regions| regions.into_iter().map(|r| r.category).collect())
            .collect();
        assert_eq!(
            categories,
            [
                vec![Category::Directive, Category::SectionName],
                vec![Category::NonlocalLabel, Category::Instruction, Category::String],
            ]
        );
    }

    struct NoComments;

    impl SyntaxState for NoComments {
        fn scan(&self, _line: &str) -> LineSyntax {
            LineSyntax::default()
        }
    }

    #[test]
    fn host_supplied_syntax_state() {
        let mut editor = Editor::with_syntax(
            "    ret ; x",
            PatternSet::nasm(),
            Config::default(),
            NoComments,
        );
        editor.buffer_mut().set_point(Pos::new(0, 11));
        // the host says there is no comment, so this is a jump, not a return
        assert!(matches!(editor.comment(), CommentAction::Jumped(_)));
        assert!(!editor.kill_comment());
    }
}
