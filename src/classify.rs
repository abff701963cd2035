use std::{
    fmt::{self, Display, Formatter},
    ops::Range,
};

use crate::{
    keywords::KeywordKind,
    patterns::PatternSet,
    syntax::{indentation_end, symbol_runs, SyntaxState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    SectionName,
    Register,
    Prefix,
    Type,
    Instruction,
    Preprocessor,
    NonlocalLabel,
    LocalLabel,
    Constant,
    Directive,
    Comment,
    String,
}

impl Category {
    /// Lexical categories, highest priority first. Comments and strings are
    /// claimed before any of these.
    pub const PRECEDENCE: [Self; 10] = [
        Self::SectionName,
        Self::Register,
        Self::Prefix,
        Self::Type,
        Self::Instruction,
        Self::Preprocessor,
        Self::NonlocalLabel,
        Self::LocalLabel,
        Self::Constant,
        Self::Directive,
    ];

    pub fn keyword_kind(self) -> Option<KeywordKind> {
        match self {
            Self::Register => Some(KeywordKind::Registers),
            Self::Prefix => Some(KeywordKind::Prefixes),
            Self::Type => Some(KeywordKind::Types),
            Self::Instruction => Some(KeywordKind::Instructions),
            Self::Preprocessor => Some(KeywordKind::Preprocessor),
            Self::Directive => Some(KeywordKind::Directives),
            _ => None,
        }
    }

    pub fn from_keyword_kind(kind: KeywordKind) -> Self {
        match kind {
            KeywordKind::Registers => Self::Register,
            KeywordKind::Prefixes => Self::Prefix,
            KeywordKind::Types => Self::Type,
            KeywordKind::Instructions => Self::Instruction,
            KeywordKind::Preprocessor => Self::Preprocessor,
            KeywordKind::Directives => Self::Directive,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SectionName => "section-name",
            Self::Register => "register",
            Self::Prefix => "prefix",
            Self::Type => "type",
            Self::Instruction => "instruction",
            Self::Preprocessor => "preprocessor",
            Self::NonlocalLabel => "nonlocal-label",
            Self::LocalLabel => "local-label",
            Self::Constant => "constant",
            Self::Directive => "directive",
            Self::Comment => "comment",
            Self::String => "string",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub range: Range<usize>,
    pub category: Category,
}

/// What starts a line, as far as indentation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leading {
    Empty,
    Bracket,
    /// `;;` or more.
    DoubleComment,
    Comment,
    Label(Category),
    Keyword(Category),
    /// Anything else, including bare identifiers that may be macro calls.
    Code,
}

impl Leading {
    /// Lines that belong at column 0 rather than at the basic offset.
    pub fn is_flush_left(self) -> bool {
        matches!(
            self,
            Self::Bracket
                | Self::DoubleComment
                | Self::Label(_)
                | Self::Keyword(Category::Directive | Category::Preprocessor)
        )
    }
}

pub struct Classifier<'a, S: ?Sized> {
    patterns: &'a PatternSet,
    syntax: &'a S,
}

impl<'a, S: SyntaxState + ?Sized> Classifier<'a, S> {
    pub fn new(patterns: &'a PatternSet, syntax: &'a S) -> Self {
        Self { patterns, syntax }
    }

    pub fn patterns(&self) -> &'a PatternSet {
        self.patterns
    }

    /// Keyword category of a single word, if any.
    pub fn keyword(&self, word: &str) -> Option<Category> {
        self.patterns
            .keyword_kind(word)
            .map(Category::from_keyword_kind)
    }

    /// Every classified region of `line`, ordered by position. Earlier
    /// categories claim text first and later ones never overlap them.
    pub fn regions(&self, line: &str) -> Vec<Region> {
        let syntax = self.syntax.scan(line);
        let mut claimed: Vec<Region> = syntax
            .strings
            .iter()
            .map(|span| Region {
                range: span.range.clone(),
                category: Category::String,
            })
            .collect();
        if let Some(start) = syntax.comment {
            claimed.push(Region {
                range: start..line.len(),
                category: Category::Comment,
            });
        }
        let runs = symbol_runs(line);
        for category in Category::PRECEDENCE {
            let candidates: Vec<Range<usize>> = match category {
                Category::SectionName => self.patterns.section_name(line).into_iter().collect(),
                Category::NonlocalLabel => self.patterns.nonlocal_label(line).into_iter().collect(),
                Category::LocalLabel => self.patterns.local_label(line).into_iter().collect(),
                Category::Constant => runs
                    .iter()
                    .filter(|run| self.patterns.is_constant(&line[(*run).clone()]))
                    .cloned()
                    .collect(),
                _ => {
                    let Some(kind) = category.keyword_kind() else {
                        continue;
                    };
                    let matcher = self.patterns.keyword(kind);
                    runs.iter()
                        .filter(|run| matcher.is_match(&line[(*run).clone()]))
                        .cloned()
                        .collect()
                }
            };
            for range in candidates {
                if !claimed.iter().any(|r| overlaps(&r.range, &range)) {
                    claimed.push(Region { range, category });
                }
            }
        }
        claimed.sort_by_key(|region| region.range.start);
        claimed
    }

    /// Category of the region containing `column`, or ending right at it.
    pub fn category_at(&self, line: &str, column: usize) -> Option<Category> {
        self.regions(line)
            .into_iter()
            .find(|region| region.range.start <= column && column <= region.range.end)
            .map(|region| region.category)
    }

    pub fn leading(&self, line: &str) -> Leading {
        let rest = &line[indentation_end(line)..];
        if rest.is_empty() {
            return Leading::Empty;
        }
        if rest.starts_with('[') {
            return Leading::Bracket;
        }
        if rest.starts_with(";;") {
            return Leading::DoubleComment;
        }
        if rest.starts_with(';') {
            return Leading::Comment;
        }
        let word = symbol_runs(rest)
            .into_iter()
            .next()
            .filter(|run| run.start == 0)
            .map(|run| &rest[run]);
        let keyword = word.and_then(|word| self.keyword(word));
        if let Some(category @ (Category::Directive | Category::Preprocessor)) = keyword {
            return Leading::Keyword(category);
        }
        if self.patterns.nonlocal_label(line).is_some() {
            return Leading::Label(Category::NonlocalLabel);
        }
        if self.patterns.local_label(line).is_some() {
            return Leading::Label(Category::LocalLabel);
        }
        match keyword {
            Some(category) => Leading::Keyword(category),
            None => Leading::Code,
        }
    }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::NasmSyntax;

    fn classifier() -> Classifier<'static, NasmSyntax> {
        Classifier::new(PatternSet::nasm(), &NasmSyntax)
    }

    fn regions(line: &str) -> Vec<(&str, Category)> {
        classifier()
            .regions(line)
            .into_iter()
            .map(|region| (&line[region.range], region.category))
            .collect()
    }

    #[test]
    fn instruction_line() {
        assert_eq!(
            regions("    mov eax, dword [rbx+10h] ; load"),
            [
                ("mov", Category::Instruction),
                ("eax", Category::Register),
                ("dword", Category::Type),
                ("rbx", Category::Register),
                ("10h", Category::Constant),
                ("; load", Category::Comment),
            ]
        );
    }

    #[test]
    fn section_line() {
        assert_eq!(
            regions("section .text"),
            [
                ("section", Category::Directive),
                (".text", Category::SectionName),
            ]
        );
    }

    #[test]
    fn labels_and_prefixes() {
        assert_eq!(
            regions("copy: rep movsb"),
            [
                ("copy", Category::NonlocalLabel),
                ("rep", Category::Prefix),
                ("movsb", Category::Instruction),
            ]
        );
        assert_eq!(
            regions(".loop: dec ecx"),
            [
                (".loop", Category::LocalLabel),
                ("dec", Category::Instruction),
                ("ecx", Category::Register),
            ]
        );
        assert_eq!(regions(".loop"), [(".loop", Category::LocalLabel)]);
    }

    #[test]
    fn bare_identifiers_are_not_labels() {
        assert!(regions("foo").is_empty());
        assert_eq!(regions("prologue 16"), [("16", Category::Constant)]);
        assert_eq!(classifier().leading("foo"), Leading::Code);
    }

    #[test]
    fn keywords_inside_strings_and_comments_are_ignored() {
        assert_eq!(
            regions("db \"mov eax\", 0 ; push"),
            [
                ("db", Category::Instruction),
                ("\"mov eax\"", Category::String),
                ("0", Category::Constant),
                ("; push", Category::Comment),
            ]
        );
    }

    #[test]
    fn preprocessor_lines() {
        assert_eq!(
            regions("%define WIDTH 80"),
            [
                ("%define", Category::Preprocessor),
                ("80", Category::Constant),
            ]
        );
    }

    #[test]
    fn category_at_point() {
        let classifier = classifier();
        let line = "  mov eax, 1";
        assert_eq!(classifier.category_at(line, 5), Some(Category::Instruction));
        assert_eq!(classifier.category_at(line, 3), Some(Category::Instruction));
        assert_eq!(classifier.category_at(line, 9), Some(Category::Register));
        assert_eq!(classifier.category_at(line, 12), Some(Category::Constant));
        assert_eq!(classifier.category_at(line, 0), None);
    }

    #[test]
    fn leading_tokens() {
        let classifier = classifier();
        assert_eq!(classifier.leading(""), Leading::Empty);
        assert_eq!(classifier.leading("   \t"), Leading::Empty);
        assert_eq!(classifier.leading("  [bits 64]"), Leading::Bracket);
        assert_eq!(classifier.leading(";; banner"), Leading::DoubleComment);
        assert_eq!(classifier.leading("  ; note"), Leading::Comment);
        assert_eq!(
            classifier.leading("  global main"),
            Leading::Keyword(Category::Directive)
        );
        assert_eq!(
            classifier.leading("%macro m 0"),
            Leading::Keyword(Category::Preprocessor)
        );
        assert_eq!(
            classifier.leading("main:"),
            Leading::Label(Category::NonlocalLabel)
        );
        assert_eq!(
            classifier.leading("\t.loop"),
            Leading::Label(Category::LocalLabel)
        );
        assert_eq!(
            classifier.leading("lock xadd [rdi], eax"),
            Leading::Keyword(Category::Prefix)
        );
        assert_eq!(
            classifier.leading("mov eax, 1"),
            Leading::Keyword(Category::Instruction)
        );
        assert_eq!(classifier.leading("+ 4"), Leading::Code);
    }

    #[test]
    fn flush_left_lines() {
        assert!(Leading::Bracket.is_flush_left());
        assert!(Leading::DoubleComment.is_flush_left());
        assert!(Leading::Label(Category::LocalLabel).is_flush_left());
        assert!(Leading::Keyword(Category::Directive).is_flush_left());
        assert!(Leading::Keyword(Category::Preprocessor).is_flush_left());
        assert!(!Leading::Keyword(Category::Instruction).is_flush_left());
        assert!(!Leading::Comment.is_flush_left());
        assert!(!Leading::Code.is_flush_left());
        assert!(!Leading::Empty.is_flush_left());
    }
}
