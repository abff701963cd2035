//! Lexical classification and line editing for NASM assembly source.
//!
//! The [`patterns`] module compiles the keyword tables into matchers once,
//! [`classify`] uses them to label regions of a line, and the [`indent`],
//! [`comment`] and [`join`] engines drive keystroke-sized edits of a
//! [`Buffer`]. [`Editor`] bundles all of it for a single editing session.

use std::{
    error,
    fmt::{self, Display, Formatter},
    io,
};

pub mod buffer;
pub mod classify;
pub mod comment;
pub mod config;
pub mod editor;
pub mod indent;
pub mod join;
pub mod keywords;
pub mod outline;
pub mod patterns;
pub mod syntax;

pub use buffer::{Buffer, Edit};
pub use classify::{Category, Classifier, Leading, Region};
pub use comment::{CommentAction, MarkStack};
pub use config::{AfterMnemonic, Config};
pub use editor::Editor;
pub use indent::IndentAction;
pub use join::JoinAction;
pub use keywords::{KeywordKind, KeywordSet, KeywordTables};
pub use outline::{OutlineEntry, OutlineKind};
pub use patterns::PatternSet;
pub use syntax::{LineSyntax, NasmSyntax, SyntaxState};

/// A position in a buffer. `column` is a byte offset into the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

impl Pos {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Pos {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

#[derive(Debug)]
pub enum Error {
    /// A keyword table entry that can never match as a whole identifier.
    Keyword(String),
    Pattern(regex::Error),
    Config(String),
    Toml(toml::de::Error),
    Io(io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(msg) => write!(f, "invalid keyword: {msg}"),
            Self::Pattern(e) => write!(f, "cant compile pattern: {e}"),
            Self::Config(msg) => write!(f, "invalid config: {msg}"),
            Self::Toml(e) => write!(f, "cant parse config: {e}"),
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Pattern(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Keyword(_) | Self::Config(_) => None,
        }
    }
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Self {
        Self::Pattern(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
