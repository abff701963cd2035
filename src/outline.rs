use std::fmt::{self, Display, Formatter};

use indexmap::{map::Entry, IndexMap};

use crate::{
    buffer::Buffer,
    patterns::{DefinitionKind, PatternSet},
    syntax::SyntaxState,
    Pos,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineKind {
    Label,
    Define,
    Macro,
}

impl From<DefinitionKind> for OutlineKind {
    fn from(kind: DefinitionKind) -> Self {
        match kind {
            DefinitionKind::Define => Self::Define,
            DefinitionKind::Macro => Self::Macro,
        }
    }
}

impl Display for OutlineKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Label => "label",
            Self::Define => "define",
            Self::Macro => "macro",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub name: String,
    pub kind: OutlineKind,
    pub pos: Pos,
}

/// Label declarations and `%define`/`%macro` definitions in document order.
/// Matches inside comments and strings are skipped.
pub fn outline<S: SyntaxState + ?Sized>(
    buffer: &Buffer,
    patterns: &PatternSet,
    syntax: &S,
) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    for (index, line) in buffer.lines().iter().enumerate() {
        let lexical = syntax.scan(line);
        let quoted = |offset: usize| {
            lexical.comment.is_some_and(|start| offset >= start)
                || lexical.strings.iter().any(|span| span.range.contains(&offset))
        };
        if let Some(range) = patterns.nonlocal_label(line) {
            if !quoted(range.start) {
                entries.push(OutlineEntry {
                    name: line[range.clone()].to_string(),
                    kind: OutlineKind::Label,
                    pos: Pos::new(index, range.start),
                });
            }
        }
        for (kind, directive, name) in patterns.definitions(line) {
            if quoted(directive) {
                continue;
            }
            entries.push(OutlineEntry {
                name: line[name.clone()].to_string(),
                kind: kind.into(),
                pos: Pos::new(index, name.start),
            });
        }
    }
    entries
}

/// Folds entries into a name index. The first declaration of a name wins;
/// later ones are reported and dropped.
pub fn index(entries: &[OutlineEntry]) -> IndexMap<&str, &OutlineEntry> {
    let mut index = IndexMap::new();
    for entry in entries {
        match index.entry(entry.name.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
            Entry::Occupied(first) => {
                tracing::warn!(
                    "{}: `{}` already declared at {}",
                    entry.pos,
                    entry.name,
                    first.get().pos
                );
            }
        }
    }
    index
}
