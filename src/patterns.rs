use std::{ops::Range, sync::OnceLock};

use regex::Regex;

use crate::{
    keywords::{KeywordKind, KeywordSet, KeywordTables},
    syntax::is_symbol_char,
    Error,
};

const IDENT_HEAD: &str = "[A-Za-z_?]";
const IDENT_TAIL: &str = "[A-Za-z0-9_$#@~?]*";
const SYMBOL_CLASS: &str = "[A-Za-z0-9_$#@~.?%]";
const NOT_SYMBOL: &str = "[^A-Za-z0-9_$#@~.?%]";

/// Tests a single word for membership in one keyword category.
#[derive(Debug, Clone)]
pub struct Matcher {
    kind: KeywordKind,
    regex: Regex,
}

impl Matcher {
    pub fn compile(set: &KeywordSet) -> Result<Self, Error> {
        Ok(Self {
            kind: set.kind(),
            regex: Regex::new(&format!("(?i)^(?:{})$", alternation(set)))?,
        })
    }

    pub fn kind(&self) -> KeywordKind {
        self.kind
    }

    pub fn is_match(&self, word: &str) -> bool {
        self.regex.is_match(word)
    }
}

/// Longest words first, so the alternation never stops at a prefix.
fn alternation(set: &KeywordSet) -> String {
    let mut words: Vec<&str> = set.words().collect();
    words.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    words
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Define,
    Macro,
}

/// Every matcher the classifier and engines use, compiled once.
#[derive(Debug, Clone)]
pub struct PatternSet {
    keywords: Vec<Matcher>,
    nonlocal_label: Regex,
    local_label: Regex,
    constant: Regex,
    section_name: Regex,
    full_instruction: Regex,
    label_before_point: Regex,
    definition: Regex,
}

impl PatternSet {
    pub fn compile(tables: &KeywordTables) -> Result<Self, Error> {
        let keywords = KeywordKind::ALL
            .iter()
            .map(|kind| Matcher::compile(tables.get(*kind)))
            .collect::<Result<Vec<_>, _>>()?;
        let prefixes = alternation(tables.get(KeywordKind::Prefixes));
        let instructions = alternation(tables.get(KeywordKind::Instructions));
        let nonlocal = format!(r"{IDENT_HEAD}{IDENT_TAIL}\s*:");
        let local = format!(r"\.{IDENT_HEAD}{IDENT_TAIL}(?:\s*:)?");
        tracing::trace!("compiled {} keyword matchers", keywords.len());
        Ok(Self {
            keywords,
            nonlocal_label: Regex::new(&format!(r"^\s*({IDENT_HEAD}{IDENT_TAIL})\s*:"))?,
            local_label: Regex::new(&format!(r"^\s*(\.{IDENT_HEAD}{IDENT_TAIL})(\s*:)?"))?,
            constant: Regex::new(r"^\$?[-+]?[0-9][-+_0-9A-Fa-fHhXxDdTtQqOoBbYyeE.]*$")?,
            section_name: Regex::new(r"(?i)^\s*section[ \t]+(\.[A-Za-z0-9_$#@~.?]+)")?,
            full_instruction: Regex::new(&format!(
                r"(?i)^(?:(?:{prefixes})\s+)?(?:{instructions})$"
            ))?,
            label_before_point: Regex::new(&format!(
                r"(?:^|{NOT_SYMBOL})(?:{nonlocal}|{local})$"
            ))?,
            definition: Regex::new(&format!(
                r"(?i)(?:^|{NOT_SYMBOL})(%(define|macro))\s+({SYMBOL_CLASS}+)"
            ))?,
        })
    }

    /// Patterns for the built-in NASM tables, shared by every document.
    pub fn nasm() -> &'static PatternSet {
        static NASM: OnceLock<PatternSet> = OnceLock::new();
        NASM.get_or_init(|| {
            PatternSet::compile(&KeywordTables::nasm()).expect("built-in keyword tables compile")
        })
    }

    pub fn keyword(&self, kind: KeywordKind) -> &Matcher {
        // compiled in KeywordKind::ALL order, which is declaration order
        &self.keywords[kind as usize]
    }

    /// The first keyword category, in classifier order, containing `word`.
    pub fn keyword_kind(&self, word: &str) -> Option<KeywordKind> {
        self.keywords
            .iter()
            .find(|matcher| matcher.is_match(word))
            .map(Matcher::kind)
    }

    /// Name range of a colon-terminated label at the start of `line`.
    pub fn nonlocal_label(&self, line: &str) -> Option<Range<usize>> {
        self.nonlocal_label
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.range())
    }

    /// Name range of a `.`-prefixed label at the start of `line`; the colon
    /// is optional.
    pub fn local_label(&self, line: &str) -> Option<Range<usize>> {
        let name = self.local_label.captures(line)?.get(1)?;
        if line[name.end()..].starts_with(is_symbol_char) {
            return None;
        }
        Some(name.range())
    }

    pub fn is_constant(&self, word: &str) -> bool {
        self.constant.is_match(word)
    }

    /// Range of the dotted name following a leading `section` directive.
    pub fn section_name(&self, line: &str) -> Option<Range<usize>> {
        let name = self.section_name.captures(line)?.get(1)?;
        if line[name.end()..].starts_with(is_symbol_char) {
            return None;
        }
        Some(name.range())
    }

    /// Whether `text` is exactly an optional prefix plus one mnemonic.
    pub fn is_full_instruction(&self, text: &str) -> bool {
        self.full_instruction.is_match(text)
    }

    /// Whether `text` ends with a label (nonlocal with colon, or local).
    pub fn ends_with_label(&self, text: &str) -> bool {
        self.label_before_point.is_match(text)
    }

    /// `%define` and `%macro` names on `line`, with the offset of the `%`.
    pub fn definitions<'a>(
        &'a self,
        line: &'a str,
    ) -> impl Iterator<Item = (DefinitionKind, usize, Range<usize>)> + 'a {
        self.definition.captures_iter(line).filter_map(|caps| {
            let directive = caps.get(1)?;
            let kind = if caps.get(2)?.as_str().eq_ignore_ascii_case("macro") {
                DefinitionKind::Macro
            } else {
                DefinitionKind::Define
            };
            Some((kind, directive.start(), caps.get(3)?.range()))
        })
    }
}
