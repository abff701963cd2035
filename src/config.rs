use std::{fs, path::Path};

use indexmap::IndexMap;
use serde_derive::Deserialize;

use crate::{
    keywords::{KeywordKind, KeywordTables},
    Error,
};

/// What the indent key inserts right after a complete mnemonic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AfterMnemonic {
    #[default]
    Tab,
    /// `basic_offset` spaces.
    Space,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic_offset: usize,
    pub after_mnemonic_whitespace: AfterMnemonic,
    pub comment_column: usize,
    pub tab_width: usize,
    pub indent_tabs: bool,
    /// Extra words per category, e.g. project macros to treat as mnemonics.
    pub keywords: IndexMap<KeywordKind, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            basic_offset: 8,
            after_mnemonic_whitespace: AfterMnemonic::Tab,
            comment_column: 40,
            tab_width: 8,
            indent_tabs: false,
            keywords: IndexMap::new(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cant open {}: {e}", path.display())))?;
        tracing::debug!("loading config from {}", path.display());
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.basic_offset == 0 {
            return Err(Error::Config("basic_offset must be positive".into()));
        }
        if self.tab_width == 0 {
            return Err(Error::Config("tab_width must be positive".into()));
        }
        Ok(())
    }

    /// The built-in tables plus any configured extras.
    pub fn keyword_tables(&self) -> Result<KeywordTables, Error> {
        let mut tables = KeywordTables::nasm();
        for (kind, words) in &self.keywords {
            tracing::debug!("adding {} word(s) to the {kind} table", words.len());
            tables.extend(*kind, words)?;
        }
        Ok(tables)
    }
}
