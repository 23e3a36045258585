//! Fluent construction of a [`Parser`].
//!
//! ```
//! use rulecraft::Builder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let parser = Builder::new()
//!     .from_string("entry = @word {@word}; word = 'a'..'z'#{#'a'..'z'}; = {' '};")
//!     .entries(["entry"])
//!     .max_depth(64)
//!     .build()?;
//! let tree = parser.parse("two words")?;
//! assert_eq!(tree.children().len(), 2);
//! assert_eq!(parser.max_depth(), 64);
//! # Ok(())
//! # }
//! ```

use crate::engine::{Options, Parser};
use crate::errors::GrammarError;
use crate::grammar::Grammar;

/// Rule nesting allowed by default before a parse gives up. Fits the 2 MiB
/// stack of a spawned thread in unoptimized builds.
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone)]
pub struct Builder {
    text: String,
    source_name: String,
    entries: Vec<String>,
    require_full_input: bool,
    max_depth: usize,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            source_name: "grammar".to_string(),
            entries: Vec::new(),
            require_full_input: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Grammar text to compile.
    pub fn from_string(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Name shown in grammar diagnostics, usually the grammar's file name.
    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// Adds entry rules. They are tried in the order given.
    pub fn entries<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.extend(names.into_iter().map(Into::into));
        self
    }

    /// When set, an entry only matches if nothing but skippable text follows
    /// it. Off by default: trailing input is ignored unless the grammar asks
    /// for `$`.
    pub fn require_full_input(mut self, yes: bool) -> Self {
        self.require_full_input = yes;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn build(self) -> Result<Parser, GrammarError> {
        let grammar = Grammar::compile(&self.text, &self.source_name)?;
        if self.entries.is_empty() {
            return Err(GrammarError::NoEntry);
        }
        let entries = self
            .entries
            .into_iter()
            .map(|name| {
                grammar
                    .rule_id(&name)
                    .ok_or(GrammarError::UnknownEntry { name })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Parser::new(
            grammar,
            entries,
            Options {
                require_full_input: self.require_full_input,
                max_depth: self.max_depth,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let parser = Builder::new()
            .from_string("a = 'a';")
            .entries(["a"])
            .build()
            .unwrap();
        assert!(!parser.requires_full_input());
        assert_eq!(parser.max_depth(), DEFAULT_MAX_DEPTH);
        assert_eq!(parser.entries().collect::<Vec<_>>(), ["a"]);
    }

    #[test]
    fn entries_accumulate() {
        let parser = Builder::new()
            .from_string("a = 'a'; b = 'b';")
            .entries(["b"])
            .entries(vec![String::from("a")])
            .build()
            .unwrap();
        assert_eq!(parser.entries().collect::<Vec<_>>(), ["b", "a"]);
    }

    #[test]
    fn missing_grammar_text_has_no_entry() {
        let err = Builder::new().entries(["a"]).build().unwrap_err();
        assert!(matches!(err, GrammarError::UnknownEntry { ref name } if name == "a"));
    }
}
