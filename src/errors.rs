//! Rulecraft error types.
//!
//! Grammar problems surface once, from `Builder::build`, as [`GrammarError`].
//! Input that does not conform surfaces per call as [`ParseError`]. Both carry
//! the offending text so `miette` can render an annotated report.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::source::SourceError;

/// Named text attached to a diagnostic.
pub type Source = Arc<NamedSource<String>>;

pub(crate) fn named_source(name: &str, text: &str) -> Source {
    Arc::new(NamedSource::new(name, text.to_string()))
}

// ============================================================================
// LOCATIONS
// ============================================================================

/// A byte offset together with its 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Resolves `offset` in `text`. Columns count characters, not bytes.
    pub fn locate(text: &str, offset: usize) -> Self {
        let offset = offset.min(text.len());
        let before = &text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

// ============================================================================
// GRAMMAR ERRORS
// ============================================================================

#[derive(Error, Diagnostic, Debug)]
pub enum GrammarError {
    #[error("grammar syntax error: {message}")]
    #[diagnostic(code(rulecraft::grammar::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: Source,
        #[label("invalid syntax")]
        span: SourceSpan,
    },

    #[error("rule `{name}` is referenced but never defined")]
    #[diagnostic(
        code(rulecraft::grammar::undefined_rule),
        help("define it with `{name} = ...;`")
    )]
    UndefinedRule {
        name: String,
        #[source_code]
        src: Source,
        #[label("undefined rule")]
        span: SourceSpan,
    },

    #[error("rule `{name}` is defined more than once")]
    #[diagnostic(code(rulecraft::grammar::duplicate_rule))]
    DuplicateRule {
        name: String,
        #[source_code]
        src: Source,
        #[label("redefined here")]
        span: SourceSpan,
        #[label("first defined here")]
        first: SourceSpan,
    },

    #[error("invalid character literal {literal}: {reason}")]
    #[diagnostic(code(rulecraft::grammar::invalid_character))]
    InvalidCharacter {
        literal: String,
        reason: String,
        #[source_code]
        src: Source,
        #[label("invalid character")]
        span: SourceSpan,
    },

    #[error("rule `{name}` is left-recursive: {cycle}")]
    #[diagnostic(
        code(rulecraft::grammar::left_recursion),
        help("make the rule consume input before it calls itself again")
    )]
    LeftRecursion {
        name: String,
        cycle: String,
        #[source_code]
        src: Source,
        #[label("recursion starts here")]
        span: SourceSpan,
    },

    #[error("no entry rule given")]
    #[diagnostic(
        code(rulecraft::grammar::no_entry),
        help("name at least one rule with `Builder::entries`")
    )]
    NoEntry,

    #[error("entry rule `{name}` is not defined")]
    #[diagnostic(code(rulecraft::grammar::unknown_entry))]
    UnknownEntry { name: String },
}

// ============================================================================
// PARSE ERRORS
// ============================================================================

#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("unexpected {found} at {location}{}; expected {}", in_rule(.rule), expected_list(.expected))]
    #[diagnostic(code(rulecraft::parse::unexpected))]
    Unexpected {
        found: String,
        expected: Vec<String>,
        /// Innermost rule being matched at the failure position.
        rule: Option<String>,
        location: Location,
        #[source_code]
        src: Source,
        #[label("parsing stopped here")]
        span: SourceSpan,
    },

    #[error("rule nesting exceeded {limit} levels at {location} in rule `{rule}`")]
    #[diagnostic(
        code(rulecraft::parse::recursion_limit),
        help("raise the limit with `Builder::max_depth`")
    )]
    RecursionLimit {
        limit: usize,
        rule: String,
        location: Location,
        #[source_code]
        src: Source,
        #[label("limit reached here")]
        span: SourceSpan,
    },
}

impl ParseError {
    /// Where parsing stopped.
    pub fn location(&self) -> Location {
        match self {
            Self::Unexpected { location, .. } | Self::RecursionLimit { location, .. } => *location,
        }
    }
}

fn in_rule(rule: &Option<String>) -> String {
    rule.as_ref()
        .map(|name| format!(" in rule `{name}`"))
        .unwrap_or_default()
}

fn expected_list(expected: &[String]) -> String {
    match expected {
        [] => "different input".to_string(),
        [one] => one.clone(),
        many => format!("one of {}", many.join(", ")),
    }
}

// ============================================================================
// UMBRELLA ERROR
// ============================================================================

/// Any failure the command-line front end can hit.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Source(#[from] SourceError),

    #[error("failed to serialize parse tree")]
    #[diagnostic(code(rulecraft::output::json))]
    Json(#[from] serde_json::Error),
}

/// Prints an error with full miette diagnostics to stderr.
pub fn print_error(error: impl Diagnostic + Send + Sync + 'static) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
