//! The runnable parser.
//!
//! A [`Parser`] is an immutable compiled grammar plus its entry rules. All
//! per-call state lives in a matcher created inside [`Parser::parse`], so one
//! parser can serve any number of calls, from any number of threads.

use crate::builder::Builder;
use crate::errors::ParseError;
use crate::grammar::{Grammar, RuleId};
use crate::tree::Node;

mod matcher;

use matcher::Matcher;

/// Name given to input parsed without an explicit source name.
pub const DEFAULT_SOURCE_NAME: &str = "input";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Options {
    pub require_full_input: bool,
    pub max_depth: usize,
}

#[derive(Debug, Clone)]
pub struct Parser {
    grammar: Grammar,
    entries: Vec<RuleId>,
    options: Options,
}

impl Parser {
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn new(grammar: Grammar, entries: Vec<RuleId>, options: Options) -> Self {
        Self {
            grammar,
            entries,
            options,
        }
    }

    /// Parses `text`, trying each entry rule at offset 0 in order.
    pub fn parse(&self, text: &str) -> Result<Node, ParseError> {
        self.parse_named(DEFAULT_SOURCE_NAME, text)
    }

    /// Like [`parse`](Self::parse); `source_name` labels the error report.
    pub fn parse_named(&self, source_name: &str, text: &str) -> Result<Node, ParseError> {
        let mut matcher = Matcher::new(&self.grammar, text, self.options.max_depth);
        for &entry in &self.entries {
            match matcher.entry(entry, self.options.require_full_input) {
                Ok(Some(node)) => return Ok(node),
                Ok(None) => continue,
                Err(overflow) => return Err(matcher.overflow_error(overflow, source_name)),
            }
        }
        Err(matcher.into_error(source_name))
    }

    /// Rule name for a node tag.
    pub fn by_id(&self, id: RuleId) -> &str {
        self.grammar.name(id)
    }

    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.grammar.rule_id(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|id| self.grammar.name(*id))
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn requires_full_input(&self) -> bool {
        self.options.require_full_input
    }

    pub fn max_depth(&self) -> usize {
        self.options.max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeKind;

    fn parser(grammar: &str, entry: &str) -> Parser {
        Builder::new()
            .from_string(grammar)
            .entries([entry])
            .build()
            .unwrap()
    }

    #[test]
    fn negation_consumes_nothing() {
        let p = parser("a = !'x' @rest; rest = {'a'..'z'};", "a");
        let node = p.parse("abc").unwrap();
        assert_eq!(node.children()[0].value(), Some("abc"));
        assert_eq!(node.children()[0].span.start, 0);
        assert!(p.parse("xbc").is_err());
    }

    #[test]
    fn empty_repetition_still_succeeds() {
        let p = parser("a = {@d} 'z'; d = '0'..'9';", "a");
        let node = p.parse("z").unwrap();
        assert_eq!(node.kind, NodeKind::Leaf("z".into()));
    }

    #[test]
    fn nullable_repetition_body_terminates() {
        let p = parser("a = {['x']} 'y';", "a");
        assert!(p.parse("xxy").is_ok());
    }

    #[test]
    fn skip_rule_does_not_skip_adjacent_terms() {
        let p = parser("= {' '}; a = 'a'#'b' 'c';", "a");
        assert!(p.parse("ab  c").is_ok());
        assert!(p.parse("a b c").is_err());
    }

    #[test]
    fn failed_alternative_drops_its_captures() {
        let p = parser("a = @x 'b' | @y; x = 'x'; y = 'x';", "a");
        let node = p.parse("x").unwrap();
        assert_eq!(node.children().len(), 1);
        assert_eq!(p.by_id(node.children()[0].tag), "y");
    }

    #[test]
    fn parser_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Parser>();
    }
}
