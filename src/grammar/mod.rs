//! Compiled grammar representation.
//!
//! A [`Grammar`] is the resolved rule graph produced from grammar text. Rule
//! references are stored as [`RuleId`]s, so every reference is known to point
//! at a defined rule once a `Grammar` exists.

use std::collections::HashMap;

use crate::errors::GrammarError;
use crate::tree::Span;

pub mod analysis;
pub mod meta;

/// Numeric tag of a rule: its index in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u32);

impl RuleId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A rule expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `''`, always matches, consumes nothing.
    Empty,
    /// Exact text.
    Literal(String),
    /// Inclusive character range.
    Range(char, char),
    /// `$`, matches only at the end of the input.
    End,
    /// Reference to another rule. Its captures surface in the caller.
    Rule(RuleId),
    /// `@name`: reference whose match becomes a tree node.
    Capture(RuleId),
    Sequence(Vec<Term>),
    /// Ordered choice.
    Choice(Vec<Expr>),
    /// `{...}`, zero or more.
    Repeat(Box<Expr>),
    /// `[...]`, zero or one.
    Optional(Box<Expr>),
    /// `!...`, negative lookahead.
    Not(Box<Expr>),
}

/// One element of a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// Set by a leading `#`: the skip rule does not run before this element.
    pub adjacent: bool,
    pub expr: Expr,
}

/// A named rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub body: Expr,
    /// Where the rule name appears in the grammar text.
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Vec<Rule>,
    skip: Option<Expr>,
    index: HashMap<String, RuleId>,
}

impl Grammar {
    /// Compiles grammar text without selecting entry rules.
    ///
    /// `source_name` only labels diagnostics.
    pub fn compile(text: &str, source_name: &str) -> Result<Self, GrammarError> {
        meta::compile(text, source_name)
    }

    pub(crate) fn new(rules: Vec<Rule>, skip: Option<Expr>) -> Self {
        let index = rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (rule.name.clone(), RuleId::new(i)))
            .collect();
        Self { rules, skip, index }
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.index()]
    }

    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.index.get(name).copied()
    }

    /// Rule name for a tag.
    pub fn name(&self, id: RuleId) -> &str {
        &self.rule(id).name
    }

    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (RuleId::new(i), rule))
    }

    /// Body of the unnamed skip rule, if the grammar defines one.
    pub fn skip(&self) -> Option<&Expr> {
        self.skip.as_ref()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
