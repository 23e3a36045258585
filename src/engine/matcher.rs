//! Per-call matching state.
//!
//! A `Matcher` lives for one `parse` call. It walks the rule graph
//! recursively, appending captured nodes to the caller's child list and
//! truncating that list again whenever a branch fails.

use std::collections::BTreeSet;

use crate::errors::{named_source, Location, ParseError};
use crate::grammar::{Expr, Grammar, RuleId, Term};
use crate::tree::{Node, Span};

/// Rule nesting went past the configured depth.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Overflow {
    offset: usize,
    rule: RuleId,
}

/// `Ok(Some(end))` on a match, `Ok(None)` on failure.
type Step = Result<Option<usize>, Overflow>;

/// Furthest position any terminal failed at, and what was expected there.
#[derive(Debug, Default)]
struct Failure {
    offset: usize,
    expected: BTreeSet<String>,
    rule: Option<RuleId>,
}

pub(crate) struct Matcher<'g, 'i> {
    grammar: &'g Grammar,
    input: &'i str,
    max_depth: usize,
    stack: Vec<RuleId>,
    /// Set while the skip rule runs so it never skips recursively.
    skipping: bool,
    /// Failures inside lookaheads and the skip rule are not reported.
    quiet: usize,
    furthest: Failure,
}

impl<'g, 'i> Matcher<'g, 'i> {
    pub(crate) fn new(grammar: &'g Grammar, input: &'i str, max_depth: usize) -> Self {
        Self {
            grammar,
            input,
            max_depth,
            stack: Vec::new(),
            skipping: false,
            quiet: 0,
            furthest: Failure::default(),
        }
    }

    /// Matches `entry` at offset 0.
    pub(crate) fn entry(&mut self, entry: RuleId, full: bool) -> Result<Option<Node>, Overflow> {
        let mut children = Vec::new();
        let Some(end) = self.rule(entry, 0, &mut children)? else {
            return Ok(None);
        };
        if full {
            let rest = self.skip(end, &mut Vec::new())?;
            if rest < self.input.len() {
                self.fail(rest, || "end of input".to_string());
                return Ok(None);
            }
        }
        Ok(Some(Node::from_match(
            entry,
            Span::new(0, end),
            children,
            self.input,
        )))
    }

    // ========================================================================
    // EVALUATION
    // ========================================================================

    /// `lead` asks for the skip rule to run before the first thing matched.
    ///
    /// Every nested rule passes through this frame; bulky arms stay in helpers.
    fn eval(&mut self, expr: &'g Expr, pos: usize, lead: bool, out: &mut Vec<Node>) -> Step {
        match expr {
            Expr::Sequence(terms) => self.sequence(terms, pos, lead, out),
            Expr::Choice(alternatives) => self.choice(alternatives, pos, lead, out),
            Expr::Repeat(body) => self.repeat(body, pos, lead, out),
            Expr::Optional(body) => {
                let mark = out.len();
                let end = self.eval(body, pos, lead, out)?;
                if end.is_none() {
                    out.truncate(mark);
                }
                Ok(end.or(Some(pos)))
            }
            // Looks at the cursor itself; the next element does any skipping.
            Expr::Not(body) => self.not(body, pos),
            _ if lead => self.skip_then(expr, pos, out),
            Expr::Rule(id) => self.rule(*id, pos, out),
            Expr::Capture(id) => self.capture(*id, pos, out),
            terminal => Ok(self.terminal(terminal, pos)),
        }
    }

    fn choice(
        &mut self,
        alternatives: &'g [Expr],
        pos: usize,
        lead: bool,
        out: &mut Vec<Node>,
    ) -> Step {
        let mark = out.len();
        for alt in alternatives {
            if let Some(end) = self.eval(alt, pos, lead, out)? {
                return Ok(Some(end));
            }
            out.truncate(mark);
        }
        Ok(None)
    }

    fn not(&mut self, body: &'g Expr, pos: usize) -> Step {
        self.quiet += 1;
        let matched = self.eval(body, pos, false, &mut Vec::new());
        self.quiet -= 1;
        Ok(match matched? {
            Some(_) => None,
            None => Some(pos),
        })
    }

    fn skip_then(&mut self, expr: &'g Expr, pos: usize, out: &mut Vec<Node>) -> Step {
        let mark = out.len();
        let at = self.skip(pos, out)?;
        let result = self.eval(expr, at, false, out)?;
        if result.is_none() {
            out.truncate(mark);
        }
        Ok(result)
    }

    fn capture(&mut self, id: RuleId, pos: usize, out: &mut Vec<Node>) -> Step {
        let mut children = Vec::new();
        let Some(end) = self.rule(id, pos, &mut children)? else {
            return Ok(None);
        };
        out.push(Node::from_match(id, Span::new(pos, end), children, self.input));
        Ok(Some(end))
    }

    /// Expressions that never call a rule.
    fn terminal(&mut self, expr: &Expr, pos: usize) -> Option<usize> {
        match expr {
            Expr::Empty => Some(pos),
            Expr::Literal(text) => {
                if self.rest(pos).starts_with(text.as_str()) {
                    Some(pos + text.len())
                } else {
                    self.fail(pos, || format!("{text:?}"));
                    None
                }
            }
            Expr::Range(low, high) => match self.rest(pos).chars().next() {
                Some(c) if (*low..=*high).contains(&c) => Some(pos + c.len_utf8()),
                _ => {
                    self.fail(pos, || format!("{low:?}..{high:?}"));
                    None
                }
            },
            Expr::End => {
                if pos == self.input.len() {
                    Some(pos)
                } else {
                    self.fail(pos, || "end of input".to_string());
                    None
                }
            }
            _ => None,
        }
    }

    fn sequence(&mut self, terms: &'g [Term], pos: usize, lead: bool, out: &mut Vec<Node>) -> Step {
        let mark = out.len();
        let mut cursor = pos;
        for (i, term) in terms.iter().enumerate() {
            let skip_before = !term.adjacent && (i > 0 || lead);
            match self.eval(&term.expr, cursor, skip_before, out)? {
                Some(end) => cursor = end,
                None => {
                    out.truncate(mark);
                    return Ok(None);
                }
            }
        }
        Ok(Some(cursor))
    }

    /// Greedy; an iteration that consumes nothing ends the loop.
    fn repeat(&mut self, body: &'g Expr, pos: usize, lead: bool, out: &mut Vec<Node>) -> Step {
        let mut cursor = pos;
        let mut first = true;
        loop {
            let mark = out.len();
            match self.eval(body, cursor, lead || !first, out)? {
                Some(end) if end > cursor => cursor = end,
                _ => {
                    out.truncate(mark);
                    return Ok(Some(cursor));
                }
            }
            first = false;
        }
    }

    fn rule(&mut self, id: RuleId, pos: usize, out: &mut Vec<Node>) -> Step {
        if self.stack.len() >= self.max_depth {
            return Err(Overflow { offset: pos, rule: id });
        }
        let grammar = self.grammar;
        self.stack.push(id);
        let result = self.eval(&grammar.rule(id).body, pos, false, out);
        self.stack.pop();
        result
    }

    /// Runs the skip rule once at `pos`, returning where it stopped.
    fn skip(&mut self, pos: usize, out: &mut Vec<Node>) -> Result<usize, Overflow> {
        let grammar = self.grammar;
        let Some(body) = grammar.skip() else {
            return Ok(pos);
        };
        if self.skipping {
            return Ok(pos);
        }
        let mark = out.len();
        self.skipping = true;
        self.quiet += 1;
        let result = self.eval(body, pos, false, out);
        self.skipping = false;
        self.quiet -= 1;
        match result? {
            Some(end) => Ok(end),
            None => {
                out.truncate(mark);
                Ok(pos)
            }
        }
    }

    // ========================================================================
    // FAILURE TRACKING
    // ========================================================================

    fn rest(&self, pos: usize) -> &'i str {
        &self.input[pos..]
    }

    fn fail(&mut self, pos: usize, expected: impl FnOnce() -> String) {
        if self.quiet > 0 || pos < self.furthest.offset {
            return;
        }
        if pos > self.furthest.offset {
            self.furthest = Failure {
                offset: pos,
                ..Failure::default()
            };
        }
        if self.furthest.rule.is_none() {
            self.furthest.rule = self.stack.last().copied();
        }
        self.furthest.expected.insert(expected());
    }

    /// Error for a parse in which no entry matched.
    pub(crate) fn into_error(self, source_name: &str) -> ParseError {
        let offset = self.furthest.offset;
        let found = self.rest(offset).chars().next();
        let width = found.map_or(0, char::len_utf8);
        ParseError::Unexpected {
            found: found.map_or_else(|| "end of input".to_string(), |c| format!("{c:?}")),
            expected: self.furthest.expected.into_iter().collect(),
            rule: self
                .furthest
                .rule
                .map(|id| self.grammar.name(id).to_string()),
            location: Location::locate(self.input, offset),
            src: named_source(source_name, self.input),
            span: (offset..offset + width).into(),
        }
    }

    pub(crate) fn overflow_error(&self, overflow: Overflow, source_name: &str) -> ParseError {
        ParseError::RecursionLimit {
            limit: self.max_depth,
            rule: self.grammar.name(overflow.rule).to_string(),
            location: Location::locate(self.input, overflow.offset),
            src: named_source(source_name, self.input),
            span: (overflow.offset..overflow.offset).into(),
        }
    }
}
