//! Grammar text to [`Grammar`].
//!
//! The notation itself is described by `meta.pest`. Compilation runs in three
//! passes: collect definitions and assign ids, lower every body while
//! resolving references, then reject left recursion.

use std::collections::HashMap;

use pest::error::InputLocation;
use pest::iterators::Pair;
use pest::Parser as _;
use pest_derive::Parser;

use super::{analysis, Expr, Grammar, RuleId, Term};
use crate::errors::{named_source, GrammarError, Source};
use crate::tree::Span;

#[derive(Parser)]
#[grammar = "grammar/meta.pest"]
struct MetaParser;

const SKIP_RULE: &str = "<skip>";

/// A definition seen in pass one, body not yet lowered.
struct Pending<'i> {
    name: Option<Pair<'i, Rule>>,
    body: Pair<'i, Rule>,
}

pub(crate) fn compile(text: &str, source_name: &str) -> Result<Grammar, GrammarError> {
    let src = named_source(source_name, text);
    let mut pairs = MetaParser::parse(Rule::grammar, text)
        .map_err(|e| convert_syntax_error(e, &src))?;
    let grammar = pairs.next().ok_or_else(|| GrammarError::Syntax {
        message: "empty parse".into(),
        src: src.clone(),
        span: (0..0).into(),
    })?;

    let pending: Vec<Pending> = grammar
        .into_inner()
        .filter(|p| p.as_rule() == Rule::definition)
        .map(split_definition)
        .collect();

    let mut index: HashMap<&str, (RuleId, Span)> = HashMap::new();
    let mut skip_span: Option<Span> = None;
    let mut names = Vec::new();
    for def in &pending {
        match &def.name {
            Some(name) => {
                let span = span_of(name);
                if let Some((_, first)) = index.get(name.as_str()) {
                    return Err(duplicate(name.as_str(), span, *first, &src));
                }
                index.insert(name.as_str(), (RuleId::new(names.len()), span));
                names.push((name.as_str().to_string(), span));
            }
            None => {
                let span = span_of(&def.body);
                if let Some(first) = skip_span {
                    return Err(duplicate(SKIP_RULE, span, first, &src));
                }
                skip_span = Some(span);
            }
        }
    }

    let lowering = Lowering { index, src: &src };
    let mut rules = Vec::with_capacity(names.len());
    let mut skip = None;
    let mut names = names.into_iter();
    for def in pending {
        let body = lowering.expr(def.body)?;
        match def.name {
            Some(_) => {
                if let Some((name, span)) = names.next() {
                    rules.push(super::Rule { name, body, span });
                }
            }
            None => skip = Some(body),
        }
    }

    let grammar = Grammar::new(rules, skip);
    analysis::check_left_recursion(&grammar, &src)?;
    Ok(grammar)
}

fn split_definition(pair: Pair<'_, Rule>) -> Pending<'_> {
    let mut name = None;
    let mut body = None;
    for inner in pair.clone().into_inner() {
        match inner.as_rule() {
            Rule::name => name = Some(inner),
            Rule::choice => body = Some(inner),
            _ => {}
        }
    }
    // The meta-grammar requires a body, so `pair` itself is only a fallback.
    Pending {
        name,
        body: body.unwrap_or(pair),
    }
}

fn span_of(pair: &Pair<'_, Rule>) -> Span {
    let span = pair.as_span();
    Span::new(span.start(), span.end())
}

fn duplicate(name: &str, span: Span, first: Span, src: &Source) -> GrammarError {
    GrammarError::DuplicateRule {
        name: name.to_string(),
        src: src.clone(),
        span: span.into(),
        first: first.into(),
    }
}

fn convert_syntax_error(error: pest::error::Error<Rule>, src: &Source) -> GrammarError {
    let span = match error.location {
        InputLocation::Pos(pos) => Span::new(pos, pos),
        InputLocation::Span((start, end)) => Span::new(start, end),
    };
    GrammarError::Syntax {
        message: error.variant.message().into_owned(),
        src: src.clone(),
        span: span.into(),
    }
}

// ============================================================================
// LOWERING
// ============================================================================

struct Lowering<'a> {
    index: HashMap<&'a str, (RuleId, Span)>,
    src: &'a Source,
}

impl Lowering<'_> {
    fn expr(&self, pair: Pair<'_, Rule>) -> Result<Expr, GrammarError> {
        match pair.as_rule() {
            Rule::choice => {
                let mut alternatives = pair
                    .into_inner()
                    .map(|seq| self.expr(seq))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if alternatives.len() == 1 {
                    alternatives.remove(0)
                } else {
                    Expr::Choice(alternatives)
                })
            }
            Rule::sequence => {
                let mut terms = pair
                    .into_inner()
                    .map(|term| self.term(term))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if terms.len() == 1 && !terms[0].adjacent {
                    terms.remove(0).expr
                } else {
                    Expr::Sequence(terms)
                })
            }
            Rule::prefixed => self.prefixed(pair),
            rule => Err(self.syntax(&pair, format!("unexpected {rule:?}"))),
        }
    }

    fn term(&self, pair: Pair<'_, Rule>) -> Result<Term, GrammarError> {
        let mut adjacent = false;
        let mut expr = Expr::Empty;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::adjacent => adjacent = true,
                _ => expr = self.expr(inner)?,
            }
        }
        Ok(Term { adjacent, expr })
    }

    fn prefixed(&self, pair: Pair<'_, Rule>) -> Result<Expr, GrammarError> {
        let Some(inner) = pair.clone().into_inner().next() else {
            return Err(self.syntax(&pair, "empty expression".into()));
        };
        match inner.as_rule() {
            Rule::negation => {
                let operand = self.first_inner(inner)?;
                Ok(Expr::Not(Box::new(self.expr(operand)?)))
            }
            Rule::capture => Ok(Expr::Capture(self.resolve(self.first_inner(inner)?)?)),
            Rule::reference => Ok(Expr::Rule(self.resolve(self.first_inner(inner)?)?)),
            Rule::range => self.range(inner),
            Rule::group => self.expr(self.first_inner(inner)?),
            Rule::repeat => Ok(Expr::Repeat(Box::new(self.expr(self.first_inner(inner)?)?))),
            Rule::optional => Ok(Expr::Optional(Box::new(
                self.expr(self.first_inner(inner)?)?,
            ))),
            Rule::end => Ok(Expr::End),
            Rule::literal => {
                let character = self.first_inner(inner)?;
                let text = match character.as_rule() {
                    Rule::quoted => quoted_body(&character).to_string(),
                    _ => self.char_code(&character)?.to_string(),
                };
                Ok(if text.is_empty() {
                    Expr::Empty
                } else {
                    Expr::Literal(text)
                })
            }
            rule => Err(self.syntax(&inner, format!("unexpected {rule:?}"))),
        }
    }

    fn range(&self, pair: Pair<'_, Rule>) -> Result<Expr, GrammarError> {
        let span = span_of(&pair);
        let mut bounds = pair.into_inner();
        let (Some(low), Some(high)) = (bounds.next(), bounds.next()) else {
            return Err(self.invalid(span, "range needs two bounds"));
        };
        let low = self.single_char(&low)?;
        let high = match high.as_rule() {
            Rule::end => char::MAX,
            _ => self.single_char(&high)?,
        };
        if low > high {
            return Err(self.invalid(span, "range bounds are reversed"));
        }
        Ok(Expr::Range(low, high))
    }

    fn single_char(&self, pair: &Pair<'_, Rule>) -> Result<char, GrammarError> {
        if pair.as_rule() == Rule::char_code {
            return self.char_code(pair);
        }
        let mut chars = quoted_body(pair).chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(self.invalid(
                span_of(pair),
                "range bounds must be a single character",
            )),
        }
    }

    fn char_code(&self, pair: &Pair<'_, Rule>) -> Result<char, GrammarError> {
        let text = pair.as_str();
        u32::from_str_radix(&text[2..], 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.invalid(span_of(pair), "not a valid code point"))
    }

    fn resolve(&self, name: Pair<'_, Rule>) -> Result<RuleId, GrammarError> {
        self.index
            .get(name.as_str())
            .map(|(id, _)| *id)
            .ok_or_else(|| GrammarError::UndefinedRule {
                name: name.as_str().to_string(),
                src: self.src.clone(),
                span: span_of(&name).into(),
            })
    }

    fn first_inner<'i>(&self, pair: Pair<'i, Rule>) -> Result<Pair<'i, Rule>, GrammarError> {
        let fallback = pair.clone();
        pair.into_inner()
            .next()
            .ok_or_else(|| self.syntax(&fallback, "missing operand".into()))
    }

    fn syntax(&self, pair: &Pair<'_, Rule>, message: String) -> GrammarError {
        GrammarError::Syntax {
            message,
            src: self.src.clone(),
            span: span_of(pair).into(),
        }
    }

    fn invalid(&self, span: Span, reason: &str) -> GrammarError {
        GrammarError::InvalidCharacter {
            literal: self.src.inner()[span.start..span.end].to_string(),
            reason: reason.to_string(),
            src: self.src.clone(),
            span: span.into(),
        }
    }
}

/// Text between the quotes of a `quoted` pair, taken verbatim.
fn quoted_body<'i>(pair: &Pair<'i, Rule>) -> &'i str {
    let text = pair.as_str();
    &text[1..text.len() - 1]
}
