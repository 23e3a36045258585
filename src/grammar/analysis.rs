//! Static checks over a compiled grammar.
//!
//! PEG evaluation of a left-recursive rule never terminates, so such grammars
//! are rejected at build time. A rule is left-recursive when it can reach
//! itself through references that are tried before any input is consumed.

use super::{Expr, Grammar, RuleId};
use crate::errors::{GrammarError, Source};

/// Whether each rule can succeed without consuming input, indexed by `RuleId`.
pub fn nullable_rules(grammar: &Grammar) -> Vec<bool> {
    let mut nullable = vec![false; grammar.len()];
    let mut changed = true;
    while changed {
        changed = false;
        for (id, rule) in grammar.rules() {
            if !nullable[id.index()] && is_nullable(&rule.body, &nullable) {
                nullable[id.index()] = true;
                changed = true;
            }
        }
    }
    nullable
}

pub fn is_nullable(expr: &Expr, nullable: &[bool]) -> bool {
    match expr {
        Expr::Empty | Expr::End | Expr::Repeat(_) | Expr::Optional(_) | Expr::Not(_) => true,
        Expr::Literal(text) => text.is_empty(),
        Expr::Range(..) => false,
        Expr::Rule(id) | Expr::Capture(id) => nullable[id.index()],
        Expr::Sequence(terms) => terms.iter().all(|term| is_nullable(&term.expr, nullable)),
        Expr::Choice(alternatives) => alternatives.iter().any(|alt| is_nullable(alt, nullable)),
    }
}

/// Rules `expr` may call at its starting position.
fn leading_calls(expr: &Expr, nullable: &[bool], out: &mut Vec<RuleId>) {
    match expr {
        Expr::Rule(id) | Expr::Capture(id) => out.push(*id),
        Expr::Sequence(terms) => {
            for term in terms {
                leading_calls(&term.expr, nullable, out);
                if !is_nullable(&term.expr, nullable) {
                    break;
                }
            }
        }
        Expr::Choice(alternatives) => {
            for alt in alternatives {
                leading_calls(alt, nullable, out);
            }
        }
        Expr::Repeat(inner) | Expr::Optional(inner) | Expr::Not(inner) => {
            leading_calls(inner, nullable, out)
        }
        Expr::Empty | Expr::Literal(_) | Expr::Range(..) | Expr::End => {}
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Fails with the first left-recursive cycle found, in declaration order.
pub(crate) fn check_left_recursion(grammar: &Grammar, src: &Source) -> Result<(), GrammarError> {
    let nullable = nullable_rules(grammar);
    let edges: Vec<Vec<RuleId>> = grammar
        .rules()
        .map(|(_, rule)| {
            let mut calls = Vec::new();
            leading_calls(&rule.body, &nullable, &mut calls);
            calls
        })
        .collect();

    let mut marks = vec![Mark::Unvisited; grammar.len()];
    let mut path = Vec::new();
    for (id, _) in grammar.rules() {
        if let Some(cycle) = find_cycle(id, &edges, &mut marks, &mut path) {
            let head = cycle[0];
            let rendered = cycle
                .iter()
                .map(|id| grammar.name(*id))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(GrammarError::LeftRecursion {
                name: grammar.name(head).to_string(),
                cycle: rendered,
                src: src.clone(),
                span: grammar.rule(head).span.into(),
            });
        }
    }
    Ok(())
}

fn find_cycle(
    id: RuleId,
    edges: &[Vec<RuleId>],
    marks: &mut [Mark],
    path: &mut Vec<RuleId>,
) -> Option<Vec<RuleId>> {
    match marks[id.index()] {
        Mark::Done => return None,
        Mark::OnPath => {
            let start = path.iter().position(|p| *p == id).unwrap_or(0);
            let mut cycle = path[start..].to_vec();
            cycle.push(id);
            return Some(cycle);
        }
        Mark::Unvisited => {}
    }

    marks[id.index()] = Mark::OnPath;
    path.push(id);
    for next in &edges[id.index()] {
        if let Some(cycle) = find_cycle(*next, edges, marks, path) {
            return Some(cycle);
        }
    }
    path.pop();
    marks[id.index()] = Mark::Done;
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(text: &str) -> Result<Grammar, GrammarError> {
        Grammar::compile(text, "test")
    }

    #[test]
    fn nullable_follows_references() {
        let grammar = compile("a = b; b = ['x']; c = a 'y';").unwrap();
        let nullable = nullable_rules(&grammar);
        assert_eq!(nullable, vec![true, true, false]);
    }

    #[test]
    fn direct_left_recursion_is_rejected() {
        let err = compile("sum = sum '+' num | num; num = '0'..'9';").unwrap_err();
        match err {
            GrammarError::LeftRecursion { name, cycle, .. } => {
                assert_eq!(name, "sum");
                assert_eq!(cycle, "sum -> sum");
            }
            other => panic!("expected left recursion, got {other:?}"),
        }
    }

    #[test]
    fn indirect_recursion_through_nullable_prefix_is_rejected() {
        let err = compile("a = [' '] b; b = {'-'} a 'x';").unwrap_err();
        assert!(matches!(err, GrammarError::LeftRecursion { ref cycle, .. } if cycle == "a -> b -> a"));
    }

    #[test]
    fn recursion_after_consumption_is_fine() {
        assert!(compile("list = '(' {list} ')';").is_ok());
    }
}
