// tests/grammar_tests.rs

use miette::Diagnostic;
use rulecraft::{Builder, Expr, Grammar, GrammarError};

fn build(grammar: &str, entry: &str) -> Result<rulecraft::Parser, GrammarError> {
    Builder::new().from_string(grammar).entries([entry]).build()
}

fn code(err: &GrammarError) -> String {
    err.code().map(|c| c.to_string()).unwrap_or_default()
}

#[test]
fn test_compile_counts_rules_and_skip() {
    let grammar = Grammar::compile(
        "// pairs\nentry = @pair {@pair}; pair = 'a'; = {' '};",
        "pairs.grammar",
    )
    .unwrap();
    assert_eq!(grammar.len(), 2);
    assert!(grammar.skip().is_some());
    let names: Vec<_> = grammar.rules().map(|(_, rule)| rule.name.as_str()).collect();
    assert_eq!(names, ["entry", "pair"]);
}

#[test]
fn test_char_codes_and_open_ranges() {
    let grammar = Grammar::compile(r"q = \u0027; any = \x00..$; tab = \x09;", "codes").unwrap();
    let body = |name: &str| &grammar.rule(grammar.rule_id(name).unwrap()).body;
    assert_eq!(body("q"), &Expr::Literal("'".into()));
    assert_eq!(body("any"), &Expr::Range('\0', char::MAX));
    assert_eq!(body("tab"), &Expr::Literal("\t".into()));
}

#[test]
fn test_undefined_reference_is_rejected() {
    let err = build("a = b;", "a").unwrap_err();
    assert!(matches!(err, GrammarError::UndefinedRule { ref name, .. } if name == "b"));
    assert_eq!(code(&err), "rulecraft::grammar::undefined_rule");

    let err = build("a = @missing;", "a").unwrap_err();
    assert!(matches!(err, GrammarError::UndefinedRule { ref name, .. } if name == "missing"));
}

#[test]
fn test_duplicate_rule_is_rejected() {
    let err = build("a = 'x'; a = 'y';", "a").unwrap_err();
    assert!(matches!(err, GrammarError::DuplicateRule { ref name, .. } if name == "a"));
}

#[test]
fn test_second_skip_rule_is_rejected() {
    let err = build("= ' '; a = 'x'; = '\t';", "a").unwrap_err();
    assert!(matches!(err, GrammarError::DuplicateRule { .. }));
}

#[test]
fn test_syntax_error_points_into_the_grammar() {
    let err = build("a = 'x'\nb = 'y';", "a").unwrap_err();
    assert!(matches!(err, GrammarError::Syntax { .. }));
    assert_eq!(code(&err), "rulecraft::grammar::syntax");
    assert!(err.labels().is_some());
}

#[test]
fn test_unterminated_literal_is_a_syntax_error() {
    assert!(matches!(
        build("a = 'x;", "a").unwrap_err(),
        GrammarError::Syntax { .. }
    ));
}

#[test]
fn test_invalid_ranges_are_rejected() {
    assert!(matches!(
        build("a = 'z'..'a';", "a").unwrap_err(),
        GrammarError::InvalidCharacter { .. }
    ));
    assert!(matches!(
        build("a = 'ab'..'z';", "a").unwrap_err(),
        GrammarError::InvalidCharacter { .. }
    ));
    assert!(matches!(
        build(r"a = \uD800..\uDFFF;", "a").unwrap_err(),
        GrammarError::InvalidCharacter { .. }
    ));
}

#[test]
fn test_left_recursion_is_rejected() {
    let err = build("a = b 'x'; b = a | 'y';", "a").unwrap_err();
    match err {
        GrammarError::LeftRecursion { cycle, .. } => {
            assert!(cycle.contains("a -> b -> a") || cycle.contains("b -> a -> b"));
        }
        other => panic!("Expected left recursion, got {other:?}"),
    }

    let err = build("a = {'x'} a 'y';", "a").unwrap_err();
    assert!(matches!(err, GrammarError::LeftRecursion { .. }));
}

#[test]
fn test_recursion_after_input_is_fine() {
    assert!(build("a = '(' [a] ')';", "a").is_ok());
}

#[test]
fn test_entry_checks() {
    let err = Builder::new().from_string("a = 'x';").build().unwrap_err();
    assert!(matches!(err, GrammarError::NoEntry));
    assert_eq!(code(&err), "rulecraft::grammar::no_entry");

    let err = build("a = 'x';", "b").unwrap_err();
    assert!(matches!(err, GrammarError::UnknownEntry { ref name } if name == "b"));
}

#[test]
fn test_grammar_errors_prevent_a_parser() {
    // Only a fully valid grammar yields a parser, whatever the entry.
    for text in ["a = b;", "a = 'x'", "a = a 'x';"] {
        assert!(build(text, "a").is_err(), "{text} should not build");
    }
}
