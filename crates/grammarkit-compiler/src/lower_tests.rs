use indoc::indoc;

use grammarkit_core::Grammar;

use crate::diagnostics::DiagnosticKind;
use crate::loader::{Compiled, GrammarLoader};

fn compile(source: &str) -> Compiled {
    GrammarLoader::new().compile(source).expect("no fuel limit set")
}

fn compile_valid(source: &str) -> Grammar {
    let Compiled {
        grammar,
        diagnostics,
    } = compile(source);
    assert!(diagnostics.is_empty(), "unexpected diagnostics:\n{diagnostics}");
    grammar.expect("grammar has a header")
}

fn names(grammar: &Grammar, ids: &[grammarkit_core::RuleId]) -> Vec<String> {
    ids.iter().map(|&id| grammar.rule(id).id.clone()).collect()
}

#[test]
fn lexer_and_parser_rules() {
    let grammar = compile_valid(indoc! {r#"
    grammar Arith;
    NUM: [0-9]+;
    WS: [ \t]+ {skip};
    sum: NUM '+' NUM;
    "#});

    insta::assert_snapshot!(grammar, @r"
    grammar Arith;
    NUM: [0-9]+;
    WS {skip}: [ \t]+;
    sum: NUM '+' NUM;
    ");
    assert_eq!(names(&grammar, grammar.lexer_rules()), ["NUM", "WS"]);
    assert_eq!(names(&grammar, grammar.parser_rules()), ["sum"]);
}

#[test]
fn groups_ranges_and_captures() {
    let grammar = compile_valid(indoc! {r#"
    grammar T;
    fragment HEX: ('0'..'9' | [a-f])+;
    TAG: (?<open>'<') ~'>'* $open;
    greeting: 'hello' WORD#name 'bye' $name;
    WORD: [a-z]+;
    "#});

    insta::assert_snapshot!(grammar, @r"
    grammar T;
    fragment HEX: ('0'..'9' | [a-f])+;
    TAG: (?<open> '<') ~'>'* $open;
    greeting: 'hello' WORD#name 'bye' $name;
    WORD: [a-z]+;
    ");
    assert_eq!(names(&grammar, grammar.lexer_rules()), ["TAG", "WORD"]);
}

#[test]
fn dictionary_words_and_identifiers() {
    let grammar = compile_valid(indoc! {r#"
    grammar Words;
    KEYWORD {dictionary}: 'let' 'in' | 'if';
    OP: '+';
    "#});

    let words: Vec<_> = grammar
        .words()
        .iter()
        .map(|w| format!("{}:{}", w.rule, w.value))
        .collect();
    assert_eq!(words, ["KEYWORD:let", "KEYWORD:in", "KEYWORD:if"]);
    let identifiers: Vec<_> = grammar.identifiers().iter().cloned().collect();
    assert_eq!(identifiers, ["let", "in", "if"]);
    assert_eq!(
        grammar.render_rule("KEYWORD").as_deref(),
        Some("'let' | 'in' | 'if'")
    );
}

#[test]
fn dictionary_rejects_non_literals() {
    let Compiled {
        grammar,
        diagnostics,
    } = compile("grammar W;\nBAD {dictionary}: 'a' [b];\n");

    insta::assert_snapshot!(diagnostics, @"error at 33..36: dictionary entries must be literals");
    assert!(grammar.expect("header present").get("BAD").is_none());
}

#[test]
fn rule_level_diagnostics() {
    let Compiled {
        grammar,
        diagnostics,
    } = compile(indoc! {r#"
    grammar G;
    A: 'a';
    A: 'b';
    B {shiny}: C;
    D: 'd' | ;
    E: 'e' $x;
    "#});

    insta::assert_snapshot!(diagnostics, @r"
    error at 19..20: `A` is already defined (related: first defined here at 11..12)
    warning at 30..35: unknown attribute `shiny`
    error at 49..49: empty alternative
    warning at 59..61: `$x` refers to no earlier capture group
    warning at 38..39: `C` is not defined
    ");

    let grammar = grammar.expect("header present");
    let defined: Vec<_> = grammar.rules().keys().cloned().collect();
    assert_eq!(defined, ["A", "B", "E"]);
    assert_eq!(grammar.render_rule("A").as_deref(), Some("'a'"));
}

#[test]
fn extend_appends_to_rule_defined_earlier() {
    let grammar = compile_valid(indoc! {r#"
    grammar G;
    OP: '+';
    OP {extend}: '-' | '*';
    "#});

    assert_eq!(grammar.rules().len(), 1);
    assert_eq!(grammar.render_rule("OP").as_deref(), Some("'+' | '-' | '*'"));
}

#[test]
fn rule_level_group_is_visible_to_other_rules() {
    let grammar = compile_valid(indoc! {r#"
    grammar Greet;
    WORD: [a-z]+;
    greeting: 'hello' name 'bye' $n;
    name {group: n}: WORD;
    "#});

    assert!(grammar.get("greeting").is_some());

    let Compiled { diagnostics, .. } = compile(indoc! {r#"
    grammar Greet;
    WORD: [a-z]+;
    greeting: 'hello' name 'bye' $m;
    name {group: n}: WORD;
    "#});
    insta::assert_snapshot!(diagnostics, @"warning at 58..60: `$m` refers to no earlier capture group");
}

#[test]
fn missing_header() {
    let Compiled {
        grammar,
        diagnostics,
    } = compile("A: 'a';");

    assert!(grammar.is_none());
    insta::assert_snapshot!(diagnostics, @"error at 0..0: missing `grammar Name;` header");
}

#[test]
fn malformed_rule_is_dropped() {
    let Compiled {
        grammar,
        diagnostics,
    } = compile("grammar G;\nA: ('a';\nB: 'b';\n");

    assert!(diagnostics.contains(DiagnosticKind::UnclosedGroup));
    let grammar = grammar.expect("header present");
    assert!(grammar.get("A").is_none());
    assert!(grammar.get("B").is_some());
}

#[test]
fn missing_semicolon_keeps_rule() {
    let Compiled {
        grammar,
        diagnostics,
    } = compile("grammar G;\nA: 'a'\nB: 'b';\n");

    assert_eq!(diagnostics.error_count(), 1);
    let grammar = grammar.expect("header present");
    assert_eq!(grammar.rules().len(), 2);
}

#[test]
fn invalid_patterns() {
    let Compiled {
        grammar,
        diagnostics,
    } = compile("grammar G;\nR: 'ab'..'z';\nX: [z-a];\nOK: 'ok';\n");

    let kinds: Vec<_> = diagnostics.iter().map(|d| d.kind()).collect();
    assert_eq!(
        kinds,
        [DiagnosticKind::InvalidPattern, DiagnosticKind::InvalidPattern]
    );
    assert_eq!(
        diagnostics.iter().next().map(|d| d.message().to_string()).as_deref(),
        Some("invalid pattern: range bounds must be single characters")
    );
    let defined: Vec<_> = grammar
        .expect("header present")
        .rules()
        .keys()
        .cloned()
        .collect();
    assert_eq!(defined, ["OK"]);
}

#[test]
fn recursion_warnings() {
    let Compiled {
        grammar,
        diagnostics,
    } = compile(indoc! {r#"
    grammar R;
    loop: 'a' loop;
    expr: expr '+' NUM | NUM;
    NUM: [0-9]+;
    "#});

    insta::assert_snapshot!(diagnostics, @r"
    warning at 11..15: infinite recursion: `loop` has no escape path
    warning at 27..31: `expr` is left recursive
    ");
    assert_eq!(grammar.expect("header present").rules().len(), 3);
}

#[test]
fn precedence_orders_rules() {
    let grammar = compile_valid(indoc! {r#"
    grammar P;
    B {precedence: 5}: 'b';
    A {precedence: 10}: 'a';
    "#});
    assert_eq!(names(&grammar, grammar.lexer_rules()), ["A", "B"]);

    let grammar = compile_valid(indoc! {r#"
    grammar P;
    X {precedence: <Y}: 'x';
    Y: 'y';
    "#});
    assert_eq!(names(&grammar, grammar.lexer_rules()), ["Y", "X"]);
}

#[test]
fn precedence_diagnostics() {
    let Compiled { diagnostics, .. } = compile(indoc! {r#"
    grammar P;
    A {precedence: <Z}: 'a';
    B {precedence: soon}: 'b';
    "#});

    insta::assert_snapshot!(diagnostics, @r"
    warning at 39..55: invalid precedence: soon
    warning at 14..28: precedence refers to undefined rule `Z`
    ");
}

#[test]
fn cyclic_precedence_is_ambiguous() {
    let Compiled { diagnostics, .. } = compile(indoc! {r#"
    grammar P;
    A {precedence: <B}: 'a';
    B {precedence: <C}: 'b';
    C {precedence: <A}: 'c';
    "#});

    assert!(diagnostics.contains(DiagnosticKind::AmbiguousPrecedence));
    assert!(!diagnostics.has_errors());
}

#[test]
fn rule_attributes() {
    let grammar = compile_valid(indoc! {r#"
    grammar Attrs;
    STR {nested, omit}: '"' [^"]* '"';
    num {group: value, precedence: max}: NUM;
    NUM: [0-9]+;
    "#});

    insta::assert_snapshot!(grammar, @r#"
    grammar Attrs;
    STR {nested, omit}: '"' [^"]* '"';
    num {precedence: max, group: value}: NUM;
    NUM: [0-9]+;
    "#);
    assert_eq!(names(&grammar, grammar.lexer_rules()), ["NUM"]);
}

#[test]
fn unquote_escapes() {
    use crate::lower::unquote;

    assert_eq!(unquote(r"'it\'s'"), "it's");
    assert_eq!(unquote(r#""a\tb""#), "a\tb");
    assert_eq!(unquote(r"'\\'"), "\\");
    assert_eq!(unquote("''"), "");
}
