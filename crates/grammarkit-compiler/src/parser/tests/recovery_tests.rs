use indoc::indoc;

use super::parse_with_errors;
use crate::Error;
use crate::parser::lexer::lex;
use crate::parser::{Parser, parse, parse_with_parser};

#[test]
fn missing_semicolon_before_next_rule() {
    let input = indoc! {r#"
    grammar G;
    A: 'a'
    B: 'b';
    "#};

    let (parse, diagnostics) = parse_with_errors(input);

    assert_eq!(parse.root().rules().count(), 2);
    insta::assert_snapshot!(diagnostics, @"error at 18..19: expected `;`");
}

#[test]
fn unclosed_group() {
    let input = indoc! {r#"
    grammar G;
    A: ('a' 'b';
    "#};

    let (parse, diagnostics) = parse_with_errors(input);

    insta::assert_snapshot!(diagnostics, @"error at 14..23: missing closing `)`; expected `)` (related: group started here at 14..15)");
    insta::assert_snapshot!(parse.dump(false), @r#"
    Root
      Header
        KwGrammar "grammar"
        Id "G"
        Semicolon ";"
      Rule
        Id "A"
        Colon ":"
        Body
          Branch
            Item
              Group
                ParenOpen "("
                Body
                  Branch
                    Item
                      Literal
                        StringLiteral "'a'"
                    Item
                      Literal
                        StringLiteral "'b'"
        Semicolon ";"
    "#);
}

#[test]
fn unclosed_group_rendered() {
    let input = "A: ('a';";

    let (_, diagnostics) = parse_with_errors(input);

    insta::assert_snapshot!(diagnostics.render(input), @r"
    error: missing closing `)`; expected `)`
      |
    1 | A: ('a';
      |    -^^^^
      |    |
      |    group started here
    ");
}

#[test]
fn stray_close_paren() {
    let input = indoc! {r#"
    grammar G;
    A: 'a' ) 'b';
    "#};

    let (parse, diagnostics) = parse_with_errors(input);

    insta::assert_snapshot!(diagnostics, @"error at 18..19: unmatched `)`");
    let rule = parse.root().rules().next().expect("rule parsed");
    let branch = rule.body().and_then(|b| b.branches().next()).expect("branch parsed");
    assert_eq!(branch.items().count(), 2);
}

#[test]
fn missing_colon() {
    let input = indoc! {r#"
    grammar G;
    A 'a';
    "#};

    let (_, diagnostics) = parse_with_errors(input);

    insta::assert_snapshot!(diagnostics, @"error at 13..16: expected `:`");
}

#[test]
fn header_without_name() {
    let (_, diagnostics) = parse_with_errors("grammar ;");
    insta::assert_snapshot!(diagnostics, @"error at 8..9: expected grammar name");
}

#[test]
fn misplaced_header() {
    let (_, diagnostics) = parse_with_errors("A: 'a';\ngrammar G;");
    insta::assert_snapshot!(diagnostics, @"error at 8..15: `grammar` header must come first");
}

#[test]
fn quantifier_without_item() {
    let (_, diagnostics) = parse_with_errors("A: * 'a';");
    insta::assert_snapshot!(diagnostics, @"error at 3..4: invalid quantifier: nothing to repeat");
}

#[test]
fn repeated_quantifier() {
    let (_, diagnostics) = parse_with_errors("A: 'a'+*;");
    insta::assert_snapshot!(diagnostics, @"error at 7..8: invalid quantifier: repeated quantifier");
}

#[test]
fn unclosed_attributes() {
    let (_, diagnostics) = parse_with_errors("A {skip: 'a';");
    insta::assert_snapshot!(diagnostics, @"error at 2..13: missing closing `}`; expected `}` (related: attributes started here at 2..3)");
}

#[test]
fn garbage_inside_body() {
    let (parse, diagnostics) = parse_with_errors("A: 'a' @ 'b';");

    insta::assert_snapshot!(diagnostics, @"error at 7..8: unexpected token: not a rule item");
    let rule = parse.root().rules().next().expect("rule parsed");
    assert!(rule.has_error_nodes());
}

#[test]
fn top_level_garbage() {
    let (parse, diagnostics) = parse_with_errors("'a'; A: 'b';");

    insta::assert_snapshot!(diagnostics, @r"
    error at 0..3: unexpected token: expected a rule, `import` or `grammar`
    error at 3..4: unexpected token: expected a rule, `import` or `grammar`
    ");
    assert_eq!(parse.root().rules().count(), 1);
}

#[test]
fn recursion_limit() {
    let input = "A: ((('a')));";
    let parser = Parser::new(input, lex(input)).with_depth_limit(Some(2));

    assert!(matches!(
        parse_with_parser(parser),
        Err(Error::RecursionLimitExceeded)
    ));
    assert!(parse(input).is_ok());
}

#[test]
fn step_limit_exhausted() {
    let input = "A: 'a' 'b' 'c' 'd';";
    let parser = Parser::new(input, lex(input)).with_step_limit(Some(3));

    assert!(matches!(
        parse_with_parser(parser),
        Err(Error::ExecFuelExhausted)
    ));
}
