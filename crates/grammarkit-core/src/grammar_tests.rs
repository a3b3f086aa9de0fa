use std::cmp::Ordering;

use crate::{
    Grammar, GrammarRule, MetadataOption, PatternSource, Precedence, Quantifier, RuleClass, RuleId,
    RuleKind, UNMATCHED_RULE_ID,
};

fn literal(g: &mut Grammar, rule: &str, text: &str) -> RuleId {
    let pattern = g.intern_pattern(PatternSource::Literal(text)).unwrap();
    g.alloc(GrammarRule::new(
        rule,
        RuleKind::Literal {
            text: text.to_string(),
            pattern,
        },
    ))
}

fn expression(g: &mut Grammar, rule: &str, source: &str) -> RuleId {
    let pattern = g.intern_pattern(PatternSource::Expression(source)).unwrap();
    g.alloc(GrammarRule::new(
        rule,
        RuleKind::Expression {
            source: source.to_string(),
            pattern,
        },
    ))
}

fn reference(g: &mut Grammar, rule: &str, target: &str) -> RuleId {
    g.alloc(GrammarRule::new(
        rule,
        RuleKind::RuleRef {
            target: target.to_string(),
            class: RuleClass::of(target),
        },
    ))
}

fn quantified(g: &mut Grammar, id: RuleId, quantifier: Quantifier) -> RuleId {
    g.rule_mut(id).quantifier = quantifier;
    id
}

/// Links `items` through `next` and returns the first.
fn seq(g: &mut Grammar, items: &[RuleId]) -> RuleId {
    for pair in items.windows(2) {
        g.rule_mut(pair[0]).next = Some(pair[1]);
    }
    items[0]
}

fn define(g: &mut Grammar, name: &str, alternatives: &[RuleId]) -> RuleId {
    let root = g.alloc(GrammarRule::new(
        name,
        RuleKind::Composite {
            children: Vec::new(),
        },
    ));
    for &alt in alternatives {
        g.arena_mut().push_child(root, alt);
    }
    g.insert_rule(name, root);
    root
}

fn names(g: &Grammar, ids: &[RuleId]) -> Vec<String> {
    ids.iter().map(|&id| g.rule(id).id.clone()).collect()
}

#[test]
fn unmatched_rule_is_built_in() {
    let g = Grammar::new("Empty");
    let unmatched = g.rule(g.unmatched_rule());

    assert_eq!(unmatched.id, UNMATCHED_RULE_ID);
    assert_eq!(unmatched.precedence, Precedence::lowest());
    assert!(g.rules().is_empty());
    assert!(g.lexer_rules().is_empty());

    let RuleKind::Expression { pattern, .. } = &unmatched.kind else {
        panic!("expected expression");
    };
    assert_eq!(g.pattern(*pattern).match_prefix("\n"), Some(1));
}

#[test]
fn rule_sets_partition_by_class() {
    let mut g = Grammar::new("Arith");

    let num = expression(&mut g, "NUM", "[0-9]+");
    define(&mut g, "NUM", &[num]);

    let id = expression(&mut g, "ID", "[a-z]+");
    let root = define(&mut g, "ID", &[id]);
    g.rule_mut(root)
        .precedence
        .relations
        .insert("KEYWORD".into(), Ordering::Less);

    let kw = literal(&mut g, "KEYWORD", "let");
    define(&mut g, "KEYWORD", &[kw]);

    let digit = expression(&mut g, "DIGIT", "[0-9]");
    let root = define(&mut g, "DIGIT", &[digit]);
    g.rule_mut(root).metadata.insert(MetadataOption::Fragment);

    let hidden = literal(&mut g, "HIDDEN", "?");
    let root = define(&mut g, "HIDDEN", &[hidden]);
    g.rule_mut(root).metadata.insert(MetadataOption::Omit);

    let (a, plus, b) = (
        reference(&mut g, "sum", "NUM"),
        literal(&mut g, "sum", "+"),
        reference(&mut g, "sum", "NUM"),
    );
    let body = seq(&mut g, &[a, plus, b]);
    define(&mut g, "sum", &[body]);

    assert_eq!(names(&g, g.lexer_rules()), ["NUM", "KEYWORD", "ID"]);
    assert_eq!(names(&g, g.parser_rules()), ["sum"]);
    assert_eq!(g.rules().len(), 6);
}

#[test]
fn weights_order_rules() {
    let mut g = Grammar::new("W");
    let b = literal(&mut g, "B", "b");
    let b = define(&mut g, "B", &[b]);
    let a = literal(&mut g, "A", "a");
    let a = define(&mut g, "A", &[a]);

    g.rule_mut(a).precedence = Precedence::with_weight(10);
    g.rule_mut(b).precedence = Precedence::with_weight(5);
    let rules = g.rules().clone();
    g.set_rules(rules);

    assert_eq!(names(&g, g.lexer_rules()), ["A", "B"]);
}

#[test]
fn cyclic_precedence_is_a_conflict() {
    let mut g = Grammar::new("Cycle");
    for (name, below) in [("A", "B"), ("B", "C"), ("C", "A")] {
        let body = literal(&mut g, name, &name.to_lowercase());
        let root = define(&mut g, name, &[body]);
        g.rule_mut(root)
            .precedence
            .relations
            .insert(below.to_string(), Ordering::Less);
    }
    let rules = g.rules().clone();
    g.set_rules(rules);

    assert_eq!(g.lexer_rules().len(), 3);
    assert_eq!(
        g.precedence_conflicts(),
        vec![
            ("A".to_string(), "B".to_string()),
            ("A".to_string(), "C".to_string()),
            ("B".to_string(), "C".to_string()),
        ]
    );
}

#[test]
fn left_recursion() {
    let mut g = Grammar::new("Expr");
    let (e, plus, n) = (
        reference(&mut g, "expr", "expr"),
        literal(&mut g, "expr", "+"),
        reference(&mut g, "expr", "NUM"),
    );
    let first = seq(&mut g, &[e, plus, n]);
    let second = reference(&mut g, "expr", "NUM");
    define(&mut g, "expr", &[first, second]);

    assert!(g.is_recursive("expr"));
    assert!(g.is_left_recursive("expr"));
    assert!(!g.is_infinitely_recursive("expr"));
}

#[test]
fn recursion_without_escape() {
    let mut g = Grammar::new("Loop");
    let (a, again) = (
        literal(&mut g, "loop", "a"),
        reference(&mut g, "loop", "loop"),
    );
    let body = seq(&mut g, &[a, again]);
    define(&mut g, "loop", &[body]);

    assert!(g.is_recursive("loop"));
    assert!(!g.is_left_recursive("loop"));
    assert!(g.is_infinitely_recursive("loop"));
}

#[test]
fn optional_prefix_still_left_recursive() {
    let mut g = Grammar::new("Opt");
    let x = literal(&mut g, "opt", "x");
    let x = quantified(&mut g, x, Quantifier::OPTIONAL);
    let again = reference(&mut g, "opt", "opt");
    let again = quantified(&mut g, again, Quantifier::OPTIONAL);
    let body = seq(&mut g, &[x, again]);
    define(&mut g, "opt", &[body]);

    assert!(g.is_left_recursive("opt"));
    assert!(!g.is_infinitely_recursive("opt"));
    assert!(!g.is_recursive("missing"));
}

#[test]
fn render_rule_body() {
    let mut g = Grammar::new("R");
    let kw = literal(&mut g, "stmt", "let");
    let ids = reference(&mut g, "stmt", "ID");
    let ids = quantified(&mut g, ids, Quantifier::ZERO_OR_MORE);
    let first = seq(&mut g, &[kw, ids]);

    let digit = expression(&mut g, "stmt", "[0-9]");
    g.rule_mut(digit).inverted = true;
    g.rule_mut(digit).metadata.group = Some("d".into());

    let quote = literal(&mut g, "stmt", "it's");
    let quote = quantified(&mut g, quote, Quantifier::range(2, Some(4), false));
    define(&mut g, "stmt", &[first, digit, quote]);

    insta::assert_snapshot!(g.render_rule("stmt").unwrap(), @r"'let' ID* | ~[0-9]#d | 'it\'s'{2,4}");
    assert_eq!(g.render_rule("nope"), None);
}

#[test]
fn merge_copies_rules_and_patterns() {
    let mut parent = Grammar::new("Base");
    let ws = expression(&mut parent, "WS", "[ \t]+");
    let root = define(&mut parent, "WS", &[ws]);
    parent.rule_mut(root).metadata.insert(MetadataOption::Skip);
    let num = expression(&mut parent, "NUM", "[0-9]+");
    define(&mut parent, "NUM", &[num]);
    parent.add_word("let", "KEYWORD");

    let mut child = Grammar::new("Child");
    child.add_import("Base");
    child.merge(&parent);

    assert_eq!(names(&child, child.lexer_rules()), ["WS", "NUM"]);
    assert!(child.rule_named("WS").unwrap().is_skip());
    assert_eq!(child.words()[0].value, "let");

    let root = child.get("NUM").unwrap();
    let alt = child.rule(root).children()[0];
    assert_eq!(child.rule(alt).parent, Some(root));
    let RuleKind::Expression { pattern, .. } = &child.rule(alt).kind else {
        panic!("expected expression");
    };
    assert_eq!(child.pattern(*pattern).match_prefix("42+"), Some(2));
}

#[test]
fn display_grammar() {
    let mut g = Grammar::new("Arith");
    g.add_import("Base");

    let num = expression(&mut g, "NUM", "[0-9]");
    let num = quantified(&mut g, num, Quantifier::ONE_OR_MORE);
    let root = define(&mut g, "NUM", &[num]);
    g.rule_mut(root).precedence = Precedence::with_weight(10);

    let digit = expression(&mut g, "DIGIT", "[0-9]");
    let root = define(&mut g, "DIGIT", &[digit]);
    g.rule_mut(root).metadata.insert(MetadataOption::Fragment);

    let ws = expression(&mut g, "WS", "[ ]+");
    let root = define(&mut g, "WS", &[ws]);
    g.rule_mut(root).metadata.insert(MetadataOption::Skip);
    g.rule_mut(root).metadata.group = Some("space".into());

    let (a, plus, b) = (
        reference(&mut g, "sum", "NUM"),
        literal(&mut g, "sum", "+"),
        reference(&mut g, "sum", "NUM"),
    );
    let body = seq(&mut g, &[a, plus, b]);
    define(&mut g, "sum", &[body]);

    insta::assert_snapshot!(g.to_string(), @r"
    grammar Arith;
    import Base;
    NUM {precedence: 10}: [0-9]+;
    fragment DIGIT: [0-9];
    WS {skip, group: space}: [ ]+;
    sum: NUM '+' NUM;
    ");
}
