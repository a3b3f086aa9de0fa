use crate::parser::cst::{GLang, SyntaxKind::*, TokenSet};
use rowan::Language;

#[test]
fn token_set_contains() {
    let set = TokenSet::new(&[ParenOpen, ParenClose, Star]);
    assert!(set.contains(ParenOpen));
    assert!(set.contains(ParenClose));
    assert!(set.contains(Star));
    assert!(!set.contains(Plus));
    assert!(!set.contains(Colon));
}

#[test]
fn token_set_union() {
    let a = TokenSet::new(&[ParenOpen, ParenClose]);
    let b = TokenSet::new(&[Star, Plus]);
    let c = a.union(b);
    assert!(c.contains(ParenOpen));
    assert!(c.contains(Plus));
    assert!(!c.contains(Colon));
}

#[test]
fn token_set_ignores_node_kinds() {
    let set = TokenSet::new(&[Id]);
    assert!(!set.contains(Rule));
    assert!(!TokenSet::EMPTY.contains(Id));
}

#[test]
fn token_set_debug() {
    let set = TokenSet::new(&[Colon, Semicolon]);
    insta::assert_snapshot!(format!("{set:?}"), @"{Colon, Semicolon}");
}

#[test]
fn trivia_kinds() {
    assert!(Whitespace.is_trivia());
    assert!(Newline.is_trivia());
    assert!(LineContinuation.is_trivia());
    assert!(LineComment.is_trivia());
    assert!(BlockComment.is_trivia());
    assert!(!ParenOpen.is_trivia());
    assert!(!Error.is_trivia());
}

#[test]
fn error_kinds() {
    assert!(Error.is_error());
    assert!(Garbage.is_error());
    assert!(!Id.is_error());
    assert!(!Whitespace.is_error());
}

#[test]
fn syntax_kind_count_under_64() {
    assert!(
        (__LAST as u16) < 64,
        "SyntaxKind has {} variants, exceeds TokenSet capacity of 64",
        __LAST as u16
    );
}

#[test]
fn raw_round_trip() {
    for kind in [ParenOpen, Id, Garbage, Root, Group] {
        let raw = GLang::kind_to_raw(kind);
        assert_eq!(GLang::kind_from_raw(raw), kind);
    }
}
