mod recovery_tests;

use crate::diagnostics::Diagnostics;
use crate::parser::{Parse, parse};

fn parse_ok(source: &str) -> Parse {
    let (parse, diagnostics) = parse(source).expect("no fuel limit set");
    assert!(diagnostics.is_empty(), "unexpected diagnostics:\n{diagnostics}");
    parse
}

fn parse_with_errors(source: &str) -> (Parse, Diagnostics) {
    let (parse, diagnostics) = parse(source).expect("no fuel limit set");
    assert!(diagnostics.has_errors(), "expected parse errors");
    (parse, diagnostics)
}
