use std::fmt::Write as _;

use grammarkit_core::{CharacterStream, Grammar, Token, TokenStream};
use grammarkit_vm::{FuelLimits, Lexer};
use serde::Serialize;

use super::grammar_source::{GrammarSource, require_grammar};
use super::input::{InputSource, require_input};

pub struct LexArgs {
    pub grammar: GrammarSource,
    pub input: InputSource,
    pub json: bool,
    pub limits: FuelLimits,
    pub alternates: bool,
    pub nested: bool,
    pub color: bool,
}

#[derive(Serialize)]
struct LexOutput<'a> {
    grammar: &'a str,
    tokens: &'a [Token],
}

pub fn run(args: LexArgs) {
    let grammar = require_grammar(&args.grammar, args.color);
    let text = require_input(&args.input);

    let tokens = Lexer::new(&grammar)
        .with_limits(args.limits)
        .with_alternate_rules(args.alternates)
        .with_nested(args.nested)
        .tokenize(&CharacterStream::new(text))
        .unwrap_or_else(|err| {
            eprintln!("error: {}", err);
            std::process::exit(1);
        });

    print!("{}", render(&grammar, &tokens, args.json));
}

/// One token per line, nested tokens indented under their parent.
pub fn render(grammar: &Grammar, tokens: &TokenStream, json: bool) -> String {
    if json {
        let output = LexOutput {
            grammar: grammar.name(),
            tokens: tokens.as_slice(),
        };
        let mut out = serde_json::to_string_pretty(&output).expect("tokens serialize to JSON");
        out.push('\n');
        return out;
    }

    let mut out = String::new();
    for token in tokens {
        render_token(&mut out, token, 0);
    }
    out
}

fn render_token(out: &mut String, token: &Token, depth: usize) {
    writeln!(out, "{}{token}", "  ".repeat(depth)).expect("String write never fails");
    for inner in &token.nested {
        render_token(out, inner, depth + 1);
    }
}
