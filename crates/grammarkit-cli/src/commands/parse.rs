use grammarkit_core::{CharacterStream, Grammar, MatchChain};
use grammarkit_vm::{FuelLimits, Lexer, Parser};
use serde::Serialize;

use super::grammar_source::{GrammarSource, require_grammar};
use super::input::{InputSource, require_input};

pub struct ParseArgs {
    pub grammar: GrammarSource,
    pub input: InputSource,
    pub json: bool,
    pub limits: FuelLimits,
    pub rule: Option<String>,
    pub color: bool,
}

#[derive(Serialize)]
struct ParseOutput<'a> {
    grammar: &'a str,
    chains: &'a [MatchChain],
}

pub fn run(args: ParseArgs) {
    let grammar = require_grammar(&args.grammar, args.color);
    let text = require_input(&args.input);

    let tokens = Lexer::new(&grammar)
        .with_limits(args.limits)
        .tokenize(&CharacterStream::new(text))
        .unwrap_or_else(|err| exit_with(err));

    let parser = Parser::new(&grammar).with_limits(args.limits);
    let chains = match &args.rule {
        Some(rule) => {
            if grammar.get(rule).is_none() {
                eprintln!("error: rule '{}' is not defined in {}", rule, grammar.name());
                std::process::exit(1);
            }
            let chain = parser
                .parse_rule(&tokens, rule)
                .unwrap_or_else(|err| exit_with(err));
            chain.into_iter().collect()
        }
        None => parser.parse(&tokens).unwrap_or_else(|err| exit_with(err)),
    };

    print!("{}", render(&grammar, &chains, args.json));
}

pub fn render(grammar: &Grammar, chains: &[MatchChain], json: bool) -> String {
    if json {
        let output = ParseOutput {
            grammar: grammar.name(),
            chains,
        };
        let mut out = serde_json::to_string_pretty(&output).expect("chains serialize to JSON");
        out.push('\n');
        return out;
    }
    chains.iter().map(MatchChain::dump).collect()
}

fn exit_with(err: grammarkit_vm::RuntimeError) -> ! {
    eprintln!("error: {}", err);
    std::process::exit(1)
}
