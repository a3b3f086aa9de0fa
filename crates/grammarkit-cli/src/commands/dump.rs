use std::fmt::Write as _;

use grammarkit_core::{Grammar, RuleId};

use super::grammar_source::{GrammarSource, require_grammar};

pub struct DumpArgs {
    pub grammar: GrammarSource,
    pub color: bool,
}

pub fn run(args: DumpArgs) {
    let grammar = require_grammar(&args.grammar, args.color);
    print!("{}", render(&grammar));
}

/// The grammar in source form, followed by the evaluation order of its rules.
pub fn render(grammar: &Grammar) -> String {
    let mut out = grammar.to_string();

    out.push('\n');
    writeln!(out, "// lexer: {}", rule_order(grammar, grammar.lexer_rules()))
        .expect("String write never fails");
    writeln!(out, "// parser: {}", rule_order(grammar, grammar.parser_rules()))
        .expect("String write never fails");
    if !grammar.words().is_empty() {
        let words: Vec<String> = grammar
            .words()
            .iter()
            .map(|word| format!("{:?} ({})", word.value, word.rule))
            .collect();
        writeln!(out, "// words: {}", words.join(", ")).expect("String write never fails");
    }
    out
}

fn rule_order(grammar: &Grammar, rules: &[RuleId]) -> String {
    if rules.is_empty() {
        return "-".to_string();
    }
    rules
        .iter()
        .map(|&id| grammar.rule(id).id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
