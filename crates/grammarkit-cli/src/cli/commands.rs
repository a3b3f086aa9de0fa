//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Grammar selection flags shared by every subcommand.
fn with_grammar_args(cmd: Command) -> Command {
    cmd.arg(grammar_arg())
        .arg(search_path_arg())
        .arg(color_arg())
}

/// Input and runtime limit flags shared by `lex` and `parse`.
fn with_run_args(cmd: Command) -> Command {
    cmd.arg(input_path_arg())
        .arg(input_text_arg())
        .arg(json_arg())
        .arg(fuel_arg())
        .arg(max_depth_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("grammarkit")
        .about("Compile grammars, then tokenize and parse text with them")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(check_command())
        .subcommand(lex_command())
        .subcommand(parse_command())
        .subcommand(dump_command())
}

/// Compile a grammar and report its diagnostics.
pub fn check_command() -> Command {
    let cmd = Command::new("check")
        .about("Validate a grammar")
        .override_usage(
            "\
  grammarkit check <GRAMMAR>
  grammarkit check <ID> -I <DIR>",
        )
        .after_help(
            r#"EXAMPLES:
  grammarkit check calc.grammar         # validate a file
  grammarkit check Calc -I grammars/    # look up by id
  grammarkit check calc.grammar --strict"#,
        )
        .arg(strict_arg());

    with_grammar_args(cmd)
}

/// Tokenize input with the grammar's lexer rules.
pub fn lex_command() -> Command {
    let cmd = Command::new("lex")
        .about("Tokenize input")
        .override_usage(
            "\
  grammarkit lex <GRAMMAR> <INPUT>
  grammarkit lex <GRAMMAR> -s <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  grammarkit lex calc.grammar input.txt
  grammarkit lex calc.grammar -s '12 + 7' --json
  cat input.txt | grammarkit lex Calc - -I grammars/"#,
        )
        .arg(alternates_arg())
        .arg(nested_arg());

    with_run_args(with_grammar_args(cmd))
}

/// Tokenize, then group tokens with the grammar's parser rules.
pub fn parse_command() -> Command {
    let cmd = Command::new("parse")
        .about("Parse input into match chains")
        .override_usage(
            "\
  grammarkit parse <GRAMMAR> <INPUT>
  grammarkit parse <GRAMMAR> -s <TEXT> [-r <RULE>]",
        )
        .after_help(
            r#"EXAMPLES:
  grammarkit parse calc.grammar input.txt
  grammarkit parse calc.grammar -s '12 + 7' --json
  grammarkit parse calc.grammar -s '12 + 7' -r sum"#,
        )
        .arg(rule_arg());

    with_run_args(with_grammar_args(cmd))
}

/// Print the compiled grammar.
pub fn dump_command() -> Command {
    let cmd = Command::new("dump")
        .about("Show the compiled grammar and its rule order")
        .override_usage(
            "\
  grammarkit dump <GRAMMAR>",
        )
        .after_help(
            r#"EXAMPLES:
  grammarkit dump calc.grammar
  grammarkit dump Calc -I grammars/     # includes imported rules"#,
        );

    with_grammar_args(cmd)
}
