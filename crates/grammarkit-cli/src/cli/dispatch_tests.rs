use std::path::PathBuf;

use super::*;
use crate::cli::commands::{check_command, dump_command, lex_command, parse_command};
use crate::commands::lex::LexArgs;
use crate::commands::parse::ParseArgs;

#[test]
fn cli_definition_is_consistent() {
    let cli = build_cli();
    cli.clone().debug_assert();

    let names: Vec<_> = cli.get_subcommands().map(|c| c.get_name()).collect();
    assert_eq!(names, ["check", "lex", "parse", "dump"]);
}

#[test]
fn check_extracts_grammar_and_search_paths() {
    let m = check_command()
        .try_get_matches_from(["check", "Calc", "-I", "grammars", "--search-path", "vendor", "--strict"])
        .unwrap();
    let params = CheckParams::from_matches(&m);

    assert_eq!(params.grammar, "Calc");
    assert_eq!(
        params.search_paths,
        [PathBuf::from("grammars"), PathBuf::from("vendor")]
    );
    assert!(params.strict);
    assert_eq!(params.color, ColorChoice::Auto);
}

#[test]
fn color_choice_is_parsed() {
    let m = dump_command()
        .try_get_matches_from(["dump", "calc.grammar", "--color", "never"])
        .unwrap();
    assert_eq!(DumpParams::from_matches(&m).color, ColorChoice::Never);

    let m = dump_command()
        .try_get_matches_from(["dump", "calc.grammar", "--color", "always"])
        .unwrap();
    assert_eq!(DumpParams::from_matches(&m).color, ColorChoice::Always);

    let result = dump_command().try_get_matches_from(["dump", "calc.grammar", "--color", "sometimes"]);
    assert!(result.is_err());
}

#[test]
fn lex_takes_inline_source_and_options() {
    let m = lex_command()
        .try_get_matches_from([
            "lex",
            "calc.grammar",
            "-s",
            "12 + 7",
            "--json",
            "--alternates",
            "--nested",
            "--fuel",
            "500",
            "--color",
            "never",
        ])
        .unwrap();
    let params = LexParams::from_matches(&m);
    assert_eq!(params.input_text.as_deref(), Some("12 + 7"));
    assert_eq!(params.input_path, None);

    let args: LexArgs = params.into();
    assert!(args.json && args.alternates && args.nested && !args.color);
    assert_eq!(args.limits.get_exec_fuel(), Some(500));
    assert_eq!(args.limits.get_recursion_limit(), None);
    assert_eq!(args.input.read().unwrap(), "12 + 7");
}

#[test]
fn lex_requires_exactly_one_input() {
    let missing = lex_command().try_get_matches_from(["lex", "calc.grammar"]);
    assert!(missing.is_err());

    let both = lex_command().try_get_matches_from(["lex", "calc.grammar", "in.txt", "-s", "1"]);
    assert!(both.is_err());

    let m = lex_command()
        .try_get_matches_from(["lex", "calc.grammar", "-"])
        .unwrap();
    assert_eq!(
        LexParams::from_matches(&m).input_path,
        Some(PathBuf::from("-"))
    );
}

#[test]
fn parse_extracts_rule_and_limits() {
    let m = parse_command()
        .try_get_matches_from([
            "parse",
            "Calc",
            "input.txt",
            "-r",
            "sum",
            "--max-depth",
            "8",
        ])
        .unwrap();
    let args: ParseArgs = ParseParams::from_matches(&m).into();

    assert_eq!(args.grammar.grammar, "Calc");
    assert_eq!(args.input.path, Some(PathBuf::from("input.txt")));
    assert_eq!(args.rule.as_deref(), Some("sum"));
    assert!(!args.json);
    assert_eq!(args.limits.get_exec_fuel(), None);
    assert_eq!(args.limits.get_recursion_limit(), Some(8));
}

#[test]
fn run_flags_are_rejected_where_unused() {
    assert!(dump_command().try_get_matches_from(["dump", "calc.grammar", "--json"]).is_err());
    assert!(check_command().try_get_matches_from(["check", "calc.grammar", "in.txt"]).is_err());
    assert!(lex_command().try_get_matches_from(["lex", "calc.grammar", "-s", "x", "-r", "sum"]).is_err());
}

#[test]
fn fuel_must_be_a_number() {
    let result = parse_command().try_get_matches_from(["parse", "Calc", "-s", "1", "--fuel", "lots"]);
    assert!(result.is_err());
}
