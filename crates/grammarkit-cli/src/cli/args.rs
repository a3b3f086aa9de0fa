//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` so the same definition can be reused
//! by every subcommand that needs it.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Grammar file path or grammar id (positional).
pub fn grammar_arg() -> Arg {
    Arg::new("grammar")
        .value_name("GRAMMAR")
        .required(true)
        .help("Grammar file, or a grammar id looked up in the search paths")
}

/// Input file to tokenize (positional).
pub fn input_path_arg() -> Arg {
    Arg::new("input_path")
        .value_name("INPUT")
        .value_parser(value_parser!(PathBuf))
        .required_unless_present("input_text")
        .help("Input file (`-` reads stdin)")
}

/// Inline input text (-s/--source).
pub fn input_text_arg() -> Arg {
    Arg::new("input_text")
        .short('s')
        .long("source")
        .value_name("TEXT")
        .conflicts_with("input_path")
        .help("Inline input text")
}

/// Extra grammar search directory (-I/--search-path), repeatable.
pub fn search_path_arg() -> Arg {
    Arg::new("search_path")
        .short('I')
        .long("search-path")
        .value_name("DIR")
        .value_parser(value_parser!(PathBuf))
        .action(ArgAction::Append)
        .help("Directory searched for grammar ids and imports (after GRAMMARKIT_PATH)")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize diagnostics")
}

/// Treat warnings as errors (--strict).
pub fn strict_arg() -> Arg {
    Arg::new("strict")
        .long("strict")
        .action(ArgAction::SetTrue)
        .help("Treat warnings as errors")
}

/// JSON output (--json).
pub fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print results as JSON")
}

/// Execution fuel (--fuel).
pub fn fuel_arg() -> Arg {
    Arg::new("fuel")
        .long("fuel")
        .value_name("N")
        .value_parser(value_parser!(u32))
        .help("Stop after N evaluation steps")
}

/// Recursion limit (--max-depth).
pub fn max_depth_arg() -> Arg {
    Arg::new("max_depth")
        .long("max-depth")
        .value_name("N")
        .value_parser(value_parser!(u32))
        .help("Fail when rule references nest deeper than N")
}

/// Record alternate rules on tokens (--alternates).
pub fn alternates_arg() -> Arg {
    Arg::new("alternates")
        .long("alternates")
        .action(ArgAction::SetTrue)
        .help("List every lexer rule that matches a token's exact span")
}

/// Lex inside `nested` rules (--nested).
pub fn nested_arg() -> Arg {
    Arg::new("nested")
        .long("nested")
        .action(ArgAction::SetTrue)
        .help("Lex the inside of tokens produced by `nested` rules")
}

/// Single parser rule to match (-r/--rule).
pub fn rule_arg() -> Arg {
    Arg::new("rule")
        .short('r')
        .long("rule")
        .value_name("NAME")
        .help("Match only this rule, at the start of the input")
}
