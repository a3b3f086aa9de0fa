//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! `*Params` structs mirror the command `*Args` but hold raw clap values
//! (color as a choice, limits as optional numbers). The `Into<*Args>` impls
//! resolve them for the command handlers.

use std::path::PathBuf;

use clap::ArgMatches;
use grammarkit_vm::FuelLimits;

use super::ColorChoice;
use crate::commands::check::CheckArgs;
use crate::commands::dump::DumpArgs;
use crate::commands::grammar_source::GrammarSource;
use crate::commands::input::InputSource;
use crate::commands::lex::LexArgs;
use crate::commands::parse::ParseArgs;

pub struct CheckParams {
    pub grammar: String,
    pub search_paths: Vec<PathBuf>,
    pub strict: bool,
    pub color: ColorChoice,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar: parse_grammar(m),
            search_paths: parse_search_paths(m),
            strict: m.get_flag("strict"),
            color: parse_color(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            grammar: GrammarSource::new(p.grammar, p.search_paths),
            strict: p.strict,
            color: p.color.should_colorize(),
        }
    }
}

pub struct LexParams {
    pub grammar: String,
    pub search_paths: Vec<PathBuf>,
    pub input_path: Option<PathBuf>,
    pub input_text: Option<String>,
    pub json: bool,
    pub fuel: Option<u32>,
    pub max_depth: Option<u32>,
    pub alternates: bool,
    pub nested: bool,
    pub color: ColorChoice,
}

impl LexParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar: parse_grammar(m),
            search_paths: parse_search_paths(m),
            input_path: m.get_one::<PathBuf>("input_path").cloned(),
            input_text: m.get_one::<String>("input_text").cloned(),
            json: m.get_flag("json"),
            fuel: m.get_one::<u32>("fuel").copied(),
            max_depth: m.get_one::<u32>("max_depth").copied(),
            alternates: m.get_flag("alternates"),
            nested: m.get_flag("nested"),
            color: parse_color(m),
        }
    }
}

impl From<LexParams> for LexArgs {
    fn from(p: LexParams) -> Self {
        Self {
            grammar: GrammarSource::new(p.grammar, p.search_paths),
            input: InputSource::new(p.input_path, p.input_text),
            json: p.json,
            limits: limits(p.fuel, p.max_depth),
            alternates: p.alternates,
            nested: p.nested,
            color: p.color.should_colorize(),
        }
    }
}

pub struct ParseParams {
    pub grammar: String,
    pub search_paths: Vec<PathBuf>,
    pub input_path: Option<PathBuf>,
    pub input_text: Option<String>,
    pub json: bool,
    pub fuel: Option<u32>,
    pub max_depth: Option<u32>,
    pub rule: Option<String>,
    pub color: ColorChoice,
}

impl ParseParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar: parse_grammar(m),
            search_paths: parse_search_paths(m),
            input_path: m.get_one::<PathBuf>("input_path").cloned(),
            input_text: m.get_one::<String>("input_text").cloned(),
            json: m.get_flag("json"),
            fuel: m.get_one::<u32>("fuel").copied(),
            max_depth: m.get_one::<u32>("max_depth").copied(),
            rule: m.get_one::<String>("rule").cloned(),
            color: parse_color(m),
        }
    }
}

impl From<ParseParams> for ParseArgs {
    fn from(p: ParseParams) -> Self {
        Self {
            grammar: GrammarSource::new(p.grammar, p.search_paths),
            input: InputSource::new(p.input_path, p.input_text),
            json: p.json,
            limits: limits(p.fuel, p.max_depth),
            rule: p.rule,
            color: p.color.should_colorize(),
        }
    }
}

pub struct DumpParams {
    pub grammar: String,
    pub search_paths: Vec<PathBuf>,
    pub color: ColorChoice,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar: parse_grammar(m),
            search_paths: parse_search_paths(m),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            grammar: GrammarSource::new(p.grammar, p.search_paths),
            color: p.color.should_colorize(),
        }
    }
}

fn parse_grammar(m: &ArgMatches) -> String {
    m.get_one::<String>("grammar")
        .cloned()
        .expect("grammar is a required argument")
}

fn parse_search_paths(m: &ArgMatches) -> Vec<PathBuf> {
    m.get_many::<PathBuf>("search_path")
        .map(|dirs| dirs.cloned().collect())
        .unwrap_or_default()
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

fn limits(fuel: Option<u32>, max_depth: Option<u32>) -> FuelLimits {
    let mut limits = FuelLimits::new();
    if let Some(fuel) = fuel {
        limits = limits.exec_fuel(fuel);
    }
    if let Some(depth) = max_depth {
        limits = limits.recursion_limit(depth);
    }
    limits
}
