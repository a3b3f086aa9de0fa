mod cli;
mod commands;

use cli::{CheckParams, DumpParams, LexParams, ParseParams, build_cli};
use tracing_subscriber::EnvFilter;

/// Log filter directives, e.g. `GRAMMARKIT_LOG=grammarkit_vm=trace`.
const LOG_ENV: &str = "GRAMMARKIT_LOG";

fn main() {
    init_tracing();
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into());
        }
        Some(("lex", m)) => {
            let params = LexParams::from_matches(m);
            commands::lex::run(params.into());
        }
        Some(("parse", m)) => {
            let params = ParseParams::from_matches(m);
            commands::parse::run(params.into());
        }
        Some(("dump", m)) => {
            let params = DumpParams::from_matches(m);
            commands::dump::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
