use super::grammar_source::GrammarSource;

pub struct CheckArgs {
    pub grammar: GrammarSource,
    pub strict: bool,
    pub color: bool,
}

pub fn run(args: CheckArgs) {
    let loaded = match args.grammar.load() {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    };

    let diagnostics = &loaded.diagnostics;
    let is_valid = if args.strict {
        !diagnostics.has_errors() && !diagnostics.has_warnings()
    } else {
        !diagnostics.has_errors()
    };

    if !diagnostics.is_empty() {
        eprintln!(
            "{}",
            diagnostics.render_file(&loaded.path, &loaded.source, args.color)
        );
    }
    if !is_valid || loaded.grammar.is_none() {
        std::process::exit(1);
    }

    // Silent on success, apart from warnings
}
