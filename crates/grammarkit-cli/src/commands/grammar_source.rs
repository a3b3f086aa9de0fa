use std::path::{Path, PathBuf};

use grammarkit_compiler::{Error, GrammarLoader, Loaded};
use grammarkit_core::Grammar;

/// Grammar named on the command line: a file path or an id.
pub struct GrammarSource {
    pub grammar: String,
    pub search_paths: Vec<PathBuf>,
}

impl GrammarSource {
    pub fn new(grammar: impl Into<String>, search_paths: Vec<PathBuf>) -> Self {
        Self {
            grammar: grammar.into(),
            search_paths,
        }
    }

    /// `GRAMMARKIT_PATH` directories first, then `-I` directories.
    pub fn loader(&self) -> GrammarLoader {
        self.search_paths
            .iter()
            .fold(GrammarLoader::from_env(), |loader, dir| {
                loader.with_search_path(dir.clone())
            })
    }

    /// The argument as a path, when it reads like one.
    ///
    /// Anything with a directory part or an extension, or that names an
    /// existing file, is a path. Bare names are grammar ids.
    pub fn as_path(&self) -> Option<&Path> {
        let path = Path::new(&self.grammar);
        let path_like = path.is_file() || path.components().count() > 1 || path.extension().is_some();
        path_like.then_some(path)
    }

    pub fn load(&self) -> Result<Loaded, Error> {
        let loader = self.loader();
        tracing::debug!(grammar = %self.grammar, search_paths = ?loader.search_paths(), "resolving grammar");
        match self.as_path() {
            Some(path) => loader.load_file(path),
            None => loader.load(&self.grammar),
        }
    }
}

/// Loads the grammar or exits with its diagnostics.
///
/// Warnings are not printed here; `check` reports them.
pub fn require_grammar(source: &GrammarSource, color: bool) -> Grammar {
    let loaded = match source.load() {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    };

    if loaded.diagnostics.has_errors() {
        eprintln!(
            "{}",
            loaded
                .diagnostics
                .render_file(&loaded.path, &loaded.source, color)
        );
        std::process::exit(1);
    }

    match loaded.grammar {
        Some(grammar) => grammar,
        None => {
            eprintln!("error: '{}' has no grammar header", loaded.path.display());
            std::process::exit(1);
        }
    }
}
