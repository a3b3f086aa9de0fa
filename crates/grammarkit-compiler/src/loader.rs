//! Grammar lookup, compilation and inheritance.
//!
//! A grammar id resolves against the search paths in order: first the package
//! layout `<dir>/<id>.grammar/grammar.g`, then a plain file `<dir>/<id>.grammar`.
//! Imports are loaded through the same loader and merged before local rules.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use grammarkit_core::Grammar;

use crate::diagnostics::Diagnostics;
use crate::lower::{ImportError, ImportResolver, lower};
use crate::parser::parse;
use crate::{Error, Result};

/// Environment variable holding extra search directories, separated like `PATH`.
pub const SEARCH_PATH_ENV: &str = "GRAMMARKIT_PATH";

const PACKAGE_EXTENSION: &str = "grammar";
const PACKAGE_ENTRY: &str = "grammar.g";

/// Output of compiling grammar source text.
#[derive(Debug, Clone)]
pub struct Compiled {
    /// `None` when the source has no usable `grammar Name;` header.
    pub grammar: Option<Grammar>,
    pub diagnostics: Diagnostics,
}

/// A grammar loaded from disk, with the text its diagnostics point into.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub path: PathBuf,
    pub source: String,
    pub grammar: Option<Grammar>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct GrammarLoader {
    search_paths: Vec<PathBuf>,
}

impl GrammarLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader seeded with the directories in `GRAMMARKIT_PATH`.
    pub fn from_env() -> Self {
        let mut loader = Self::new();
        if let Some(value) = std::env::var_os(SEARCH_PATH_ENV) {
            for dir in std::env::split_paths(&value) {
                if !dir.as_os_str().is_empty() {
                    loader.search_paths.push(dir);
                }
            }
        }
        loader
    }

    pub fn with_search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_paths.push(dir.into());
        self
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// File that holds grammar `id`, if any search path has it.
    pub fn package_path(&self, id: &str) -> Option<PathBuf> {
        self.search_paths.iter().find_map(|dir| {
            let package = dir.join(format!("{id}.{PACKAGE_EXTENSION}"));
            let entry = package.join(PACKAGE_ENTRY);
            if entry.is_file() {
                Some(entry)
            } else if package.is_file() {
                Some(package)
            } else {
                None
            }
        })
    }

    /// The grammar, or `None` when it is missing, unreadable or headerless.
    pub fn load_grammar(&self, id: &str) -> Option<Grammar> {
        match self.load(id) {
            Ok(loaded) => loaded.grammar,
            Err(err) => {
                tracing::debug!(id, %err, "grammar unavailable");
                None
            }
        }
    }

    /// Resolves `id` through the search paths and compiles it.
    pub fn load(&self, id: &str) -> Result<Loaded> {
        let path = self
            .package_path(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let mut session = Session::new(self);
        session.stack.push(id.to_string());
        session.load_path(path)
    }

    /// Compiles a grammar file at an explicit path.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Loaded> {
        let path = path.as_ref();
        let mut session = Session::new(self);
        if let Some(stem) = grammar_id(path) {
            session.stack.push(stem);
        }
        session.load_path(path.to_path_buf())
    }

    /// Compiles grammar source text. Imports resolve through the search paths.
    pub fn compile(&self, source: &str) -> Result<Compiled> {
        Session::new(self).compile(source)
    }

    /// Loads `id` on a new thread and hands the grammar to `callback` there.
    pub fn load_in_background<F>(self: Arc<Self>, id: impl Into<String>, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Option<Grammar>) + Send + 'static,
    {
        let id = id.into();
        std::thread::spawn(move || {
            tracing::debug!(id = %id, "background load started");
            let grammar = self.load_grammar(&id);
            callback(grammar);
        })
    }
}

/// Id a grammar file is known by: `Name` for both `Name.grammar` and
/// `Name.grammar/grammar.g`.
fn grammar_id(path: &Path) -> Option<String> {
    let file = if path.file_name().is_some_and(|f| f == PACKAGE_ENTRY) {
        path.parent()?
    } else {
        path
    };
    file.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

/// One top-level load. Tracks the import stack to detect cycles.
struct Session<'l> {
    loader: &'l GrammarLoader,
    stack: Vec<String>,
}

impl<'l> Session<'l> {
    fn new(loader: &'l GrammarLoader) -> Self {
        Self {
            loader,
            stack: Vec::new(),
        }
    }

    fn load_path(&mut self, path: PathBuf) -> Result<Loaded> {
        tracing::debug!(path = %path.display(), "loading grammar");
        let source = std::fs::read_to_string(&path).map_err(|e| Error::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let Compiled {
            grammar,
            diagnostics,
        } = self.compile(&source)?;
        Ok(Loaded {
            path,
            source,
            grammar,
            diagnostics,
        })
    }

    fn compile(&mut self, source: &str) -> Result<Compiled> {
        let (parsed, mut diagnostics) = parse(source)?;
        let (grammar, lowered) = lower(&parsed.root(), &diagnostics, self);
        diagnostics.extend(lowered);

        if let Some(grammar) = &grammar {
            tracing::debug!(
                grammar = grammar.name(),
                rules = grammar.rules().len(),
                errors = diagnostics.error_count(),
                warnings = diagnostics.warning_count(),
                "grammar compiled"
            );
        }
        Ok(Compiled {
            grammar,
            diagnostics,
        })
    }
}

impl ImportResolver for Session<'_> {
    fn resolve(&mut self, name: &str) -> std::result::Result<Grammar, ImportError> {
        if self.stack.iter().any(|entry| entry == name) {
            let mut chain = self.stack.clone();
            chain.push(name.to_string());
            return Err(ImportError::Cycle(chain.join(" -> ")));
        }

        let path = self.loader.package_path(name).ok_or(ImportError::NotFound)?;
        self.stack.push(name.to_string());
        let loaded = self.load_path(path);
        self.stack.pop();

        match loaded {
            Ok(Loaded {
                grammar: Some(grammar),
                diagnostics,
                ..
            }) => {
                if diagnostics.has_errors() {
                    tracing::debug!(
                        import = name,
                        errors = diagnostics.error_count(),
                        "imported grammar has errors"
                    );
                }
                Ok(grammar)
            }
            Ok(_) => Err(ImportError::NotFound),
            Err(err) => {
                tracing::debug!(import = name, %err, "import failed");
                Err(ImportError::NotFound)
            }
        }
    }
}
