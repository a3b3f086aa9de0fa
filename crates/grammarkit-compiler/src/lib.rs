//! grammarkit-compiler: grammar files to executable rule trees.
//!
//! # Example
//!
//! ```
//! use grammarkit_compiler::GrammarLoader;
//!
//! let source = r#"
//!     grammar Arith;
//!     NUM: [0-9]+;
//!     sum: NUM '+' NUM;
//! "#;
//!
//! let compiled = GrammarLoader::new().compile(source).expect("out of fuel");
//! eprintln!("{}", compiled.diagnostics.render(source));
//! assert!(compiled.grammar.is_some());
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod diagnostics;
pub mod loader;
pub mod lower;
pub mod parser;

#[cfg(test)]
mod lower_tests;

use std::path::PathBuf;

/// Result type for passes that produce both output and diagnostics.
///
/// Each pass returns its typed output alongside any diagnostics it collected.
/// Fatal errors (like fuel exhaustion) use the outer `Result`.
pub type PassResult<T> = std::result::Result<(T, Diagnostics), Error>;

pub use diagnostics::{DiagnosticKind, Diagnostics, Severity};
pub use loader::{Compiled, GrammarLoader, Loaded};

/// Errors that can occur while loading a grammar.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Execution fuel exhausted (too many parser operations).
    #[error("execution limit exceeded")]
    ExecFuelExhausted,

    /// Recursion fuel exhausted (input nested too deeply).
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    /// No search path holds the grammar.
    #[error("grammar `{0}` not found")]
    NotFound(String),

    #[error("cannot read {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, Error>;
