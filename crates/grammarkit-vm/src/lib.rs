#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Lexer and parser engines for compiled grammarkit grammars.
//!
//! Both engines run the same rule evaluator: the [`Lexer`] over characters,
//! producing a [`TokenStream`](grammarkit_core::TokenStream), and the
//! [`Parser`] over those tokens, producing
//! [`MatchChain`](grammarkit_core::MatchChain)s. Progress is reported through
//! a [`Listener`].

mod error;
mod eval;
pub mod lexer;
pub mod listener;
pub mod parser;


pub use error::{FuelLimits, RuntimeError};
pub use lexer::Lexer;
pub use listener::{Event, EventLog, Listener, NoopListener};
pub use parser::Parser;
