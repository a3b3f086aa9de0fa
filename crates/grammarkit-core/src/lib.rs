#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for grammarkit.
//!
//! - [`Quantifier`], [`Precedence`], [`Metadata`]: per-atom and per-rule annotations
//! - [`ComparisonGraph`]: partial-order resolution of rule precedence
//! - [`GrammarRule`] nodes in a [`RuleArena`], addressed by [`RuleId`]
//! - [`Grammar`]: rule registry with precedence-sorted lexer and parser sets
//! - [`Token`], [`TokenStream`], [`CharacterStream`], [`MatchChain`]: engine input and output

pub mod comparison;
pub mod grammar;
pub mod match_chain;
pub mod pattern;
pub mod precedence;
pub mod quantifier;
pub mod rule;
pub mod stream;

#[cfg(test)]
mod comparison_tests;
#[cfg(test)]
mod grammar_tests;

pub use comparison::ComparisonGraph;
pub use grammar::{Grammar, Identifier, UNMATCHED_RULE_ID};
pub use match_chain::MatchChain;
pub use pattern::{Pattern, PatternError, PatternId, PatternSource, PatternTable};
pub use precedence::{Metadata, MetadataOption, Precedence, PrecedenceError};
pub use quantifier::Quantifier;
pub use rule::{GrammarRule, RuleArena, RuleClass, RuleId, RuleKind};
pub use stream::{CharacterStream, Token, TokenStream};
