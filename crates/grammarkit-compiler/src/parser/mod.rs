//! Parser infrastructure for grammar files.
//!
//! # Architecture
//!
//! Grammar files parse into a lossless rowan tree. Comments, whitespace and
//! line continuations stay in the tree as leading trivia of the next token.
//!
//! Malformed input still yields a tree:
//!
//! - stray tokens are reported and wrapped in `Error` nodes
//! - a missing token is reported without consuming anything
//! - a rule that lost its `;` ends where the next `Name :` starts
//! - text between a broken declaration and the next `;` or keyword becomes one `Error` node
//!
//! Only the step and depth limits of [`Parser`] abort a parse, with an `Err`.

pub mod ast;
pub mod cst;
pub mod lexer;

mod core;
mod grammar;

#[cfg(test)]
mod cst_tests;
#[cfg(test)]
mod tests;

use std::fmt::Write;

use rowan::NodeOrToken;

pub use cst::{SyntaxKind, SyntaxNode, SyntaxToken};

pub use ast::{
    Atom, Attribute, AttributeValue, Attributes, Body, Branch, Class, Group, Header, Import, Item,
    Literal, Ref, Root, Rule, Wildcard,
};

pub use core::Parser;

use crate::PassResult;
use lexer::lex;

/// Parse result containing the green tree.
///
/// The tree is always complete; diagnostics are returned separately.
/// Error nodes in the tree represent recovery points.
#[derive(Debug, Clone)]
pub struct Parse {
    cst: rowan::GreenNode,
}

impl Parse {
    pub fn as_cst(&self) -> &rowan::GreenNode {
        &self.cst
    }

    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.cst.clone())
    }

    pub fn root(&self) -> Root {
        Root::cast(self.syntax()).expect("parser always produces a Root node")
    }

    /// Indented tree dump, one node or token per line.
    pub fn dump(&self, trivia: bool) -> String {
        let mut out = String::new();
        format_cst(&self.syntax(), 0, trivia, &mut out).expect("String write never fails");
        out
    }
}

/// Parses without limits, so this never returns `Err` in practice.
pub fn parse(source: &str) -> PassResult<Parse> {
    parse_with_parser(Parser::new(source, lex(source)))
}

/// Parse with a pre-configured parser, e.g. one carrying step or depth limits.
pub(crate) fn parse_with_parser(mut parser: Parser) -> PassResult<Parse> {
    parser.parse_root();
    let (cst, diagnostics) = parser.finish()?;
    Ok((Parse { cst }, diagnostics))
}

fn format_cst(node: &SyntaxNode, indent: usize, trivia: bool, w: &mut impl Write) -> std::fmt::Result {
    let prefix = "  ".repeat(indent);
    writeln!(w, "{}{:?}", prefix, node.kind())?;

    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(n) => format_cst(&n, indent + 1, trivia, w)?,
            NodeOrToken::Token(t) => {
                if trivia || !t.kind().is_trivia() {
                    writeln!(w, "{}  {:?} {:?}", prefix, t.kind(), t.text())?;
                }
            }
        }
    }
    Ok(())
}
