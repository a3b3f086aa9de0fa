//! Hierarchical match results.

use std::fmt::{self, Write as _};
use std::ops::Range;

use serde::Serialize;

use crate::stream::Token;

/// Result of matching one rule: the tokens it covered and the named
/// sub-rules it matched along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchChain {
    /// Producing rule; `None` for anonymous scaffolding.
    pub rule: Option<String>,
    pub tokens: Vec<Token>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subchains: Vec<MatchChain>,
    pub matches: bool,
    /// Position in the parent's `subchains`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// From the first token's start to the last token's end.
    pub span: Option<Range<usize>>,
    /// Stream units consumed: bytes when lexing, tokens when parsing.
    pub units: usize,
}

impl MatchChain {
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: Some(rule.into()),
            ..Self::default()
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn add_token(&mut self, token: Token) {
        self.span = Some(match self.span.take() {
            Some(span) => span.start.min(token.range.start)..span.end.max(token.range.end),
            None => token.range.clone(),
        });
        self.tokens.push(token);
    }

    pub fn add_subchain(&mut self, mut chain: MatchChain) {
        chain.index = Some(self.subchains.len());
        self.subchains.push(chain);
    }

    /// Merges an anonymous chain into this one.
    pub fn absorb(&mut self, other: MatchChain) {
        for token in other.tokens {
            self.add_token(token);
        }
        for subchain in other.subchains {
            self.add_subchain(subchain);
        }
        self.units += other.units;
    }

    pub fn absolute_match(&self) -> bool {
        self.matches && !self.tokens.is_empty()
    }

    pub fn rule_name(&self) -> &str {
        self.rule.as_deref().unwrap_or("_")
    }

    /// Indented tree of the chain, its tokens and subchains.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        write!(out, "{indent}{}", self.rule_name()).expect("String write never fails");
        if let Some(span) = &self.span {
            write!(out, " {}..{}", span.start, span.end).expect("String write never fails");
        }
        out.push('\n');
        for token in &self.tokens {
            writeln!(out, "{indent}  {token}").expect("String write never fails");
        }
        for subchain in &self.subchains {
            subchain.dump_into(out, depth + 1);
        }
    }
}

impl fmt::Display for MatchChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rule_name())?;
        if let Some(span) = &self.span {
            write!(f, " {}..{}", span.start, span.end)?;
        }
        let values: Vec<&str> = self.tokens.iter().map(|t| t.value.as_str()).collect();
        write!(f, " {values:?}")
    }
}
