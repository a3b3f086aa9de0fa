//! Input and output streams of the matching engine.

use std::fmt;
use std::ops::{Index, Range};

use serde::Serialize;

/// A lexed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub value: String,
    /// Byte span into the source text.
    pub range: Range<usize>,
    /// Rule ids this token satisfies; the winning rule comes first.
    pub rules: Vec<String>,
    /// Tokens re-lexed from the inner range of a `nested` rule.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<Token>,
}

impl Token {
    pub fn new(value: impl Into<String>, range: Range<usize>, rule: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            range,
            rules: vec![rule.into()],
            nested: Vec::new(),
        }
    }

    /// The winning rule.
    pub fn rule(&self) -> Option<&str> {
        self.rules.first().map(String::as_str)
    }

    pub fn satisfies(&self, rule: &str) -> bool {
        self.rules.iter().any(|r| r == rule)
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} {}..{}",
            self.rules.join("|"),
            self.value,
            self.range.start,
            self.range.end
        )
    }
}

/// Ordered output of the lexer, input of the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_vec(self) -> Vec<Token> {
        self.tokens
    }
}

impl Index<usize> for TokenStream {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }
}

impl FromIterator<Token> for TokenStream {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl fmt::Display for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            writeln!(f, "{token}")?;
        }
        Ok(())
    }
}

/// Source text handed to the lexer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterStream {
    text: String,
}

impl CharacterStream {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// `None` when the range is out of bounds or splits a character.
    pub fn slice(&self, range: Range<usize>) -> Option<&str> {
        self.text.get(range)
    }
}

impl From<String> for CharacterStream {
    fn from(text: String) -> Self {
        Self { text }
    }
}

impl From<&str> for CharacterStream {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
