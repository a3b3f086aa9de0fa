//! Tokenizer for grammar files.
//!
//! Every byte of the source ends up in exactly one token, trivia included, so
//! the tree built from the stream reproduces the file. Runs of characters no
//! pattern accepts are merged into one `Garbage` token.

use logos::Logos;
use rowan::{TextRange, TextSize};

use super::cst::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.span]
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }
}

pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    for (result, range) in SyntaxKind::lexer(source).spanned() {
        let span = TextRange::new(offset(range.start), offset(range.end));
        let kind = result.unwrap_or(SyntaxKind::Garbage);
        match tokens.last_mut() {
            Some(last) if kind == SyntaxKind::Garbage && last.kind == SyntaxKind::Garbage => {
                last.span = last.span.cover(span);
            }
            _ => tokens.push(Token { kind, span }),
        }
    }
    tokens
}

fn offset(at: usize) -> TextSize {
    TextSize::try_from(at).expect("grammar files are smaller than 4 GiB")
}
