//! Characters to tokens.

use std::ops::Range;

use grammarkit_core::{
    CharacterStream, Grammar, MatchChain, MetadataOption, RuleId, Token, TokenStream,
};

use crate::error::{FuelLimits, RuntimeError};
use crate::eval::{EvalResult, Evaluator, Input};
use crate::listener::{Listener, NoopListener};

/// Tokenizes text with a grammar's lexer rules.
///
/// At each position the lexer rules are tried in precedence order, then the
/// grammar's unmatched rule. The first rule that consumes input wins; ties go
/// to precedence, not length.
#[derive(Debug, Clone)]
pub struct Lexer<'g> {
    grammar: &'g Grammar,
    limits: FuelLimits,
    alternate_rules: bool,
    nested: bool,
}

impl<'g> Lexer<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            limits: FuelLimits::default(),
            alternate_rules: false,
            nested: false,
        }
    }

    pub fn with_limits(mut self, limits: FuelLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Record every other lexer rule that matches a token's exact span.
    pub fn with_alternate_rules(mut self, enabled: bool) -> Self {
        self.alternate_rules = enabled;
        self
    }

    /// Lex the inside of `nested` rule matches into [`Token::nested`].
    pub fn with_nested(mut self, enabled: bool) -> Self {
        self.nested = enabled;
        self
    }

    pub fn tokenize(&self, stream: &CharacterStream) -> Result<TokenStream, RuntimeError> {
        self.tokenize_with(stream, &mut NoopListener)
    }

    pub fn tokenize_with<L: Listener<TokenStream>>(
        &self,
        stream: &CharacterStream,
        listener: &mut L,
    ) -> Result<TokenStream, RuntimeError> {
        self.run(stream, 0..stream.len(), listener)
    }

    /// Tokenizes only `range` of the stream. Offsets stay absolute; the range
    /// is clamped to the text and narrowed to character boundaries.
    pub fn tokenize_range(
        &self,
        stream: &CharacterStream,
        range: Range<usize>,
    ) -> Result<TokenStream, RuntimeError> {
        self.run(stream, range, &mut NoopListener)
    }

    fn run<L: Listener<TokenStream>>(
        &self,
        stream: &CharacterStream,
        range: Range<usize>,
        listener: &mut L,
    ) -> Result<TokenStream, RuntimeError> {
        let text = stream.as_str();
        let start = snap(text, range.start, true);
        let end = snap(text, range.end, false).max(start);

        let mut eval = Evaluator::new(self.grammar, Input::text(text), self.limits);
        eval.set_text_end(end);
        let tokens = self.scan(&mut eval, text, start..end, listener)?;

        tracing::debug!(tokens = tokens.len(), start, end, "tokenized");
        listener.did_finish(&tokens);
        Ok(tokens)
    }

    fn scan<L: Listener<TokenStream>>(
        &self,
        eval: &mut Evaluator<'g, '_>,
        text: &str,
        range: Range<usize>,
        listener: &mut L,
    ) -> EvalResult<TokenStream> {
        let unmatched = self.grammar.unmatched_rule();
        let mut tokens = TokenStream::new();
        let mut pos = range.start;

        while pos < range.end {
            let (root, end) = match self.winner(eval, pos)? {
                Some(won) => won,
                None => (unmatched, next_boundary(text, pos)),
            };
            let rule = self.grammar.rule(root);

            if rule.is_skip() {
                tracing::trace!(rule = %rule.id, start = pos, end, "skipped");
                pos = end;
                continue;
            }

            let mut token = Token::new(&text[pos..end], pos..end, rule.id.clone());
            if root == unmatched {
                tracing::trace!(start = pos, end, "unmatched");
                listener.did_skip(&token);
                tokens.push(token);
                pos = end;
                continue;
            }

            if self.alternate_rules {
                for &other in self.grammar.lexer_rules() {
                    if other != root
                        && eval.eval_rule(other, pos)?.is_some_and(|m| m.end == end)
                    {
                        token.rules.push(self.grammar.rule(other).id.clone());
                    }
                }
            }
            if self.nested && rule.has(MetadataOption::Nested) {
                token.nested = self.scan_inner(eval, text, pos..end)?.into_vec();
            }

            tracing::trace!(rule = %rule.id, start = pos, end, "token");
            let mut chain = MatchChain::new(rule.id.clone());
            chain.add_token(token.clone());
            chain.matches = true;
            chain.units = end - pos;
            listener.did_generate(&chain);

            tokens.push(token);
            pos = end;
        }
        Ok(tokens)
    }

    /// First lexer rule, then the unmatched rule, that consumes input at `pos`.
    fn winner(&self, eval: &mut Evaluator<'g, '_>, pos: usize) -> EvalResult<Option<(RuleId, usize)>> {
        let candidates = self
            .grammar
            .lexer_rules()
            .iter()
            .copied()
            .chain([self.grammar.unmatched_rule()]);
        for root in candidates {
            if let Some(m) = eval.eval_rule(root, pos)? {
                return Ok(Some((root, m.end)));
            }
        }
        Ok(None)
    }

    /// Lexes a match without its first and last character.
    fn scan_inner(
        &self,
        eval: &mut Evaluator<'g, '_>,
        text: &str,
        span: Range<usize>,
    ) -> EvalResult<TokenStream> {
        let inner = &text[span.clone()];
        let (Some(first), Some(last)) = (inner.chars().next(), inner.chars().next_back()) else {
            return Ok(TokenStream::new());
        };
        let start = span.start + first.len_utf8();
        let end = span.end - last.len_utf8();
        if start >= end {
            return Ok(TokenStream::new());
        }

        let outer_end = eval.set_text_end(end);
        let tokens = self.scan(eval, text, start..end, &mut NoopListener);
        eval.set_text_end(outer_end);
        tokens
    }
}

/// Clamps `at` into `text` and moves it onto a character boundary.
fn snap(text: &str, at: usize, forward: bool) -> usize {
    let mut at = at.min(text.len());
    while !text.is_char_boundary(at) {
        if forward {
            at += 1;
        } else {
            at -= 1;
        }
    }
    at
}

fn next_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len(), |c| pos + c.len_utf8())
}
