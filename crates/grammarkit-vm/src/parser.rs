//! Tokens to match chains.

use grammarkit_core::{Grammar, MatchChain, RuleId, TokenStream};

use crate::error::{FuelLimits, RuntimeError};
use crate::eval::{EvalResult, Evaluator, Input, Matched};
use crate::listener::{Listener, NoopListener};

/// Groups a token stream into match chains with a grammar's parser rules.
///
/// Same loop as the [`Lexer`](crate::Lexer): at each token the parser rules
/// are tried in precedence order and the first that consumes tokens wins.
/// Tokens no rule claims are skipped one at a time.
#[derive(Debug, Clone)]
pub struct Parser<'g> {
    grammar: &'g Grammar,
    limits: FuelLimits,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            limits: FuelLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: FuelLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn parse(&self, tokens: &TokenStream) -> Result<Vec<MatchChain>, RuntimeError> {
        self.parse_with(tokens, &mut NoopListener)
    }

    pub fn parse_with<L: Listener<[MatchChain]>>(
        &self,
        tokens: &TokenStream,
        listener: &mut L,
    ) -> Result<Vec<MatchChain>, RuntimeError> {
        let slice = tokens.as_slice();
        let mut eval = Evaluator::new(self.grammar, Input::Tokens(slice), self.limits);
        let mut chains = Vec::new();
        let mut pos = 0;

        while pos < slice.len() {
            let Some((root, m)) = self.winner(&mut eval, pos)? else {
                tracing::trace!(pos, token = %slice[pos], "no rule matched");
                listener.did_skip(&slice[pos]);
                pos += 1;
                continue;
            };

            let rule = self.grammar.rule(root);
            if rule.is_skip() {
                for token in &slice[pos..m.end] {
                    listener.did_skip(token);
                }
            } else {
                let mut chain = MatchChain::new(rule.id.clone());
                chain.absorb(m.chain);
                chain.matches = true;
                tracing::trace!(%chain, "matched");
                listener.did_generate(&chain);
                chains.push(chain);
            }
            pos = m.end;
        }

        tracing::debug!(tokens = slice.len(), chains = chains.len(), "parsed");
        listener.did_finish(&chains);
        Ok(chains)
    }

    /// Matches one rule against the start of the stream.
    ///
    /// `None` when the rule does not exist or does not consume any token.
    pub fn parse_rule(&self, tokens: &TokenStream, name: &str) -> Result<Option<MatchChain>, RuntimeError> {
        let Some(root) = self.grammar.get(name) else {
            tracing::warn!(rule = name, "no such rule");
            return Ok(None);
        };
        let mut eval = Evaluator::new(self.grammar, Input::Tokens(tokens.as_slice()), self.limits);
        let Some(m) = eval.eval_rule(root, 0)? else {
            return Ok(None);
        };
        let mut chain = MatchChain::new(name);
        chain.absorb(m.chain);
        chain.matches = true;
        Ok(Some(chain))
    }

    fn winner(&self, eval: &mut Evaluator<'g, '_>, pos: usize) -> EvalResult<Option<(RuleId, Matched)>> {
        for &root in self.grammar.parser_rules() {
            if let Some(m) = eval.eval_rule(root, pos)? {
                return Ok(Some((root, m)));
            }
        }
        Ok(None)
    }
}
