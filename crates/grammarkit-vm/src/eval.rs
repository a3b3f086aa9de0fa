//! Rule evaluation shared by the lexer and the parser.
//!
//! One evaluator walks rule trees over either source text (lexing, positions
//! are byte offsets) or a token slice (parsing, positions are token indices).
//! Evaluation is greedy-first with no backtracking inside a sequence: a
//! composite commits to the first alternative that consumes input.

use std::collections::HashSet;
use std::ops::Range;

use grammarkit_core::{
    Grammar, GrammarRule, MatchChain, PatternId, RuleClass, RuleId, RuleKind, Token,
    UNMATCHED_RULE_ID,
};

use crate::error::{FuelLimits, RuntimeError};

pub(crate) type EvalResult<T> = Result<T, RuntimeError>;

/// The stream a run evaluates over.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Input<'i> {
    /// Source text; matching never reads past `end`.
    Text { text: &'i str, end: usize },
    Tokens(&'i [Token]),
}

impl<'i> Input<'i> {
    pub(crate) fn text(text: &'i str) -> Self {
        Input::Text {
            text,
            end: text.len(),
        }
    }
}

/// A successful evaluation: where it stopped and what it collected.
///
/// `chain` only carries tokens when evaluating over tokens.
#[derive(Debug)]
pub(crate) struct Matched {
    pub(crate) end: usize,
    pub(crate) chain: MatchChain,
}

impl Matched {
    fn empty(pos: usize) -> Self {
        Self {
            end: pos,
            chain: MatchChain::anonymous(),
        }
    }

    fn advance(&mut self, other: Matched) {
        self.end = other.end;
        self.chain.absorb(other.chain);
    }
}

/// A tagged span, visible until the sequence that stored it ends.
#[derive(Debug)]
struct Capture {
    iteration: usize,
    name: String,
    span: Range<usize>,
}

pub(crate) struct Evaluator<'g, 'i> {
    grammar: &'g Grammar,
    input: Input<'i>,
    limits: FuelLimits,
    fuel: Option<u32>,
    depth: u32,
    /// Bumped while a rule evaluates a reference to itself.
    iteration: usize,
    captures: Vec<Capture>,
    /// Rule roots currently being evaluated, by start position.
    active: HashSet<(RuleId, usize)>,
    warned: HashSet<String>,
}

impl<'g, 'i> Evaluator<'g, 'i> {
    pub(crate) fn new(grammar: &'g Grammar, input: Input<'i>, limits: FuelLimits) -> Self {
        Self {
            grammar,
            input,
            limits,
            fuel: limits.exec_fuel,
            depth: 0,
            iteration: 0,
            captures: Vec::new(),
            active: HashSet::new(),
            warned: HashSet::new(),
        }
    }

    /// Moves the end of a text input, returning the previous end.
    pub(crate) fn set_text_end(&mut self, new_end: usize) -> usize {
        match &mut self.input {
            Input::Text { end, .. } => std::mem::replace(end, new_end),
            Input::Tokens(tokens) => tokens.len(),
        }
    }

    /// Evaluates a whole rule at `pos`. Only matches that consume input count.
    pub(crate) fn eval_rule(&mut self, root: RuleId, pos: usize) -> EvalResult<Option<Matched>> {
        let mark = self.captures.len();
        let result = self.enter(root, pos, false);
        self.captures.truncate(mark);
        Ok(result?.filter(|m| m.end > pos))
    }

    // --- structure ---------------------------------------------------------

    /// Runs a `next`-linked sequence. Captures stored along the way are
    /// dropped when it ends.
    fn eval_chain(&mut self, start: RuleId, pos: usize) -> EvalResult<Option<Matched>> {
        let mark = self.captures.len();
        let mut acc = Matched::empty(pos);
        let mut cursor = Some(start);
        let result = loop {
            let Some(id) = cursor else {
                break Some(acc);
            };
            match self.eval_node(id, acc.end)? {
                Some(m) => acc.advance(m),
                None => break None,
            }
            cursor = self.grammar.rule(id).next;
        };
        self.captures.truncate(mark);
        Ok(result)
    }

    /// One node with its quantifier applied.
    fn eval_node(&mut self, id: RuleId, pos: usize) -> EvalResult<Option<Matched>> {
        let grammar = self.grammar;
        let node = grammar.rule(id);
        let quantifier = node.quantifier;

        let mut acc = Matched::empty(pos);
        let mut count = 0;
        while let Some(m) = self.eval_once(node, acc.end)? {
            let advanced = m.end > acc.end;
            acc.advance(m);
            count += 1;
            if !quantifier.greedy || !advanced {
                break;
            }
        }

        if !quantifier.accepts(count) {
            return Ok(None);
        }
        if let Some(name) = &node.metadata.group
            && acc.end > pos
        {
            self.captures.push(Capture {
                iteration: self.iteration,
                name: name.clone(),
                span: pos..acc.end,
            });
        }
        Ok(Some(acc))
    }

    /// A single repetition of a node, inversion included.
    fn eval_once(&mut self, node: &'g GrammarRule, pos: usize) -> EvalResult<Option<Matched>> {
        self.consume_fuel()?;

        let matched = match &node.kind {
            RuleKind::Literal { pattern, .. } | RuleKind::Expression { pattern, .. } => {
                self.eval_pattern(*pattern, pos)
            }
            RuleKind::Composite { children } => self.eval_alternatives(children, pos)?,
            RuleKind::RuleRef { target, class } => self.eval_ref(node, target, *class, pos)?,
            RuleKind::CaptureGroupRef { name } => self.eval_backref(name, pos),
        };

        if !node.inverted {
            return Ok(matched);
        }
        if matched.is_some() {
            return Ok(None);
        }
        Ok(self.single_unit(pos))
    }

    fn eval_alternatives(&mut self, children: &[RuleId], pos: usize) -> EvalResult<Option<Matched>> {
        for &child in children {
            if let Some(m) = self.eval_chain(child, pos)?
                && m.end > pos
            {
                return Ok(Some(m));
            }
        }
        Ok(None)
    }

    // --- leaves ------------------------------------------------------------

    fn eval_pattern(&self, id: PatternId, pos: usize) -> Option<Matched> {
        let pattern = self.grammar.pattern(id);
        match self.input {
            Input::Text { text, end } => {
                if pos > end {
                    return None;
                }
                let stop = pattern.match_at(text, pos..end)?;
                Some(Matched {
                    end: stop,
                    chain: units(stop - pos),
                })
            }
            Input::Tokens(tokens) => {
                let token = tokens.get(pos)?;
                if pattern.is_zero_width() {
                    pattern.match_prefix(&token.value)?;
                    return Some(Matched::empty(pos));
                }
                pattern
                    .match_whole(&token.value)
                    .then(|| take_token(token, pos))
            }
        }
    }

    /// Exactly one character or token, for inverted nodes.
    fn single_unit(&self, pos: usize) -> Option<Matched> {
        match self.input {
            Input::Text { text, end } => {
                let c = text.get(pos..end)?.chars().next()?;
                let stop = pos + c.len_utf8();
                Some(Matched {
                    end: stop,
                    chain: units(stop - pos),
                })
            }
            Input::Tokens(tokens) => tokens.get(pos).map(|token| take_token(token, pos)),
        }
    }

    fn eval_backref(&self, name: &str, pos: usize) -> Option<Matched> {
        let span = self
            .captures
            .iter()
            .rev()
            .find(|c| c.iteration == self.iteration && c.name == name)?
            .span
            .clone();

        match self.input {
            Input::Text { text, end } => {
                let captured = text.get(span)?;
                let rest = text.get(pos..end)?;
                if captured.is_empty() || !rest.starts_with(captured) {
                    return None;
                }
                let stop = pos + captured.len();
                Some(Matched {
                    end: stop,
                    chain: units(stop - pos),
                })
            }
            Input::Tokens(tokens) => {
                let captured = tokens.get(span)?;
                let candidate = tokens.get(pos..pos + captured.len())?;
                let same = captured
                    .iter()
                    .zip(candidate)
                    .all(|(a, b)| a.value == b.value);
                if captured.is_empty() || !same {
                    return None;
                }
                let mut m = Matched::empty(pos);
                for token in candidate {
                    m.chain.add_token(token.clone());
                }
                m.chain.units = candidate.len();
                m.end = pos + candidate.len();
                Some(m)
            }
        }
    }

    // --- references --------------------------------------------------------

    fn eval_ref(
        &mut self,
        node: &'g GrammarRule,
        target: &str,
        class: RuleClass,
        pos: usize,
    ) -> EvalResult<Option<Matched>> {
        let recursive = node.id == target;
        match (self.input, class) {
            (Input::Text { .. }, RuleClass::Parser) => Ok(None),
            (Input::Text { .. }, RuleClass::Lexer) => {
                let Some(root) = self.resolve(node, target) else {
                    return Ok(None);
                };
                self.enter(root, pos, recursive)
            }
            (Input::Tokens(tokens), RuleClass::Lexer) => {
                let Some(token) = tokens.get(pos) else {
                    return Ok(None);
                };
                if token.satisfies(target) {
                    return Ok(Some(take_token(token, pos)));
                }
                let Some(root) = self.resolve(node, target) else {
                    return Ok(None);
                };
                if !self.grammar.rule(root).is_fragment() {
                    return Ok(None);
                }
                let whole = self.eval_fragment_on(token, root)?;
                Ok(whole.then(|| take_token(token, pos)))
            }
            (Input::Tokens(_), RuleClass::Parser) => {
                let Some(root) = self.resolve(node, target) else {
                    return Ok(None);
                };
                let Some(m) = self.enter(root, pos, recursive)? else {
                    return Ok(None);
                };
                if self.grammar.rule(root).is_fragment() {
                    return Ok(Some(m));
                }
                Ok(Some(Matched {
                    end: m.end,
                    chain: named(target, m.chain),
                }))
            }
        }
    }

    /// Root of `target`, warning once per run when it does not exist.
    fn resolve(&mut self, node: &GrammarRule, target: &str) -> Option<RuleId> {
        if target == UNMATCHED_RULE_ID {
            return Some(self.grammar.unmatched_rule());
        }
        let root = self.grammar.get(target);
        if root.is_none() && self.warned.insert(target.to_string()) {
            tracing::warn!(rule = %node.id, target, "reference to undefined rule never matches");
        }
        root
    }

    /// Evaluates a fragment lexer rule against the full value of one token.
    fn eval_fragment_on(&mut self, token: &'i Token, root: RuleId) -> EvalResult<bool> {
        let saved_input = std::mem::replace(&mut self.input, Input::text(&token.value));
        let saved_active = std::mem::take(&mut self.active);
        let result = self.enter(root, 0, false);
        self.input = saved_input;
        self.active = saved_active;
        Ok(result?.is_some_and(|m| m.end > 0 && m.end == token.value.len()))
    }

    /// Evaluates a rule root reached by reference.
    ///
    /// Re-entering a root at the position it is already being evaluated at
    /// cannot make progress, so that path fails instead of recursing forever.
    fn enter(&mut self, root: RuleId, pos: usize, recursive: bool) -> EvalResult<Option<Matched>> {
        if !self.active.insert((root, pos)) {
            tracing::trace!(rule = %self.grammar.rule(root).id, pos, "left-recursive path cut");
            return Ok(None);
        }
        self.depth += 1;
        if let Some(limit) = self.limits.recursion_limit
            && self.depth > limit
        {
            return Err(RuntimeError::RecursionLimitExceeded(limit));
        }
        if recursive {
            self.iteration += 1;
        }

        let result = self.eval_node(root, pos);

        if recursive {
            self.iteration -= 1;
        }
        self.depth -= 1;
        self.active.remove(&(root, pos));
        result
    }

    fn consume_fuel(&mut self) -> EvalResult<()> {
        let Some(fuel) = &mut self.fuel else {
            return Ok(());
        };
        if *fuel == 0 {
            let limit = self.limits.exec_fuel.unwrap_or_default();
            return Err(RuntimeError::ExecFuelExhausted(limit));
        }
        *fuel -= 1;
        Ok(())
    }
}

/// An anonymous chain that consumed `n` units and holds no tokens.
fn units(n: usize) -> MatchChain {
    let mut chain = MatchChain::anonymous();
    chain.units = n;
    chain
}

fn take_token(token: &Token, pos: usize) -> Matched {
    let mut chain = MatchChain::anonymous();
    chain.add_token(token.clone());
    chain.units = 1;
    Matched {
        end: pos + 1,
        chain,
    }
}

/// Wraps a referenced rule's match as a subchain, keeping its tokens visible
/// to the caller.
fn named(rule: &str, inner: MatchChain) -> MatchChain {
    let mut sub = MatchChain::new(rule);
    sub.absorb(inner);
    sub.matches = true;

    let mut wrapper = MatchChain::anonymous();
    for token in &sub.tokens {
        wrapper.add_token(token.clone());
    }
    wrapper.units = sub.units;
    wrapper.add_subchain(sub);
    wrapper
}
