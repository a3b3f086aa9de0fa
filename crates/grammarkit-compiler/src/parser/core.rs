//! Token cursor and tree builder behind the grammar-file productions.
//!
//! Productions only ever see significant tokens. Trivia passed over by the
//! cursor is written into the tree just before the next token or node, so it
//! ends up as leading trivia of whatever follows it.

use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};

use super::cst::{SyntaxKind, TokenSet};
use super::lexer::Token;
use crate::Error;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Bracketed constructs whose closing token may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Delimiter {
    /// `( ... )` or `(?<name> ... )`
    Group,
    /// `{ ... }` after a rule name or body
    Attributes,
}

impl Delimiter {
    fn close(self) -> SyntaxKind {
        match self {
            Delimiter::Group => SyntaxKind::ParenClose,
            Delimiter::Attributes => SyntaxKind::BraceClose,
        }
    }

    fn diagnostic(self) -> DiagnosticKind {
        match self {
            Delimiter::Group => DiagnosticKind::UnclosedGroup,
            Delimiter::Attributes => DiagnosticKind::UnclosedAttributes,
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Delimiter::Group => "expected `)`",
            Delimiter::Attributes => "expected `}`",
        }
    }

    fn opened_here(self) -> &'static str {
        match self {
            Delimiter::Group => "group started here",
            Delimiter::Attributes => "attributes started here",
        }
    }
}

/// Optional caps on parser work. Hitting either one aborts the parse.
#[derive(Debug, Default)]
struct Budget {
    steps_left: Option<u32>,
    depth: u32,
    max_depth: Option<u32>,
}

pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    /// Indices into `tokens` of everything that is not trivia.
    significant: Vec<usize>,
    /// Position in `significant` of the current token.
    cursor: usize,
    /// Tokens before this index are already in the tree.
    written: usize,
    builder: GreenNodeBuilder<'static>,
    diagnostics: Diagnostics,
    last_report: Option<TextSize>,
    budget: Budget,
    fatal: Option<Error>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, tokens: Vec<Token>) -> Self {
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_trivia())
            .map(|(i, _)| i)
            .collect();
        Self {
            source,
            tokens,
            significant,
            cursor: 0,
            written: 0,
            builder: GreenNodeBuilder::new(),
            diagnostics: Diagnostics::new(),
            last_report: None,
            budget: Budget::default(),
            fatal: None,
        }
    }

    /// Aborts with [`Error::ExecFuelExhausted`] after `limit` tokens.
    pub fn with_step_limit(mut self, limit: Option<u32>) -> Self {
        self.budget.steps_left = limit;
        self
    }

    /// Aborts with [`Error::RecursionLimitExceeded`] past `limit` nested items.
    pub fn with_depth_limit(mut self, limit: Option<u32>) -> Self {
        self.budget.max_depth = limit;
        self
    }

    pub(super) fn finish(mut self) -> Result<(GreenNode, Diagnostics), Error> {
        if let Some(err) = self.fatal {
            return Err(err);
        }
        Ok((self.builder.finish(), self.diagnostics))
    }

    /// Index of the current significant token. Only moves forward.
    pub(super) fn position(&self) -> usize {
        self.cursor
    }

    /// True past the last significant token, or once the parse was aborted.
    pub(super) fn at_end(&self) -> bool {
        self.cursor >= self.significant.len() || self.fatal.is_some()
    }

    /// Kind of the `n`th significant token from the cursor. `Error` past the end.
    pub(super) fn nth(&self, n: usize) -> SyntaxKind {
        self.significant
            .get(self.cursor + n)
            .map_or(SyntaxKind::Error, |&i| self.tokens[i].kind)
    }

    pub(super) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    pub(super) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub(super) fn at_any(&self, set: TokenSet) -> bool {
        set.contains(self.current())
    }

    /// A rule name directly followed by `:`.
    pub(super) fn at_rule_head(&self) -> bool {
        self.at(SyntaxKind::Id) && self.nth(1) == SyntaxKind::Colon
    }

    /// Span of the current token, or an empty span at end of input.
    pub(super) fn span(&self) -> TextRange {
        match self.significant.get(self.cursor) {
            Some(&i) => self.tokens[i].span,
            None => TextRange::empty(TextSize::of(self.source)),
        }
    }

    fn write_trivia_until(&mut self, end: usize) {
        while self.written < end {
            let token = self.tokens[self.written];
            self.builder.token(token.kind.into(), token.text(self.source));
            self.written += 1;
        }
    }

    fn next_raw_index(&self) -> usize {
        self.significant
            .get(self.cursor)
            .copied()
            .unwrap_or(self.tokens.len())
    }

    /// Writes trivia skipped so far into the current node.
    pub(super) fn flush_trivia(&mut self) {
        self.write_trivia_until(self.next_raw_index());
    }

    /// Opens the root node. Leading trivia goes inside it.
    pub(super) fn start_root(&mut self) {
        self.builder.start_node(SyntaxKind::Root.into());
    }

    pub(super) fn start_node(&mut self, kind: SyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind.into());
    }

    pub(super) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    /// Moves the current token into the tree.
    pub(super) fn bump(&mut self) {
        let index = self.significant[self.cursor];
        self.spend_step();
        self.write_trivia_until(index);
        let token = self.tokens[index];
        self.builder.token(token.kind.into(), token.text(self.source));
        self.written = index + 1;
        self.cursor += 1;
    }

    pub(super) fn eat(&mut self, kind: SyntaxKind) -> bool {
        let found = self.at(kind);
        if found {
            self.bump();
        }
        found
    }

    /// Eats `kind` or reports `missing` without consuming anything.
    pub(super) fn expect(&mut self, kind: SyntaxKind, missing: DiagnosticKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(missing, None);
        false
    }

    fn spend_step(&mut self) {
        match self.budget.steps_left {
            Some(0) => self.abort(Error::ExecFuelExhausted),
            Some(ref mut left) => *left -= 1,
            None => {}
        }
    }

    fn abort(&mut self, err: Error) {
        self.fatal.get_or_insert(err);
    }

    /// Enters one level of item nesting, or aborts the parse at the limit.
    pub(super) fn descend(&mut self) -> bool {
        if self
            .budget
            .max_depth
            .is_some_and(|max| self.budget.depth >= max)
        {
            self.abort(Error::RecursionLimitExceeded);
            return false;
        }
        self.budget.depth += 1;
        true
    }

    pub(super) fn ascend(&mut self) {
        self.budget.depth = self.budget.depth.saturating_sub(1);
    }

    /// Reports at the current token. A second report at the same offset is dropped.
    pub(super) fn error(&mut self, kind: DiagnosticKind, detail: Option<&str>) {
        let range = self.span();
        if self.last_report.replace(range.start()) == Some(range.start()) {
            return;
        }
        let report = self.diagnostics.report(kind, range);
        match detail {
            Some(detail) => report.message(detail).emit(),
            None => report.emit(),
        }
    }

    /// Reports at the current token and moves it into an `Error` node.
    pub(super) fn reject(&mut self, kind: DiagnosticKind, detail: Option<&str>) {
        self.error(kind, detail);
        if self.at_end() {
            return;
        }
        self.start_node(SyntaxKind::Error);
        self.bump();
        self.finish_node();
    }

    /// Reports `kind`, then wraps everything up to the next `stop` token in a
    /// single `Error` node.
    pub(super) fn skip_until(&mut self, kind: DiagnosticKind, stop: TokenSet) {
        if self.at_end() || self.at_any(stop) {
            self.error(kind, None);
            return;
        }
        self.start_node(SyntaxKind::Error);
        self.error(kind, None);
        while !self.at_end() && !self.at_any(stop) {
            self.bump();
        }
        self.finish_node();
    }

    /// Bumps an opening `(` or `{` and returns its span for [`Parser::close`].
    pub(super) fn open(&mut self) -> TextRange {
        let span = self.span();
        self.bump();
        span
    }

    /// Eats the closing token. When it is missing, the report covers the whole
    /// construct and points back at the opening token.
    pub(super) fn close(&mut self, delimiter: Delimiter, opened: TextRange) {
        if self.eat(delimiter.close()) {
            return;
        }
        let here = self.span();
        if self.last_report.replace(here.start()) == Some(here.start()) {
            return;
        }
        self.diagnostics
            .report(delimiter.diagnostic(), TextRange::new(opened.start(), here.end()))
            .message(delimiter.expected())
            .related_to(delimiter.opened_here(), opened)
            .emit();
    }
}
