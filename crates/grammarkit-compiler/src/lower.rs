//! Lowering: typed AST into a [`Grammar`].
//!
//! Imports are resolved first and merged into the new grammar, then every
//! well-formed local rule is lowered into the rule arena. A rule that fails to
//! lower is dropped with an error diagnostic; the rest of the file still loads.
//! Reference, recursion and precedence checks run last, over the final rule set,
//! and only produce warnings.

use std::collections::HashSet;

use indexmap::IndexMap;
use rowan::{Direction, TextRange};

use grammarkit_core::pattern::is_bare_word;
use grammarkit_core::{
    Grammar, GrammarRule, MetadataOption, PatternSource, Quantifier, RuleClass, RuleId, RuleKind,
    UNMATCHED_RULE_ID,
};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::parser::ast::{self, Atom};
use crate::parser::{SyntaxToken, cst::SyntaxKind};

/// Why an imported grammar could not be provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    NotFound,
    /// Import chain that leads back to a grammar still loading, e.g. `A -> B -> A`.
    Cycle(String),
}

/// Supplies grammars named by `import` declarations.
pub trait ImportResolver {
    fn resolve(&mut self, name: &str) -> Result<Grammar, ImportError>;
}

/// Resolver for sources that must not import anything.
pub struct NoImports;

impl ImportResolver for NoImports {
    fn resolve(&mut self, _name: &str) -> Result<Grammar, ImportError> {
        Err(ImportError::NotFound)
    }
}

/// Lowers a parsed grammar file.
///
/// `parse_diagnostics` decides which rules are malformed. Returns `None` when the
/// file has no usable `grammar Name;` header.
pub fn lower(
    root: &ast::Root,
    parse_diagnostics: &Diagnostics,
    resolver: &mut dyn ImportResolver,
) -> (Option<Grammar>, Diagnostics) {
    let mut lowering = Lowering::new(parse_diagnostics);
    let grammar = lowering.lower_root(root, resolver);
    (grammar, lowering.diagnostics)
}

struct Lowering<'p> {
    parse_diagnostics: &'p Diagnostics,
    diagnostics: Diagnostics,
    grammar: Grammar,
    rules: IndexMap<String, RuleId>,
    /// Name ranges of rules defined in this file.
    local: IndexMap<String, TextRange>,
    references: Vec<(String, TextRange)>,
    precedence_targets: Vec<(String, TextRange)>,
    /// Groups named by rule-level `{group: name}` tags, here or in imports.
    rule_groups: HashSet<String>,
}

/// Per-rule state while lowering one body.
struct RuleScope {
    name: String,
    groups: HashSet<String>,
}

impl<'p> Lowering<'p> {
    fn new(parse_diagnostics: &'p Diagnostics) -> Self {
        Self {
            parse_diagnostics,
            diagnostics: Diagnostics::new(),
            grammar: Grammar::new(""),
            rules: IndexMap::new(),
            local: IndexMap::new(),
            references: Vec::new(),
            precedence_targets: Vec::new(),
            rule_groups: HashSet::new(),
        }
    }

    fn lower_root(&mut self, root: &ast::Root, resolver: &mut dyn ImportResolver) -> Option<Grammar> {
        let Some(header) = root.header() else {
            self.diagnostics
                .report(DiagnosticKind::ExpectedHeader, TextRange::empty(0.into()))
                .emit();
            return None;
        };
        let name = header.name()?;
        self.grammar.set_name(name.text());

        for import in root.imports() {
            self.lower_import(&import, resolver);
        }
        self.rules = self.grammar.rules().clone();
        self.collect_rule_groups(root);

        for rule in root.rules() {
            self.lower_rule(&rule);
        }

        let rules = std::mem::take(&mut self.rules);
        self.grammar.set_rules(rules);

        self.check_references();
        self.check_recursion();
        self.check_precedence();

        Some(std::mem::replace(&mut self.grammar, Grammar::new("")))
    }

    fn lower_import(&mut self, import: &ast::Import, resolver: &mut dyn ImportResolver) {
        let Some(name) = import.name() else {
            return;
        };
        let range = import.as_cst().text_range();
        self.grammar.add_import(name.text());

        match resolver.resolve(name.text()) {
            Ok(imported) => self.grammar.merge(&imported),
            Err(ImportError::NotFound) => {
                self.diagnostics
                    .report(DiagnosticKind::ImportNotFound, range)
                    .message(name.text())
                    .emit();
            }
            Err(ImportError::Cycle(chain)) => {
                self.diagnostics
                    .report(DiagnosticKind::ImportCycle, range)
                    .message(chain)
                    .emit();
            }
        }
    }

    /// A rule tagged `{group: name}` captures its match wherever it is
    /// referenced, so `$name` is valid in every body.
    fn collect_rule_groups(&mut self, root: &ast::Root) {
        for id in self.grammar.rules().values() {
            if let Some(group) = &self.grammar.rule(*id).metadata.group {
                self.rule_groups.insert(group.clone());
            }
        }
        for rule in root.rules() {
            for attribute in rule.attributes() {
                if attribute.key().is_some_and(|key| key.text() == "group")
                    && let Some(group) = attribute.value().and_then(|v| v.items().into_iter().next())
                {
                    self.rule_groups.insert(group);
                }
            }
        }
    }

    fn is_malformed(&self, rule: &ast::Rule) -> bool {
        if rule.has_error_nodes() {
            return true;
        }
        let range = rule.as_cst().text_range();
        self.parse_diagnostics.iter().any(|d| {
            d.is_error()
                && d.kind() != DiagnosticKind::ExpectedSemicolon
                && range.contains_range(d.range())
        })
    }

    fn lower_rule(&mut self, rule: &ast::Rule) {
        let Some(name_token) = rule.name() else {
            return;
        };
        if self.is_malformed(rule) {
            return;
        }
        let Some(body) = rule.body() else {
            return;
        };
        let name = name_token.text().to_string();
        let name_range = name_token.text_range();

        let mut root = GrammarRule::new(name.clone(), RuleKind::Composite { children: Vec::new() });
        if rule.is_fragment() {
            root.metadata.insert(MetadataOption::Fragment);
        }
        for attribute in rule.attributes() {
            self.lower_attribute(&attribute, &mut root);
        }
        let is_dictionary = root.has(MetadataOption::Dictionary);
        let extends = root.has(MetadataOption::Extend);

        if !extends && let Some(&first) = self.local.get(&name) {
            self.diagnostics
                .report(DiagnosticKind::DuplicateDefinition, name_range)
                .message(&name)
                .related_to("first defined here", first)
                .emit();
            return;
        }

        let mut scope = RuleScope {
            name: name.clone(),
            groups: HashSet::new(),
        };
        if let Some(group) = &root.metadata.group {
            scope.groups.insert(group.clone());
        }

        let root_id = self.grammar.alloc(root);
        let lowered = if is_dictionary {
            self.lower_dictionary(&body, root_id, &name)
        } else {
            self.lower_alternatives(&body, root_id, &mut scope)
        };
        if lowered.is_none() {
            return;
        }

        self.local.entry(name.clone()).or_insert(name_range);
        self.register(name, root_id, extends, name_range);
    }

    fn register(&mut self, name: String, root_id: RuleId, extends: bool, range: TextRange) {
        if !extends {
            self.rules.insert(name, root_id);
            return;
        }

        let Some(&existing) = self.rules.get(&name) else {
            self.diagnostics
                .report(DiagnosticKind::ExtendUndefined, range)
                .message(&name)
                .emit();
            self.rules.insert(name, root_id);
            return;
        };

        let children = self.grammar.rule(root_id).children().to_vec();
        for child in children {
            self.grammar.arena_mut().push_child(existing, child);
        }
    }

    fn lower_attribute(&mut self, attribute: &ast::Attribute, rule: &mut GrammarRule) {
        let Some(key) = attribute.key() else {
            return;
        };
        let values = attribute.value().map(|v| v.items()).unwrap_or_default();

        match key.text() {
            "precedence" => {
                let range = attribute.as_cst().text_range();
                for item in &values {
                    if let Err(err) = rule.precedence.push_item(item) {
                        self.diagnostics
                            .report(DiagnosticKind::InvalidPrecedence, range)
                            .message(err.0)
                            .emit();
                    }
                }
                for target in rule.precedence.relations.keys() {
                    self.precedence_targets.push((target.clone(), range));
                }
            }
            "group" => match values.first() {
                Some(group) => rule.metadata.group = Some(group.clone()),
                None => {
                    self.diagnostics
                        .report(DiagnosticKind::UnknownAttribute, key.text_range())
                        .message("group (missing name)")
                        .emit();
                }
            },
            other => match other.parse::<MetadataOption>() {
                Ok(option) => rule.metadata.insert(option),
                Err(_) => {
                    self.diagnostics
                        .report(DiagnosticKind::UnknownAttribute, key.text_range())
                        .message(other)
                        .emit();
                }
            },
        }
    }

    /// One composite child per literal, each recorded as a word.
    fn lower_dictionary(&mut self, body: &ast::Body, root_id: RuleId, name: &str) -> Option<()> {
        let mut entries = Vec::new();
        for item in body.branches().flat_map(|b| b.items().collect::<Vec<_>>()) {
            match item.atom() {
                Some(Atom::Literal(literal))
                    if !literal.is_range()
                        && !item.is_inverted()
                        && item.quantifier().is_none()
                        && item.capture_tag().is_none() =>
                {
                    entries.push(literal.value()?);
                }
                _ => {
                    self.diagnostics
                        .report(DiagnosticKind::InvalidDictionaryEntry, item.as_cst().text_range())
                        .emit();
                    return None;
                }
            }
        }

        for token in entries {
            let text = unquote(token.text());
            let id = self.literal_node(name, &text, token.text_range())?;
            self.grammar.arena_mut().push_child(root_id, id);
            self.grammar.add_word(text, name);
        }
        Some(())
    }

    fn lower_alternatives(
        &mut self,
        body: &ast::Body,
        composite: RuleId,
        scope: &mut RuleScope,
    ) -> Option<()> {
        for branch in body.branches() {
            if branch.is_empty() {
                let range = empty_branch_range(&branch, body);
                self.diagnostics
                    .report(DiagnosticKind::EmptyAlternative, range)
                    .emit();
                return None;
            }
            let first = self.lower_sequence(&branch, scope)?;
            self.grammar.arena_mut().push_child(composite, first);
        }
        Some(())
    }

    /// Lowers a branch into a `next`-linked chain, returning its head.
    fn lower_sequence(&mut self, branch: &ast::Branch, scope: &mut RuleScope) -> Option<RuleId> {
        let mut ids = Vec::new();
        for item in branch.items() {
            ids.push(self.lower_item(&item, scope)?);
        }
        for pair in ids.windows(2) {
            self.grammar.rule_mut(pair[0]).next = Some(pair[1]);
        }
        ids.first().copied()
    }

    fn lower_item(&mut self, item: &ast::Item, scope: &mut RuleScope) -> Option<RuleId> {
        let atom = item.atom()?;
        let id = match &atom {
            Atom::Literal(literal) => self.lower_literal(literal, &scope.name)?,
            Atom::Class(class) => {
                let token = class.token()?;
                self.expression_node(&scope.name, token.text(), token.text_range())?
            }
            Atom::Wildcard(wildcard) => {
                self.expression_node(&scope.name, ".", wildcard.as_cst().text_range())?
            }
            Atom::Ref(reference) => {
                let token = reference.name()?;
                let target = token.text().to_string();
                self.references.push((target.clone(), token.text_range()));
                let class = RuleClass::of(&target);
                self.grammar.alloc(GrammarRule::new(
                    scope.name.clone(),
                    RuleKind::RuleRef { target, class },
                ))
            }
            Atom::BackRef(token) => {
                let name = token.text().trim_start_matches('$').to_string();
                if !scope.groups.contains(&name) && !self.rule_groups.contains(&name) {
                    self.diagnostics
                        .report(DiagnosticKind::UnknownCaptureGroup, token.text_range())
                        .message(&name)
                        .emit();
                }
                self.grammar.alloc(GrammarRule::new(
                    scope.name.clone(),
                    RuleKind::CaptureGroupRef { name },
                ))
            }
            Atom::Group(group) => self.lower_group(group, scope)?,
        };

        if let Some(token) = item.quantifier() {
            self.grammar.rule_mut(id).quantifier = self.quantifier(&token)?;
        }
        if item.is_inverted() {
            self.grammar.rule_mut(id).inverted = true;
        }
        if let Some(tag) = item.capture_tag() {
            let name = tag.text().trim_start_matches('#').to_string();
            scope.groups.insert(name.clone());
            self.grammar.rule_mut(id).metadata.group = Some(name);
        }
        Some(id)
    }

    fn lower_group(&mut self, group: &ast::Group, scope: &mut RuleScope) -> Option<RuleId> {
        let body = group.body()?;
        let mut node = GrammarRule::new(scope.name.clone(), RuleKind::Composite { children: Vec::new() });
        node.metadata.group = group.name();
        let id = self.grammar.alloc(node);

        self.lower_alternatives(&body, id, scope)?;
        if let Some(name) = group.name() {
            scope.groups.insert(name);
        }
        Some(id)
    }

    fn lower_literal(&mut self, literal: &ast::Literal, rule: &str) -> Option<RuleId> {
        let start = literal.value()?;
        let Some(end) = literal.range_end() else {
            let text = unquote(start.text());
            return self.literal_node(rule, &text, start.text_range());
        };

        let range = literal.as_cst().text_range();
        let (Some(lo), Some(hi)) = (single_char(&unquote(start.text())), single_char(&unquote(end.text())))
        else {
            self.diagnostics
                .report(DiagnosticKind::InvalidPattern, range)
                .message("range bounds must be single characters")
                .emit();
            return None;
        };

        let source = format!("{}..{}", start.text(), end.text());
        let pattern = match self.grammar.intern_pattern(PatternSource::LiteralRange(lo, hi)) {
            Ok(pattern) => pattern,
            Err(err) => {
                self.diagnostics
                    .report(DiagnosticKind::InvalidPattern, range)
                    .message(err.to_string())
                    .emit();
                return None;
            }
        };
        Some(self.grammar.alloc(GrammarRule::new(
            rule,
            RuleKind::Expression { source, pattern },
        )))
    }

    fn literal_node(&mut self, rule: &str, text: &str, range: TextRange) -> Option<RuleId> {
        let pattern = match self.grammar.intern_pattern(PatternSource::Literal(text)) {
            Ok(pattern) => pattern,
            Err(err) => {
                self.diagnostics
                    .report(DiagnosticKind::InvalidPattern, range)
                    .message(err.to_string())
                    .emit();
                return None;
            }
        };
        if is_bare_word(text) {
            self.grammar.add_identifier(text);
        }
        Some(self.grammar.alloc(GrammarRule::new(
            rule,
            RuleKind::Literal {
                text: text.to_string(),
                pattern,
            },
        )))
    }

    fn expression_node(&mut self, rule: &str, source: &str, range: TextRange) -> Option<RuleId> {
        let pattern = match self.grammar.intern_pattern(PatternSource::Expression(source)) {
            Ok(pattern) => pattern,
            Err(err) => {
                self.diagnostics
                    .report(DiagnosticKind::InvalidPattern, range)
                    .message(err.to_string())
                    .emit();
                return None;
            }
        };
        Some(self.grammar.alloc(GrammarRule::new(
            rule,
            RuleKind::Expression {
                source: source.to_string(),
                pattern,
            },
        )))
    }

    fn quantifier(&mut self, token: &SyntaxToken) -> Option<Quantifier> {
        let quantifier = Quantifier::parse(token.text());
        if quantifier.is_none() {
            self.diagnostics
                .report(DiagnosticKind::InvalidQuantifier, token.text_range())
                .message(token.text())
                .emit();
        }
        quantifier
    }

    // --- whole-grammar checks -----------------------------------------------

    fn check_references(&mut self) {
        for (target, range) in std::mem::take(&mut self.references) {
            if target == UNMATCHED_RULE_ID || self.grammar.get(&target).is_some() {
                continue;
            }
            self.diagnostics
                .report(DiagnosticKind::UndefinedReference, range)
                .message(&target)
                .emit();
        }
    }

    fn check_recursion(&mut self) {
        for (name, &range) in &self.local {
            if self.grammar.is_infinitely_recursive(name) {
                self.diagnostics
                    .report(DiagnosticKind::RecursionNoEscape, range)
                    .message(name)
                    .emit();
            } else if self.grammar.is_left_recursive(name) {
                self.diagnostics
                    .report(DiagnosticKind::LeftRecursion, range)
                    .message(name)
                    .emit();
            }
        }
    }

    fn check_precedence(&mut self) {
        for (target, range) in std::mem::take(&mut self.precedence_targets) {
            if self.grammar.get(&target).is_none() {
                self.diagnostics
                    .report(DiagnosticKind::UndefinedPrecedenceTarget, range)
                    .message(&target)
                    .emit();
            }
        }

        for (a, b) in self.grammar.precedence_conflicts() {
            let Some(&range) = self.local.get(&a).or_else(|| self.local.get(&b)) else {
                continue;
            };
            self.diagnostics
                .report(DiagnosticKind::AmbiguousPrecedence, range)
                .message(format!("`{a}` and `{b}`"))
                .emit();
        }
    }
}

/// Zero-width range where an empty branch sits: after the preceding `|`.
fn empty_branch_range(branch: &ast::Branch, body: &ast::Body) -> TextRange {
    let offset = branch
        .as_cst()
        .siblings_with_tokens(Direction::Prev)
        .skip(1)
        .find(|it| !it.kind().is_trivia())
        .filter(|it| it.kind() == SyntaxKind::Pipe)
        .map_or_else(|| body.as_cst().text_range().start(), |it| it.text_range().end());
    TextRange::empty(offset)
}

/// Strips the quotes of a string literal and resolves escapes.
pub fn unquote(text: &str) -> String {
    let inner = if text.len() >= 2 {
        &text[1..text.len() - 1]
    } else {
        ""
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}
