//! Grammar: named rule registry with precedence-sorted lexer and parser sets.

use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::comparison::ComparisonGraph;
use crate::pattern::{Pattern, PatternError, PatternId, PatternSource, PatternTable};
use crate::precedence::{MetadataOption, Precedence};
use crate::rule::{GrammarRule, RuleArena, RuleClass, RuleId, RuleKind};

/// Name of the synthetic fallback rule.
pub const UNMATCHED_RULE_ID: &str = "UNMATCHED";

/// A known word attached to the grammar, with the rule that declared it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Identifier {
    pub value: String,
    pub rule: String,
}

#[derive(Debug, Clone)]
pub struct Grammar {
    name: String,
    imports: Vec<String>,
    arena: RuleArena,
    patterns: PatternTable,
    rules: IndexMap<String, RuleId>,
    lexer_rules: Vec<RuleId>,
    parser_rules: Vec<RuleId>,
    unmatched_rule: RuleId,
    words: Vec<Identifier>,
    identifiers: IndexSet<String>,
}

impl Grammar {
    pub fn new(name: impl Into<String>) -> Self {
        let mut arena = RuleArena::new();
        let mut patterns = PatternTable::new();
        let pattern = patterns
            .intern(PatternSource::Expression("."))
            .expect("any-character pattern always compiles");
        let mut unmatched = GrammarRule::new(
            UNMATCHED_RULE_ID,
            RuleKind::Expression {
                source: ".".to_string(),
                pattern,
            },
        );
        unmatched.precedence = Precedence::lowest();
        let unmatched_rule = arena.alloc(unmatched);

        Self {
            name: name.into(),
            imports: Vec::new(),
            arena,
            patterns,
            rules: IndexMap::new(),
            lexer_rules: Vec::new(),
            parser_rules: Vec::new(),
            unmatched_rule,
            words: Vec::new(),
            identifiers: IndexSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Grammars this one inherits from, in import order.
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn add_import(&mut self, name: impl Into<String>) {
        self.imports.push(name.into());
    }

    // --- nodes -------------------------------------------------------------

    pub fn alloc(&mut self, rule: GrammarRule) -> RuleId {
        self.arena.alloc(rule)
    }

    pub fn rule(&self, id: RuleId) -> &GrammarRule {
        self.arena.get(id)
    }

    pub fn rule_mut(&mut self, id: RuleId) -> &mut GrammarRule {
        self.arena.get_mut(id)
    }

    pub fn arena(&self) -> &RuleArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut RuleArena {
        &mut self.arena
    }

    pub fn intern_pattern(&mut self, source: PatternSource<'_>) -> Result<PatternId, PatternError> {
        self.patterns.intern(source)
    }

    pub fn pattern(&self, id: PatternId) -> &Pattern {
        self.patterns.get(id)
    }

    pub fn patterns(&self) -> &PatternTable {
        &self.patterns
    }

    // --- registry ----------------------------------------------------------

    pub fn rules(&self) -> &IndexMap<String, RuleId> {
        &self.rules
    }

    pub fn get(&self, name: &str) -> Option<RuleId> {
        self.rules.get(name).copied()
    }

    pub fn rule_named(&self, name: &str) -> Option<&GrammarRule> {
        self.get(name).map(|id| self.rule(id))
    }

    /// Replaces the registry and recomputes the derived rule sets.
    pub fn set_rules(&mut self, rules: IndexMap<String, RuleId>) {
        self.rules = rules;
        self.derive_rule_sets();
    }

    /// Registers (or replaces) one rule and recomputes the derived rule sets.
    pub fn insert_rule(&mut self, name: impl Into<String>, root: RuleId) {
        self.rules.insert(name.into(), root);
        self.derive_rule_sets();
    }

    pub fn remove_rule(&mut self, name: &str) -> Option<RuleId> {
        let removed = self.rules.shift_remove(name);
        self.derive_rule_sets();
        removed
    }

    /// Lexer rules, highest precedence first.
    pub fn lexer_rules(&self) -> &[RuleId] {
        &self.lexer_rules
    }

    /// Parser rules, highest precedence first.
    pub fn parser_rules(&self) -> &[RuleId] {
        &self.parser_rules
    }

    pub fn unmatched_rule(&self) -> RuleId {
        self.unmatched_rule
    }

    pub fn words(&self) -> &[Identifier] {
        &self.words
    }

    pub fn add_word(&mut self, value: impl Into<String>, rule: impl Into<String>) {
        let word = Identifier {
            value: value.into(),
            rule: rule.into(),
        };
        if !self.words.contains(&word) {
            self.words.push(word);
        }
    }

    pub fn identifiers(&self) -> &IndexSet<String> {
        &self.identifiers
    }

    pub fn add_identifier(&mut self, value: impl Into<String>) {
        self.identifiers.insert(value.into());
    }

    fn derive_rule_sets(&mut self) {
        let (lexer, parser) = self.precedence_graphs();
        let resolve = |graph: ComparisonGraph<String>| -> Vec<RuleId> {
            graph
                .sorted(true)
                .iter()
                .filter_map(|name| self.rules.get(name).copied())
                .collect()
        };
        let lexer_rules = resolve(lexer);
        let parser_rules = resolve(parser);
        self.lexer_rules = lexer_rules;
        self.parser_rules = parser_rules;
    }

    /// One comparison graph per rule class, seeded from rule precedences.
    fn precedence_graphs(&self) -> (ComparisonGraph<String>, ComparisonGraph<String>) {
        let mut lexer = ComparisonGraph::new();
        let mut parser = ComparisonGraph::new();

        for (name, &root) in &self.rules {
            let rule = self.rule(root);
            if rule.is_fragment() || rule.has(MetadataOption::Omit) {
                continue;
            }
            let graph = match RuleClass::of(name) {
                RuleClass::Lexer => &mut lexer,
                RuleClass::Parser => &mut parser,
            };
            graph.add_node(name.clone());
            if let Some(weight) = rule.precedence.weight {
                graph.set_weight(name.clone(), weight);
            }
            for (target, relation) in &rule.precedence.relations {
                graph.connect(name.clone(), target.clone(), *relation);
            }
        }

        (lexer, parser)
    }

    /// Rule pairs whose precedence cannot be ordered consistently.
    pub fn precedence_conflicts(&self) -> Vec<(String, String)> {
        let (lexer, parser) = self.precedence_graphs();
        let mut out = lexer.conflicts();
        out.extend(parser.conflicts());
        out
    }

    // --- inheritance -------------------------------------------------------

    /// Copies every rule of `other` into this grammar, replacing same-named rules.
    pub fn merge(&mut self, other: &Grammar) {
        for (name, &root) in &other.rules {
            let copied = self.copy_subtree(other, root);
            self.rules.insert(name.clone(), copied);
        }
        for word in &other.words {
            self.add_word(word.value.clone(), word.rule.clone());
        }
        for identifier in &other.identifiers {
            self.identifiers.insert(identifier.clone());
        }
        self.derive_rule_sets();
    }

    fn copy_subtree(&mut self, other: &Grammar, id: RuleId) -> RuleId {
        let source = other.rule(id);
        let mut node = source.clone();
        node.parent = None;
        node.next = source.next.map(|next| self.copy_subtree(other, next));
        node.kind = match &source.kind {
            RuleKind::Literal { text, pattern } => RuleKind::Literal {
                text: text.clone(),
                pattern: self.patterns.import(&other.patterns, *pattern),
            },
            RuleKind::Expression { source, pattern } => RuleKind::Expression {
                source: source.clone(),
                pattern: self.patterns.import(&other.patterns, *pattern),
            },
            RuleKind::Composite { .. } => RuleKind::Composite {
                children: Vec::new(),
            },
            kind => kind.clone(),
        };

        let copied = self.arena.alloc(node);
        for &child in source.children() {
            let child = self.copy_subtree(other, child);
            self.arena.push_child(copied, child);
        }
        copied
    }

    // --- recursion analysis ------------------------------------------------

    /// Whether the rule body references the rule itself anywhere.
    pub fn is_recursive(&self, name: &str) -> bool {
        let Some(root) = self.get(name) else {
            return false;
        };
        self.arena
            .descendants(root)
            .into_iter()
            .any(|id| self.refers_to(id, name))
    }

    /// Whether every alternative must recurse before it can finish.
    pub fn is_infinitely_recursive(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|root| self.must_recurse(root, name))
    }

    /// Whether some alternative can reach a self reference before consuming anything.
    pub fn is_left_recursive(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|root| self.starts_with_self(root, name))
    }

    fn refers_to(&self, id: RuleId, name: &str) -> bool {
        matches!(&self.rule(id).kind, RuleKind::RuleRef { target, .. } if target == name)
    }

    fn must_recurse(&self, start: RuleId, name: &str) -> bool {
        self.arena.chain(start).any(|id| {
            let node = self.rule(id);
            if node.quantifier.optional || node.inverted {
                return false;
            }
            match &node.kind {
                RuleKind::RuleRef { target, .. } => target == name,
                RuleKind::Composite { children } => {
                    !children.is_empty() && children.iter().all(|&c| self.must_recurse(c, name))
                }
                _ => false,
            }
        })
    }

    fn starts_with_self(&self, start: RuleId, name: &str) -> bool {
        for id in self.arena.chain(start) {
            let node = self.rule(id);
            let hit = match &node.kind {
                RuleKind::RuleRef { target, .. } => target == name,
                RuleKind::Composite { children } => {
                    children.iter().any(|&c| self.starts_with_self(c, name))
                }
                _ => false,
            };
            if hit {
                return true;
            }
            if !node.quantifier.optional {
                return false;
            }
        }
        false
    }

    // --- rendering ---------------------------------------------------------

    /// Rule body in the grammar mini-language.
    pub fn render_rule(&self, name: &str) -> Option<String> {
        self.get(name).map(|root| self.render_alternatives(root))
    }

    fn render_alternatives(&self, composite: RuleId) -> String {
        self.rule(composite)
            .children()
            .iter()
            .map(|&child| self.render_chain(child))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn render_chain(&self, start: RuleId) -> String {
        self.arena
            .chain(start)
            .map(|id| self.render_node(id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn render_node(&self, id: RuleId) -> String {
        let node = self.rule(id);
        let mut out = String::new();
        if node.inverted {
            out.push('~');
        }
        match &node.kind {
            RuleKind::Literal { text, .. } => {
                out.push('\'');
                out.push_str(&escape_literal(text));
                out.push('\'');
            }
            RuleKind::Expression { source, .. } => out.push_str(source),
            RuleKind::Composite { .. } => {
                out.push('(');
                if let Some(group) = &node.metadata.group {
                    out.push_str(&format!("?<{group}> "));
                }
                out.push_str(&self.render_alternatives(id));
                out.push(')');
            }
            RuleKind::RuleRef { target, .. } => out.push_str(target),
            RuleKind::CaptureGroupRef { name } => {
                out.push('$');
                out.push_str(name);
            }
        }
        out.push_str(&node.quantifier.to_string());
        if !matches!(node.kind, RuleKind::Composite { .. })
            && let Some(group) = &node.metadata.group
        {
            out.push('#');
            out.push_str(group);
        }
        out
    }

    fn render_attributes(&self, rule: &GrammarRule) -> String {
        let mut attrs: Vec<String> = rule
            .metadata
            .options()
            .iter()
            .filter(|option| **option != MetadataOption::Fragment)
            .map(|option| option.to_string())
            .collect();
        if !rule.precedence.is_empty() {
            attrs.push(format!("precedence: {}", rule.precedence));
        }
        if let Some(group) = &rule.metadata.group {
            attrs.push(format!("group: {group}"));
        }
        if attrs.is_empty() {
            String::new()
        } else {
            format!(" {{{}}}", attrs.join(", "))
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "grammar {};", self.name)?;
        for import in &self.imports {
            writeln!(f, "import {import};")?;
        }
        for (name, &root) in &self.rules {
            let rule = self.rule(root);
            let fragment = if rule.is_fragment() { "fragment " } else { "" };
            writeln!(
                f,
                "{fragment}{name}{}: {};",
                self.render_attributes(rule),
                self.render_alternatives(root)
            )?;
        }
        Ok(())
    }
}

fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}
