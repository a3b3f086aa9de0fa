//! Compiled grammar rule nodes.
//!
//! Rules live in a [`RuleArena`] and refer to each other by [`RuleId`].
//! A rule body is a composite whose children are alternatives; each
//! alternative is a chain of nodes linked through `next`.

use std::fmt;

use crate::pattern::PatternId;
use crate::precedence::{Metadata, MetadataOption, Precedence};
use crate::quantifier::Quantifier;

/// Index of a node in a [`RuleArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u32);

impl RuleId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which stream a rule runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleClass {
    /// Characters to tokens. Names start uppercase.
    Lexer,
    /// Tokens to match chains. Names start lowercase.
    Parser,
}

impl RuleClass {
    pub fn of(name: &str) -> Self {
        if name.chars().next().is_some_and(char::is_uppercase) {
            RuleClass::Lexer
        } else {
            RuleClass::Parser
        }
    }
}

impl fmt::Display for RuleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleClass::Lexer => f.write_str("lexer"),
            RuleClass::Parser => f.write_str("parser"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Quoted text, stored unescaped.
    Literal { text: String, pattern: PatternId },
    /// `[...]`, `.`, `(?!...)` or a `'a'..'z'` range, kept in source form.
    Expression { source: String, pattern: PatternId },
    /// Alternatives; the first one that matches wins.
    Composite { children: Vec<RuleId> },
    RuleRef { target: String, class: RuleClass },
    CaptureGroupRef { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarRule {
    /// Name of the rule this node belongs to.
    pub id: String,
    pub kind: RuleKind,
    pub quantifier: Quantifier,
    pub inverted: bool,
    pub precedence: Precedence,
    pub metadata: Metadata,
    pub next: Option<RuleId>,
    pub parent: Option<RuleId>,
}

impl GrammarRule {
    pub fn new(id: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            id: id.into(),
            kind,
            quantifier: Quantifier::ONCE,
            inverted: false,
            precedence: Precedence::default(),
            metadata: Metadata::default(),
            next: None,
            parent: None,
        }
    }

    /// Literal text, expression source, referenced rule or capture name.
    pub fn value(&self) -> &str {
        match &self.kind {
            RuleKind::Literal { text, .. } => text,
            RuleKind::Expression { source, .. } => source,
            RuleKind::Composite { .. } => "",
            RuleKind::RuleRef { target, .. } => target,
            RuleKind::CaptureGroupRef { name } => name,
        }
    }

    pub fn class(&self) -> RuleClass {
        RuleClass::of(&self.id)
    }

    pub fn has(&self, option: MetadataOption) -> bool {
        self.metadata.has(option)
    }

    pub fn is_fragment(&self) -> bool {
        self.has(MetadataOption::Fragment)
    }

    pub fn is_skip(&self) -> bool {
        self.has(MetadataOption::Skip)
    }

    pub fn children(&self) -> &[RuleId] {
        match &self.kind {
            RuleKind::Composite { children } => children,
            _ => &[],
        }
    }
}

/// Owns every rule node of a grammar.
#[derive(Debug, Clone, Default)]
pub struct RuleArena {
    nodes: Vec<GrammarRule>,
}

impl RuleArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, rule: GrammarRule) -> RuleId {
        let id = RuleId(self.nodes.len() as u32);
        self.nodes.push(rule);
        id
    }

    pub fn get(&self, id: RuleId) -> &GrammarRule {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: RuleId) -> &mut GrammarRule {
        &mut self.nodes[id.index()]
    }

    /// Appends `child` as an alternative of composite `parent`.
    pub fn push_child(&mut self, parent: RuleId, child: RuleId) {
        if let RuleKind::Composite { children } = &mut self.get_mut(parent).kind {
            children.push(child);
        }
        self.set_parent_chain(child, parent);
    }

    /// Sets `parent` on `start` and every node linked after it.
    pub fn set_parent_chain(&mut self, start: RuleId, parent: RuleId) {
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            let node = self.get_mut(id);
            node.parent = Some(parent);
            cursor = node.next;
        }
    }

    /// Nodes of the sequence starting at `start`.
    pub fn chain(&self, start: RuleId) -> impl Iterator<Item = RuleId> + '_ {
        std::iter::successors(Some(start), |id| self.get(*id).next)
    }

    /// Every node reachable from `root` through children and `next` links.
    pub fn descendants(&self, root: RuleId) -> Vec<RuleId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let node = self.get(id);
            if let Some(next) = node.next {
                stack.push(next);
            }
            stack.extend(node.children().iter().rev());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
