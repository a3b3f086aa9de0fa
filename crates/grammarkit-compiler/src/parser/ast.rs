//! Typed AST wrappers over CST nodes.
//!
//! Each struct wraps a `SyntaxNode` and provides typed accessors.
//! Cast is infallible for correct `SyntaxKind` - validation happens in lowering.

use super::cst::{SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(Root, Root);
ast_node!(Header, Header);
ast_node!(Import, Import);
ast_node!(Rule, Rule);
ast_node!(Attributes, Attributes);
ast_node!(Attribute, Attribute);
ast_node!(AttributeValue, AttributeValue);
ast_node!(Body, Body);
ast_node!(Branch, Branch);
ast_node!(Item, Item);
ast_node!(Literal, Literal);
ast_node!(Class, Class);
ast_node!(Wildcard, Wildcard);
ast_node!(Ref, Ref);
ast_node!(Group, Group);

fn tokens(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + '_ {
    node.children_with_tokens().filter_map(|it| it.into_token())
}

fn token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    tokens(node).find(|t| t.kind() == kind)
}

/// The thing an item matches, before its quantifier and capture tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Atom {
    Literal(Literal),
    Class(Class),
    Wildcard(Wildcard),
    Ref(Ref),
    Group(Group),
    /// `$name`, stored as a bare token inside the item.
    BackRef(SyntaxToken),
}

impl Atom {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::Literal => Literal::cast(node).map(Atom::Literal),
            SyntaxKind::Class => Class::cast(node).map(Atom::Class),
            SyntaxKind::Wildcard => Wildcard::cast(node).map(Atom::Wildcard),
            SyntaxKind::Ref => Ref::cast(node).map(Atom::Ref),
            SyntaxKind::Group => Group::cast(node).map(Atom::Group),
            _ => None,
        }
    }

    pub fn text_range(&self) -> rowan::TextRange {
        match self {
            Atom::Literal(n) => n.as_cst().text_range(),
            Atom::Class(n) => n.as_cst().text_range(),
            Atom::Wildcard(n) => n.as_cst().text_range(),
            Atom::Ref(n) => n.as_cst().text_range(),
            Atom::Group(n) => n.as_cst().text_range(),
            Atom::BackRef(t) => t.text_range(),
        }
    }
}

impl Root {
    pub fn header(&self) -> Option<Header> {
        self.0.children().find_map(Header::cast)
    }

    pub fn headers(&self) -> impl Iterator<Item = Header> + '_ {
        self.0.children().filter_map(Header::cast)
    }

    pub fn imports(&self) -> impl Iterator<Item = Import> + '_ {
        self.0.children().filter_map(Import::cast)
    }

    pub fn rules(&self) -> impl Iterator<Item = Rule> + '_ {
        self.0.children().filter_map(Rule::cast)
    }
}

impl Header {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Id)
    }
}

impl Import {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Id)
    }
}

impl Rule {
    pub fn is_fragment(&self) -> bool {
        token(&self.0, SyntaxKind::KwFragment).is_some()
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Id)
    }

    /// Attribute blocks, both before the `:` and after the body.
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.0
            .children()
            .filter_map(Attributes::cast)
            .flat_map(|attrs| attrs.items().collect::<Vec<_>>())
    }

    pub fn body(&self) -> Option<Body> {
        self.0.children().find_map(Body::cast)
    }

    /// Whether the rule contains recovery nodes.
    pub fn has_error_nodes(&self) -> bool {
        self.0
            .descendants_with_tokens()
            .any(|it| it.kind().is_error())
    }
}

impl Attributes {
    pub fn items(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.0.children().filter_map(Attribute::cast)
    }
}

impl Attribute {
    /// `Id` or the `fragment` keyword.
    pub fn key(&self) -> Option<SyntaxToken> {
        tokens(&self.0).find(|t| matches!(t.kind(), SyntaxKind::Id | SyntaxKind::KwFragment))
    }

    pub fn value(&self) -> Option<AttributeValue> {
        self.0.children().find_map(AttributeValue::cast)
    }
}

impl AttributeValue {
    /// Value tokens with trivia dropped. Comparison operators are glued to the
    /// token after them, so `< 5 = NUM` yields `["<5", "=NUM"]`.
    pub fn items(&self) -> Vec<String> {
        let mut items = Vec::new();
        let mut pending = String::new();
        for t in tokens(&self.0).filter(|t| !t.kind().is_trivia()) {
            match t.kind() {
                SyntaxKind::Less | SyntaxKind::Greater | SyntaxKind::Equals => {
                    pending.push_str(t.text());
                }
                _ => {
                    pending.push_str(t.text());
                    items.push(std::mem::take(&mut pending));
                }
            }
        }
        if !pending.is_empty() {
            items.push(pending);
        }
        items
    }
}

impl Body {
    pub fn branches(&self) -> impl Iterator<Item = Branch> + '_ {
        self.0.children().filter_map(Branch::cast)
    }
}

impl Branch {
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.0.children().filter_map(Item::cast)
    }

    pub fn is_empty(&self) -> bool {
        self.items().next().is_none()
    }
}

impl Item {
    pub fn is_inverted(&self) -> bool {
        token(&self.0, SyntaxKind::Tilde).is_some()
    }

    pub fn atom(&self) -> Option<Atom> {
        if let Some(node) = self.0.children().find_map(Atom::cast) {
            return Some(node);
        }
        token(&self.0, SyntaxKind::BackRef).map(Atom::BackRef)
    }

    pub fn quantifier(&self) -> Option<SyntaxToken> {
        use super::cst::token_sets::QUANTIFIERS;
        tokens(&self.0).find(|t| QUANTIFIERS.contains(t.kind()))
    }

    /// `#name` tag after the atom.
    pub fn capture_tag(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::CaptureTag)
    }
}

impl Literal {
    pub fn value(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::StringLiteral)
    }

    /// Upper bound of a `'a'..'z'` range.
    pub fn range_end(&self) -> Option<SyntaxToken> {
        tokens(&self.0)
            .filter(|t| t.kind() == SyntaxKind::StringLiteral)
            .nth(1)
    }

    pub fn is_range(&self) -> bool {
        token(&self.0, SyntaxKind::DotDot).is_some()
    }
}

impl Class {
    /// `[...]` class or `(?!...)` lookahead, as written.
    pub fn token(&self) -> Option<SyntaxToken> {
        tokens(&self.0).find(|t| matches!(t.kind(), SyntaxKind::CharClass | SyntaxKind::Lookahead))
    }
}

impl Ref {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Id)
    }
}

impl Group {
    /// Name of a `(?<name> ...)` group.
    pub fn name(&self) -> Option<String> {
        let open = token(&self.0, SyntaxKind::GroupOpen)?;
        let text = open.text();
        Some(text[3..text.len() - 1].to_string())
    }

    pub fn body(&self) -> Option<Body> {
        self.0.children().find_map(Body::cast)
    }

    pub fn is_closed(&self) -> bool {
        token(&self.0, SyntaxKind::ParenClose).is_some()
    }
}
