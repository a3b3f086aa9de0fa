//! Syntax kinds for grammar files.
//!
//! `SyntaxKind` serves dual roles: token kinds (from lexer) and node kinds (from parser).
//! Logos derives token recognition; node kinds lack token/regex attributes.
//! `GLang` implements Rowan's `Language` trait for tree construction.

use logos::Logos;
use rowan::Language;

/// All token and node kinds. Tokens first, then nodes, then `__LAST` sentinel.
/// `#[repr(u16)]` enables safe transmute in `kind_from_raw`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("(")]
    ParenOpen = 0,

    #[token(")")]
    ParenClose,

    /// `(?<name>` opening a named capture group.
    #[regex(r"\(\?<[\p{L}_][\p{L}\p{N}_]*>")]
    GroupOpen,

    /// Whole `(?!...)` lookahead, one level of nested parens allowed.
    #[regex(r"\(\?!(?:[^()\\]|\\.|\((?:[^()\\]|\\.)*\))*\)")]
    Lookahead,

    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token("|")]
    Pipe,

    #[token("~")]
    Tilde,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("=")]
    Equals,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[token("?")]
    Question,

    /// Non-greedy `*?` quantifier
    #[token("*?")]
    StarQuestion,

    /// Non-greedy `+?` quantifier
    #[token("+?")]
    PlusQuestion,

    /// Non-greedy `??` quantifier
    #[token("??")]
    QuestionQuestion,

    /// `{m}`, `{m,}`, `{,n}`, `{m,n}`, optionally followed by `?`.
    #[regex(r"\{(?:[0-9]+(?:,[0-9]*)?|,[0-9]+)\}\??")]
    RangeQuantifier,

    #[token("..")]
    DotDot,

    #[token(".")]
    Dot,

    /// `[...]` character class, kept as one token.
    #[regex(r"\[(?:[^\]\\]|\\.)*\]")]
    CharClass,

    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    #[regex(r"'(?:[^'\\]|\\.)*'")]
    StringLiteral,

    /// `#name` after an atom.
    #[regex(r"#[\p{L}_][\p{L}\p{N}_]*")]
    CaptureTag,

    /// `$name` backreference.
    #[regex(r"\$[\p{L}_][\p{L}\p{N}_]*")]
    BackRef,

    #[regex(r"-?[0-9]+")]
    Number,

    #[token("grammar")]
    KwGrammar,

    #[token("import")]
    KwImport,

    #[token("fragment")]
    KwFragment,

    /// Rule, grammar and attribute names. Defined after keywords so they take precedence.
    #[regex(r"[\p{L}_][\p{L}\p{N}_\-]*")]
    Id,

    #[regex(r"[ \t]+")]
    Whitespace,

    #[token("\n")]
    #[token("\r\n")]
    Newline,

    /// Backslash-newline joins lines.
    #[regex(r"\\\r?\n")]
    LineContinuation,

    #[regex(r"//[^\n]*", allow_greedy = true)]
    LineComment,

    #[regex(r"/\*(?:[^*]|\*[^/])*\*/")]
    BlockComment,

    /// Coalesced unrecognized characters
    Garbage,
    Error,

    // --- Node kinds (non-terminals) ---
    Root,
    Header,
    Import,
    Rule,
    Attributes,
    Attribute,
    AttributeValue,
    Body,
    Branch,
    Item,
    Literal,
    Class,
    Wildcard,
    Ref,
    Group,

    // Must be last - used for bounds checking in `kind_from_raw`
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        token_sets::TRIVIA.contains(self)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Error | Garbage)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GLang {}

impl Language for GLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: We've verified the value is in bounds, and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<GLang>;
pub type SyntaxToken = rowan::SyntaxToken<GLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// 64-bit bitset of `SyntaxKind`s for O(1) membership testing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    /// Panics at compile time if any kind's discriminant >= 64.
    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        if kind >= 64 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }

    #[inline]
    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_set();
        for i in 0..64u16 {
            if self.0 & (1 << i) != 0 && i < __LAST as u16 {
                // SAFETY: bounds checked against `__LAST` above
                let kind: SyntaxKind = unsafe { std::mem::transmute(i) };
                list.entry(&kind);
            }
        }
        list.finish()
    }
}

/// Pre-defined token sets for the parser.
pub mod token_sets {
    use super::*;

    /// FIRST set of a body item.
    pub const ITEM_FIRST: TokenSet = TokenSet::new(&[
        Tilde,
        ParenOpen,
        GroupOpen,
        Lookahead,
        Dot,
        CharClass,
        StringLiteral,
        BackRef,
        Id,
    ]);

    pub const QUANTIFIERS: TokenSet = TokenSet::new(&[
        Star,
        Plus,
        Question,
        StarQuestion,
        PlusQuestion,
        QuestionQuestion,
        RangeQuantifier,
    ]);

    pub const TRIVIA: TokenSet = TokenSet::new(&[
        Whitespace,
        Newline,
        LineContinuation,
        LineComment,
        BlockComment,
    ]);

    /// Synchronization points between declarations.
    pub const DECL_RECOVERY: TokenSet = TokenSet::new(&[Semicolon, KwGrammar, KwImport, KwFragment]);
}
