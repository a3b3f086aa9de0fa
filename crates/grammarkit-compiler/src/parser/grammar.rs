//! Grammar productions for grammar files.
//!
//! This module implements all `parse_*` methods as an extension of `Parser`.
//!
//! ```text
//! root      := (header | import | rule)*
//! header    := 'grammar' Id ';'
//! import    := 'import' Id ';'
//! rule      := 'fragment'? Id attributes? ':' body attributes? ';'
//! body      := branch ('|' branch)*
//! branch    := item*
//! item      := '~'? atom quantifier? CaptureTag?
//! atom      := literal | CharClass | Lookahead | '.' | BackRef | Id | group
//! literal   := StringLiteral ('..' StringLiteral)?
//! group     := ('(' | GroupOpen) body ')'
//! ```

use super::core::{Delimiter, Parser};
use super::cst::SyntaxKind;
use super::cst::TokenSet;
use super::cst::token_sets::{DECL_RECOVERY, ITEM_FIRST, QUANTIFIERS};
use crate::diagnostics::DiagnosticKind;

/// Tokens that end a branch without being consumed by it.
const BRANCH_END: TokenSet = TokenSet::new(&[
    SyntaxKind::Pipe,
    SyntaxKind::ParenClose,
    SyntaxKind::Semicolon,
    SyntaxKind::BraceOpen,
    SyntaxKind::KwGrammar,
    SyntaxKind::KwImport,
    SyntaxKind::KwFragment,
]);

const ATTRIBUTE_VALUE_END: TokenSet = TokenSet::new(&[
    SyntaxKind::Comma,
    SyntaxKind::BraceClose,
    SyntaxKind::Semicolon,
]);

impl Parser<'_> {
    pub fn parse_root(&mut self) {
        self.start_root();

        let mut seen_declaration = false;
        while !self.at_end() {
            let start = self.position();
            match self.current() {
                SyntaxKind::KwGrammar => {
                    if seen_declaration {
                        self.error(DiagnosticKind::MisplacedHeader, None);
                    }
                    self.parse_header();
                }
                SyntaxKind::KwImport => self.parse_import(),
                SyntaxKind::KwFragment | SyntaxKind::Id => self.parse_rule(),
                SyntaxKind::ParenClose => self.reject(DiagnosticKind::UnmatchedParen, None),
                _ => self.reject(
                    DiagnosticKind::UnexpectedToken,
                    Some("expected a rule, `import` or `grammar`"),
                ),
            }
            debug_assert!(
                self.position() > start || self.at_end(),
                "declaration made no progress"
            );
            seen_declaration = true;
        }

        self.flush_trivia();
        self.finish_node();
    }

    /// `grammar Name;`
    fn parse_header(&mut self) {
        self.start_node(SyntaxKind::Header);
        self.bump();
        self.expect(SyntaxKind::Id, DiagnosticKind::ExpectedGrammarName);
        self.finish_declaration();
        self.finish_node();
    }

    /// `import Name;`
    fn parse_import(&mut self) {
        self.start_node(SyntaxKind::Import);
        self.bump();
        self.expect(SyntaxKind::Id, DiagnosticKind::ExpectedGrammarName);
        self.finish_declaration();
        self.finish_node();
    }

    /// `fragment? Name {attrs}? : body {attrs}? ;`
    fn parse_rule(&mut self) {
        self.start_node(SyntaxKind::Rule);
        self.eat(SyntaxKind::KwFragment);

        if !self.expect(SyntaxKind::Id, DiagnosticKind::ExpectedRuleName) {
            self.finish_declaration();
            self.finish_node();
            return;
        }

        if self.at(SyntaxKind::BraceOpen) {
            self.parse_attributes();
        }

        if !self.expect(SyntaxKind::Colon, DiagnosticKind::ExpectedColon) {
            self.finish_declaration();
            self.finish_node();
            return;
        }

        self.parse_body(false);

        if self.at(SyntaxKind::BraceOpen) {
            self.parse_attributes();
        }

        self.finish_declaration();
        self.finish_node();
    }

    /// Consumes the closing `;`. Anything before it is wrapped in an error node,
    /// unless the next declaration already starts.
    fn finish_declaration(&mut self) {
        if self.eat(SyntaxKind::Semicolon) {
            return;
        }
        if self.at_rule_head() {
            self.error(DiagnosticKind::ExpectedSemicolon, None);
            return;
        }
        self.skip_until(DiagnosticKind::ExpectedSemicolon, DECL_RECOVERY);
        self.eat(SyntaxKind::Semicolon);
    }

    /// `{ flag, key: value, ... }`
    fn parse_attributes(&mut self) {
        self.start_node(SyntaxKind::Attributes);
        let opened = self.open();

        while !self.at_end() {
            match self.current() {
                SyntaxKind::BraceClose | SyntaxKind::Semicolon => break,
                SyntaxKind::Id | SyntaxKind::KwFragment => self.parse_attribute(),
                SyntaxKind::Comma => self.bump(),
                _ => self.reject(DiagnosticKind::ExpectedAttribute, None),
            }
        }

        self.close(Delimiter::Attributes, opened);
        self.finish_node();
    }

    fn parse_attribute(&mut self) {
        self.start_node(SyntaxKind::Attribute);
        self.bump();
        if self.eat(SyntaxKind::Colon) {
            self.start_node(SyntaxKind::AttributeValue);
            while !self.at_end() && !self.at_any(ATTRIBUTE_VALUE_END) {
                self.bump();
            }
            self.finish_node();
        }
        self.finish_node();
    }

    /// Alternatives separated by `|`.
    fn parse_body(&mut self, in_group: bool) {
        self.start_node(SyntaxKind::Body);
        self.parse_branch(in_group);
        while self.eat(SyntaxKind::Pipe) {
            self.parse_branch(in_group);
        }
        self.finish_node();
    }

    fn parse_branch(&mut self, in_group: bool) {
        self.start_node(SyntaxKind::Branch);
        while !self.at_end() && !self.at_rule_head() {
            let kind = self.current();
            if ITEM_FIRST.contains(kind) {
                self.parse_item();
            } else if kind == SyntaxKind::ParenClose && !in_group {
                self.reject(DiagnosticKind::UnmatchedParen, None);
            } else if BRANCH_END.contains(kind) {
                break;
            } else if QUANTIFIERS.contains(kind) {
                self.reject(DiagnosticKind::InvalidQuantifier, Some("nothing to repeat"));
            } else {
                self.reject(DiagnosticKind::UnexpectedToken, Some("not a rule item"));
            }
        }
        self.finish_node();
    }

    fn parse_item(&mut self) {
        if !self.descend() {
            return;
        }

        self.start_node(SyntaxKind::Item);
        self.eat(SyntaxKind::Tilde);

        match self.current() {
            SyntaxKind::StringLiteral => self.parse_literal(),
            SyntaxKind::CharClass | SyntaxKind::Lookahead => self.wrap_token(SyntaxKind::Class),
            SyntaxKind::Dot => self.wrap_token(SyntaxKind::Wildcard),
            SyntaxKind::Id => self.wrap_token(SyntaxKind::Ref),
            SyntaxKind::BackRef => self.bump(),
            SyntaxKind::ParenOpen | SyntaxKind::GroupOpen => self.parse_group(),
            _ => self.error(DiagnosticKind::ExpectedItem, None),
        }

        if self.at_any(QUANTIFIERS) {
            self.bump();
            if self.at_any(QUANTIFIERS) {
                self.reject(DiagnosticKind::InvalidQuantifier, Some("repeated quantifier"));
            }
        }
        self.eat(SyntaxKind::CaptureTag);

        self.finish_node();
        self.ascend();
    }

    fn wrap_token(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        self.bump();
        self.finish_node();
    }

    /// `'text'` or `'a'..'z'`
    fn parse_literal(&mut self) {
        self.start_node(SyntaxKind::Literal);
        self.bump();
        if self.eat(SyntaxKind::DotDot) && !self.eat(SyntaxKind::StringLiteral) {
            self.error(DiagnosticKind::ExpectedItem, Some("range end literal"));
        }
        self.finish_node();
    }

    /// `( body )` or `(?<name> body )`
    fn parse_group(&mut self) {
        self.start_node(SyntaxKind::Group);
        let opened = self.open();
        self.parse_body(true);
        self.close(Delimiter::Group, opened);
        self.finish_node();
    }
}
