//! Common parsing utilities
//!
//! Token cursor primitives, identifiers, binding patterns, automatic
//! semicolon insertion and speculative parsing.

use crate::{MAX_NESTING_DEPTH, Parser};
use crate::error::ParseError;
use crate::tokenizer::{Token, TokenKind};
use stepwise_ast::*;

impl<'src> Parser<'src> {
    pub(crate) fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// Token `n` positions ahead; clamps to the trailing EOF token.
    pub(crate) fn peek_at(&self, n: usize) -> &Token {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Run `parse` one nesting level deeper.
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::new("nesting too deep", self.peek().span.clone()));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!("expected {}", what)))
        }
    }

    /// Current token is the contextual keyword `word`.
    pub(crate) fn check_word(&self, word: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Ident(w) if w == word)
    }

    pub(crate) fn check_word_at(&self, n: usize, word: &str) -> bool {
        matches!(&self.peek_at(n).kind, TokenKind::Ident(w) if w == word)
    }

    pub(crate) fn eat_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Start offset of the current token.
    pub(crate) fn start(&self) -> usize {
        self.peek().span.start
    }

    /// End offset of the most recently consumed token.
    pub(crate) fn prev_end(&self) -> usize {
        if self.pos == 0 {
            self.peek().span.start
        } else {
            self.tokens[self.pos - 1].span.end
        }
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> ParseError {
        let token = self.peek();
        let message = message.into();
        let message = match &token.kind {
            TokenKind::Eof => format!("{}, found end of input", message),
            TokenKind::Unterminated => format!("{}, found unterminated literal", message),
            _ => format!("{}, found `{}`", message, token.text),
        };
        ParseError::new(message, token.span.clone())
    }

    /// Consume a statement terminator, applying automatic semicolon
    /// insertion before `}`, end of input, or a line break.
    pub(crate) fn consume_semicolon(&mut self) -> Result<(), ParseError> {
        if self.eat(&TokenKind::Semicolon) {
            return Ok(());
        }
        let token = self.peek();
        if matches!(token.kind, TokenKind::RightBrace | TokenKind::Eof) || token.newline_before {
            Ok(())
        } else {
            Err(self.error_here("expected `;`"))
        }
    }

    /// Binding identifier (reserved words rejected).
    pub(crate) fn parse_ident(&mut self) -> Result<Ident, ParseError> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let ident = Ident::new(name.clone(), self.peek().span.clone());
                self.advance();
                Ok(ident)
            }
            _ => Err(self.error_here("expected identifier")),
        }
    }

    /// Any identifier name, reserved words included (property names).
    pub(crate) fn parse_ident_name(&mut self) -> Result<Ident, ParseError> {
        if self.peek().kind.is_identifier_name() {
            let token = self.advance();
            Ok(Ident::new(token.text, token.span))
        } else {
            Err(self.error_here("expected property name"))
        }
    }

    /// Object-literal or pattern key: name, string, number or `[expr]`.
    pub(crate) fn parse_prop_name(&mut self) -> Result<PropName, ParseError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::String(s) => {
                self.advance();
                Ok(PropName::Str(s))
            }
            TokenKind::Number(_) => {
                self.advance();
                Ok(PropName::Num(token.text))
            }
            TokenKind::LeftBracket => {
                self.advance();
                let expr = self.parse_assign()?;
                self.expect(&TokenKind::RightBracket, "`]`")?;
                Ok(PropName::Computed(Box::new(expr)))
            }
            _ => Ok(PropName::Ident(self.parse_ident_name()?)),
        }
    }

    /// Binding pattern: identifier, `[...]` or `{...}`.
    pub(crate) fn parse_binding_pattern(&mut self) -> Result<Pat, ParseError> {
        self.nested(Self::binding_pattern)
    }

    fn binding_pattern(&mut self) -> Result<Pat, ParseError> {
        let start = self.start();
        match self.peek().kind {
            TokenKind::LeftBracket => {
                self.advance();
                let mut elems = Vec::new();
                let mut rest = None;
                while !self.check(&TokenKind::RightBracket) {
                    if self.eat(&TokenKind::Comma) {
                        elems.push(None);
                        continue;
                    }
                    if self.eat(&TokenKind::DotDotDot) {
                        rest = Some(Box::new(self.parse_binding_pattern()?));
                        break;
                    }
                    let pat = self.parse_binding_pattern()?;
                    let default = if self.eat(&TokenKind::Eq) {
                        Some(self.parse_assign()?)
                    } else {
                        None
                    };
                    elems.push(Some(PatElem { pat, default }));
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RightBracket, "`]`")?;
                Ok(Pat::Array(ArrayPat {
                    elems,
                    rest,
                    span: start..self.prev_end(),
                }))
            }
            TokenKind::LeftBrace => {
                self.advance();
                let mut props = Vec::new();
                let mut rest = None;
                while !self.check(&TokenKind::RightBrace) {
                    if self.eat(&TokenKind::DotDotDot) {
                        rest = Some(self.parse_ident()?);
                        break;
                    }
                    let prop_start = self.start();
                    let key = self.parse_prop_name()?;
                    let value = if self.eat(&TokenKind::Colon) {
                        Some(self.parse_binding_pattern()?)
                    } else {
                        if !matches!(key, PropName::Ident(_)) {
                            return Err(self.error_here("expected `:`"));
                        }
                        None
                    };
                    let default = if self.eat(&TokenKind::Eq) {
                        Some(self.parse_assign()?)
                    } else {
                        None
                    };
                    props.push(ObjectPatProp {
                        key,
                        value,
                        default,
                        span: prop_start..self.prev_end(),
                    });
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RightBrace, "`}`")?;
                Ok(Pat::Object(ObjectPat {
                    props,
                    rest,
                    span: start..self.prev_end(),
                }))
            }
            TokenKind::This => {
                let token = self.advance();
                Ok(Pat::Ident(Ident::new("this", token.span)))
            }
            _ => Ok(Pat::Ident(self.parse_ident()?)),
        }
    }

    /// Run `f`; on failure rewind the cursor (and any token splits) and
    /// return `None`.
    pub(crate) fn try_parse<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Option<T> {
        let pos = self.pos;
        let rewrites = self.rewrites.len();
        let no_in = self.no_in;
        match f(self) {
            Ok(value) => Some(value),
            Err(_) => {
                while self.rewrites.len() > rewrites {
                    if let Some((idx, token)) = self.rewrites.pop() {
                        self.tokens[idx] = token;
                    }
                }
                self.pos = pos;
                self.no_in = no_in;
                None
            }
        }
    }

    /// Consume one `>` closing a type argument list, splitting `>>`, `>=`
    /// and friends in place.
    pub(crate) fn expect_type_close(&mut self) -> Result<(), ParseError> {
        let token = self.peek().clone();
        let remainder = match token.kind {
            TokenKind::Gt => {
                self.advance();
                return Ok(());
            }
            TokenKind::GtGt => TokenKind::Gt,
            TokenKind::GtGtGt => TokenKind::GtGt,
            TokenKind::GtEq => TokenKind::Eq,
            TokenKind::GtGtEq => TokenKind::GtEq,
            TokenKind::GtGtGtEq => TokenKind::GtGtEq,
            _ => return Err(self.error_here("expected `>`")),
        };
        self.rewrites.push((self.pos, token.clone()));
        self.tokens[self.pos] = Token {
            kind: remainder,
            span: token.span.start + 1..token.span.end,
            text: token.text[1..].to_string(),
            newline_before: false,
        };
        Ok(())
    }

    /// Skip a top-level item the parser does not model, returning its text.
    ///
    /// The item ends at a `;` outside brackets, at a line break where the
    /// next line cannot continue the item, or, for `block_item`s such as
    /// `interface` and `enum`, at the `}` closing their body.
    pub(crate) fn skip_opaque_item(
        &mut self,
        start: usize,
        block_item: bool,
    ) -> Result<OpaqueStmt, ParseError> {
        let mut depth = 0usize;
        let mut consumed_any = false;
        loop {
            let token = self.peek().clone();
            match token.kind {
                TokenKind::Eof => {
                    if depth > 0 {
                        return Err(self.error_here("unclosed bracket"));
                    }
                    break;
                }
                TokenKind::Unterminated => return Err(self.error_here("unterminated literal")),
                _ if depth == 0 && consumed_any && token.newline_before && !self.continues_item() => {
                    break;
                }
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    break;
                }
                TokenKind::LeftBrace | TokenKind::LeftParen | TokenKind::LeftBracket => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RightBrace if depth == 1 && block_item => {
                    self.advance();
                    // `declare const x: { a: T };` keeps going to its `;`
                    if !self.check(&TokenKind::Semicolon) || self.peek().newline_before {
                        break;
                    }
                    depth = 0;
                }
                TokenKind::RightBrace | TokenKind::RightParen | TokenKind::RightBracket => {
                    if depth == 0 {
                        return Err(self.error_here("unbalanced closing bracket"));
                    }
                    depth -= 1;
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
            consumed_any = true;
        }
        let end = self.prev_end();
        Ok(OpaqueStmt {
            text: self.source[start..end].to_string(),
            span: start..end,
        })
    }

    /// Whether the token after a line break continues an opaque item.
    fn continues_item(&self) -> bool {
        let prev = &self.tokens[self.pos.saturating_sub(1)].kind;
        let next = &self.peek().kind;
        let prev_continues = matches!(
            prev,
            TokenKind::Eq
                | TokenKind::Or
                | TokenKind::And
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Arrow
                | TokenKind::Lt
                | TokenKind::Question
                | TokenKind::Dot
                | TokenKind::Extends
        );
        let next_continues = matches!(
            next,
            TokenKind::Or
                | TokenKind::And
                | TokenKind::Dot
                | TokenKind::Arrow
                | TokenKind::Question
                | TokenKind::Colon
                | TokenKind::Extends
                | TokenKind::Gt
                | TokenKind::LeftBrace
                | TokenKind::Eq
        ) || matches!(next, TokenKind::Ident(w) if w == "from" || w == "implements");
        prev_continues || next_continues
    }
}
