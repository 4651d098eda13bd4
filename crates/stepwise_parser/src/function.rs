//! Function parsing: declarations, signatures, parameters and generic
//! parameter lists.

use crate::Parser;
use crate::error::ParseError;
use crate::tokenizer::TokenKind;
use stepwise_ast::*;

impl<'src> Parser<'src> {
    /// `[async] function[*] name<T>(params): Ret { body }`
    ///
    /// Overload signatures (no body) are accepted and produce a function
    /// whose `body` is `None`.
    pub(crate) fn parse_fn_decl(&mut self) -> Result<FnDecl, ParseError> {
        let start = self.start();
        let is_async = self.eat_word("async");
        self.expect(&TokenKind::Function, "`function`")?;
        let is_generator = self.eat(&TokenKind::Star);
        let ident = self.parse_ident()?;
        let mut function = self.parse_signature(start, is_async, is_generator)?;
        if self.check(&TokenKind::LeftBrace) {
            function.body = Some(self.parse_block()?);
        } else {
            self.consume_semicolon()?;
        }
        function.span = start..self.prev_end();
        Ok(FnDecl {
            ident,
            function,
            span: start..self.prev_end(),
        })
    }

    /// Signature and required body of a function whose name (if any) has
    /// already been consumed.
    pub(crate) fn parse_function_rest(
        &mut self,
        start: usize,
        is_async: bool,
        is_generator: bool,
    ) -> Result<Function, ParseError> {
        let mut function = self.parse_signature(start, is_async, is_generator)?;
        function.body = Some(self.parse_block()?);
        function.span = start..self.prev_end();
        Ok(function)
    }

    /// `<T>(params): Ret`, leaving the body unset.
    pub(crate) fn parse_signature(
        &mut self,
        start: usize,
        is_async: bool,
        is_generator: bool,
    ) -> Result<Function, ParseError> {
        let type_params = self.parse_type_params()?;
        let params = self.parse_params()?;
        let return_type = if self.eat(&TokenKind::Colon) {
            Some(self.parse_return_type()?)
        } else {
            None
        };
        Ok(Function {
            type_params,
            params,
            body: None,
            return_type,
            is_async,
            is_generator,
            span: start..self.prev_end(),
        })
    }

    /// Return annotation. Type predicates (`x is T`) are rejected.
    fn parse_return_type(&mut self) -> Result<TsType, ParseError> {
        if matches!(self.peek().kind, TokenKind::Ident(_) | TokenKind::This)
            && self.check_word_at(1, "is")
        {
            return Err(self.error_here("type predicates are not supported"));
        }
        self.parse_type()
    }

    /// Parenthesized parameter list.
    pub(crate) fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect(&TokenKind::LeftParen, "`(`")?;
        let no_in = std::mem::replace(&mut self.no_in, false);
        let mut params = Vec::new();
        while !self.check(&TokenKind::RightParen) {
            params.push(self.parse_param()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen, "`)` after parameters")?;
        self.no_in = no_in;
        Ok(params)
    }

    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let start = self.start();
        let is_modifier = |p: &Self| {
            ["public", "private", "protected", "readonly", "override"]
                .iter()
                .any(|m| p.check_word(m))
                && matches!(
                    p.peek_at(1).kind,
                    TokenKind::Ident(_) | TokenKind::LeftBrace | TokenKind::LeftBracket
                )
        };
        if is_modifier(self) {
            return Err(self.error_here("parameter properties are not supported"));
        }
        let rest = self.eat(&TokenKind::DotDotDot);
        let pat = self.parse_binding_pattern()?;
        let optional = self.eat(&TokenKind::Question);
        let ty = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let default = if self.eat(&TokenKind::Eq) {
            Some(self.parse_assign()?)
        } else {
            None
        };
        Ok(Param {
            pat,
            ty,
            optional,
            rest,
            default,
            span: start..self.prev_end(),
        })
    }

    /// Optional `<T extends U = V, ...>` list.
    pub(crate) fn parse_type_params(&mut self) -> Result<Vec<TsTypeParam>, ParseError> {
        if !self.eat(&TokenKind::Lt) {
            return Ok(Vec::new());
        }
        let mut params = Vec::new();
        loop {
            let start = self.start();
            let ident = self.parse_ident()?;
            let constraint = if self.eat(&TokenKind::Extends) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let default = if self.eat(&TokenKind::Eq) {
                Some(self.parse_type()?)
            } else {
                None
            };
            params.push(TsTypeParam {
                ident,
                constraint,
                default,
                span: start..self.prev_end(),
            });
            if !self.eat(&TokenKind::Comma) || self.check(&TokenKind::Gt) {
                break;
            }
        }
        self.expect_type_close()?;
        Ok(params)
    }
}
