//! Type annotation parsing.
//!
//! Grammar, loosest first: union (`A | B`), intersection (`A & B`),
//! postfix array (`T[]`), primary (keyword, reference with arguments,
//! literal, tuple, type literal, function or parenthesized type).

use crate::Parser;
use crate::error::ParseError;
use crate::tokenizer::TokenKind;
use stepwise_ast::*;

impl<'src> Parser<'src> {
    pub(crate) fn parse_type(&mut self) -> Result<TsType, ParseError> {
        self.nested(Self::union_type)
    }

    fn union_type(&mut self) -> Result<TsType, ParseError> {
        let start = self.start();
        self.eat(&TokenKind::Or);
        let first = self.parse_intersection_type()?;
        if !self.check(&TokenKind::Or) {
            return Ok(first);
        }
        let mut types = vec![first];
        while self.eat(&TokenKind::Or) {
            types.push(self.parse_intersection_type()?);
        }
        Ok(TsType::TsUnionType(TsUnionType {
            types,
            span: start..self.prev_end(),
        }))
    }

    fn parse_intersection_type(&mut self) -> Result<TsType, ParseError> {
        let start = self.start();
        self.eat(&TokenKind::And);
        let first = self.parse_array_type()?;
        if !self.check(&TokenKind::And) {
            return Ok(first);
        }
        let mut types = vec![first];
        while self.eat(&TokenKind::And) {
            types.push(self.parse_array_type()?);
        }
        Ok(TsType::TsIntersectionType(TsIntersectionType {
            types,
            span: start..self.prev_end(),
        }))
    }

    fn parse_array_type(&mut self) -> Result<TsType, ParseError> {
        let start = self.start();
        let mut ty = self.parse_primary_type()?;
        while self.check(&TokenKind::LeftBracket) && !self.peek().newline_before {
            self.advance();
            if !self.check(&TokenKind::RightBracket) {
                return Err(self.error_here("indexed access types are not supported"));
            }
            self.advance();
            ty = TsType::TsArrayType(TsArrayType {
                elem_type: Box::new(ty),
                span: start..self.prev_end(),
            });
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> Result<TsType, ParseError> {
        let token = self.peek().clone();
        let span = token.span.clone();
        match token.kind {
            TokenKind::Ident(name) => {
                if let Some(kind) = TsKeywordKind::from_name(&name) {
                    self.advance();
                    return Ok(TsType::TsKeywordType(TsKeywordType { kind, span }));
                }
                if matches!(name.as_str(), "keyof" | "unique" | "infer" | "asserts") {
                    return Err(self.error_here(format!("`{}` types are not supported", name)));
                }
                self.parse_type_ref()
            }
            TokenKind::Void => {
                self.advance();
                Ok(TsType::TsKeywordType(TsKeywordType {
                    kind: TsKeywordKind::Void,
                    span,
                }))
            }
            TokenKind::Null => {
                self.advance();
                Ok(TsType::TsKeywordType(TsKeywordType {
                    kind: TsKeywordKind::Null,
                    span,
                }))
            }
            TokenKind::This => {
                self.advance();
                Ok(TsType::TsTypeRef(TsTypeRef {
                    type_name: "this".into(),
                    type_args: Vec::new(),
                    span,
                }))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(TsType::TsLitType(TsLitType {
                    lit: LitKind::Str(s),
                    span,
                }))
            }
            TokenKind::Number(value) => {
                self.advance();
                Ok(TsType::TsLitType(TsLitType {
                    lit: LitKind::Num {
                        value,
                        raw: token.text,
                    },
                    span,
                }))
            }
            TokenKind::Minus if matches!(self.peek_at(1).kind, TokenKind::Number(_)) => {
                self.advance();
                let num = self.advance();
                let value = match num.kind {
                    TokenKind::Number(v) => -v,
                    _ => f64::NAN,
                };
                Ok(TsType::TsLitType(TsLitType {
                    lit: LitKind::Num {
                        value,
                        raw: format!("-{}", num.text),
                    },
                    span: span.start..num.span.end,
                }))
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(TsType::TsLitType(TsLitType {
                    lit: LitKind::Bool(token.kind == TokenKind::True),
                    span,
                }))
            }
            TokenKind::LeftBracket => self.parse_tuple_type(),
            TokenKind::LeftBrace => self.parse_type_lit(),
            TokenKind::LeftParen => {
                if let Some(func) = self.try_parse(|p| p.parse_function_type()) {
                    return Ok(func);
                }
                self.advance();
                let inner = self.parse_type()?;
                self.expect(&TokenKind::RightParen, "`)`")?;
                Ok(TsType::TsParenType(TsParenType {
                    ty: Box::new(inner),
                    span: span.start..self.prev_end(),
                }))
            }
            TokenKind::Lt => self.parse_function_type(),
            TokenKind::Typeof => Err(self.error_here("`typeof` types are not supported")),
            _ => Err(self.error_here("expected type")),
        }
    }

    /// `Name`, `ns.Name`, `Name<A, B>`
    fn parse_type_ref(&mut self) -> Result<TsType, ParseError> {
        let start = self.start();
        let mut type_name = self.parse_ident()?.sym;
        while self.check(&TokenKind::Dot) {
            self.advance();
            type_name.push('.');
            type_name.push_str(&self.parse_ident_name()?.sym);
        }
        let mut type_args = Vec::new();
        if self.check(&TokenKind::Lt) && !self.peek().newline_before {
            self.advance();
            loop {
                type_args.push(self.parse_type()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect_type_close()?;
        }
        Ok(TsType::TsTypeRef(TsTypeRef {
            type_name,
            type_args,
            span: start..self.prev_end(),
        }))
    }

    /// `[A, B]`
    fn parse_tuple_type(&mut self) -> Result<TsType, ParseError> {
        let start = self.start();
        self.expect(&TokenKind::LeftBracket, "`[`")?;
        let mut elem_types = Vec::new();
        while !self.check(&TokenKind::RightBracket) {
            elem_types.push(self.parse_type()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightBracket, "`]`")?;
        Ok(TsType::TsTupleType(TsTupleType {
            elem_types,
            span: start..self.prev_end(),
        }))
    }

    /// `{ a: T; b?: U; readonly c: V; [key: string]: W; m(x: X): Y }`
    fn parse_type_lit(&mut self) -> Result<TsType, ParseError> {
        let start = self.start();
        self.expect(&TokenKind::LeftBrace, "`{`")?;
        let mut members = Vec::new();
        while !self.check(&TokenKind::RightBrace) {
            let member_start = self.start();
            let readonly = self.check_word("readonly")
                && !matches!(
                    self.peek_at(1).kind,
                    TokenKind::Colon | TokenKind::Question | TokenKind::LeftParen
                )
                && self.eat_word("readonly");

            if self.check(&TokenKind::LeftBracket) {
                self.advance();
                let key_name = self.parse_ident()?;
                self.expect(&TokenKind::Colon, "`:` in index signature")?;
                let key_type = self.parse_type()?;
                self.expect(&TokenKind::RightBracket, "`]`")?;
                self.expect(&TokenKind::Colon, "`:` after index signature")?;
                let value_type = self.parse_type()?;
                members.push(TsTypeElement::Index(TsIndexSignature {
                    key_name,
                    key_type: Box::new(key_type),
                    value_type: Box::new(value_type),
                    readonly,
                    span: member_start..self.prev_end(),
                }));
            } else {
                let key = match self.peek().kind.clone() {
                    TokenKind::String(s) => {
                        let token = self.advance();
                        Ident::new(s, token.span)
                    }
                    _ => self.parse_ident_name()?,
                };
                let optional = self.eat(&TokenKind::Question);
                let ty = if self.check(&TokenKind::LeftParen) || self.check(&TokenKind::Lt) {
                    // method signature, kept as a function-typed property
                    let sig_start = self.start();
                    if self.check(&TokenKind::Lt) {
                        return Err(self.error_here("generic method signatures are not supported"));
                    }
                    let params = self.parse_params()?;
                    self.expect(&TokenKind::Colon, "`:` before return type")?;
                    let return_type = self.parse_type()?;
                    Some(TsType::TsFunctionType(TsFunctionType {
                        params,
                        return_type: Box::new(return_type),
                        span: sig_start..self.prev_end(),
                    }))
                } else if self.eat(&TokenKind::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                members.push(TsTypeElement::Property(TsPropertySignature {
                    key,
                    ty,
                    optional,
                    readonly,
                    span: member_start..self.prev_end(),
                }));
            }

            if !(self.eat(&TokenKind::Semicolon)
                || self.eat(&TokenKind::Comma)
                || self.peek().newline_before
                || self.check(&TokenKind::RightBrace))
            {
                return Err(self.error_here("expected `;` between type members"));
            }
        }
        self.expect(&TokenKind::RightBrace, "`}`")?;
        Ok(TsType::TsTypeLit(TsTypeLit {
            members,
            span: start..self.prev_end(),
        }))
    }

    /// `(a: A, b: B) => R`
    fn parse_function_type(&mut self) -> Result<TsType, ParseError> {
        let start = self.start();
        if self.check(&TokenKind::Lt) {
            return Err(self.error_here("generic function types are not supported"));
        }
        let params = self.parse_params()?;
        self.expect(&TokenKind::Arrow, "`=>`")?;
        let return_type = self.parse_type()?;
        Ok(TsType::TsFunctionType(TsFunctionType {
            params,
            return_type: Box::new(return_type),
            span: start..self.prev_end(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::parse_type;
    use stepwise_ast::print::type_to_string;
    use stepwise_ast::*;

    fn roundtrip(src: &str) -> String {
        type_to_string(&parse_type(src).unwrap())
    }

    #[test]
    fn keyword_types() {
        for kw in ["number", "string", "boolean", "any", "unknown", "void", "null", "undefined"] {
            assert!(
                matches!(parse_type(kw).unwrap(), TsType::TsKeywordType(_)),
                "{} should be a keyword type",
                kw
            );
        }
    }

    #[test]
    fn composite_types_roundtrip() {
        for src in [
            "number[][]",
            "(string | number)[]",
            "Generator<number, void, unknown>",
            "Map<string, Array<number>>",
            "A & B | C",
            "(a: number, b?: string) => void",
            "[number, string]",
            "{ a: number; b?: string; readonly c: boolean; [key: string]: any }",
            "\"on\" | \"off\" | -1 | true",
            "ns.Inner<T>",
        ] {
            assert_eq!(roundtrip(src), src);
        }
    }

    #[test]
    fn nested_closing_angles_are_split() {
        let ty = parse_type("Array<Array<Array<number>>>").unwrap();
        match ty {
            TsType::TsTypeRef(r) => assert_eq!(r.type_args.len(), 1),
            other => panic!("expected type ref, got {:?}", other),
        }
    }

    #[test]
    fn leading_union_bar_is_accepted() {
        assert_eq!(roundtrip("| \"a\" | \"b\""), "\"a\" | \"b\"");
    }
}
