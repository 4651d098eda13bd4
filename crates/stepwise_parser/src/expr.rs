//! Expression parsing.
//!
//! Binary operators use precedence climbing over the same table the printer
//! uses (`BinaryOp::precedence`), so printed output re-parses to the same
//! tree. Assignment, conditional, arrow and `yield` sit above the binary
//! layer; unary, postfix, call and member access below it.

use crate::Parser;
use crate::error::ParseError;
use crate::tokenizer::TokenKind;
use stepwise_ast::*;

/// Lowest binary precedence (`||` / `??`).
const MIN_BINARY_PREC: u8 = 4;

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::EqEq => BinaryOp::EqEq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::EqEqEq => BinaryOp::EqEqEq,
        TokenKind::NotEqEq => BinaryOp::NotEqEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::Plus => BinaryOp::Plus,
        TokenKind::Minus => BinaryOp::Minus,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::StarStar => BinaryOp::Exp,
        TokenKind::AndAnd => BinaryOp::And,
        TokenKind::OrOr => BinaryOp::Or,
        TokenKind::DoubleQuestion => BinaryOp::NullishCoalesce,
        TokenKind::And => BinaryOp::BitwiseAnd,
        TokenKind::Or => BinaryOp::BitwiseOr,
        TokenKind::Xor => BinaryOp::BitwiseXor,
        TokenKind::LtLt => BinaryOp::LShift,
        TokenKind::GtGt => BinaryOp::RShift,
        TokenKind::GtGtGt => BinaryOp::URShift,
        TokenKind::In => BinaryOp::In,
        TokenKind::Instanceof => BinaryOp::InstanceOf,
        _ => return None,
    })
}

fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Eq => AssignOp::Eq,
        TokenKind::PlusEq => AssignOp::PlusEq,
        TokenKind::MinusEq => AssignOp::MinusEq,
        TokenKind::StarEq => AssignOp::MulEq,
        TokenKind::SlashEq => AssignOp::DivEq,
        TokenKind::PercentEq => AssignOp::ModEq,
        TokenKind::StarStarEq => AssignOp::ExpEq,
        TokenKind::LtLtEq => AssignOp::LShiftEq,
        TokenKind::GtGtEq => AssignOp::RShiftEq,
        TokenKind::GtGtGtEq => AssignOp::URShiftEq,
        TokenKind::AndEq => AssignOp::BitAndEq,
        TokenKind::OrEq => AssignOp::BitOrEq,
        TokenKind::XorEq => AssignOp::BitXorEq,
        TokenKind::AndAndEq => AssignOp::AndEq,
        TokenKind::OrOrEq => AssignOp::OrEq,
        TokenKind::DoubleQuestionEq => AssignOp::NullishEq,
        _ => return None,
    })
}

fn unary_op(kind: &TokenKind) -> Option<UnaryOp> {
    Some(match kind {
        TokenKind::Plus => UnaryOp::Plus,
        TokenKind::Minus => UnaryOp::Minus,
        TokenKind::Not => UnaryOp::Not,
        TokenKind::Tilde => UnaryOp::BitwiseNot,
        TokenKind::Typeof => UnaryOp::TypeOf,
        TokenKind::Void => UnaryOp::Void,
        TokenKind::Delete => UnaryOp::Delete,
        _ => return None,
    })
}

fn is_assign_target(expr: &Expr, op: AssignOp) -> bool {
    match expr {
        Expr::Ident(_) | Expr::Member(_) => true,
        Expr::Paren(p) => is_assign_target(&p.expr, op),
        Expr::NonNull(n) => is_assign_target(&n.expr, op),
        Expr::As(a) => is_assign_target(&a.expr, op),
        Expr::Object(_) | Expr::Array(_) => op == AssignOp::Eq,
        _ => false,
    }
}

impl<'src> Parser<'src> {
    /// Full expression, including the comma operator.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        let first = self.parse_assign()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut exprs = vec![first];
        while self.eat(&TokenKind::Comma) {
            exprs.push(self.parse_assign()?);
        }
        Ok(Expr::Seq(SeqExpr {
            exprs,
            span: start..self.prev_end(),
        }))
    }

    /// Assignment-level expression (no top-level comma).
    pub(crate) fn parse_assign(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::assign_expr)
    }

    fn assign_expr(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Yield) {
            return self.parse_yield();
        }
        if let Some(arrow) = self.parse_arrow_if_present()? {
            return Ok(arrow);
        }

        let start = self.start();
        let left = self.parse_conditional()?;
        let Some(op) = assign_op(&self.peek().kind) else {
            return Ok(left);
        };
        if !is_assign_target(&left, op) {
            return Err(ParseError::new("invalid assignment target", left.span()));
        }
        self.advance();
        let right = self.parse_assign()?;
        Ok(Expr::Assign(AssignExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span: start..self.prev_end(),
        }))
    }

    fn parse_yield(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        self.advance();
        let delegate = !self.peek().newline_before && self.eat(&TokenKind::Star);
        let arg = if delegate || (!self.peek().newline_before && self.starts_expression()) {
            Some(Box::new(self.parse_assign()?))
        } else {
            None
        };
        Ok(Expr::Yield(YieldExpr {
            arg,
            delegate,
            span: start..self.prev_end(),
        }))
    }

    /// Whether the current token can begin an expression.
    pub(crate) fn starts_expression(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Ident(_)
                | TokenKind::String(_)
                | TokenKind::Number(_)
                | TokenKind::Template { .. }
                | TokenKind::This
                | TokenKind::Super
                | TokenKind::Function
                | TokenKind::Class
                | TokenKind::New
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::LeftParen
                | TokenKind::LeftBracket
                | TokenKind::LeftBrace
                | TokenKind::Not
                | TokenKind::Tilde
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::Typeof
                | TokenKind::Void
                | TokenKind::Delete
                | TokenKind::Await
                | TokenKind::Yield
        )
    }

    /// Relative index of the `)` matching the `(` at `offset`.
    fn matching_paren(&self, offset: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut n = offset;
        loop {
            match self.peek_at(n).kind {
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => depth += 1,
                TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(n);
                    }
                }
                TokenKind::Eof => return None,
                _ => {}
            }
            n += 1;
        }
    }

    /// Parse an arrow function if one starts here.
    ///
    /// `(...) =>` is decided by looking past the matching parenthesis;
    /// `(...): T =>` is ambiguous with a conditional's `:` and is parsed
    /// speculatively.
    fn parse_arrow_if_present(&mut self) -> Result<Option<Expr>, ParseError> {
        let is_async = self.check_word("async")
            && !self.peek_at(1).newline_before
            && match self.peek_at(1).kind {
                TokenKind::LeftParen => true,
                TokenKind::Ident(_) => self.peek_at(2).kind == TokenKind::Arrow,
                _ => false,
            };
        let offset = usize::from(is_async);

        match self.peek_at(offset).kind {
            TokenKind::Ident(_) if self.peek_at(offset + 1).kind == TokenKind::Arrow => {
                let start = self.start();
                if is_async {
                    self.advance();
                }
                let ident = self.parse_ident()?;
                let param = Param {
                    span: ident.span.clone(),
                    pat: Pat::Ident(ident),
                    ty: None,
                    optional: false,
                    rest: false,
                    default: None,
                };
                self.advance();
                let body = self.parse_arrow_body()?;
                Ok(Some(Expr::Arrow(ArrowExpr {
                    params: vec![param],
                    body,
                    return_type: None,
                    is_async,
                    span: start..self.prev_end(),
                })))
            }
            TokenKind::LeftParen => {
                let Some(close) = self.matching_paren(offset) else {
                    return Ok(None);
                };
                match self.peek_at(close + 1).kind {
                    TokenKind::Arrow => self.parse_arrow(is_async).map(Some),
                    TokenKind::Colon => Ok(self.try_parse(|p| p.parse_arrow(is_async))),
                    _ => Ok(None),
                }
            }
            _ => Ok(None),
        }
    }

    fn parse_arrow(&mut self, is_async: bool) -> Result<Expr, ParseError> {
        let start = self.start();
        if is_async {
            self.advance();
        }
        let params = self.parse_params()?;
        let return_type = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        if self.peek().newline_before {
            return Err(self.error_here("line break before `=>`"));
        }
        self.expect(&TokenKind::Arrow, "`=>`")?;
        let body = self.parse_arrow_body()?;
        Ok(Expr::Arrow(ArrowExpr {
            params,
            body,
            return_type,
            is_async,
            span: start..self.prev_end(),
        }))
    }

    fn parse_arrow_body(&mut self) -> Result<ArrowBody, ParseError> {
        let no_in = std::mem::replace(&mut self.no_in, false);
        let body = if self.check(&TokenKind::LeftBrace) {
            ArrowBody::Block(self.parse_block()?)
        } else {
            ArrowBody::Expr(Box::new(self.parse_assign()?))
        };
        self.no_in = no_in;
        Ok(body)
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        let test = self.parse_binary(MIN_BINARY_PREC)?;
        if !self.eat(&TokenKind::Question) {
            return Ok(test);
        }
        let no_in = std::mem::replace(&mut self.no_in, false);
        let cons = self.parse_assign()?;
        self.no_in = no_in;
        self.expect(&TokenKind::Colon, "`:` in conditional expression")?;
        let alt = self.parse_assign()?;
        Ok(Expr::Cond(CondExpr {
            test: Box::new(test),
            cons: Box::new(cons),
            alt: Box::new(alt),
            span: start..self.prev_end(),
        }))
    }

    /// Precedence climbing over binary operators and `as`.
    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let start = self.start();
        let mut left = self.parse_unary()?;

        loop {
            if self.check_word("as") && !self.peek().newline_before {
                if 10 < min_prec {
                    break;
                }
                self.advance();
                let ty = if self.check(&TokenKind::Const) {
                    let token = self.advance();
                    TsType::TsTypeRef(TsTypeRef {
                        type_name: "const".into(),
                        type_args: Vec::new(),
                        span: token.span,
                    })
                } else {
                    self.parse_type()?
                };
                left = Expr::As(AsExpr {
                    expr: Box::new(left),
                    ty,
                    span: start..self.prev_end(),
                });
                continue;
            }

            let Some(op) = binary_op(&self.peek().kind) else {
                break;
            };
            if op == BinaryOp::In && self.no_in {
                break;
            }
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();
            // `**` is right-associative
            let next_min = if op == BinaryOp::Exp { prec } else { prec + 1 };
            let right = self.nested(|p| p.parse_binary(next_min))?;
            left = Expr::Bin(BinExpr {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span: start..self.prev_end(),
            });
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        if let Some(op) = unary_op(&self.peek().kind) {
            self.advance();
            let arg = self.nested(Self::parse_unary)?;
            return Ok(Expr::Unary(UnaryExpr {
                op,
                arg: Box::new(arg),
                span: start..self.prev_end(),
            }));
        }
        match self.peek().kind {
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.advance().kind == TokenKind::PlusPlus {
                    UpdateOp::Inc
                } else {
                    UpdateOp::Dec
                };
                let arg = self.nested(Self::parse_unary)?;
                Ok(Expr::Update(UpdateExpr {
                    op,
                    prefix: true,
                    arg: Box::new(arg),
                    span: start..self.prev_end(),
                }))
            }
            TokenKind::Await => {
                self.advance();
                let arg = self.nested(Self::parse_unary)?;
                Ok(Expr::Await(AwaitExpr {
                    arg: Box::new(arg),
                    span: start..self.prev_end(),
                }))
            }
            TokenKind::Lt => Err(self.error_here("angle-bracket type assertions are not supported")),
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        let expr = self.parse_lhs()?;
        let op = match self.peek().kind {
            TokenKind::PlusPlus if !self.peek().newline_before => UpdateOp::Inc,
            TokenKind::MinusMinus if !self.peek().newline_before => UpdateOp::Dec,
            _ => return Ok(expr),
        };
        self.advance();
        Ok(Expr::Update(UpdateExpr {
            op,
            prefix: false,
            arg: Box::new(expr),
            span: start..self.prev_end(),
        }))
    }

    /// Primary expression followed by member accesses, calls and `!`.
    pub(crate) fn parse_lhs(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        let mut expr = if self.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };

        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    let prop = self.parse_ident_name()?;
                    expr = Expr::Member(MemberExpr {
                        obj: Box::new(expr),
                        prop: MemberProp::Ident(prop),
                        optional: false,
                        span: start..self.prev_end(),
                    });
                }
                TokenKind::QuestionDot => {
                    self.advance();
                    expr = match self.peek().kind {
                        TokenKind::LeftParen => {
                            let args = self.parse_args()?;
                            Expr::Call(CallExpr {
                                callee: Box::new(expr),
                                args,
                                optional: true,
                                span: start..self.prev_end(),
                            })
                        }
                        TokenKind::LeftBracket => {
                            self.advance();
                            let prop = self.parse_expr()?;
                            self.expect(&TokenKind::RightBracket, "`]`")?;
                            Expr::Member(MemberExpr {
                                obj: Box::new(expr),
                                prop: MemberProp::Computed(Box::new(prop)),
                                optional: true,
                                span: start..self.prev_end(),
                            })
                        }
                        _ => {
                            let prop = self.parse_ident_name()?;
                            Expr::Member(MemberExpr {
                                obj: Box::new(expr),
                                prop: MemberProp::Ident(prop),
                                optional: true,
                                span: start..self.prev_end(),
                            })
                        }
                    };
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let no_in = std::mem::replace(&mut self.no_in, false);
                    let prop = self.parse_expr()?;
                    self.no_in = no_in;
                    self.expect(&TokenKind::RightBracket, "`]`")?;
                    expr = Expr::Member(MemberExpr {
                        obj: Box::new(expr),
                        prop: MemberProp::Computed(Box::new(prop)),
                        optional: false,
                        span: start..self.prev_end(),
                    });
                }
                TokenKind::LeftParen => {
                    let args = self.parse_args()?;
                    expr = Expr::Call(CallExpr {
                        callee: Box::new(expr),
                        args,
                        optional: false,
                        span: start..self.prev_end(),
                    });
                }
                TokenKind::Not if !self.peek().newline_before => {
                    self.advance();
                    expr = Expr::NonNull(NonNullExpr {
                        expr: Box::new(expr),
                        span: start..self.prev_end(),
                    });
                }
                TokenKind::Template { .. } => {
                    return Err(self.error_here("tagged templates are not supported"));
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_new(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        self.expect(&TokenKind::New, "`new`")?;
        let mut callee = if self.check(&TokenKind::New) {
            self.nested(Self::parse_new)?
        } else {
            self.parse_primary()?
        };
        // member accesses bind to the callee; the first `(` is the argument list
        loop {
            if self.eat(&TokenKind::Dot) {
                let prop = self.parse_ident_name()?;
                callee = Expr::Member(MemberExpr {
                    obj: Box::new(callee),
                    prop: MemberProp::Ident(prop),
                    optional: false,
                    span: start..self.prev_end(),
                });
            } else if self.eat(&TokenKind::LeftBracket) {
                let prop = self.parse_expr()?;
                self.expect(&TokenKind::RightBracket, "`]`")?;
                callee = Expr::Member(MemberExpr {
                    obj: Box::new(callee),
                    prop: MemberProp::Computed(Box::new(prop)),
                    optional: false,
                    span: start..self.prev_end(),
                });
            } else {
                break;
            }
        }
        let args = if self.check(&TokenKind::LeftParen) {
            self.parse_args()?
        } else {
            Vec::new()
        };
        Ok(Expr::New(NewExpr {
            callee: Box::new(callee),
            args,
            span: start..self.prev_end(),
        }))
    }

    fn parse_args(&mut self) -> Result<Vec<ExprOrSpread>, ParseError> {
        self.expect(&TokenKind::LeftParen, "`(`")?;
        let no_in = std::mem::replace(&mut self.no_in, false);
        let mut args = Vec::new();
        while !self.check(&TokenKind::RightParen) {
            let spread = self.eat(&TokenKind::DotDotDot);
            let expr = self.parse_assign()?;
            args.push(ExprOrSpread { spread, expr });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.no_in = no_in;
        self.expect(&TokenKind::RightParen, "`)` after arguments")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        let span = token.span.clone();
        match token.kind {
            TokenKind::Number(value) => {
                self.advance();
                Ok(Expr::Lit(Lit {
                    kind: LitKind::Num {
                        value,
                        raw: token.text,
                    },
                    span,
                }))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Expr::Lit(Lit {
                    kind: LitKind::Str(s),
                    span,
                }))
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(Expr::Lit(Lit {
                    kind: LitKind::Bool(token.kind == TokenKind::True),
                    span,
                }))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Lit(Lit {
                    kind: LitKind::Null,
                    span,
                }))
            }
            TokenKind::Template { quasis, exprs } => {
                self.advance();
                let mut parsed = Vec::with_capacity(exprs.len());
                for sub in &exprs {
                    let mut inner = Parser::with_offset(self.source, &sub.source, sub.offset);
                    inner.depth = self.depth;
                    let expr = inner.parse_expr()?;
                    if !inner.at_eof() {
                        return Err(inner.error_here("expected `}` in template literal"));
                    }
                    parsed.push(expr);
                }
                Ok(Expr::Tpl(TplExpr {
                    quasis,
                    exprs: parsed,
                    span,
                }))
            }
            TokenKind::This => {
                self.advance();
                Ok(Expr::This(ThisExpr { span }))
            }
            TokenKind::Super => {
                self.advance();
                Ok(Expr::Ident(Ident::new("super", span)))
            }
            TokenKind::Ident(name) => {
                if name == "async"
                    && self.peek_at(1).kind == TokenKind::Function
                    && !self.peek_at(1).newline_before
                {
                    return self.parse_fn_expr();
                }
                self.advance();
                Ok(Expr::Ident(Ident::new(name, span)))
            }
            TokenKind::Function => self.parse_fn_expr(),
            TokenKind::LeftParen => {
                self.advance();
                let no_in = std::mem::replace(&mut self.no_in, false);
                let expr = self.parse_expr()?;
                self.no_in = no_in;
                self.expect(&TokenKind::RightParen, "`)`")?;
                Ok(Expr::Paren(ParenExpr {
                    expr: Box::new(expr),
                    span: span.start..self.prev_end(),
                }))
            }
            TokenKind::LeftBracket => self.parse_array_lit(),
            TokenKind::LeftBrace => self.parse_object_lit(),
            TokenKind::Class => Err(self.error_here("class expressions are not supported")),
            TokenKind::Slash | TokenKind::SlashEq => {
                Err(self.error_here("regular expression literals are not supported"))
            }
            _ => Err(self.error_here("expected expression")),
        }
    }

    fn parse_fn_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        let is_async = self.eat_word("async");
        self.expect(&TokenKind::Function, "`function`")?;
        let is_generator = self.eat(&TokenKind::Star);
        let ident = if matches!(self.peek().kind, TokenKind::Ident(_)) {
            Some(self.parse_ident()?)
        } else {
            None
        };
        let function = self.parse_function_rest(start, is_async, is_generator)?;
        Ok(Expr::Fn(FnExpr {
            ident,
            function,
            span: start..self.prev_end(),
        }))
    }

    fn parse_array_lit(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        self.expect(&TokenKind::LeftBracket, "`[`")?;
        let no_in = std::mem::replace(&mut self.no_in, false);
        let mut elems = Vec::new();
        while !self.check(&TokenKind::RightBracket) {
            if self.eat(&TokenKind::Comma) {
                elems.push(None);
                continue;
            }
            let spread = self.eat(&TokenKind::DotDotDot);
            let expr = self.parse_assign()?;
            elems.push(Some(ExprOrSpread { spread, expr }));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightBracket, "`]`")?;
        self.no_in = no_in;
        Ok(Expr::Array(ArrayLit {
            elems,
            span: start..self.prev_end(),
        }))
    }

    fn parse_object_lit(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        self.expect(&TokenKind::LeftBrace, "`{`")?;
        let no_in = std::mem::replace(&mut self.no_in, false);
        let mut props = Vec::new();
        while !self.check(&TokenKind::RightBrace) {
            props.push(self.parse_object_prop()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightBrace, "`}`")?;
        self.no_in = no_in;
        Ok(Expr::Object(ObjectLit {
            props,
            span: start..self.prev_end(),
        }))
    }

    fn parse_object_prop(&mut self) -> Result<PropOrSpread, ParseError> {
        let start = self.start();
        if self.eat(&TokenKind::DotDotDot) {
            let expr = self.parse_assign()?;
            return Ok(PropOrSpread::Spread(SpreadElement {
                expr,
                span: start..self.prev_end(),
            }));
        }

        let modifier_follows = |p: &Self| {
            !matches!(
                p.peek_at(1).kind,
                TokenKind::Comma
                    | TokenKind::Colon
                    | TokenKind::LeftParen
                    | TokenKind::RightBrace
                    | TokenKind::Eq
            )
        };
        if (self.check_word("get") || self.check_word("set")) && modifier_follows(self) {
            return Err(self.error_here("accessors in object literals are not supported"));
        }
        let is_async = self.check_word("async") && modifier_follows(self);
        if is_async {
            self.advance();
        }
        let is_generator = self.eat(&TokenKind::Star);

        let key = self.parse_prop_name()?;
        if is_async || is_generator || matches!(self.peek().kind, TokenKind::LeftParen | TokenKind::Lt) {
            let function = self.parse_function_rest(start, is_async, is_generator)?;
            let span = start..self.prev_end();
            return Ok(PropOrSpread::Prop(Prop::KeyValue(KeyValueProp {
                key,
                value: Expr::Fn(FnExpr {
                    ident: None,
                    function,
                    span: span.clone(),
                }),
                span,
            })));
        }
        if self.eat(&TokenKind::Colon) {
            let value = self.parse_assign()?;
            return Ok(PropOrSpread::Prop(Prop::KeyValue(KeyValueProp {
                key,
                value,
                span: start..self.prev_end(),
            })));
        }
        match key {
            PropName::Ident(ident) if matches!(self.peek().kind, TokenKind::Comma | TokenKind::RightBrace) => {
                if TokenKind::keyword(&ident.sym).is_some() {
                    return Err(ParseError::new("reserved word used as shorthand property", ident.span));
                }
                Ok(PropOrSpread::Prop(Prop::Shorthand(ident)))
            }
            _ => Err(self.error_here("expected `:` after property name")),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parse_expression;
    use stepwise_ast::print::expr_to_string;
    use stepwise_ast::*;

    fn roundtrip(src: &str) -> String {
        expr_to_string(&parse_expression(src).unwrap())
    }

    #[test]
    fn binary_precedence_and_associativity() {
        match parse_expression("a + b * c").unwrap() {
            Expr::Bin(b) => {
                assert_eq!(b.op, BinaryOp::Plus);
                assert!(matches!(*b.right, Expr::Bin(ref r) if r.op == BinaryOp::Mul));
            }
            other => panic!("expected binary, got {:?}", other),
        }
        match parse_expression("a ** b ** c").unwrap() {
            Expr::Bin(b) => assert!(matches!(*b.right, Expr::Bin(_))),
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn printed_expressions_reparse() {
        for src in [
            "a = b ? c : d",
            "f(a, ...b)?.c[d]!",
            "new Foo(1).bar()",
            "x => x + 1",
            "async (a: number): Promise<number> => await a",
            "{ a, b: [1, , 2], ...c }",
            "`sum ${a + b} done`",
            "typeof x === \"string\" && !y",
            "(a, b) => ({ a })",
            "a ?? (b || c)",
            "x as unknown as string",
            "i++ + --j",
        ] {
            let once = roundtrip(src);
            assert_eq!(roundtrip(&once), once, "unstable print for {}", src);
        }
    }

    #[test]
    fn yield_forms() {
        match parse_expression("yield").unwrap() {
            Expr::Yield(y) => assert!(y.arg.is_none() && !y.delegate),
            other => panic!("expected yield, got {:?}", other),
        }
        match parse_expression("yield* inner()").unwrap() {
            Expr::Yield(y) => assert!(y.arg.is_some() && y.delegate),
            other => panic!("expected yield, got {:?}", other),
        }
        match parse_expression("x = yield 1").unwrap() {
            Expr::Assign(a) => assert!(matches!(*a.right, Expr::Yield(_))),
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn conditional_is_not_mistaken_for_arrow() {
        match parse_expression("a ? (b) : c").unwrap() {
            Expr::Cond(_) => {}
            other => panic!("expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn less_than_is_comparison() {
        assert!(matches!(
            parse_expression("a < b").unwrap(),
            Expr::Bin(BinExpr { op: BinaryOp::Lt, .. })
        ));
    }

    #[test]
    fn invalid_assignment_target() {
        let err = parse_expression("1 = 2").unwrap_err();
        assert!(err.message.contains("invalid assignment target"));
    }

    #[test]
    fn template_spans_point_into_source() {
        match parse_expression("`a${bc}`").unwrap() {
            Expr::Tpl(t) => assert_eq!(t.exprs[0].span(), 4..6),
            other => panic!("expected template, got {:?}", other),
        }
    }
}
