//! Statement and module-item parsing.

use crate::Parser;
use crate::error::ParseError;
use crate::tokenizer::TokenKind;
use stepwise_ast::*;

/// Contextual words that start a top-level item kept as opaque text.
const OPAQUE_BLOCK_ITEMS: &[&str] = &["interface", "enum", "declare", "namespace", "module", "abstract"];

impl<'src> Parser<'src> {
    /// One top-level item.
    pub(crate) fn parse_module_item(&mut self) -> Result<Stmt, ParseError> {
        let start = self.start();
        if self.check(&TokenKind::Export) {
            return self.parse_export();
        }
        if self.check(&TokenKind::Import)
            && !matches!(self.peek_at(1).kind, TokenKind::LeftParen | TokenKind::Dot)
        {
            return Ok(Stmt::Opaque(self.skip_opaque_item(start, false)?));
        }
        if self.starts_opaque_block_item() {
            return Ok(Stmt::Opaque(self.skip_opaque_item(start, true)?));
        }
        if self.starts_type_alias() {
            return Ok(Stmt::Opaque(self.skip_opaque_item(start, false)?));
        }
        if self.check(&TokenKind::Class) {
            return self.parse_class_or_opaque(start);
        }
        self.parse_statement()
    }

    fn starts_opaque_block_item(&self) -> bool {
        let next = self.peek_at(1);
        let word_item = OPAQUE_BLOCK_ITEMS.iter().any(|w| self.check_word(w))
            && !next.newline_before
            && (matches!(next.kind, TokenKind::Ident(_) | TokenKind::String(_))
                || next.kind.is_reserved_word());
        let const_enum = self.check(&TokenKind::Const) && self.check_word_at(1, "enum");
        word_item || const_enum
    }

    fn starts_type_alias(&self) -> bool {
        self.check_word("type")
            && matches!(self.peek_at(1).kind, TokenKind::Ident(_))
            && !self.peek_at(1).newline_before
            && matches!(self.peek_at(2).kind, TokenKind::Eq | TokenKind::Lt)
    }

    /// Classes the lowering does not need to understand still must not stop
    /// the file from being processed; unparseable ones are kept verbatim.
    fn parse_class_or_opaque(&mut self, start: usize) -> Result<Stmt, ParseError> {
        match self.try_parse(|p| p.parse_class_decl()) {
            Some(class) => Ok(Stmt::ClassDecl(class)),
            None => {
                tracing::debug!(offset = start, "class kept as opaque text");
                Ok(Stmt::Opaque(self.skip_opaque_item(start, true)?))
            }
        }
    }

    /// `export` followed by a declaration; every other export form is opaque.
    fn parse_export(&mut self) -> Result<Stmt, ParseError> {
        let start = self.start();
        self.expect(&TokenKind::Export, "`export`")?;
        let is_default = self.eat(&TokenKind::Default);

        let is_function = self.check(&TokenKind::Function)
            || (self.check_word("async") && self.peek_at(1).kind == TokenKind::Function);
        let decl = if is_function {
            self.try_parse(|p| p.parse_fn_decl()).map(Stmt::FnDecl)
        } else if self.check(&TokenKind::Class) {
            self.try_parse(|p| p.parse_class_decl()).map(Stmt::ClassDecl)
        } else if !is_default
            && matches!(
                self.peek().kind,
                TokenKind::Var | TokenKind::Let | TokenKind::Const
            )
            && !self.check_word_at(1, "enum")
        {
            Some(Stmt::VarDecl(self.parse_var_stmt()?))
        } else {
            None
        };

        match decl {
            Some(decl) => Ok(Stmt::Export(ExportDecl {
                decl: Box::new(decl),
                is_default,
                span: start..self.prev_end(),
            })),
            None => {
                let block_item = self.starts_opaque_block_item() || self.check(&TokenKind::Class);
                Ok(Stmt::Opaque(self.skip_opaque_item(start, block_item)?))
            }
        }
    }

    /// `{ stmts }`
    pub(crate) fn parse_block(&mut self) -> Result<BlockStmt, ParseError> {
        let start = self.start();
        self.expect(&TokenKind::LeftBrace, "`{`")?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RightBrace) {
            if self.at_eof() {
                return Err(self.error_here("expected `}`"));
            }
            stmts.push(self.parse_statement()?);
        }
        self.advance();
        Ok(BlockStmt {
            stmts,
            span: start..self.prev_end(),
        })
    }

    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        self.nested(Self::statement)
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.start();
        match self.peek().kind.clone() {
            TokenKind::LeftBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                Ok(Stmt::VarDecl(self.parse_var_stmt()?))
            }
            TokenKind::Function => Ok(Stmt::FnDecl(self.parse_fn_decl()?)),
            TokenKind::Ident(ref w)
                if w == "async"
                    && self.peek_at(1).kind == TokenKind::Function
                    && !self.peek_at(1).newline_before =>
            {
                Ok(Stmt::FnDecl(self.parse_fn_decl()?))
            }
            TokenKind::Class => Ok(Stmt::ClassDecl(self.parse_class_decl()?)),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => {
                self.advance();
                let test = self.parse_paren_expr()?;
                let body = self.parse_statement()?;
                Ok(Stmt::While(WhileStmt {
                    test,
                    body: Box::new(body),
                    span: start..self.prev_end(),
                }))
            }
            TokenKind::Do => {
                self.advance();
                let body = self.parse_statement()?;
                self.expect(&TokenKind::While, "`while` after do-while body")?;
                let test = self.parse_paren_expr()?;
                self.eat(&TokenKind::Semicolon);
                Ok(Stmt::DoWhile(DoWhileStmt {
                    body: Box::new(body),
                    test,
                    span: start..self.prev_end(),
                }))
            }
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Return => {
                self.advance();
                let arg = if self.statement_ends_here() {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.consume_semicolon()?;
                Ok(Stmt::Return(ReturnStmt {
                    arg,
                    span: start..self.prev_end(),
                }))
            }
            TokenKind::Break | TokenKind::Continue => {
                let keyword = self.advance();
                let label = if matches!(self.peek().kind, TokenKind::Ident(_))
                    && !self.peek().newline_before
                {
                    Some(self.parse_ident()?)
                } else {
                    None
                };
                self.consume_semicolon()?;
                let span = start..self.prev_end();
                Ok(if keyword.kind == TokenKind::Break {
                    Stmt::Break(BreakStmt { label, span })
                } else {
                    Stmt::Continue(ContinueStmt { label, span })
                })
            }
            TokenKind::Throw => {
                self.advance();
                if self.peek().newline_before {
                    return Err(self.error_here("line break is not allowed after `throw`"));
                }
                let arg = self.parse_expr()?;
                self.consume_semicolon()?;
                Ok(Stmt::Throw(ThrowStmt {
                    arg,
                    span: start..self.prev_end(),
                }))
            }
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::Empty(EmptyStmt {
                    span: start..self.prev_end(),
                }))
            }
            TokenKind::Ident(_) if self.peek_at(1).kind == TokenKind::Colon => {
                let label = self.parse_ident()?;
                self.advance();
                let body = self.parse_statement()?;
                Ok(Stmt::Labeled(LabeledStmt {
                    label,
                    body: Box::new(body),
                    span: start..self.prev_end(),
                }))
            }
            TokenKind::Import | TokenKind::Export
                if !matches!(self.peek_at(1).kind, TokenKind::LeftParen | TokenKind::Dot) =>
            {
                Err(self.error_here("imports and exports are only allowed at the top level"))
            }
            TokenKind::Debugger => Err(self.error_here("`debugger` statements are not supported")),
            _ => {
                let expr = self.parse_expr()?;
                self.consume_semicolon()?;
                Ok(Stmt::ExprStmt(ExprStmt {
                    expr,
                    span: start..self.prev_end(),
                }))
            }
        }
    }

    /// A `return` argument is absent when the statement ends right away.
    fn statement_ends_here(&self) -> bool {
        let token = self.peek();
        token.newline_before
            || matches!(
                token.kind,
                TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
            )
    }

    fn parse_paren_expr(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen, "`(`")?;
        let expr = self.parse_expr()?;
        self.expect(&TokenKind::RightParen, "`)`")?;
        Ok(expr)
    }

    /// Declaration statement including its terminator.
    fn parse_var_stmt(&mut self) -> Result<VarDecl, ParseError> {
        let mut decl = self.parse_var_decl()?;
        self.consume_semicolon()?;
        decl.span.end = self.prev_end();
        Ok(decl)
    }

    /// `let a: T = x, b` without the terminator.
    fn parse_var_decl(&mut self) -> Result<VarDecl, ParseError> {
        let start = self.start();
        let kind = match self.advance().kind {
            TokenKind::Var => VarDeclKind::Var,
            TokenKind::Let => VarDeclKind::Let,
            TokenKind::Const => VarDeclKind::Const,
            _ => return Err(ParseError::new("expected `var`, `let` or `const`", start..start)),
        };
        let mut decls = Vec::new();
        loop {
            let decl_start = self.start();
            let name = self.parse_binding_pattern()?;
            // definite assignment assertion: `let x!: number;`
            self.eat(&TokenKind::Not);
            let ty = if self.eat(&TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let init = if self.eat(&TokenKind::Eq) {
                Some(self.parse_assign()?)
            } else {
                None
            };
            decls.push(VarDeclarator {
                name,
                ty,
                init,
                span: decl_start..self.prev_end(),
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(VarDecl {
            kind,
            decls,
            span: start..self.prev_end(),
        })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.start();
        self.expect(&TokenKind::If, "`if`")?;
        let test = self.parse_paren_expr()?;
        let cons = self.parse_statement()?;
        let alt = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If(IfStmt {
            test,
            cons: Box::new(cons),
            alt,
            span: start..self.prev_end(),
        }))
    }

    /// `for (;;)`, `for (x in o)`, `for (x of xs)` and `for await (x of xs)`.
    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let start = self.start();
        self.expect(&TokenKind::For, "`for`")?;
        let is_await = self.eat(&TokenKind::Await);
        self.expect(&TokenKind::LeftParen, "`(` after `for`")?;

        let outer_no_in = std::mem::replace(&mut self.no_in, true);
        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if matches!(
            self.peek().kind,
            TokenKind::Var | TokenKind::Let | TokenKind::Const
        ) {
            Some(ForInit::VarDecl(self.parse_var_decl()?))
        } else {
            Some(ForInit::Expr(self.parse_expr()?))
        };
        self.no_in = outer_no_in;

        if self.check_word("of") || self.check(&TokenKind::In) {
            let is_of = self.check_word("of");
            let keyword = self.advance();
            let left = match init {
                Some(ForInit::VarDecl(decl)) => {
                    if decl.decls.len() != 1 || decl.decls[0].init.is_some() {
                        return Err(ParseError::new(
                            "for-in/of declarations take exactly one binding without initializer",
                            decl.span,
                        ));
                    }
                    ForHead::VarDecl(decl)
                }
                Some(ForInit::Expr(target @ (Expr::Ident(_) | Expr::Member(_)))) => {
                    ForHead::Expr(target)
                }
                Some(ForInit::Expr(other)) => {
                    return Err(ParseError::new(
                        "unsupported for-in/of target",
                        other.span(),
                    ));
                }
                None => return Err(ParseError::new("expected loop variable", keyword.span)),
            };
            if is_await && !is_of {
                return Err(ParseError::new("`for await` requires `of`", keyword.span));
            }
            let right = if is_of {
                self.parse_assign()?
            } else {
                self.parse_expr()?
            };
            self.expect(&TokenKind::RightParen, "`)`")?;
            let body = Box::new(self.parse_statement()?);
            let span = start..self.prev_end();
            return Ok(if is_of {
                Stmt::ForOf(ForOfStmt {
                    left,
                    right,
                    body,
                    is_await,
                    span,
                })
            } else {
                Stmt::ForIn(ForInStmt {
                    left,
                    right,
                    body,
                    span,
                })
            });
        }

        if is_await {
            return Err(self.error_here("`for await` requires `of`"));
        }
        self.expect(&TokenKind::Semicolon, "`;` in for statement")?;
        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::Semicolon, "`;` in for statement")?;
        let update = if self.check(&TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::RightParen, "`)`")?;
        let body = self.parse_statement()?;
        Ok(Stmt::For(ForStmt {
            init,
            test,
            update,
            body: Box::new(body),
            span: start..self.prev_end(),
        }))
    }

    fn parse_switch(&mut self) -> Result<Stmt, ParseError> {
        let start = self.start();
        self.expect(&TokenKind::Switch, "`switch`")?;
        let discriminant = self.parse_paren_expr()?;
        self.expect(&TokenKind::LeftBrace, "`{`")?;
        let mut cases = Vec::new();
        let mut seen_default = false;
        while !self.eat(&TokenKind::RightBrace) {
            let case_start = self.start();
            let test = if self.eat(&TokenKind::Case) {
                Some(self.parse_expr()?)
            } else if self.check(&TokenKind::Default) {
                if seen_default {
                    return Err(self.error_here("duplicate `default` clause"));
                }
                seen_default = true;
                self.advance();
                None
            } else {
                return Err(self.error_here("expected `case`, `default` or `}`"));
            };
            self.expect(&TokenKind::Colon, "`:`")?;
            let mut cons = Vec::new();
            while !matches!(
                self.peek().kind,
                TokenKind::Case | TokenKind::Default | TokenKind::RightBrace | TokenKind::Eof
            ) {
                cons.push(self.parse_statement()?);
            }
            cases.push(SwitchCase {
                test,
                cons,
                span: case_start..self.prev_end(),
            });
        }
        Ok(Stmt::Switch(SwitchStmt {
            discriminant,
            cases,
            span: start..self.prev_end(),
        }))
    }

    fn parse_try(&mut self) -> Result<Stmt, ParseError> {
        let start = self.start();
        self.expect(&TokenKind::Try, "`try`")?;
        let block = self.parse_block()?;
        let handler = if self.check(&TokenKind::Catch) {
            let catch_start = self.start();
            self.advance();
            let (param, ty) = if self.eat(&TokenKind::LeftParen) {
                let param = self.parse_binding_pattern()?;
                let ty = if self.eat(&TokenKind::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                self.expect(&TokenKind::RightParen, "`)`")?;
                (Some(param), ty)
            } else {
                (None, None)
            };
            let body = self.parse_block()?;
            Some(CatchClause {
                param,
                ty,
                body,
                span: catch_start..self.prev_end(),
            })
        } else {
            None
        };
        let finalizer = if self.eat(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.error_here("expected `catch` or `finally`"));
        }
        Ok(Stmt::Try(TryStmt {
            block,
            handler,
            finalizer,
            span: start..self.prev_end(),
        }))
    }
}
