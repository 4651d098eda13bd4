//! Class declaration parsing.

use crate::Parser;
use crate::error::ParseError;
use crate::tokenizer::TokenKind;
use stepwise_ast::*;

impl<'src> Parser<'src> {
    /// `class Name<T> extends Base implements I, J { members }`
    pub(crate) fn parse_class_decl(&mut self) -> Result<ClassDecl, ParseError> {
        let start = self.start();
        self.expect(&TokenKind::Class, "`class`")?;
        let ident = self.parse_ident()?;
        let type_params = self.parse_type_params()?;
        let super_class = if self.eat(&TokenKind::Extends) {
            let base = self.parse_lhs()?;
            if self.check(&TokenKind::Lt) {
                return Err(self.error_here("type arguments on a base class are not supported"));
            }
            Some(base)
        } else {
            None
        };
        let mut implements = Vec::new();
        if self.eat_word("implements") {
            loop {
                implements.push(self.parse_type()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(&TokenKind::LeftBrace, "`{` before class body")?;
        let mut body = Vec::new();
        while !self.eat(&TokenKind::RightBrace) {
            if self.at_eof() {
                return Err(self.error_here("expected `}` after class body"));
            }
            if self.eat(&TokenKind::Semicolon) {
                continue;
            }
            body.push(self.parse_class_member()?);
        }
        Ok(ClassDecl {
            ident,
            type_params,
            super_class,
            implements,
            body,
            span: start..self.prev_end(),
        })
    }

    /// `word` used as a modifier rather than as the member's own name.
    fn member_modifier(&self, word: &str) -> bool {
        let next = self.peek_at(1);
        self.check_word(word)
            && !next.newline_before
            && !matches!(
                next.kind,
                TokenKind::LeftParen
                    | TokenKind::Lt
                    | TokenKind::Eq
                    | TokenKind::Semicolon
                    | TokenKind::Colon
                    | TokenKind::Question
                    | TokenKind::Not
                    | TokenKind::RightBrace
            )
    }

    fn parse_class_member(&mut self) -> Result<ClassMember, ParseError> {
        let start = self.start();
        if self.check(&TokenKind::At) {
            return Err(self.error_here("decorators are not supported"));
        }

        let mut accessibility = None;
        let mut is_static = false;
        let mut readonly = false;
        loop {
            if accessibility.is_none() {
                let acc = if self.member_modifier("public") {
                    Some(Accessibility::Public)
                } else if self.member_modifier("private") {
                    Some(Accessibility::Private)
                } else if self.member_modifier("protected") {
                    Some(Accessibility::Protected)
                } else {
                    None
                };
                if acc.is_some() {
                    self.advance();
                    accessibility = acc;
                    continue;
                }
            }
            if !is_static && self.member_modifier("static") {
                self.advance();
                is_static = true;
                continue;
            }
            if !readonly && self.member_modifier("readonly") {
                self.advance();
                readonly = true;
                continue;
            }
            if ["abstract", "override", "declare", "accessor"]
                .iter()
                .any(|m| self.member_modifier(m))
            {
                return Err(self.error_here("member modifier is not supported"));
            }
            break;
        }

        if self.check_word("constructor") && self.peek_at(1).kind == TokenKind::LeftParen {
            if is_static || readonly {
                return Err(self.error_here("invalid constructor modifier"));
            }
            self.advance();
            let params = self.parse_params()?;
            let body = if self.check(&TokenKind::LeftBrace) {
                Some(self.parse_block()?)
            } else {
                self.consume_semicolon()?;
                None
            };
            return Ok(ClassMember::Constructor(ConstructorDecl {
                accessibility,
                params,
                body,
                span: start..self.prev_end(),
            }));
        }

        let is_async = self.member_modifier("async") && self.eat_word("async");
        let is_generator = self.eat(&TokenKind::Star);
        let kind = if !is_async && !is_generator && self.member_modifier("get") {
            self.advance();
            MethodKind::Getter
        } else if !is_async && !is_generator && self.member_modifier("set") {
            self.advance();
            MethodKind::Setter
        } else {
            MethodKind::Method
        };

        if !self.peek().kind.is_identifier_name() {
            return Err(self.error_here("expected member name"));
        }
        let ident = self.parse_ident_name()?;

        if self.check(&TokenKind::LeftParen) || self.check(&TokenKind::Lt) {
            if readonly {
                return Err(self.error_here("methods cannot be `readonly`"));
            }
            let mut function = self.parse_signature(start, is_async, is_generator)?;
            if self.check(&TokenKind::LeftBrace) {
                function.body = Some(self.parse_block()?);
            } else {
                self.consume_semicolon()?;
            }
            function.span = start..self.prev_end();
            return Ok(ClassMember::Method(MethodDecl {
                ident,
                accessibility,
                is_static,
                kind,
                function,
                span: start..self.prev_end(),
            }));
        }

        if is_async || is_generator || kind != MethodKind::Method {
            return Err(self.error_here("expected `(`"));
        }
        let optional = self.eat(&TokenKind::Question);
        // definite assignment assertion
        self.eat(&TokenKind::Not);
        let ty = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let value = if self.eat(&TokenKind::Eq) {
            Some(self.parse_assign()?)
        } else {
            None
        };
        self.consume_semicolon()?;
        Ok(ClassMember::Field(FieldDecl {
            ident,
            accessibility,
            is_static,
            readonly,
            optional,
            ty,
            value,
            span: start..self.prev_end(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::parse_module;
    use stepwise_ast::print::module_to_string;
    use stepwise_ast::*;

    #[test]
    fn class_members_reprint_unchanged() {
        let src = "\
class Counter<T> extends Base implements Tick, Tock {
  private count: number = 0;
  static readonly label?: string;
  constructor(start: number) {
    super();
    this.count = start;
  }
  get value(): number {
    return this.count;
  }
  async *ticks(): AsyncGenerator<number> {
    yield this.count;
  }
  protected static reset(): void {}
}
";
        assert_eq!(module_to_string(&parse_module(src).unwrap()), src);
    }

    #[test]
    fn modifier_words_can_be_member_names() {
        let module = parse_module("class A {\n  static: number;\n  get() {}\n  async = 1;\n}").unwrap();
        let Stmt::ClassDecl(class) = &module.body[0] else {
            panic!("expected class");
        };
        assert_eq!(class.body.len(), 3);
        assert!(matches!(&class.body[0], ClassMember::Field(f) if f.ident.sym == "static" && !f.is_static));
        assert!(matches!(&class.body[1], ClassMember::Method(m) if m.ident.sym == "get" && m.kind == MethodKind::Method));
        assert!(matches!(&class.body[2], ClassMember::Field(f) if f.ident.sym == "async"));
    }

    #[test]
    fn nested_class_with_decorator_is_an_error() {
        let err = parse_module("function f() {\n  class A {\n    @dec x = 1;\n  }\n}").unwrap_err();
        assert!(err.message.starts_with("decorators are not supported"));
    }
}
