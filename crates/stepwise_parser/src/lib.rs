//! Stepwise Parser
//!
//! A hand-written recursive-descent parser for the TypeScript subset that the
//! stepwise lowering consumes. Tokens come from [`tokenizer`]; statements,
//! expressions (Pratt-style), functions, classes and type annotations each
//! live in their own module as `impl Parser` blocks.
//!
//! Top-level items the lowering never touches (imports, interfaces, type
//! aliases, enums, ambient declarations, export lists) are skipped and kept
//! as [`stepwise_ast::OpaqueStmt`] with their original text.

mod class;
mod common;
mod error;
mod expr;
mod function;
mod stmt;
pub mod tokenizer;
mod types;

use stepwise_ast::*;
use tokenizer::{Token, filter_whitespace_and_comments, tokenize};

pub use error::{ParseError, SourceLine, line_col, source_line};

/// Deepest nesting of statements, expressions and types the parser accepts.
/// Deeper input fails with a `ParseError` instead of exhausting the stack.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Parse a whole source file.
#[tracing::instrument(level = "debug", skip(source), fields(len = source.len()))]
pub fn parse_module(source: &str) -> Result<Module, ParseError> {
    let mut parser = Parser::new(source);
    let mut body = Vec::new();
    while !parser.at_eof() {
        body.push(parser.parse_module_item()?);
    }
    tracing::debug!(items = body.len(), "parsed module");
    Ok(Module {
        body,
        span: 0..source.len(),
    })
}

/// Parse a single expression; the whole input must be consumed.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(source);
    let expr = parser.parse_expr()?;
    if !parser.at_eof() {
        return Err(parser.error_here("unexpected token after expression"));
    }
    Ok(expr)
}

/// Parse a single type annotation; the whole input must be consumed.
pub fn parse_type(source: &str) -> Result<TsType, ParseError> {
    let mut parser = Parser::new(source);
    let ty = parser.parse_type()?;
    if !parser.at_eof() {
        return Err(parser.error_here("unexpected token after type"));
    }
    Ok(ty)
}

/// Token cursor shared by all grammar modules.
pub(crate) struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    /// Disallow `in` as a binary operator (for-statement heads).
    no_in: bool,
    /// Tokens rewritten by `>>` splitting, so backtracking can undo them.
    rewrites: Vec<(usize, Token)>,
    /// Current nesting, bounded by [`MAX_NESTING_DEPTH`].
    depth: usize,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self::with_offset(source, source, 0)
    }

    /// Parser over `fragment`, a substring of `source` starting at `offset`.
    /// Spans are reported against `source`.
    pub(crate) fn with_offset(source: &'src str, fragment: &str, offset: usize) -> Self {
        let mut tokens = filter_whitespace_and_comments(tokenize(fragment));
        if offset > 0 {
            for token in &mut tokens {
                token.span = token.span.start + offset..token.span.end + offset;
            }
        }
        Parser {
            source,
            tokens,
            pos: 0,
            no_in: false,
            rewrites: Vec::new(),
            depth: 0,
        }
    }
}
