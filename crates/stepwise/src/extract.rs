//! Extraction: split one generator declaration into steps.
//!
//! Only the flat model is accepted: the body is a sequence of top-level
//! statements, and every `yield` stands alone as a top-level expression
//! statement. Each such `yield` closes the current step; a top-level
//! `return` closes the last one.

use std::collections::HashSet;

use crate::components::{GeneratorComponents, LocalVar, Step};
use crate::error::{LowerError, Result};
use stepwise_ast::*;

const SYNC_GENERATOR_TYPES: &[&str] = &["Generator", "Iterator", "IterableIterator"];
const ASYNC_GENERATOR_TYPES: &[&str] = &["AsyncGenerator", "AsyncIterator", "AsyncIterableIterator"];

/// State record key holding the step cursor.
pub(crate) const CURSOR_KEY: &str = "nextStep";

/// Build the component model of a generator declaration.
pub fn extract(decl: &FnDecl) -> Result<GeneratorComponents> {
    let function = &decl.function;
    if !function.is_generator {
        return Err(LowerError::structural(
            format!("`{}` is not a generator function", decl.ident.sym),
            decl.ident.span.clone(),
        ));
    }
    let body = function.body.as_ref().ok_or_else(|| {
        LowerError::structural("generator declaration has no body", decl.span.clone())
    })?;
    let (yield_type, return_type, next_type) = type_descriptors(function)?;

    let mut splitter = Splitter::default();
    for param in &function.params {
        splitter.declare_param(param)?;
    }
    for stmt in &body.stmts {
        splitter.push(stmt)?;
    }
    let (steps, locals) = splitter.finish();
    tracing::debug!(
        function = %decl.ident.sym,
        steps = steps.len(),
        locals = locals.len(),
        "extracted generator"
    );

    Ok(GeneratorComponents {
        name: decl.ident.clone(),
        type_params: function.type_params.clone(),
        params: function.params.clone(),
        locals,
        steps,
        yield_type,
        return_type,
        next_type,
        is_async: function.is_async,
        span: decl.span.clone(),
    })
}

/// `Generator<Y, R, N>` and friends; missing arguments take TypeScript's
/// defaults `unknown`, `any`, `any`.
fn type_descriptors(function: &Function) -> Result<(TsType, TsType, TsType)> {
    let unknown = || TsType::keyword(TsKeywordKind::Unknown);
    let any = || TsType::keyword(TsKeywordKind::Any);
    let Some(annotation) = &function.return_type else {
        return Ok((unknown(), any(), any()));
    };

    let expected = if function.is_async {
        ASYNC_GENERATOR_TYPES
    } else {
        SYNC_GENERATOR_TYPES
    };
    let reference = match annotation {
        TsType::TsTypeRef(r) if expected.contains(&r.type_name.as_str()) => r,
        other => {
            return Err(LowerError::structural(
                format!(
                    "return type must be one of {}",
                    expected
                        .iter()
                        .map(|name| format!("`{}`", name))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                other.span(),
            ));
        }
    };
    if reference.type_args.len() > 3 {
        return Err(LowerError::structural(
            format!("`{}` takes at most three type arguments", reference.type_name),
            reference.span.clone(),
        ));
    }
    let mut args = reference.type_args.iter().cloned();
    Ok((
        args.next().unwrap_or_else(unknown),
        args.next().unwrap_or_else(any),
        args.next().unwrap_or_else(any),
    ))
}

#[derive(Default)]
struct Splitter {
    steps: Vec<Step>,
    stmts: Vec<Stmt>,
    starting_yield: Option<YieldExpr>,
    locals: Vec<LocalVar>,
    declared: HashSet<String>,
    returned: bool,
}

impl Splitter {
    fn declare(&mut self, ident: &Ident) -> Result<()> {
        if ident.sym == CURSOR_KEY {
            return Err(LowerError::structural(
                format!("`{}` is reserved for the step cursor", CURSOR_KEY),
                ident.span.clone(),
            ));
        }
        if !self.declared.insert(ident.sym.clone()) {
            return Err(LowerError::structural(
                format!("`{}` is declared more than once", ident.sym),
                ident.span.clone(),
            ));
        }
        Ok(())
    }

    fn declare_param(&mut self, param: &Param) -> Result<()> {
        let Some(ident) = param.pat.as_ident() else {
            return Err(LowerError::structural(
                "destructured parameters are not supported",
                param.pat.span(),
            ));
        };
        if ident.sym == "this" {
            return Err(LowerError::structural(
                "`this` parameters are not supported",
                ident.span.clone(),
            ));
        }
        if param.ty.is_none() {
            return Err(LowerError::structural(
                format!("parameter `{}` needs a type annotation", ident.sym),
                param.span.clone(),
            ));
        }
        if let Some(span) = param.default.as_ref().and_then(first_yield) {
            return Err(sub_expression_yield(span));
        }
        self.declare(ident)
    }

    fn push(&mut self, stmt: &Stmt) -> Result<()> {
        if self.returned {
            tracing::warn!(
                span = ?stmt.span(),
                "statement after `return` is unreachable and was dropped"
            );
            return Ok(());
        }

        if let Some(y) = yield_statement(stmt) {
            if y.delegate {
                return Err(LowerError::structural(
                    "delegated `yield*` is not supported",
                    y.span.clone(),
                ));
            }
            if let Some(span) = y.arg.as_deref().and_then(first_yield) {
                return Err(sub_expression_yield(span));
            }
            self.close_step(y.arg.as_deref().cloned());
            self.starting_yield = Some(y.clone());
            return Ok(());
        }

        match stmt {
            Stmt::Return(r) => {
                if let Some(span) = r.arg.as_ref().and_then(first_yield) {
                    return Err(sub_expression_yield(span));
                }
                self.returned = true;
                self.close_step(r.arg.clone());
            }
            Stmt::VarDecl(v) => self.push_locals(v)?,
            Stmt::FnDecl(f) => {
                return Err(LowerError::structural(
                    "function declarations inside a generator body are not supported",
                    f.span.clone(),
                ));
            }
            Stmt::ClassDecl(c) => {
                return Err(LowerError::structural(
                    "class declarations inside a generator body are not supported",
                    c.span.clone(),
                ));
            }
            other => {
                let mut findings = Findings::default();
                findings.stmt(other, 0);
                findings.into_result()?;
                self.stmts.push(other.clone());
            }
        }
        Ok(())
    }

    /// Top-level declarations become state entries; initializers become
    /// assignments in the current step.
    fn push_locals(&mut self, decl: &VarDecl) -> Result<()> {
        for declarator in &decl.decls {
            let Some(ident) = declarator.name.as_ident() else {
                return Err(LowerError::structural(
                    "destructured bindings are not supported",
                    declarator.name.span(),
                ));
            };
            let Some(ty) = &declarator.ty else {
                return Err(LowerError::structural(
                    format!("local `{}` needs a type annotation", ident.sym),
                    declarator.span.clone(),
                ));
            };
            if let Some(span) = declarator.init.as_ref().and_then(first_yield) {
                return Err(sub_expression_yield(span));
            }
            self.declare(ident)?;
            self.locals.push(LocalVar {
                name: ident.clone(),
                ty: ty.clone(),
            });
            if let Some(init) = &declarator.init {
                self.stmts.push(Stmt::ExprStmt(ExprStmt {
                    expr: Expr::Assign(AssignExpr {
                        op: AssignOp::Eq,
                        left: Box::new(Expr::Ident(ident.clone())),
                        right: Box::new(init.clone()),
                        span: declarator.span.clone(),
                    }),
                    span: declarator.span.clone(),
                }));
            }
        }
        Ok(())
    }

    fn close_step(&mut self, return_expr: Option<Expr>) {
        let step = Step {
            index: self.steps.len(),
            starting_yield: self.starting_yield.take(),
            stmts: std::mem::take(&mut self.stmts),
            return_expr,
        };
        tracing::debug!(
            step = step.index,
            statements = step.stmts.len(),
            yields = step.return_expr.is_some(),
            "closed step"
        );
        self.steps.push(step);
    }

    fn finish(mut self) -> (Vec<Step>, Vec<LocalVar>) {
        if !self.returned {
            self.close_step(None);
        }
        (self.steps, self.locals)
    }
}

/// `yield x;` standing alone as a statement.
fn yield_statement(stmt: &Stmt) -> Option<&YieldExpr> {
    match stmt {
        Stmt::ExprStmt(s) => match s.expr.unparen() {
            Expr::Yield(y) => Some(y),
            _ => None,
        },
        _ => None,
    }
}

fn sub_expression_yield(span: Span) -> LowerError {
    LowerError::structural(
        "`yield` must be a statement of its own at the top level of the generator body",
        span,
    )
}

fn first_yield(expr: &Expr) -> Option<Span> {
    let mut findings = Findings::default();
    findings.expr(expr);
    findings.yield_span
}

/// Constructs below a top-level statement that the flat model rejects.
#[derive(Default)]
struct Findings {
    yield_span: Option<Span>,
    return_span: Option<Span>,
    var_span: Option<Span>,
}

impl Findings {
    fn into_result(self) -> Result<()> {
        if let Some(span) = self.yield_span {
            return Err(sub_expression_yield(span));
        }
        if let Some(span) = self.return_span {
            return Err(LowerError::structural(
                "`return` is only supported at the top level of the generator body",
                span,
            ));
        }
        if let Some(span) = self.var_span {
            return Err(LowerError::structural(
                "`var` declarations are only supported at the top level; use `let`",
                span,
            ));
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt, depth: usize) {
        let inner = depth + 1;
        match stmt {
            Stmt::VarDecl(v) => self.var_decl(v, depth),
            Stmt::ExprStmt(s) => self.expr(&s.expr),
            Stmt::If(s) => {
                self.expr(&s.test);
                self.stmt(&s.cons, inner);
                if let Some(alt) = &s.alt {
                    self.stmt(alt, inner);
                }
            }
            Stmt::For(s) => {
                match &s.init {
                    Some(ForInit::VarDecl(v)) => self.var_decl(v, inner),
                    Some(ForInit::Expr(e)) => self.expr(e),
                    None => {}
                }
                self.opt_expr(s.test.as_ref());
                self.opt_expr(s.update.as_ref());
                self.stmt(&s.body, inner);
            }
            Stmt::ForIn(s) => {
                self.for_head(&s.left, inner);
                self.expr(&s.right);
                self.stmt(&s.body, inner);
            }
            Stmt::ForOf(s) => {
                self.for_head(&s.left, inner);
                self.expr(&s.right);
                self.stmt(&s.body, inner);
            }
            Stmt::While(s) => {
                self.expr(&s.test);
                self.stmt(&s.body, inner);
            }
            Stmt::DoWhile(s) => {
                self.stmt(&s.body, inner);
                self.expr(&s.test);
            }
            Stmt::Switch(s) => {
                self.expr(&s.discriminant);
                for case in &s.cases {
                    self.opt_expr(case.test.as_ref());
                    for stmt in &case.cons {
                        self.stmt(stmt, inner);
                    }
                }
            }
            Stmt::Try(s) => {
                self.block(&s.block, inner);
                if let Some(handler) = &s.handler {
                    if let Some(param) = &handler.param {
                        self.pat(param);
                    }
                    self.block(&handler.body, inner);
                }
                if let Some(finalizer) = &s.finalizer {
                    self.block(finalizer, inner);
                }
            }
            Stmt::Block(b) => self.block(b, inner),
            Stmt::Return(r) => {
                self.return_span.get_or_insert_with(|| r.span.clone());
                self.opt_expr(r.arg.as_ref());
            }
            Stmt::Throw(s) => self.expr(&s.arg),
            Stmt::Labeled(s) => self.stmt(&s.body, inner),
            // nested functions and classes own their `yield`/`return`
            Stmt::FnDecl(_) | Stmt::ClassDecl(_) => {}
            Stmt::Export(_)
            | Stmt::Break(_)
            | Stmt::Continue(_)
            | Stmt::Empty(_)
            | Stmt::Opaque(_) => {}
        }
    }

    fn block(&mut self, block: &BlockStmt, depth: usize) {
        for stmt in &block.stmts {
            self.stmt(stmt, depth);
        }
    }

    fn var_decl(&mut self, decl: &VarDecl, depth: usize) {
        if depth > 0 && decl.kind == VarDeclKind::Var {
            self.var_span.get_or_insert_with(|| decl.span.clone());
        }
        for declarator in &decl.decls {
            self.pat(&declarator.name);
            self.opt_expr(declarator.init.as_ref());
        }
    }

    fn for_head(&mut self, head: &ForHead, depth: usize) {
        match head {
            ForHead::VarDecl(v) => self.var_decl(v, depth),
            ForHead::Expr(e) => self.expr(e),
        }
    }

    fn pat(&mut self, pat: &Pat) {
        match pat {
            Pat::Ident(_) => {}
            Pat::Array(a) => {
                for elem in a.elems.iter().flatten() {
                    self.pat(&elem.pat);
                    self.opt_expr(elem.default.as_ref());
                }
                if let Some(rest) = &a.rest {
                    self.pat(rest);
                }
            }
            Pat::Object(o) => {
                for prop in &o.props {
                    if let PropName::Computed(key) = &prop.key {
                        self.expr(key);
                    }
                    if let Some(value) = &prop.value {
                        self.pat(value);
                    }
                    self.opt_expr(prop.default.as_ref());
                }
            }
        }
    }

    fn opt_expr(&mut self, expr: Option<&Expr>) {
        if let Some(expr) = expr {
            self.expr(expr);
        }
    }

    fn args(&mut self, args: &[ExprOrSpread]) {
        for arg in args {
            self.expr(&arg.expr);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Yield(y) => {
                self.yield_span.get_or_insert_with(|| y.span.clone());
                if let Some(arg) = &y.arg {
                    self.expr(arg);
                }
            }
            Expr::This(_) | Expr::Ident(_) | Expr::Lit(_) => {}
            // nested functions own their `yield`/`return`
            Expr::Fn(_) | Expr::Arrow(_) => {}
            Expr::Tpl(t) => t.exprs.iter().for_each(|e| self.expr(e)),
            Expr::Unary(u) => self.expr(&u.arg),
            Expr::Update(u) => self.expr(&u.arg),
            Expr::Bin(b) => {
                self.expr(&b.left);
                self.expr(&b.right);
            }
            Expr::Assign(a) => {
                self.expr(&a.left);
                self.expr(&a.right);
            }
            Expr::Cond(c) => {
                self.expr(&c.test);
                self.expr(&c.cons);
                self.expr(&c.alt);
            }
            Expr::Call(c) => {
                self.expr(&c.callee);
                self.args(&c.args);
            }
            Expr::New(n) => {
                self.expr(&n.callee);
                self.args(&n.args);
            }
            Expr::Member(m) => {
                self.expr(&m.obj);
                if let MemberProp::Computed(prop) = &m.prop {
                    self.expr(prop);
                }
            }
            Expr::Array(a) => {
                for elem in a.elems.iter().flatten() {
                    self.expr(&elem.expr);
                }
            }
            Expr::Object(o) => {
                for prop in &o.props {
                    match prop {
                        PropOrSpread::Prop(Prop::Shorthand(_)) => {}
                        PropOrSpread::Prop(Prop::KeyValue(kv)) => {
                            if let PropName::Computed(key) = &kv.key {
                                self.expr(key);
                            }
                            self.expr(&kv.value);
                        }
                        PropOrSpread::Spread(s) => self.expr(&s.expr),
                    }
                }
            }
            Expr::Seq(s) => s.exprs.iter().for_each(|e| self.expr(e)),
            Expr::Paren(p) => self.expr(&p.expr),
            Expr::Await(a) => self.expr(&a.arg),
            Expr::As(a) => self.expr(&a.expr),
            Expr::NonNull(n) => self.expr(&n.expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use stepwise_ast::print::{expr_to_string, stmt_to_string, type_to_string};
    use stepwise_parser::parse_module;

    fn generator(src: &str) -> FnDecl {
        match parse_module(src).unwrap().body.into_iter().next() {
            Some(Stmt::FnDecl(f)) => f,
            other => panic!("expected function, got {:?}", other),
        }
    }

    fn structural_message(src: &str) -> String {
        match extract(&generator(src)) {
            Err(LowerError::StructuralUnsupported { message, .. }) => message,
            other => panic!("expected structural error, got {:?}", other),
        }
    }

    #[test]
    fn yields_split_steps() {
        let c = extract(&generator(
            "function* f(a: number, b: number): Generator<number, number, number> {\n  yield 42;\n  yield 42;\n  return 42;\n}",
        ))
        .unwrap();
        assert_eq!(c.steps.len(), 3);
        assert!(c.steps[0].starting_yield.is_none());
        assert!(c.steps[1].starting_yield.is_some());
        assert!(c.steps.iter().all(|s| s.stmts.is_empty()));
        assert!(c.steps.iter().all(|s| s.return_expr.is_some()));
        assert_eq!(c.state_names(), vec!["a", "b"]);
        assert_eq!(type_to_string(&c.next_type), "number");
    }

    #[test]
    fn implicit_terminal_step() {
        let c = extract(&generator(
            "function* f(): Generator<string> {\n  let s: string = \"a\";\n  yield s;\n  s = s + \"b\";\n}",
        ))
        .unwrap();
        assert_eq!(c.steps.len(), 2);
        assert_eq!(c.last_step(), 1);
        assert!(c.steps[1].return_expr.is_none());
        assert_eq!(stmt_to_string(&c.steps[0].stmts[0]), "s = \"a\";");
        assert_eq!(stmt_to_string(&c.steps[1].stmts[0]), "s = s + \"b\";");
        assert_eq!(type_to_string(&c.return_type), "any");
        assert_eq!(type_to_string(&c.next_type), "any");
    }

    #[test]
    fn adjacent_yields_make_empty_steps() {
        let c = extract(&generator("function* f() {\n  yield;\n  yield;\n}")).unwrap();
        assert_eq!(c.steps.len(), 3);
        assert!(c.steps[0].return_expr.is_none());
        assert_eq!(type_to_string(&c.yield_type), "unknown");
    }

    #[test]
    fn declarator_without_initializer_emits_nothing() {
        let c = extract(&generator("function* f() {\n  let n: number;\n  yield n;\n}")).unwrap();
        assert_eq!(c.locals.len(), 1);
        assert!(c.steps[0].stmts.is_empty());
        assert_eq!(expr_to_string(c.steps[0].return_expr.as_ref().unwrap()), "n");
    }

    #[test]
    fn statements_after_return_are_dropped() {
        let c = extract(&generator("function* f() {\n  return 1;\n  yield 2;\n  g();\n}")).unwrap();
        assert_eq!(c.steps.len(), 1);
    }

    #[test]
    fn structural_rejections() {
        let cases = [
            ("function* f() {\n  const [a, b]: number[] = [1, 2];\n}", "destructured"),
            ("function* f({ a }: { a: number }) {}", "destructured"),
            ("function* f() {\n  const x: number = yield 1;\n}", "statement of its own"),
            ("function* f() {\n  g(yield 1);\n}", "statement of its own"),
            ("function* f() {\n  if (c) {\n    yield 1;\n  }\n}", "statement of its own"),
            ("function* f() {\n  yield* g();\n}", "yield*"),
            ("function* f() {\n  while (c) {\n    return 1;\n  }\n}", "`return`"),
            ("function* f() {\n  function g() {}\n}", "function declarations"),
            ("function* f(a) {}", "type annotation"),
            ("function* f() {\n  let x = 1;\n}", "type annotation"),
            ("function* f(): number {}", "return type"),
            ("async function* f(): Generator<number> {}", "return type"),
            ("function* f(a: number) {\n  let a: number = 1;\n}", "more than once"),
            ("function* f(nextStep: number) {}", "reserved"),
            ("function* f() {\n  if (c) {\n    var t = 1;\n  }\n}", "`var`"),
            ("function f() {}", "not a generator"),
        ];
        for (src, needle) in cases {
            let message = structural_message(src);
            assert!(message.contains(needle), "{:?} should mention {:?}", message, needle);
        }
    }

    #[test]
    fn yields_inside_nested_functions_are_theirs() {
        let c = extract(&generator(
            "function* f() {\n  const inner: any = function* () {\n    yield 1;\n  };\n  yield 2;\n}",
        ))
        .unwrap();
        assert_eq!(c.steps.len(), 2);
    }

    #[test]
    fn errors_point_at_the_construct() {
        let src = "function* f() {\n  g(yield 1);\n}";
        let err = extract(&generator(src)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructuralUnsupported);
        assert_eq!(&src[err.span()], "yield 1");
    }
}
