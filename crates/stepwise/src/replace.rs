//! Route references to parameters and locals through `this.state`.
//!
//! The rewrite is structural and scope-aware: a name rebound by a nested
//! function, arrow, catch clause or block declaration is left alone inside
//! the scope that rebinds it. Binding positions, member property names and
//! object-literal keys are never rewritten.
//!
//! Inside a `function` or class body `this` is no longer the state machine,
//! so references there are left alone and reported through
//! [`Replacer::escaped`].

use std::collections::HashSet;

use stepwise_ast::*;

/// In-place rewriter for one generator's step bodies.
#[derive(Debug, Clone)]
pub struct Replacer {
    names: HashSet<String>,
    /// Names rebound by enclosing scopes, innermost last.
    scopes: Vec<HashSet<String>>,
    /// The `yield` resumed into the current step and the identifier that
    /// replaces it.
    resume: Option<(YieldExpr, String)>,
    /// Enclosing bodies that rebind `this`.
    this_depth: usize,
    escaped: Option<Ident>,
    rewritten: usize,
}

/// `this.state.<name>`
pub fn state_access(name: &str, span: Span) -> Expr {
    Expr::Member(MemberExpr {
        obj: Box::new(Expr::Member(MemberExpr {
            obj: Box::new(Expr::This(ThisExpr { span: dummy_span() })),
            prop: MemberProp::Ident(Ident::new("state", dummy_span())),
            optional: false,
            span: dummy_span(),
        })),
        prop: MemberProp::Ident(Ident::new(name, span.clone())),
        optional: false,
        span,
    })
}

impl Replacer {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Replacer {
            names: names.into_iter().map(Into::into).collect(),
            scopes: Vec::new(),
            resume: None,
            this_depth: 0,
            escaped: None,
            rewritten: 0,
        }
    }

    /// Substitute `resume_param` for `starting_yield` from now on.
    pub fn set_resume(&mut self, starting_yield: Option<YieldExpr>, resume_param: &str) {
        self.resume = starting_yield.map(|y| (y, resume_param.to_string()));
    }

    /// First state reference found where `this.state` cannot reach it.
    pub fn escaped(&self) -> Option<&Ident> {
        self.escaped.as_ref()
    }

    /// Number of identifiers rewritten so far.
    pub fn rewritten(&self) -> usize {
        self.rewritten
    }

    fn is_state_ref(&self, name: &str) -> bool {
        self.names.contains(name) && !self.scopes.iter().any(|scope| scope.contains(name))
    }

    fn rewrite_ident(&mut self, ident: &Ident) -> Option<Expr> {
        if !self.is_state_ref(&ident.sym) {
            return None;
        }
        if self.this_depth > 0 {
            if self.escaped.is_none() {
                self.escaped = Some(ident.clone());
            }
            return None;
        }
        self.rewritten += 1;
        tracing::trace!(name = %ident.sym, span = ?ident.span, "rewrote reference");
        Some(state_access(&ident.sym, ident.span.clone()))
    }

    /// Rewrite a statement list that forms one block scope.
    pub fn stmts(&mut self, stmts: &mut [Stmt]) {
        let mut scope = HashSet::new();
        lexical_names(stmts, &mut scope);
        self.scopes.push(scope);
        for stmt in stmts.iter_mut() {
            self.stmt(stmt);
        }
        self.scopes.pop();
    }

    fn block(&mut self, block: &mut BlockStmt) {
        self.stmts(&mut block.stmts);
    }

    pub fn stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::VarDecl(v) => self.var_decl(v),
            Stmt::FnDecl(f) => self.function(&mut f.function, None),
            Stmt::ClassDecl(c) => self.class(c),
            Stmt::Export(e) => self.stmt(&mut e.decl),
            Stmt::ExprStmt(s) => self.expr(&mut s.expr),
            Stmt::If(s) => {
                self.expr(&mut s.test);
                self.stmt(&mut s.cons);
                if let Some(alt) = &mut s.alt {
                    self.stmt(alt);
                }
            }
            Stmt::For(s) => {
                let mut scope = HashSet::new();
                if let Some(ForInit::VarDecl(v)) = &s.init {
                    var_decl_names(v, &mut scope);
                }
                self.scopes.push(scope);
                match &mut s.init {
                    Some(ForInit::VarDecl(v)) => self.var_decl(v),
                    Some(ForInit::Expr(e)) => self.expr(e),
                    None => {}
                }
                if let Some(test) = &mut s.test {
                    self.expr(test);
                }
                if let Some(update) = &mut s.update {
                    self.expr(update);
                }
                self.stmt(&mut s.body);
                self.scopes.pop();
            }
            Stmt::ForIn(s) => {
                self.expr(&mut s.right);
                self.for_body(&mut s.left, &mut s.body);
            }
            Stmt::ForOf(s) => {
                self.expr(&mut s.right);
                self.for_body(&mut s.left, &mut s.body);
            }
            Stmt::While(s) => {
                self.expr(&mut s.test);
                self.stmt(&mut s.body);
            }
            Stmt::DoWhile(s) => {
                self.stmt(&mut s.body);
                self.expr(&mut s.test);
            }
            Stmt::Switch(s) => {
                self.expr(&mut s.discriminant);
                let mut scope = HashSet::new();
                for case in &s.cases {
                    lexical_names(&case.cons, &mut scope);
                }
                self.scopes.push(scope);
                for case in &mut s.cases {
                    if let Some(test) = &mut case.test {
                        self.expr(test);
                    }
                    for stmt in &mut case.cons {
                        self.stmt(stmt);
                    }
                }
                self.scopes.pop();
            }
            Stmt::Try(s) => {
                self.block(&mut s.block);
                if let Some(handler) = &mut s.handler {
                    let mut scope = HashSet::new();
                    if let Some(param) = &handler.param {
                        pat_names(param, &mut scope);
                    }
                    self.scopes.push(scope);
                    if let Some(param) = &mut handler.param {
                        self.pat(param);
                    }
                    self.block(&mut handler.body);
                    self.scopes.pop();
                }
                if let Some(finalizer) = &mut s.finalizer {
                    self.block(finalizer);
                }
            }
            Stmt::Block(b) => self.block(b),
            Stmt::Return(r) => {
                if let Some(arg) = &mut r.arg {
                    self.expr(arg);
                }
            }
            Stmt::Throw(t) => self.expr(&mut t.arg),
            Stmt::Labeled(l) => self.stmt(&mut l.body),
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty(_) | Stmt::Opaque(_) => {}
        }
    }

    fn for_body(&mut self, head: &mut ForHead, body: &mut Stmt) {
        let mut scope = HashSet::new();
        if let ForHead::VarDecl(v) = head {
            var_decl_names(v, &mut scope);
        }
        self.scopes.push(scope);
        match head {
            ForHead::VarDecl(v) => self.var_decl(v),
            ForHead::Expr(e) => self.expr(e),
        }
        self.stmt(body);
        self.scopes.pop();
    }

    fn var_decl(&mut self, decl: &mut VarDecl) {
        for declarator in &mut decl.decls {
            self.pat(&mut declarator.name);
            if let Some(init) = &mut declarator.init {
                self.expr(init);
            }
        }
    }

    /// Patterns bind names; only their defaults and computed keys are
    /// expressions.
    fn pat(&mut self, pat: &mut Pat) {
        match pat {
            Pat::Ident(_) => {}
            Pat::Array(a) => {
                for elem in a.elems.iter_mut().flatten() {
                    self.pat(&mut elem.pat);
                    if let Some(default) = &mut elem.default {
                        self.expr(default);
                    }
                }
                if let Some(rest) = &mut a.rest {
                    self.pat(rest);
                }
            }
            Pat::Object(o) => {
                for prop in &mut o.props {
                    if let PropName::Computed(key) = &mut prop.key {
                        self.expr(key);
                    }
                    if let Some(value) = &mut prop.value {
                        self.pat(value);
                    }
                    if let Some(default) = &mut prop.default {
                        self.expr(default);
                    }
                }
            }
        }
    }

    fn params_scope(params: &[Param]) -> HashSet<String> {
        let mut scope = HashSet::new();
        for param in params {
            pat_names(&param.pat, &mut scope);
        }
        scope
    }

    fn params(&mut self, params: &mut [Param]) {
        for param in params {
            self.pat(&mut param.pat);
            if let Some(default) = &mut param.default {
                self.expr(default);
            }
        }
    }

    /// A function body is its own scope holding the function's own name
    /// (for expressions), its parameters and every `var` inside it.
    fn function(&mut self, function: &mut Function, own_name: Option<&Ident>) {
        let mut scope = Self::params_scope(&function.params);
        if let Some(name) = own_name {
            scope.insert(name.sym.clone());
        }
        if let Some(body) = &function.body {
            var_names_deep(&body.stmts, &mut scope);
        }
        self.scopes.push(scope);
        self.this_depth += 1;
        self.params(&mut function.params);
        if let Some(body) = &mut function.body {
            self.block(body);
        }
        self.this_depth -= 1;
        self.scopes.pop();
    }

    fn class(&mut self, class: &mut ClassDecl) {
        if let Some(base) = &mut class.super_class {
            self.expr(base);
        }
        self.this_depth += 1;
        for member in &mut class.body {
            match member {
                ClassMember::Field(f) => {
                    if let Some(value) = &mut f.value {
                        self.expr(value);
                    }
                }
                ClassMember::Method(m) => self.function(&mut m.function, None),
                ClassMember::Constructor(c) => {
                    let scope = Self::params_scope(&c.params);
                    self.scopes.push(scope);
                    self.params(&mut c.params);
                    if let Some(body) = &mut c.body {
                        self.block(body);
                    }
                    self.scopes.pop();
                }
            }
        }
        self.this_depth -= 1;
    }

    fn args(&mut self, args: &mut [ExprOrSpread]) {
        for arg in args {
            self.expr(&mut arg.expr);
        }
    }

    pub fn expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Ident(ident) => {
                if let Some(access) = self.rewrite_ident(ident) {
                    *expr = access;
                }
            }
            Expr::Yield(y) => {
                let resumed = match &self.resume {
                    Some((starting, param)) if starting == y => Some(param.clone()),
                    _ => None,
                };
                match resumed {
                    Some(param) => {
                        let span = y.span.clone();
                        *expr = Expr::Ident(Ident::new(param, span));
                    }
                    None => {
                        if let Some(arg) = &mut y.arg {
                            self.expr(arg);
                        }
                    }
                }
            }
            Expr::This(_) | Expr::Lit(_) => {}
            Expr::Tpl(t) => t.exprs.iter_mut().for_each(|e| self.expr(e)),
            Expr::Unary(u) => self.expr(&mut u.arg),
            Expr::Update(u) => self.expr(&mut u.arg),
            Expr::Bin(b) => {
                self.expr(&mut b.left);
                self.expr(&mut b.right);
            }
            Expr::Assign(a) => {
                self.expr(&mut a.left);
                self.expr(&mut a.right);
            }
            Expr::Cond(c) => {
                self.expr(&mut c.test);
                self.expr(&mut c.cons);
                self.expr(&mut c.alt);
            }
            Expr::Call(c) => {
                self.expr(&mut c.callee);
                self.args(&mut c.args);
            }
            Expr::New(n) => {
                self.expr(&mut n.callee);
                self.args(&mut n.args);
            }
            Expr::Member(m) => {
                self.expr(&mut m.obj);
                if let MemberProp::Computed(prop) = &mut m.prop {
                    self.expr(prop);
                }
            }
            Expr::Array(a) => {
                for elem in a.elems.iter_mut().flatten() {
                    self.expr(&mut elem.expr);
                }
            }
            Expr::Object(o) => {
                for prop in &mut o.props {
                    self.object_prop(prop);
                }
            }
            Expr::Fn(f) => {
                let own_name = f.ident.clone();
                self.function(&mut f.function, own_name.as_ref());
            }
            Expr::Arrow(a) => {
                let scope = Self::params_scope(&a.params);
                self.scopes.push(scope);
                self.params(&mut a.params);
                match &mut a.body {
                    ArrowBody::Expr(body) => self.expr(body),
                    ArrowBody::Block(body) => {
                        let mut vars = HashSet::new();
                        var_names_deep(&body.stmts, &mut vars);
                        self.scopes.push(vars);
                        self.block(body);
                        self.scopes.pop();
                    }
                }
                self.scopes.pop();
            }
            Expr::Seq(s) => s.exprs.iter_mut().for_each(|e| self.expr(e)),
            Expr::Paren(p) => self.expr(&mut p.expr),
            Expr::Await(a) => self.expr(&mut a.arg),
            Expr::As(a) => self.expr(&mut a.expr),
            Expr::NonNull(n) => self.expr(&mut n.expr),
        }
    }

    fn object_prop(&mut self, prop: &mut PropOrSpread) {
        match prop {
            PropOrSpread::Prop(Prop::Shorthand(ident)) => {
                // `{ total }` keeps its key and reads the state entry
                if let Some(value) = self.rewrite_ident(ident) {
                    let key = PropName::Ident(ident.clone());
                    let span = ident.span.clone();
                    *prop = PropOrSpread::Prop(Prop::KeyValue(KeyValueProp { key, value, span }));
                }
            }
            PropOrSpread::Prop(Prop::KeyValue(kv)) => {
                if let PropName::Computed(key) = &mut kv.key {
                    self.expr(key);
                }
                self.expr(&mut kv.value);
            }
            PropOrSpread::Spread(s) => self.expr(&mut s.expr),
        }
    }
}

fn pat_names(pat: &Pat, out: &mut HashSet<String>) {
    match pat {
        Pat::Ident(i) => {
            out.insert(i.sym.clone());
        }
        Pat::Array(a) => {
            for elem in a.elems.iter().flatten() {
                pat_names(&elem.pat, out);
            }
            if let Some(rest) = &a.rest {
                pat_names(rest, out);
            }
        }
        Pat::Object(o) => {
            for prop in &o.props {
                match (&prop.value, &prop.key) {
                    (Some(value), _) => pat_names(value, out),
                    (None, PropName::Ident(key)) => {
                        out.insert(key.sym.clone());
                    }
                    (None, _) => {}
                }
            }
            if let Some(rest) = &o.rest {
                out.insert(rest.sym.clone());
            }
        }
    }
}

fn var_decl_names(decl: &VarDecl, out: &mut HashSet<String>) {
    for declarator in &decl.decls {
        pat_names(&declarator.name, out);
    }
}

/// Names declared directly in a statement list.
fn lexical_names(stmts: &[Stmt], out: &mut HashSet<String>) {
    for stmt in stmts {
        match stmt {
            Stmt::VarDecl(v) => var_decl_names(v, out),
            Stmt::FnDecl(f) => {
                out.insert(f.ident.sym.clone());
            }
            Stmt::ClassDecl(c) => {
                out.insert(c.ident.sym.clone());
            }
            _ => {}
        }
    }
}

/// Every `var` binding in a function body, nested blocks included.
fn var_names_deep(stmts: &[Stmt], out: &mut HashSet<String>) {
    for stmt in stmts {
        var_names_in(stmt, out);
    }
}

fn var_names_in(stmt: &Stmt, out: &mut HashSet<String>) {
    let var_decl = |decl: &VarDecl, out: &mut HashSet<String>| {
        if decl.kind == VarDeclKind::Var {
            var_decl_names(decl, out);
        }
    };
    match stmt {
        Stmt::VarDecl(v) => var_decl(v, out),
        Stmt::If(s) => {
            var_names_in(&s.cons, out);
            if let Some(alt) = &s.alt {
                var_names_in(alt, out);
            }
        }
        Stmt::For(s) => {
            if let Some(ForInit::VarDecl(v)) = &s.init {
                var_decl(v, out);
            }
            var_names_in(&s.body, out);
        }
        Stmt::ForIn(ForInStmt { left, body, .. }) | Stmt::ForOf(ForOfStmt { left, body, .. }) => {
            if let ForHead::VarDecl(v) = left {
                var_decl(v, out);
            }
            var_names_in(body, out);
        }
        Stmt::While(s) => var_names_in(&s.body, out),
        Stmt::DoWhile(s) => var_names_in(&s.body, out),
        Stmt::Switch(s) => {
            for case in &s.cases {
                var_names_deep(&case.cons, out);
            }
        }
        Stmt::Try(s) => {
            var_names_deep(&s.block.stmts, out);
            if let Some(handler) = &s.handler {
                var_names_deep(&handler.body.stmts, out);
            }
            if let Some(finalizer) = &s.finalizer {
                var_names_deep(&finalizer.stmts, out);
            }
        }
        Stmt::Block(b) => var_names_deep(&b.stmts, out),
        Stmt::Labeled(l) => var_names_in(&l.body, out),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_ast::print::{expr_to_string, stmt_to_string};
    use stepwise_parser::{parse_expression, parse_module};

    fn rewrite_expr(names: &[&str], src: &str) -> String {
        let mut expr = parse_expression(src).unwrap();
        let mut replacer = Replacer::new(names.iter().copied());
        replacer.expr(&mut expr);
        expr_to_string(&expr)
    }

    fn rewrite_stmt(names: &[&str], src: &str) -> String {
        let mut stmts = parse_module(src).unwrap().body;
        let mut replacer = Replacer::new(names.iter().copied());
        replacer.stmts(&mut stmts);
        stmts.iter().map(stmt_to_string).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn rewrites_plain_references() {
        assert_eq!(
            rewrite_expr(&["a", "b"], "a + b * c"),
            "this.state.a + this.state.b * c"
        );
        assert_eq!(rewrite_expr(&["n"], "n++"), "this.state.n++");
        assert_eq!(rewrite_expr(&["n"], "n += f(n)"), "this.state.n += f(this.state.n)");
    }

    #[test]
    fn member_properties_and_keys_are_untouched() {
        assert_eq!(rewrite_expr(&["a"], "o.a"), "o.a");
        assert_eq!(rewrite_expr(&["a"], "o[a]"), "o[this.state.a]");
        assert_eq!(rewrite_expr(&["a"], "{ a: 1 }"), "{ a: 1 }");
        assert_eq!(rewrite_expr(&["a"], "{ [a]: a }"), "{ [this.state.a]: this.state.a }");
    }

    #[test]
    fn shorthand_keeps_its_key() {
        assert_eq!(rewrite_expr(&["a"], "{ a, b }"), "{ a: this.state.a, b }");
    }

    #[test]
    fn nested_functions_shadow() {
        assert_eq!(rewrite_expr(&["a"], "(a) => a + 1"), "(a) => a + 1");
        assert_eq!(rewrite_expr(&["a", "b"], "(x) => a + x"), "(x) => this.state.a + x");
        assert_eq!(
            rewrite_expr(&["a"], "function (b) {\n  var a = b;\n  return a;\n}"),
            "function(b) {\n  var a = b;\n  return a;\n}"
        );
        assert_eq!(
            rewrite_expr(&["a"], "function a() {\n  return a;\n}"),
            "function a() {\n  return a;\n}"
        );
    }

    #[test]
    fn function_bodies_are_not_reached() {
        let mut expr = parse_expression("xs.forEach(function (x) {\n  total += x;\n})").unwrap();
        let mut replacer = Replacer::new(["xs", "total"]);
        replacer.expr(&mut expr);
        assert_eq!(
            expr_to_string(&expr),
            "this.state.xs.forEach(function(x) {\n  total += x;\n})"
        );
        assert_eq!(replacer.escaped().map(|i| i.sym.as_str()), Some("total"));
        assert_eq!(replacer.rewritten(), 1);
    }

    #[test]
    fn arrows_keep_the_outer_this() {
        let mut expr = parse_expression("xs.forEach((x) => {\n  total += x;\n})").unwrap();
        let mut replacer = Replacer::new(["xs", "total"]);
        replacer.expr(&mut expr);
        assert_eq!(
            expr_to_string(&expr),
            "this.state.xs.forEach((x) => {\n  this.state.total += x;\n})"
        );
        assert!(replacer.escaped().is_none());
    }

    #[test]
    fn class_methods_are_not_reached() {
        let mut stmts = parse_module("if (ok) {\n  class K {\n    m() {\n      return total;\n    }\n  }\n}")
            .unwrap()
            .body;
        let mut replacer = Replacer::new(["ok", "total"]);
        replacer.stmts(&mut stmts);
        assert!(stmt_to_string(&stmts[0]).starts_with("if (this.state.ok) {"));
        assert!(stmt_to_string(&stmts[0]).contains("return total;"));
        assert_eq!(replacer.escaped().map(|i| i.sym.as_str()), Some("total"));
    }

    #[test]
    fn block_and_catch_bindings_shadow() {
        let out = rewrite_stmt(
            &["e", "i", "total"],
            "try {\n  f();\n} catch (e) {\n  total = e;\n}\nfor (let i = 0; i < 3; i++) total += i;\n{\n  const total = 1;\n  g(total);\n}",
        );
        assert_eq!(
            out,
            "try {\n  f();\n} catch (e) {\n  this.state.total = e;\n}\nfor (let i = 0; i < 3; i++) this.state.total += i;\n{\n  const total = 1;\n  g(total);\n}"
        );
    }

    #[test]
    fn for_of_target_is_rewritten() {
        assert_eq!(
            rewrite_stmt(&["x"], "for (x of xs) log(x);"),
            "for (this.state.x of xs) log(this.state.x);"
        );
    }

    #[test]
    fn starting_yield_becomes_resume_value() {
        let mut stmts = parse_module("yield 1;\nyield 2;").unwrap().body;
        let Stmt::ExprStmt(first) = &stmts[0] else {
            panic!("expected expression statement");
        };
        let Expr::Yield(y) = &first.expr else {
            panic!("expected yield");
        };
        let mut replacer = Replacer::new(Vec::<String>::new());
        replacer.set_resume(Some(y.clone()), "value");
        replacer.stmts(&mut stmts);
        assert_eq!(stmt_to_string(&stmts[0]), "value;");
        assert_eq!(stmt_to_string(&stmts[1]), "yield 2;");
    }

    #[test]
    fn counts_rewrites() {
        let mut expr = parse_expression("a + a + b").unwrap();
        let mut replacer = Replacer::new(["a"]);
        replacer.expr(&mut expr);
        assert_eq!(replacer.rewritten(), 2);
    }
}
