//! Source printer for the stepwise AST.
//!
//! Output uses two-space indentation and inserts parentheses only where
//! operator precedence requires them, so printed code parses back to the
//! same tree shape.

use crate::*;

/// Render a whole module, one top-level item per line.
pub fn module_to_string(module: &Module) -> String {
    let mut p = Printer::new();
    for (i, stmt) in module.body.iter().enumerate() {
        if i > 0 {
            p.newline();
        }
        p.stmt(stmt);
    }
    let mut out = p.finish();
    out.push('\n');
    out
}

pub fn stmt_to_string(stmt: &Stmt) -> String {
    let mut p = Printer::new();
    p.stmt(stmt);
    p.finish()
}

pub fn expr_to_string(expr: &Expr) -> String {
    let mut p = Printer::new();
    p.expr(expr);
    p.finish()
}

pub fn type_to_string(ty: &TsType) -> String {
    let mut p = Printer::new();
    p.ty(ty);
    p.finish()
}

pub fn class_to_string(class: &ClassDecl) -> String {
    let mut p = Printer::new();
    p.class(class);
    p.finish()
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::EqEq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::EqEqEq => "===",
            BinaryOp::NotEqEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Exp => "**",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::NullishCoalesce => "??",
            BinaryOp::BitwiseAnd => "&",
            BinaryOp::BitwiseOr => "|",
            BinaryOp::BitwiseXor => "^",
            BinaryOp::LShift => "<<",
            BinaryOp::RShift => ">>",
            BinaryOp::URShift => ">>>",
            BinaryOp::In => "in",
            BinaryOp::InstanceOf => "instanceof",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or | BinaryOp::NullishCoalesce => 4,
            BinaryOp::And => 5,
            BinaryOp::BitwiseOr => 6,
            BinaryOp::BitwiseXor => 7,
            BinaryOp::BitwiseAnd => 8,
            BinaryOp::EqEq | BinaryOp::NotEq | BinaryOp::EqEqEq | BinaryOp::NotEqEq => 9,
            BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq
            | BinaryOp::In
            | BinaryOp::InstanceOf => 10,
            BinaryOp::LShift | BinaryOp::RShift | BinaryOp::URShift => 11,
            BinaryOp::Plus | BinaryOp::Minus => 12,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 13,
            BinaryOp::Exp => 14,
        }
    }

    fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Eq => "=",
            AssignOp::PlusEq => "+=",
            AssignOp::MinusEq => "-=",
            AssignOp::MulEq => "*=",
            AssignOp::DivEq => "/=",
            AssignOp::ModEq => "%=",
            AssignOp::ExpEq => "**=",
            AssignOp::LShiftEq => "<<=",
            AssignOp::RShiftEq => ">>=",
            AssignOp::URShiftEq => ">>>=",
            AssignOp::BitAndEq => "&=",
            AssignOp::BitOrEq => "|=",
            AssignOp::BitXorEq => "^=",
            AssignOp::AndEq => "&&=",
            AssignOp::OrEq => "||=",
            AssignOp::NullishEq => "??=",
        }
    }
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitwiseNot => "~",
            UnaryOp::TypeOf => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
        }
    }
}

impl VarDeclKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarDeclKind::Var => "var",
            VarDeclKind::Let => "let",
            VarDeclKind::Const => "const",
        }
    }
}

fn expr_precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Seq(_) => 1,
        Expr::Assign(_) | Expr::Arrow(_) | Expr::Yield(_) => 2,
        Expr::Cond(_) => 3,
        Expr::Bin(b) => b.op.precedence(),
        Expr::As(_) => 10,
        Expr::Unary(_) | Expr::Await(_) => 15,
        Expr::Update(u) if u.prefix => 15,
        Expr::Update(_) => 16,
        Expr::Call(_) | Expr::New(_) | Expr::Member(_) | Expr::NonNull(_) => 18,
        _ => 19,
    }
}

/// True if the expression's head (the leftmost member/call chain) contains a
/// call, which would be captured by an enclosing `new`.
fn has_call_head(expr: &Expr) -> bool {
    match expr {
        Expr::Call(_) => true,
        Expr::Member(m) => has_call_head(&m.obj),
        Expr::NonNull(n) => has_call_head(&n.expr),
        _ => false,
    }
}

/// Format a number the way JavaScript's `String(n)` would for common values.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if value == value.trunc() && value.abs() < 1e21 {
        if value == 0.0 {
            "0".to_string()
        } else {
            format!("{}", value as i128)
        }
    } else {
        format!("{}", value)
    }
}

/// Quote a string as a double-quoted JavaScript literal.
pub fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Indenting source writer.
#[derive(Debug, Default)]
pub struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn write(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn comma_list<T>(&mut self, items: &[T], mut each: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            each(self, item);
        }
    }

    // ---- statements -------------------------------------------------------

    pub fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FnDecl(f) => self.function(Some(&f.ident), &f.function),
            Stmt::ClassDecl(c) => self.class(c),
            Stmt::VarDecl(v) => {
                self.var_decl(v);
                self.write(";");
            }
            Stmt::Export(e) => {
                self.write(if e.is_default {
                    "export default "
                } else {
                    "export "
                });
                self.stmt(&e.decl);
            }
            Stmt::ExprStmt(s) => {
                let mut inner = Printer {
                    out: String::new(),
                    indent: self.indent,
                };
                inner.expr(&s.expr);
                let text = inner.finish();
                let needs_paren = text.starts_with('{')
                    || text.starts_with("function")
                    || text.starts_with("async function")
                    || text.starts_with("class ")
                    || text.starts_with("let [");
                if needs_paren {
                    self.write("(");
                    self.write(&text);
                    self.write(");");
                } else {
                    self.write(&text);
                    self.write(";");
                }
            }
            Stmt::If(s) => {
                self.write("if (");
                self.expr(&s.test);
                self.write(") ");
                let dangling = s.alt.is_some() && matches!(&*s.cons, Stmt::If(inner) if inner.alt.is_none());
                if dangling {
                    self.block_of(std::slice::from_ref(&*s.cons));
                } else {
                    self.stmt(&s.cons);
                }
                if let Some(alt) = &s.alt {
                    if matches!(&*s.cons, Stmt::Block(_)) || dangling {
                        self.write(" else ");
                    } else {
                        self.newline();
                        self.write("else ");
                    }
                    self.stmt(alt);
                }
            }
            Stmt::For(s) => {
                self.write("for (");
                match &s.init {
                    Some(ForInit::VarDecl(v)) => self.var_decl(v),
                    Some(ForInit::Expr(e)) => self.expr(e),
                    None => {}
                }
                self.write(";");
                if let Some(test) = &s.test {
                    self.write(" ");
                    self.expr(test);
                }
                self.write(";");
                if let Some(update) = &s.update {
                    self.write(" ");
                    self.expr(update);
                }
                self.write(") ");
                self.stmt(&s.body);
            }
            Stmt::ForIn(s) => {
                self.write("for (");
                self.for_head(&s.left);
                self.write(" in ");
                self.expr(&s.right);
                self.write(") ");
                self.stmt(&s.body);
            }
            Stmt::ForOf(s) => {
                self.write(if s.is_await { "for await (" } else { "for (" });
                self.for_head(&s.left);
                self.write(" of ");
                self.expr_prec(&s.right, 2);
                self.write(") ");
                self.stmt(&s.body);
            }
            Stmt::While(s) => {
                self.write("while (");
                self.expr(&s.test);
                self.write(") ");
                self.stmt(&s.body);
            }
            Stmt::DoWhile(s) => {
                self.write("do ");
                self.stmt(&s.body);
                self.write(" while (");
                self.expr(&s.test);
                self.write(");");
            }
            Stmt::Switch(s) => {
                self.write("switch (");
                self.expr(&s.discriminant);
                self.write(") {");
                self.indent += 1;
                for case in &s.cases {
                    self.newline();
                    match &case.test {
                        Some(test) => {
                            self.write("case ");
                            self.expr(test);
                            self.write(":");
                        }
                        None => self.write("default:"),
                    }
                    if let [Stmt::Block(b)] = case.cons.as_slice() {
                        self.write(" ");
                        self.block(b);
                    } else {
                        self.indent += 1;
                        for stmt in &case.cons {
                            self.newline();
                            self.stmt(stmt);
                        }
                        self.indent -= 1;
                    }
                }
                self.indent -= 1;
                self.newline();
                self.write("}");
            }
            Stmt::Try(s) => {
                self.write("try ");
                self.block(&s.block);
                if let Some(handler) = &s.handler {
                    self.write(" catch ");
                    if let Some(param) = &handler.param {
                        self.write("(");
                        self.pat(param);
                        if let Some(ty) = &handler.ty {
                            self.write(": ");
                            self.ty(ty);
                        }
                        self.write(") ");
                    }
                    self.block(&handler.body);
                }
                if let Some(finalizer) = &s.finalizer {
                    self.write(" finally ");
                    self.block(finalizer);
                }
            }
            Stmt::Block(b) => self.block(b),
            Stmt::Return(s) => match &s.arg {
                Some(arg) => {
                    self.write("return ");
                    self.expr(arg);
                    self.write(";");
                }
                None => self.write("return;"),
            },
            Stmt::Break(s) => match &s.label {
                Some(label) => {
                    self.write("break ");
                    self.write(&label.sym);
                    self.write(";");
                }
                None => self.write("break;"),
            },
            Stmt::Continue(s) => match &s.label {
                Some(label) => {
                    self.write("continue ");
                    self.write(&label.sym);
                    self.write(";");
                }
                None => self.write("continue;"),
            },
            Stmt::Throw(s) => {
                self.write("throw ");
                self.expr(&s.arg);
                self.write(";");
            }
            Stmt::Labeled(s) => {
                self.write(&s.label.sym);
                self.write(": ");
                self.stmt(&s.body);
            }
            Stmt::Empty(_) => self.write(";"),
            Stmt::Opaque(o) => self.write(o.text.trim_end()),
        }
    }

    fn block_of(&mut self, stmts: &[Stmt]) {
        if stmts.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{");
        self.indent += 1;
        for stmt in stmts {
            self.newline();
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.newline();
        self.write("}");
    }

    pub fn block(&mut self, block: &BlockStmt) {
        self.block_of(&block.stmts);
    }

    fn var_decl(&mut self, v: &VarDecl) {
        self.write(v.kind.as_str());
        self.write(" ");
        self.comma_list(&v.decls, |p, d| {
            p.pat(&d.name);
            if let Some(ty) = &d.ty {
                p.write(": ");
                p.ty(ty);
            }
            if let Some(init) = &d.init {
                p.write(" = ");
                p.expr_prec(init, 2);
            }
        });
    }

    fn for_head(&mut self, head: &ForHead) {
        match head {
            ForHead::VarDecl(v) => self.var_decl(v),
            ForHead::Expr(e) => self.expr_prec(e, 18),
        }
    }

    fn function(&mut self, name: Option<&Ident>, f: &Function) {
        if f.is_async {
            self.write("async ");
        }
        self.write("function");
        if f.is_generator {
            self.write("*");
        }
        if let Some(name) = name {
            self.write(" ");
            self.write(&name.sym);
        }
        self.signature(f);
    }

    fn signature(&mut self, f: &Function) {
        self.type_params(&f.type_params);
        self.params(&f.params);
        if let Some(ret) = &f.return_type {
            self.write(": ");
            self.ty(ret);
        }
        match &f.body {
            Some(body) => {
                self.write(" ");
                self.block(body);
            }
            None => self.write(";"),
        }
    }

    fn type_params(&mut self, params: &[TsTypeParam]) {
        if params.is_empty() {
            return;
        }
        self.write("<");
        self.comma_list(params, |p, tp| {
            p.write(&tp.ident.sym);
            if let Some(c) = &tp.constraint {
                p.write(" extends ");
                p.ty(c);
            }
            if let Some(d) = &tp.default {
                p.write(" = ");
                p.ty(d);
            }
        });
        self.write(">");
    }

    pub fn params(&mut self, params: &[Param]) {
        self.write("(");
        self.comma_list(params, |p, param| p.param(param));
        self.write(")");
    }

    pub fn param(&mut self, param: &Param) {
        if param.rest {
            self.write("...");
        }
        self.pat(&param.pat);
        if param.optional {
            self.write("?");
        }
        if let Some(ty) = &param.ty {
            self.write(": ");
            self.ty(ty);
        }
        if let Some(default) = &param.default {
            self.write(" = ");
            self.expr_prec(default, 2);
        }
    }

    pub fn pat(&mut self, pat: &Pat) {
        match pat {
            Pat::Ident(i) => self.write(&i.sym),
            Pat::Array(a) => {
                self.write("[");
                for (i, elem) in a.elems.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    if let Some(elem) = elem {
                        self.pat(&elem.pat);
                        if let Some(default) = &elem.default {
                            self.write(" = ");
                            self.expr_prec(default, 2);
                        }
                    }
                }
                if matches!(a.elems.last(), Some(None)) && a.rest.is_none() {
                    self.write(",");
                }
                if let Some(rest) = &a.rest {
                    if !a.elems.is_empty() {
                        self.write(", ");
                    }
                    self.write("...");
                    self.pat(rest);
                }
                self.write("]");
            }
            Pat::Object(o) => {
                if o.props.is_empty() && o.rest.is_none() {
                    self.write("{}");
                    return;
                }
                self.write("{ ");
                self.comma_list(&o.props, |p, prop| {
                    p.prop_name(&prop.key);
                    if let Some(value) = &prop.value {
                        p.write(": ");
                        p.pat(value);
                    }
                    if let Some(default) = &prop.default {
                        p.write(" = ");
                        p.expr_prec(default, 2);
                    }
                });
                if let Some(rest) = &o.rest {
                    if !o.props.is_empty() {
                        self.write(", ");
                    }
                    self.write("...");
                    self.write(&rest.sym);
                }
                self.write(" }");
            }
        }
    }

    // ---- classes ----------------------------------------------------------

    pub fn class(&mut self, class: &ClassDecl) {
        self.write("class ");
        self.write(&class.ident.sym);
        self.type_params(&class.type_params);
        if let Some(sup) = &class.super_class {
            self.write(" extends ");
            self.expr_prec(sup, 18);
        }
        if !class.implements.is_empty() {
            self.write(" implements ");
            self.comma_list(&class.implements, |p, t| p.ty(t));
        }
        if class.body.is_empty() {
            self.write(" {}");
            return;
        }
        self.write(" {");
        self.indent += 1;
        for member in &class.body {
            self.newline();
            self.class_member(member);
        }
        self.indent -= 1;
        self.newline();
        self.write("}");
    }

    fn accessibility(&mut self, acc: Option<Accessibility>) {
        match acc {
            Some(Accessibility::Public) => self.write("public "),
            Some(Accessibility::Private) => self.write("private "),
            Some(Accessibility::Protected) => self.write("protected "),
            None => {}
        }
    }

    fn class_member(&mut self, member: &ClassMember) {
        match member {
            ClassMember::Field(f) => {
                self.accessibility(f.accessibility);
                if f.is_static {
                    self.write("static ");
                }
                if f.readonly {
                    self.write("readonly ");
                }
                self.write(&f.ident.sym);
                if f.optional {
                    self.write("?");
                }
                if let Some(ty) = &f.ty {
                    self.write(": ");
                    self.ty(ty);
                }
                if let Some(value) = &f.value {
                    self.write(" = ");
                    self.expr_prec(value, 2);
                }
                self.write(";");
            }
            ClassMember::Constructor(c) => {
                self.accessibility(c.accessibility);
                self.write("constructor");
                self.params(&c.params);
                match &c.body {
                    Some(body) => {
                        self.write(" ");
                        self.block(body);
                    }
                    None => self.write(";"),
                }
            }
            ClassMember::Method(m) => {
                self.accessibility(m.accessibility);
                if m.is_static {
                    self.write("static ");
                }
                match m.kind {
                    MethodKind::Getter => self.write("get "),
                    MethodKind::Setter => self.write("set "),
                    MethodKind::Method => {}
                }
                if m.function.is_async {
                    self.write("async ");
                }
                if m.function.is_generator {
                    self.write("*");
                }
                self.write(&m.ident.sym);
                self.signature(&m.function);
            }
        }
    }

    // ---- expressions ------------------------------------------------------

    pub fn expr(&mut self, expr: &Expr) {
        self.expr_prec(expr, 0);
    }

    /// Print `expr`, parenthesized if it binds looser than `min`.
    fn expr_prec(&mut self, expr: &Expr, min: u8) {
        if expr_precedence(expr) < min {
            self.write("(");
            self.expr_inner(expr);
            self.write(")");
        } else {
            self.expr_inner(expr);
        }
    }

    fn bin_operand(&mut self, operand: &Expr, parent: BinaryOp, min: u8) {
        // `??` may not be mixed with `&&`/`||` without parentheses.
        let mixes = match operand {
            Expr::Bin(b) => {
                (parent == BinaryOp::NullishCoalesce && b.op.is_logical())
                    || (parent.is_logical() && b.op == BinaryOp::NullishCoalesce)
            }
            _ => false,
        };
        if mixes {
            self.write("(");
            self.expr_inner(operand);
            self.write(")");
        } else {
            self.expr_prec(operand, min);
        }
    }

    fn args(&mut self, args: &[ExprOrSpread]) {
        self.write("(");
        self.comma_list(args, |p, arg| {
            if arg.spread {
                p.write("...");
            }
            p.expr_prec(&arg.expr, 2);
        });
        self.write(")");
    }

    fn prop_name(&mut self, key: &PropName) {
        match key {
            PropName::Ident(i) => self.write(&i.sym),
            PropName::Str(s) => self.write(&quote_str(s)),
            PropName::Num(raw) => self.write(raw),
            PropName::Computed(e) => {
                self.write("[");
                self.expr_prec(e, 2);
                self.write("]");
            }
        }
    }

    fn expr_inner(&mut self, expr: &Expr) {
        match expr {
            Expr::This(_) => self.write("this"),
            Expr::Ident(i) => self.write(&i.sym),
            Expr::Lit(l) => self.lit(&l.kind),
            Expr::Tpl(t) => {
                self.write("`");
                for (i, quasi) in t.quasis.iter().enumerate() {
                    self.write(quasi);
                    if let Some(e) = t.exprs.get(i) {
                        self.write("${");
                        self.expr(e);
                        self.write("}");
                    }
                }
                self.write("`");
            }
            Expr::Unary(u) => {
                self.write(u.op.as_str());
                let mut inner = Printer {
                    out: String::new(),
                    indent: self.indent,
                };
                inner.expr_prec(&u.arg, 15);
                let text = inner.finish();
                let needs_space = match u.op {
                    UnaryOp::TypeOf | UnaryOp::Void | UnaryOp::Delete => true,
                    UnaryOp::Plus => text.starts_with('+'),
                    UnaryOp::Minus => text.starts_with('-'),
                    _ => false,
                };
                if needs_space {
                    self.write(" ");
                }
                self.write(&text);
            }
            Expr::Update(u) => {
                let op = match u.op {
                    UpdateOp::Inc => "++",
                    UpdateOp::Dec => "--",
                };
                if u.prefix {
                    self.write(op);
                    self.expr_prec(&u.arg, 16);
                } else {
                    self.expr_prec(&u.arg, 17);
                    self.write(op);
                }
            }
            Expr::Bin(b) => {
                let prec = b.op.precedence();
                if b.op == BinaryOp::Exp {
                    // unary operands on the left of `**` are a syntax error
                    self.bin_operand(&b.left, b.op, 16);
                    self.write(" ** ");
                    self.bin_operand(&b.right, b.op, prec);
                } else {
                    self.bin_operand(&b.left, b.op, prec);
                    self.write(" ");
                    self.write(b.op.as_str());
                    self.write(" ");
                    self.bin_operand(&b.right, b.op, prec + 1);
                }
            }
            Expr::Assign(a) => {
                self.expr_prec(&a.left, 17);
                self.write(" ");
                self.write(a.op.as_str());
                self.write(" ");
                self.expr_prec(&a.right, 2);
            }
            Expr::Cond(c) => {
                self.expr_prec(&c.test, 4);
                self.write(" ? ");
                self.expr_prec(&c.cons, 2);
                self.write(" : ");
                self.expr_prec(&c.alt, 2);
            }
            Expr::Call(c) => {
                match c.callee.as_ref() {
                    Expr::Fn(_) => {
                        self.write("(");
                        self.expr_inner(&c.callee);
                        self.write(")");
                    }
                    callee => self.expr_prec(callee, 18),
                }
                if c.optional {
                    self.write("?.");
                }
                self.args(&c.args);
            }
            Expr::New(n) => {
                self.write("new ");
                if has_call_head(&n.callee) || expr_precedence(&n.callee) < 18 {
                    self.write("(");
                    self.expr_inner(&n.callee);
                    self.write(")");
                } else {
                    self.expr_inner(&n.callee);
                }
                self.args(&n.args);
            }
            Expr::Member(m) => {
                match m.obj.as_ref() {
                    Expr::Lit(Lit {
                        kind: LitKind::Num { .. },
                        ..
                    })
                    | Expr::Fn(_) => {
                        self.write("(");
                        self.expr_inner(&m.obj);
                        self.write(")");
                    }
                    obj => self.expr_prec(obj, 18),
                }
                match &m.prop {
                    MemberProp::Ident(i) => {
                        self.write(if m.optional { "?." } else { "." });
                        self.write(&i.sym);
                    }
                    MemberProp::Computed(e) => {
                        if m.optional {
                            self.write("?.");
                        }
                        self.write("[");
                        self.expr(e);
                        self.write("]");
                    }
                }
            }
            Expr::Array(a) => {
                self.write("[");
                for (i, elem) in a.elems.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    if let Some(elem) = elem {
                        if elem.spread {
                            self.write("...");
                        }
                        self.expr_prec(&elem.expr, 2);
                    }
                }
                if matches!(a.elems.last(), Some(None)) {
                    self.write(",");
                }
                self.write("]");
            }
            Expr::Object(o) => {
                if o.props.is_empty() {
                    self.write("{}");
                    return;
                }
                self.write("{ ");
                self.comma_list(&o.props, |p, prop| match prop {
                    PropOrSpread::Prop(Prop::Shorthand(i)) => p.write(&i.sym),
                    PropOrSpread::Prop(Prop::KeyValue(kv)) => {
                        p.prop_name(&kv.key);
                        p.write(": ");
                        p.expr_prec(&kv.value, 2);
                    }
                    PropOrSpread::Spread(s) => {
                        p.write("...");
                        p.expr_prec(&s.expr, 2);
                    }
                });
                self.write(" }");
            }
            Expr::Fn(f) => self.function(f.ident.as_ref(), &f.function),
            Expr::Arrow(a) => {
                if a.is_async {
                    self.write("async ");
                }
                self.params(&a.params);
                if let Some(ret) = &a.return_type {
                    self.write(": ");
                    self.ty(ret);
                }
                self.write(" => ");
                match &a.body {
                    ArrowBody::Block(b) => self.block(b),
                    ArrowBody::Expr(e) => {
                        let mut inner = Printer {
                            out: String::new(),
                            indent: self.indent,
                        };
                        inner.expr_prec(e, 2);
                        let text = inner.finish();
                        if text.starts_with('{') {
                            self.write("(");
                            self.write(&text);
                            self.write(")");
                        } else {
                            self.write(&text);
                        }
                    }
                }
            }
            Expr::Seq(s) => {
                self.comma_list(&s.exprs, |p, e| p.expr_prec(e, 2));
            }
            Expr::Paren(p) => {
                self.write("(");
                self.expr(&p.expr);
                self.write(")");
            }
            Expr::Await(a) => {
                self.write("await ");
                self.expr_prec(&a.arg, 15);
            }
            Expr::Yield(y) => {
                self.write(if y.delegate { "yield*" } else { "yield" });
                if let Some(arg) = &y.arg {
                    self.write(" ");
                    self.expr_prec(arg, 2);
                }
            }
            Expr::As(a) => {
                self.expr_prec(&a.expr, 10);
                self.write(" as ");
                self.ty(&a.ty);
            }
            Expr::NonNull(n) => {
                self.expr_prec(&n.expr, 18);
                self.write("!");
            }
        }
    }

    fn lit(&mut self, lit: &LitKind) {
        match lit {
            LitKind::Str(s) => self.write(&quote_str(s)),
            LitKind::Num { value, raw } => {
                if raw.is_empty() {
                    self.write(&format_number(*value));
                } else {
                    self.write(raw);
                }
            }
            LitKind::Bool(true) => self.write("true"),
            LitKind::Bool(false) => self.write("false"),
            LitKind::Null => self.write("null"),
        }
    }

    // ---- types ------------------------------------------------------------

    pub fn ty(&mut self, ty: &TsType) {
        match ty {
            TsType::TsKeywordType(k) => self.write(k.kind.as_str()),
            TsType::TsTypeRef(r) => {
                self.write(&r.type_name);
                if !r.type_args.is_empty() {
                    self.write("<");
                    self.comma_list(&r.type_args, |p, t| p.ty(t));
                    self.write(">");
                }
            }
            TsType::TsArrayType(a) => {
                let wrap = matches!(
                    a.elem_type.as_ref(),
                    TsType::TsUnionType(_)
                        | TsType::TsIntersectionType(_)
                        | TsType::TsFunctionType(_)
                );
                if wrap {
                    self.write("(");
                    self.ty(&a.elem_type);
                    self.write(")");
                } else {
                    self.ty(&a.elem_type);
                }
                self.write("[]");
            }
            TsType::TsUnionType(u) => {
                for (i, t) in u.types.iter().enumerate() {
                    if i > 0 {
                        self.write(" | ");
                    }
                    self.ty_operand(t, matches!(t, TsType::TsFunctionType(_)));
                }
            }
            TsType::TsIntersectionType(u) => {
                for (i, t) in u.types.iter().enumerate() {
                    if i > 0 {
                        self.write(" & ");
                    }
                    let wrap = matches!(t, TsType::TsFunctionType(_) | TsType::TsUnionType(_));
                    self.ty_operand(t, wrap);
                }
            }
            TsType::TsFunctionType(f) => {
                self.params(&f.params);
                self.write(" => ");
                self.ty(&f.return_type);
            }
            TsType::TsTupleType(t) => {
                self.write("[");
                self.comma_list(&t.elem_types, |p, t| p.ty(t));
                self.write("]");
            }
            TsType::TsTypeLit(lit) => {
                if lit.members.is_empty() {
                    self.write("{}");
                    return;
                }
                self.write("{ ");
                for (i, member) in lit.members.iter().enumerate() {
                    if i > 0 {
                        self.write("; ");
                    }
                    match member {
                        TsTypeElement::Property(p) => {
                            if p.readonly {
                                self.write("readonly ");
                            }
                            self.write(&p.key.sym);
                            if p.optional {
                                self.write("?");
                            }
                            if let Some(ty) = &p.ty {
                                self.write(": ");
                                self.ty(ty);
                            }
                        }
                        TsTypeElement::Index(idx) => {
                            if idx.readonly {
                                self.write("readonly ");
                            }
                            self.write("[");
                            self.write(&idx.key_name.sym);
                            self.write(": ");
                            self.ty(&idx.key_type);
                            self.write("]: ");
                            self.ty(&idx.value_type);
                        }
                    }
                }
                self.write(" }");
            }
            TsType::TsLitType(l) => self.lit(&l.lit),
            TsType::TsParenType(p) => {
                self.write("(");
                self.ty(&p.ty);
                self.write(")");
            }
        }
    }

    fn ty_operand(&mut self, ty: &TsType, wrap: bool) {
        if wrap {
            self.write("(");
            self.ty(ty);
            self.write(")");
        } else {
            self.ty(ty);
        }
    }
}
