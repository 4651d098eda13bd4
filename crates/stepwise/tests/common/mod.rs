//! Shared helpers: lower a source file, re-parse the printed class and drive
//! it with a small reference evaluator.
//!
//! The evaluator understands the statement and expression forms the emitted
//! classes (and the generator bodies used in these tests) are made of. An
//! unbound identifier panics, so a reference the lowering forgot to route
//! through `this.state` fails loudly.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use serde_json::json;
use stepwise::{LowerOptions, Lowered, lower_source};
use stepwise_ast::*;
use stepwise_parser::parse_module;

pub type Object = Rc<RefCell<BTreeMap<String, Value>>>;

/// Runtime value of the evaluated subset.
#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Object(Object),
    Array(Rc<RefCell<Vec<Value>>>),
}

impl Value {
    pub fn object(entries: BTreeMap<String, Value>) -> Value {
        Value::Object(Rc::new(RefCell::new(entries)))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Num(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => Value::array(items.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(map) => Value::object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// JSON view; `undefined` becomes `null`, integral numbers become
    /// integers so they compare equal to `json!(2)`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => json!(b),
            Value::Num(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => json!(*n as i64),
            Value::Num(n) => json!(n),
            Value::Str(s) => json!(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.borrow().iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Num(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Object(_) | Value::Array(_) => true,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Num(n) => *n,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Null => 0.0,
            Value::Str(s) if s.trim().is_empty() => 0.0,
            Value::Str(s) => s.trim().parse().unwrap_or(f64::NAN),
            Value::Undefined | Value::Object(_) | Value::Array(_) => f64::NAN,
        }
    }

    pub fn to_display(&self) -> String {
        match self {
            Value::Undefined => "undefined".into(),
            Value::Null => "null".into(),
            Value::Bool(b) => b.to_string(),
            Value::Num(n) => stepwise_ast::print::format_number(*n),
            Value::Str(s) => s.clone(),
            Value::Array(items) => items
                .borrow()
                .iter()
                .map(Value::to_display)
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".into(),
        }
    }

    /// Property read; reading from `undefined`/`null` throws.
    pub fn get(&self, key: &str) -> Result<Value, String> {
        Ok(match self {
            Value::Object(map) => map.borrow().get(key).cloned().unwrap_or(Value::Undefined),
            Value::Array(items) => match key {
                "length" => Value::Num(items.borrow().len() as f64),
                _ => key
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.borrow().get(i).cloned())
                    .unwrap_or(Value::Undefined),
            },
            Value::Str(s) if key == "length" => Value::Num(s.chars().count() as f64),
            Value::Undefined | Value::Null => {
                return Err(format!(
                    "TypeError: cannot read `{}` of {}",
                    key,
                    self.to_display()
                ));
            }
            _ => Value::Undefined,
        })
    }
}

fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Num(x), Value::Num(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        (Value::Array(x), Value::Array(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
        (Value::Num(_), Value::Str(_)) | (Value::Str(_), Value::Num(_)) => {
            a.to_number() == b.to_number()
        }
        _ => strict_eq(a, b),
    }
}

fn binary(op: BinaryOp, l: &Value, r: &Value) -> Value {
    let num = |f: fn(f64, f64) -> f64| Value::Num(f(l.to_number(), r.to_number()));
    let int = |f: fn(i32, i32) -> i32| {
        Value::Num(f64::from(f(l.to_number() as i64 as i32, r.to_number() as i64 as i32)))
    };
    let cmp = |f: fn(std::cmp::Ordering) -> bool| match (l, r) {
        (Value::Str(x), Value::Str(y)) => Value::Bool(f(x.cmp(y))),
        _ => match l.to_number().partial_cmp(&r.to_number()) {
            Some(ordering) => Value::Bool(f(ordering)),
            None => Value::Bool(false),
        },
    };
    match op {
        BinaryOp::Plus => match (l, r) {
            (Value::Str(_), _) | (_, Value::Str(_)) => {
                Value::Str(format!("{}{}", l.to_display(), r.to_display()))
            }
            _ => num(|a, b| a + b),
        },
        BinaryOp::Minus => num(|a, b| a - b),
        BinaryOp::Mul => num(|a, b| a * b),
        BinaryOp::Div => num(|a, b| a / b),
        BinaryOp::Mod => num(|a, b| a % b),
        BinaryOp::Exp => num(f64::powf),
        BinaryOp::Lt => cmp(|o| o.is_lt()),
        BinaryOp::LtEq => cmp(|o| o.is_le()),
        BinaryOp::Gt => cmp(|o| o.is_gt()),
        BinaryOp::GtEq => cmp(|o| o.is_ge()),
        BinaryOp::EqEqEq => Value::Bool(strict_eq(l, r)),
        BinaryOp::NotEqEq => Value::Bool(!strict_eq(l, r)),
        BinaryOp::EqEq => Value::Bool(loose_eq(l, r)),
        BinaryOp::NotEq => Value::Bool(!loose_eq(l, r)),
        BinaryOp::BitwiseAnd => int(|a, b| a & b),
        BinaryOp::BitwiseOr => int(|a, b| a | b),
        BinaryOp::BitwiseXor => int(|a, b| a ^ b),
        BinaryOp::LShift => int(|a, b| a.wrapping_shl(b as u32)),
        BinaryOp::RShift => int(|a, b| a.wrapping_shr(b as u32)),
        other => panic!("evaluator does not support operator {:?}", other),
    }
}

fn compound(op: AssignOp) -> BinaryOp {
    match op {
        AssignOp::PlusEq => BinaryOp::Plus,
        AssignOp::MinusEq => BinaryOp::Minus,
        AssignOp::MulEq => BinaryOp::Mul,
        AssignOp::DivEq => BinaryOp::Div,
        AssignOp::ModEq => BinaryOp::Mod,
        AssignOp::ExpEq => BinaryOp::Exp,
        AssignOp::BitAndEq => BinaryOp::BitwiseAnd,
        AssignOp::BitOrEq => BinaryOp::BitwiseOr,
        AssignOp::BitXorEq => BinaryOp::BitwiseXor,
        other => panic!("evaluator does not support operator {:?}", other),
    }
}

fn thrown(value: &Value) -> String {
    match value.get("message") {
        Ok(Value::Str(message)) => message,
        _ => value.to_display(),
    }
}

enum Flow {
    Normal,
    Break,
    Return(Value),
}

/// Tree-walking evaluator for one method activation.
struct Interp {
    this: Value,
    scopes: Vec<HashMap<String, Value>>,
}

impl Interp {
    fn new(this: Value) -> Self {
        Interp {
            this,
            scopes: vec![HashMap::new()],
        }
    }

    fn declare(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    fn lookup(&self, name: &str) -> Value {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.get(name) {
                return value.clone();
            }
        }
        match name {
            "undefined" => Value::Undefined,
            _ => panic!("unbound identifier `{}`", name),
        }
    }

    fn bind_params(&mut self, params: &[Param], args: Vec<Value>) -> Result<(), String> {
        for (i, param) in params.iter().enumerate() {
            let name = &param.pat.as_ident().expect("identifier parameter").sym;
            let mut value = if param.rest {
                Value::array(args.get(i..).map(<[Value]>::to_vec).unwrap_or_default())
            } else {
                args.get(i).cloned().unwrap_or(Value::Undefined)
            };
            if let (Value::Undefined, Some(default)) = (&value, &param.default) {
                value = self.eval(default)?;
            }
            self.declare(name, value);
        }
        Ok(())
    }

    fn run_body(&mut self, body: &BlockStmt) -> Result<Value, String> {
        match self.scoped(&body.stmts)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal | Flow::Break => Ok(Value::Undefined),
        }
    }

    fn scoped(&mut self, stmts: &[Stmt]) -> Result<Flow, String> {
        self.scopes.push(HashMap::new());
        let flow = self.run(stmts);
        self.scopes.pop();
        flow
    }

    fn run(&mut self, stmts: &[Stmt]) -> Result<Flow, String> {
        for stmt in stmts {
            match self.exec(stmt)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<Flow, String> {
        match stmt {
            Stmt::ExprStmt(s) => {
                self.eval(&s.expr)?;
            }
            Stmt::VarDecl(v) => {
                for d in &v.decls {
                    let value = match &d.init {
                        Some(init) => self.eval(init)?,
                        None => Value::Undefined,
                    };
                    let name = &d.name.as_ident().expect("identifier binding").sym;
                    self.declare(name, value);
                }
            }
            Stmt::Return(r) => {
                let value = match &r.arg {
                    Some(arg) => self.eval(arg)?,
                    None => Value::Undefined,
                };
                return Ok(Flow::Return(value));
            }
            Stmt::Block(b) => return self.scoped(&b.stmts),
            Stmt::If(s) => {
                if self.eval(&s.test)?.truthy() {
                    return self.exec(&s.cons);
                }
                if let Some(alt) = &s.alt {
                    return self.exec(alt);
                }
            }
            Stmt::While(s) => {
                while self.eval(&s.test)?.truthy() {
                    match self.exec(&s.body)? {
                        Flow::Normal => {}
                        Flow::Break => break,
                        ret @ Flow::Return(_) => return Ok(ret),
                    }
                }
            }
            Stmt::For(s) => {
                self.scopes.push(HashMap::new());
                let flow = self.for_loop(s);
                self.scopes.pop();
                return flow;
            }
            Stmt::ForOf(s) => {
                let items = match self.eval(&s.right)? {
                    Value::Array(items) => items.borrow().clone(),
                    other => panic!("for-of over {:?}", other),
                };
                for item in items {
                    self.scopes.push(HashMap::new());
                    match &s.left {
                        ForHead::VarDecl(v) => {
                            let name = &v.decls[0].name.as_ident().expect("identifier binding").sym;
                            self.declare(name, item);
                        }
                        ForHead::Expr(target) => self.store(target, item)?,
                    }
                    let flow = self.exec(&s.body);
                    self.scopes.pop();
                    match flow? {
                        Flow::Normal => {}
                        Flow::Break => break,
                        ret @ Flow::Return(_) => return Ok(ret),
                    }
                }
            }
            Stmt::Switch(s) => {
                self.scopes.push(HashMap::new());
                let flow = self.switch(s);
                self.scopes.pop();
                return match flow? {
                    Flow::Break => Ok(Flow::Normal),
                    other => Ok(other),
                };
            }
            Stmt::Break(_) => return Ok(Flow::Break),
            Stmt::Throw(t) => {
                let value = self.eval(&t.arg)?;
                return Err(thrown(&value));
            }
            Stmt::Empty(_) => {}
            other => panic!("evaluator does not support {:?}", other),
        }
        Ok(Flow::Normal)
    }

    fn for_loop(&mut self, s: &ForStmt) -> Result<Flow, String> {
        match &s.init {
            Some(ForInit::VarDecl(v)) => {
                self.exec(&Stmt::VarDecl(v.clone()))?;
            }
            Some(ForInit::Expr(e)) => {
                self.eval(e)?;
            }
            None => {}
        }
        loop {
            if let Some(test) = &s.test {
                if !self.eval(test)?.truthy() {
                    break;
                }
            }
            match self.exec(&s.body)? {
                Flow::Normal => {}
                Flow::Break => break,
                ret @ Flow::Return(_) => return Ok(ret),
            }
            if let Some(update) = &s.update {
                self.eval(update)?;
            }
        }
        Ok(Flow::Normal)
    }

    fn switch(&mut self, s: &SwitchStmt) -> Result<Flow, String> {
        let discriminant = self.eval(&s.discriminant)?;
        let mut start = None;
        for (i, case) in s.cases.iter().enumerate() {
            if let Some(test) = &case.test {
                if strict_eq(&discriminant, &self.eval(test)?) {
                    start = Some(i);
                    break;
                }
            }
        }
        let Some(start) = start.or_else(|| s.cases.iter().position(|c| c.test.is_none())) else {
            return Ok(Flow::Normal);
        };
        for case in &s.cases[start..] {
            match self.run(&case.cons)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn key(&mut self, prop: &MemberProp) -> Result<String, String> {
        match prop {
            MemberProp::Ident(i) => Ok(i.sym.clone()),
            MemberProp::Computed(e) => Ok(self.eval(e)?.to_display()),
        }
    }

    fn prop_name(&mut self, key: &PropName) -> Result<String, String> {
        match key {
            PropName::Ident(i) => Ok(i.sym.clone()),
            PropName::Str(s) | PropName::Num(s) => Ok(s.clone()),
            PropName::Computed(e) => Ok(self.eval(e)?.to_display()),
        }
    }

    fn store(&mut self, target: &Expr, value: Value) -> Result<(), String> {
        match target {
            Expr::Ident(i) => {
                for scope in self.scopes.iter_mut().rev() {
                    if let Some(slot) = scope.get_mut(&i.sym) {
                        *slot = value;
                        return Ok(());
                    }
                }
                panic!("assignment to unbound identifier `{}`", i.sym);
            }
            Expr::Member(m) => {
                let obj = self.eval(&m.obj)?;
                let key = self.key(&m.prop)?;
                match obj {
                    Value::Object(map) => {
                        map.borrow_mut().insert(key, value);
                    }
                    Value::Array(items) => {
                        let index: usize = key.parse().expect("array index");
                        let mut items = items.borrow_mut();
                        if index >= items.len() {
                            items.resize(index + 1, Value::Undefined);
                        }
                        items[index] = value;
                    }
                    other => {
                        return Err(format!(
                            "TypeError: cannot set `{}` on {}",
                            key,
                            other.to_display()
                        ));
                    }
                }
                Ok(())
            }
            Expr::Paren(p) => self.store(&p.expr, value),
            other => panic!("evaluator cannot assign to {:?}", other),
        }
    }

    fn args(&mut self, args: &[ExprOrSpread]) -> Result<Vec<Value>, String> {
        let mut out = Vec::new();
        for arg in args {
            let value = self.eval(&arg.expr)?;
            match (arg.spread, value) {
                (true, Value::Array(items)) => out.extend(items.borrow().iter().cloned()),
                (_, value) => out.push(value),
            }
        }
        Ok(out)
    }

    fn call(&mut self, call: &CallExpr) -> Result<Value, String> {
        match &*call.callee {
            Expr::Member(m) => {
                let name = self.key(&m.prop)?;
                if let Expr::Ident(obj) = &*m.obj {
                    if obj.sym == "Math" {
                        let args = self.args(&call.args)?;
                        let nums = args.iter().map(Value::to_number);
                        return Ok(Value::Num(match name.as_str() {
                            "max" => nums.fold(f64::NEG_INFINITY, f64::max),
                            "min" => nums.fold(f64::INFINITY, f64::min),
                            "floor" => args.first().map_or(f64::NAN, |v| v.to_number().floor()),
                            other => panic!("evaluator does not support Math.{}", other),
                        }));
                    }
                }
                let receiver = self.eval(&m.obj)?;
                let args = self.args(&call.args)?;
                match (&receiver, name.as_str()) {
                    (Value::Array(items), "push") => {
                        let mut items = items.borrow_mut();
                        items.extend(args);
                        Ok(Value::Num(items.len() as f64))
                    }
                    (Value::Array(items), "pop") => {
                        Ok(items.borrow_mut().pop().unwrap_or(Value::Undefined))
                    }
                    (Value::Array(items), "join") => {
                        let sep = args.first().map_or(",".to_string(), Value::to_display);
                        let parts: Vec<String> = items.borrow().iter().map(Value::to_display).collect();
                        Ok(Value::Str(parts.join(&sep)))
                    }
                    (Value::Array(items), "includes") => {
                        let needle = args.first().cloned().unwrap_or(Value::Undefined);
                        Ok(Value::Bool(items.borrow().iter().any(|v| strict_eq(v, &needle))))
                    }
                    (Value::Str(s), "toUpperCase") => Ok(Value::Str(s.to_uppercase())),
                    (receiver, name) => panic!("evaluator does not support {:?}.{}()", receiver, name),
                }
            }
            Expr::Ident(i) if i.sym == "String" => {
                let args = self.args(&call.args)?;
                Ok(Value::Str(args.first().map_or(String::new(), Value::to_display)))
            }
            other => panic!("evaluator does not support calling {:?}", other),
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, String> {
        Ok(match expr {
            Expr::Lit(l) => match &l.kind {
                LitKind::Str(s) => Value::Str(s.clone()),
                LitKind::Num { value, .. } => Value::Num(*value),
                LitKind::Bool(b) => Value::Bool(*b),
                LitKind::Null => Value::Null,
            },
            Expr::Ident(i) => self.lookup(&i.sym),
            Expr::This(_) => self.this.clone(),
            Expr::Tpl(t) => {
                let mut out = String::new();
                for (i, quasi) in t.quasis.iter().enumerate() {
                    out.push_str(quasi);
                    if let Some(e) = t.exprs.get(i) {
                        out.push_str(&self.eval(e)?.to_display());
                    }
                }
                Value::Str(out)
            }
            Expr::Member(m) => {
                let obj = self.eval(&m.obj)?;
                if m.optional && matches!(obj, Value::Undefined | Value::Null) {
                    return Ok(Value::Undefined);
                }
                let key = self.key(&m.prop)?;
                obj.get(&key)?
            }
            Expr::Assign(a) => {
                let value = match a.op {
                    AssignOp::Eq => self.eval(&a.right)?,
                    op => {
                        let current = self.eval(&a.left)?;
                        let right = self.eval(&a.right)?;
                        binary(compound(op), &current, &right)
                    }
                };
                self.store(&a.left, value.clone())?;
                value
            }
            Expr::Update(u) => {
                let old = self.eval(&u.arg)?.to_number();
                let new = match u.op {
                    UpdateOp::Inc => old + 1.0,
                    UpdateOp::Dec => old - 1.0,
                };
                self.store(&u.arg, Value::Num(new))?;
                Value::Num(if u.prefix { new } else { old })
            }
            Expr::Bin(b) => match b.op {
                BinaryOp::And => {
                    let left = self.eval(&b.left)?;
                    if left.truthy() { self.eval(&b.right)? } else { left }
                }
                BinaryOp::Or => {
                    let left = self.eval(&b.left)?;
                    if left.truthy() { left } else { self.eval(&b.right)? }
                }
                BinaryOp::NullishCoalesce => match self.eval(&b.left)? {
                    Value::Undefined | Value::Null => self.eval(&b.right)?,
                    left => left,
                },
                op => {
                    let left = self.eval(&b.left)?;
                    let right = self.eval(&b.right)?;
                    binary(op, &left, &right)
                }
            },
            Expr::Unary(u) => {
                let value = self.eval(&u.arg)?;
                match u.op {
                    UnaryOp::Not => Value::Bool(!value.truthy()),
                    UnaryOp::Minus => Value::Num(-value.to_number()),
                    UnaryOp::Plus => Value::Num(value.to_number()),
                    UnaryOp::Void => Value::Undefined,
                    UnaryOp::TypeOf => Value::Str(
                        match value {
                            Value::Undefined => "undefined",
                            Value::Bool(_) => "boolean",
                            Value::Num(_) => "number",
                            Value::Str(_) => "string",
                            Value::Null | Value::Object(_) | Value::Array(_) => "object",
                        }
                        .into(),
                    ),
                    other => panic!("evaluator does not support {:?}", other),
                }
            }
            Expr::Cond(c) => {
                if self.eval(&c.test)?.truthy() {
                    self.eval(&c.cons)?
                } else {
                    self.eval(&c.alt)?
                }
            }
            Expr::Call(c) => self.call(c)?,
            Expr::New(n) => match &*n.callee {
                Expr::Ident(i) if i.sym == "Error" => {
                    let args = self.args(&n.args)?;
                    let message = args.first().map_or(String::new(), Value::to_display);
                    Value::object(BTreeMap::from([("message".to_string(), Value::Str(message))]))
                }
                other => panic!("evaluator does not support `new` of {:?}", other),
            },
            Expr::Array(a) => {
                let mut items = Vec::new();
                for elem in &a.elems {
                    match elem {
                        Some(e) if e.spread => match self.eval(&e.expr)? {
                            Value::Array(src) => items.extend(src.borrow().iter().cloned()),
                            other => panic!("spread of {:?}", other),
                        },
                        Some(e) => items.push(self.eval(&e.expr)?),
                        None => items.push(Value::Undefined),
                    }
                }
                Value::array(items)
            }
            Expr::Object(o) => {
                let mut map = BTreeMap::new();
                for prop in &o.props {
                    match prop {
                        PropOrSpread::Prop(Prop::KeyValue(kv)) => {
                            let key = self.prop_name(&kv.key)?;
                            let value = self.eval(&kv.value)?;
                            map.insert(key, value);
                        }
                        PropOrSpread::Prop(Prop::Shorthand(i)) => {
                            map.insert(i.sym.clone(), self.lookup(&i.sym));
                        }
                        PropOrSpread::Spread(s) => match self.eval(&s.expr)? {
                            Value::Object(src) => {
                                for (k, v) in src.borrow().iter() {
                                    map.insert(k.clone(), v.clone());
                                }
                            }
                            Value::Undefined | Value::Null => {}
                            other => panic!("object spread of {:?}", other),
                        },
                    }
                }
                Value::object(map)
            }
            Expr::Seq(s) => {
                let mut last = Value::Undefined;
                for e in &s.exprs {
                    last = self.eval(e)?;
                }
                last
            }
            Expr::Paren(p) => self.eval(&p.expr)?,
            Expr::Await(a) => self.eval(&a.arg)?,
            Expr::As(a) => self.eval(&a.expr)?,
            Expr::NonNull(n) => self.eval(&n.expr)?,
            other => panic!("evaluator does not support {:?}", other),
        })
    }
}

/// Value handed back by one `nextStep` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub value: serde_json::Value,
    pub done: bool,
}

/// An instance of an emitted class.
pub struct Machine {
    class: Rc<ClassDecl>,
    this: Value,
}

impl Machine {
    /// Run the constructor with `args`.
    pub fn new(class: &ClassDecl, args: &[serde_json::Value]) -> Machine {
        let machine = Machine {
            class: Rc::new(class.clone()),
            this: Value::object(BTreeMap::new()),
        };
        let ctor = machine.class.body.iter().find_map(|member| match member {
            ClassMember::Constructor(c) => Some(c),
            _ => None,
        });
        if let Some(ctor) = ctor {
            let mut interp = Interp::new(machine.this.clone());
            let args = args.iter().map(Value::from_json).collect();
            interp
                .bind_params(&ctor.params, args)
                .and_then(|()| match &ctor.body {
                    Some(body) => interp.run_body(body).map(|_| ()),
                    None => Ok(()),
                })
                .unwrap_or_else(|err| panic!("constructor threw: {}", err));
        }
        machine
    }

    /// Call a method; `Err` carries the message of a thrown error.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, String> {
        let method = self
            .class
            .body
            .iter()
            .find_map(|member| match member {
                ClassMember::Method(m) if m.ident.sym == name => Some(m),
                _ => None,
            })
            .unwrap_or_else(|| panic!("class has no method `{}`", name));
        let mut interp = Interp::new(self.this.clone());
        interp.bind_params(&method.function.params, args)?;
        match &method.function.body {
            Some(body) => interp.run_body(body),
            None => Ok(Value::Undefined),
        }
    }

    pub fn next_step(&self, value: serde_json::Value) -> Result<Outcome, String> {
        let result = self.call("nextStep", vec![Value::from_json(&value)])?;
        Ok(Outcome {
            value: result.get("value")?.to_json(),
            done: result.get("done")?.truthy(),
        })
    }

    pub fn save_state(&self) -> Value {
        self.call("saveState", Vec::new())
            .unwrap_or_else(|err| panic!("saveState threw: {}", err))
    }

    pub fn load_state(&self, state: Value) {
        self.call("loadState", vec![state])
            .unwrap_or_else(|err| panic!("loadState threw: {}", err));
    }

    /// The live state record.
    pub fn state(&self) -> Value {
        self.this.get("state").unwrap_or(Value::Undefined)
    }

    pub fn cursor(&self) -> serde_json::Value {
        self.state()
            .get("nextStep")
            .map(|v| v.to_json())
            .unwrap_or(serde_json::Value::Null)
    }
}

pub fn outcome(value: serde_json::Value, done: bool) -> Outcome {
    Outcome { value, done }
}

pub fn lower(src: &str) -> Lowered {
    lower_source(src, &LowerOptions::default())
        .unwrap_or_else(|err| panic!("lowering failed: {}\n{}", err, src))
}

/// Lower `src` and re-parse the output; returns the first emitted class.
pub fn lower_class(src: &str) -> ClassDecl {
    let lowered = lower(src);
    let module = parse_module(&lowered.output).unwrap_or_else(|err| {
        panic!(
            "lowered output does not parse:\n{}\n{}",
            err.display_with_source(&lowered.output),
            lowered.output
        )
    });
    module
        .body
        .into_iter()
        .find_map(|item| match item {
            Stmt::ClassDecl(c) => Some(c),
            Stmt::Export(e) => match *e.decl {
                Stmt::ClassDecl(c) => Some(c),
                _ => None,
            },
            _ => None,
        })
        .unwrap_or_else(|| panic!("no class in lowered output:\n{}", lowered.output))
}

/// Lower `src` and construct the class with `args`.
pub fn start(src: &str, args: &[serde_json::Value]) -> Machine {
    Machine::new(&lower_class(src), args)
}
