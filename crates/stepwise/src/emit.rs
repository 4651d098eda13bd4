//! Class emission: the five members of a lowered generator.

use crate::components::{GeneratorComponents, Step, param_name};
use crate::defaults::default_value;
use crate::error::{ErrorKind, LowerError, Result};
use crate::extract::CURSOR_KEY;
use crate::options::LowerOptions;
use crate::replace::{Replacer, state_access};
use stepwise_ast::print::type_to_string;
use stepwise_ast::*;

const STATE_FIELD: &str = "state";

/// Builds the state-machine class for one extracted generator.
pub struct Emitter<'a> {
    components: &'a GeneratorComponents,
    options: &'a LowerOptions,
}

impl<'a> Emitter<'a> {
    pub fn new(components: &'a GeneratorComponents, options: &'a LowerOptions) -> Self {
        Emitter {
            components,
            options,
        }
    }

    pub fn emit(&self) -> Result<ClassDecl> {
        let c = self.components;
        let state_type = self.state_type();
        let body = vec![
            ClassMember::Field(FieldDecl {
                ident: ident(STATE_FIELD),
                accessibility: Some(Accessibility::Private),
                is_static: false,
                readonly: false,
                optional: false,
                ty: Some(state_type.clone()),
                value: None,
                span: dummy_span(),
            }),
            self.constructor()?,
            self.save_state(&state_type),
            self.load_state(&state_type),
            self.next_step()?,
        ];
        Ok(ClassDecl {
            ident: Ident::new(self.options.class_name(&c.name.sym), c.name.span.clone()),
            type_params: c.type_params.clone(),
            super_class: None,
            implements: Vec::new(),
            body,
            span: c.span.clone(),
        })
    }

    /// `{ nextStep: number; <params>; <locals> }`
    fn state_type(&self) -> TsType {
        let c = self.components;
        let mut members = vec![property(CURSOR_KEY, TsType::keyword(TsKeywordKind::Number), false)];
        for param in &c.params {
            if let (Some(name), Some(ty)) = (param_name(param), &param.ty) {
                members.push(property(&name.sym, ty.clone(), param.optional));
            }
        }
        for local in &c.locals {
            members.push(property(&local.name.sym, local.ty.clone(), false));
        }
        TsType::TsTypeLit(TsTypeLit {
            members,
            span: dummy_span(),
        })
    }

    fn constructor(&self) -> Result<ClassMember> {
        let c = self.components;
        let mut props = vec![key_value(CURSOR_KEY, num(0.0))];
        for name in c.params.iter().filter_map(param_name) {
            props.push(key_value(&name.sym, Expr::Ident(ident(&name.sym))));
        }
        for local in &c.locals {
            props.push(key_value(&local.name.sym, default_value(&local.ty)?));
        }
        let init = assign(this_state(), object(props));
        Ok(ClassMember::Constructor(ConstructorDecl {
            accessibility: None,
            params: c.params.clone(),
            body: Some(block(vec![init])),
            span: dummy_span(),
        }))
    }

    /// `saveState(): S { return { ...this.state }; }`
    fn save_state(&self, state_type: &TsType) -> ClassMember {
        let copy = object_spread(this_state());
        method(
            "saveState",
            Vec::new(),
            state_type.clone(),
            vec![return_stmt(copy)],
            false,
        )
    }

    /// `loadState(state: unknown): void { this.state = { ...(state as S) }; }`
    fn load_state(&self, state_type: &TsType) -> ClassMember {
        let cast = Expr::Paren(ParenExpr {
            expr: Box::new(Expr::As(AsExpr {
                expr: Box::new(Expr::Ident(ident(STATE_FIELD))),
                ty: state_type.clone(),
                span: dummy_span(),
            })),
            span: dummy_span(),
        });
        method(
            "loadState",
            vec![typed_param(STATE_FIELD, TsType::keyword(TsKeywordKind::Unknown))],
            TsType::keyword(TsKeywordKind::Void),
            vec![assign(this_state(), object_spread(cast))],
            false,
        )
    }

    fn next_step(&self) -> Result<ClassMember> {
        let c = self.components;
        let mut replacer = Replacer::new(c.state_names());
        let mut cases = c
            .steps
            .iter()
            .map(|step| self.step_case(step, &mut replacer))
            .collect::<Result<Vec<_>>>()?;
        cases.push(self.trap_case());

        let dispatch = Stmt::Switch(SwitchStmt {
            discriminant: cursor(),
            cases,
            span: dummy_span(),
        });

        let result = TsType::TsTypeLit(TsTypeLit {
            members: vec![
                property("value", self.value_type(), false),
                property("done", TsType::keyword(TsKeywordKind::Boolean), false),
            ],
            span: dummy_span(),
        });
        let return_type = if c.is_async {
            TsType::reference("Promise", vec![result])
        } else {
            result
        };
        Ok(method(
            "nextStep",
            vec![typed_param(&self.options.resume_param, c.next_type.clone())],
            return_type,
            vec![dispatch],
            c.is_async,
        ))
    }

    /// `Y | R`, collapsed to `Y` when both are the same type.
    fn value_type(&self) -> TsType {
        let c = self.components;
        if type_to_string(&c.yield_type) == type_to_string(&c.return_type) {
            return c.yield_type.clone();
        }
        TsType::TsUnionType(TsUnionType {
            types: vec![c.yield_type.clone(), c.return_type.clone()],
            span: dummy_span(),
        })
    }

    fn step_case(&self, step: &Step, replacer: &mut Replacer) -> Result<SwitchCase> {
        let terminal = step.index == self.components.last_step();
        replacer.set_resume(step.starting_yield.clone(), &self.options.resume_param);

        // the resumed `yield` opens the step and reads as the resume value
        let mut stmts: Vec<Stmt> = step
            .starting_yield
            .iter()
            .map(|y| {
                Stmt::ExprStmt(ExprStmt {
                    expr: Expr::Yield(y.clone()),
                    span: y.span.clone(),
                })
            })
            .chain(step.stmts.iter().cloned())
            .collect();
        replacer.stmts(&mut stmts);
        if !terminal {
            stmts.push(assign(cursor(), num((step.index + 1) as f64)));
        }
        let value = match &step.return_expr {
            Some(expr) => {
                let mut expr = expr.clone();
                replacer.expr(&mut expr);
                expr
            }
            None => Expr::Ident(ident("undefined")),
        };
        if let Some(name) = replacer.escaped() {
            return Err(LowerError::structural(
                format!(
                    "`{}` is used inside a `function` or class body, where `this` is not the state machine; use an arrow function",
                    name.sym
                ),
                name.span.clone(),
            ));
        }
        stmts.push(return_stmt(object(vec![
            key_value("value", value),
            key_value("done", bool_lit(terminal)),
        ])));
        tracing::debug!(
            step = step.index,
            statements = stmts.len(),
            rewritten = replacer.rewritten(),
            terminal,
            "emitted step"
        );

        Ok(SwitchCase {
            test: Some(num(step.index as f64)),
            cons: vec![Stmt::Block(BlockStmt {
                stmts,
                span: dummy_span(),
            })],
            span: dummy_span(),
        })
    }

    /// `default: throw new Error("state corruption: nextStep " + ... );`
    fn trap_case(&self) -> SwitchCase {
        let message = concat(vec![
            str_lit(format!("{}: {} ", ErrorKind::StateCorruption, CURSOR_KEY)),
            cursor(),
            str_lit(format!(" is outside [0, {}]", self.components.last_step())),
        ]);
        let error = Expr::New(NewExpr {
            callee: Box::new(Expr::Ident(ident("Error"))),
            args: vec![ExprOrSpread::plain(message)],
            span: dummy_span(),
        });
        SwitchCase {
            test: None,
            cons: vec![Stmt::Throw(ThrowStmt {
                arg: error,
                span: dummy_span(),
            })],
            span: dummy_span(),
        }
    }
}

fn ident(name: &str) -> Ident {
    Ident::new(name, dummy_span())
}

fn this_state() -> Expr {
    Expr::Member(MemberExpr {
        obj: Box::new(Expr::This(ThisExpr { span: dummy_span() })),
        prop: MemberProp::Ident(ident(STATE_FIELD)),
        optional: false,
        span: dummy_span(),
    })
}

/// `this.state.nextStep`
fn cursor() -> Expr {
    state_access(CURSOR_KEY, dummy_span())
}

fn num(value: f64) -> Expr {
    Expr::Lit(Lit {
        kind: LitKind::Num {
            value,
            raw: String::new(),
        },
        span: dummy_span(),
    })
}

fn str_lit(value: String) -> Expr {
    Expr::Lit(Lit {
        kind: LitKind::Str(value),
        span: dummy_span(),
    })
}

fn bool_lit(value: bool) -> Expr {
    Expr::Lit(Lit {
        kind: LitKind::Bool(value),
        span: dummy_span(),
    })
}

fn concat(parts: Vec<Expr>) -> Expr {
    let mut parts = parts.into_iter();
    let first = parts.next().unwrap_or_else(|| str_lit(String::new()));
    parts.fold(first, |left, right| {
        Expr::Bin(BinExpr {
            op: BinaryOp::Plus,
            left: Box::new(left),
            right: Box::new(right),
            span: dummy_span(),
        })
    })
}

fn key_value(key: &str, value: Expr) -> PropOrSpread {
    PropOrSpread::Prop(Prop::KeyValue(KeyValueProp {
        key: PropName::Ident(ident(key)),
        value,
        span: dummy_span(),
    }))
}

fn object(props: Vec<PropOrSpread>) -> Expr {
    Expr::Object(ObjectLit {
        props,
        span: dummy_span(),
    })
}

/// `{ ...expr }`
fn object_spread(expr: Expr) -> Expr {
    object(vec![PropOrSpread::Spread(SpreadElement {
        expr,
        span: dummy_span(),
    })])
}

fn assign(target: Expr, value: Expr) -> Stmt {
    Stmt::ExprStmt(ExprStmt {
        expr: Expr::Assign(AssignExpr {
            op: AssignOp::Eq,
            left: Box::new(target),
            right: Box::new(value),
            span: dummy_span(),
        }),
        span: dummy_span(),
    })
}

fn return_stmt(arg: Expr) -> Stmt {
    Stmt::Return(ReturnStmt {
        arg: Some(arg),
        span: dummy_span(),
    })
}

fn block(stmts: Vec<Stmt>) -> BlockStmt {
    BlockStmt {
        stmts,
        span: dummy_span(),
    }
}

fn property(name: &str, ty: TsType, optional: bool) -> TsTypeElement {
    TsTypeElement::Property(TsPropertySignature {
        key: ident(name),
        ty: Some(ty),
        optional,
        readonly: false,
        span: dummy_span(),
    })
}

fn typed_param(name: &str, ty: TsType) -> Param {
    Param {
        pat: Pat::Ident(ident(name)),
        ty: Some(ty),
        optional: false,
        rest: false,
        default: None,
        span: dummy_span(),
    }
}

fn method(
    name: &str,
    params: Vec<Param>,
    return_type: TsType,
    body: Vec<Stmt>,
    is_async: bool,
) -> ClassMember {
    ClassMember::Method(MethodDecl {
        ident: ident(name),
        accessibility: None,
        is_static: false,
        kind: MethodKind::Method,
        function: Function {
            type_params: Vec::new(),
            params,
            body: Some(block(body)),
            return_type: Some(return_type),
            is_async,
            is_generator: false,
            span: dummy_span(),
        },
        span: dummy_span(),
    })
}
