//! Component model produced by extraction and consumed by the emitter.

use stepwise_ast::*;

/// Everything the emitter needs to know about one generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorComponents {
    pub name: Ident,
    pub type_params: Vec<TsTypeParam>,
    /// Original parameters; every pattern is a plain identifier and every
    /// parameter is annotated.
    pub params: Vec<Param>,
    pub locals: Vec<LocalVar>,
    /// Never empty; the last step is the terminal one.
    pub steps: Vec<Step>,
    pub yield_type: TsType,
    pub return_type: TsType,
    /// Type of the value passed to `nextStep` on resumption.
    pub next_type: TsType,
    pub is_async: bool,
    pub span: Span,
}

/// A top-level `let`/`const`/`var` binding, hoisted into the state record.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVar {
    pub name: Ident,
    pub ty: TsType,
}

/// Work between two suspensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub index: usize,
    /// The `yield` whose resumption starts this step; `None` for step 0.
    pub starting_yield: Option<YieldExpr>,
    pub stmts: Vec<Stmt>,
    /// Value handed to the caller when the step finishes.
    pub return_expr: Option<Expr>,
}

impl GeneratorComponents {
    /// Index of the terminal step.
    pub fn last_step(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Names that live in the state record, parameters first.
    pub fn state_names(&self) -> Vec<String> {
        self.params
            .iter()
            .filter_map(param_name)
            .map(|ident| ident.sym.clone())
            .chain(self.locals.iter().map(|local| local.name.sym.clone()))
            .collect()
    }
}

/// Identifier bound by a parameter, if it is a simple one.
pub fn param_name(param: &Param) -> Option<&Ident> {
    param.pat.as_ident()
}
