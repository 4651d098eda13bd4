//! Stepwise
//!
//! Lowers TypeScript generator functions into classes that expose their
//! suspension state as a plain record. A lowered generator becomes a class
//! with five members: a private `state` field, a constructor taking the
//! generator's parameters, `saveState`, `loadState` and `nextStep`.
//!
//! The pipeline is [`extract`] (split the body into steps), then
//! [`Emitter`] (build the class, rewriting references through
//! [`Replacer`] and initializing locals with [`default_value`]).
//!
//! ```text
//! function* f(a: number): Generator<number, number, number> {
//!   yield a;
//!   return a + 1;
//! }
//! ```
//!
//! becomes a class `F` whose `nextStep` dispatches on
//! `this.state.nextStep` with one case per step.

pub mod components;
pub mod defaults;
pub mod emit;
pub mod error;
pub mod extract;
pub mod options;
pub mod replace;

pub use components::{GeneratorComponents, LocalVar, Step};
pub use defaults::default_value;
pub use emit::Emitter;
pub use error::{ErrorKind, LowerError, Result};
pub use extract::extract;
pub use options::LowerOptions;
pub use replace::{Replacer, state_access};

use stepwise_ast::print::class_to_string;
use stepwise_ast::{ClassDecl, FnDecl, Stmt};

/// Result of lowering a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Lowered {
    /// The input with every lowered generator replaced by its class.
    pub output: String,
    pub classes: Vec<LoweredClass>,
}

/// One generator that was turned into a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweredClass {
    pub function_name: String,
    pub class_name: String,
    pub steps: usize,
}

/// Lower every selected generator declared at the top level of `source`.
///
/// Each generator's declaration span is replaced by the printed class, so
/// everything around it (comments, `export` keywords, other items) is kept
/// byte for byte. The first failure aborts the whole file.
#[tracing::instrument(skip_all, fields(len = source.len()))]
pub fn lower_source(source: &str, options: &LowerOptions) -> Result<Lowered> {
    let module = stepwise_parser::parse_module(source)?;

    let mut classes = Vec::new();
    let mut output = String::with_capacity(source.len());
    let mut copied = 0;
    for decl in module.body.iter().filter_map(generator_decl) {
        if !options.selects(&decl.ident.sym) {
            tracing::debug!(function = %decl.ident.sym, "not selected");
            continue;
        }
        let (components, class) = lower(decl, options)?;
        output.push_str(&source[copied..decl.span.start]);
        output.push_str(&class_to_string(&class));
        copied = decl.span.end;
        classes.push(LoweredClass {
            function_name: decl.ident.sym.clone(),
            class_name: class.ident.sym.clone(),
            steps: components.steps.len(),
        });
    }
    output.push_str(&source[copied..]);

    Ok(Lowered { output, classes })
}

/// Lower one generator declaration.
#[tracing::instrument(skip_all, fields(function = %decl.ident.sym))]
pub fn lower_function(decl: &FnDecl, options: &LowerOptions) -> Result<ClassDecl> {
    lower(decl, options).map(|(_, class)| class)
}

fn lower(decl: &FnDecl, options: &LowerOptions) -> Result<(GeneratorComponents, ClassDecl)> {
    let components = extract(decl)?;
    let class = Emitter::new(&components, options).emit()?;
    tracing::info!(
        function = %decl.ident.sym,
        class = %class.ident.sym,
        steps = components.steps.len(),
        "lowered generator"
    );
    Ok((components, class))
}

/// Top-level generator declarations, exported or not. Overload signatures
/// (no body) are skipped.
fn generator_decl(item: &Stmt) -> Option<&FnDecl> {
    let decl = match item {
        Stmt::FnDecl(f) => f,
        Stmt::Export(e) => match &*e.decl {
            Stmt::FnDecl(f) => f,
            _ => return None,
        },
        _ => return None,
    };
    (decl.function.is_generator && decl.function.body.is_some()).then_some(decl)
}
