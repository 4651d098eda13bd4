//! Zero values for declared local types.
//!
//! The mapping is closed: a shape without a rule fails the lowering instead
//! of guessing.

use crate::error::{LowerError, Result};
use stepwise_ast::print::type_to_string;
use stepwise_ast::*;

/// Initial value of a local declared with type `ty`.
///
/// | type                                   | value       |
/// |----------------------------------------|-------------|
/// | `number`                               | `0`         |
/// | `string`                               | `""`        |
/// | `boolean`                              | `false`     |
/// | `any`, `unknown`                       | `undefined` |
/// | `T[]`, `Array<T>`, `ReadonlyArray<T>`  | `[]`        |
/// | `A \| B`                               | `{}`        |
/// | any other named type                   | `{}`        |
pub fn default_value(ty: &TsType) -> Result<Expr> {
    let span = dummy_span();
    let expr = match ty {
        TsType::TsKeywordType(k) => match k.kind {
            TsKeywordKind::Number => Expr::Lit(Lit {
                kind: LitKind::Num {
                    value: 0.0,
                    raw: String::new(),
                },
                span,
            }),
            TsKeywordKind::String => Expr::Lit(Lit {
                kind: LitKind::Str(String::new()),
                span,
            }),
            TsKeywordKind::Boolean => Expr::Lit(Lit {
                kind: LitKind::Bool(false),
                span,
            }),
            TsKeywordKind::Any | TsKeywordKind::Unknown => Expr::Ident(Ident::new("undefined", span)),
            _ => return Err(unsupported(ty)),
        },
        TsType::TsArrayType(_) => empty_array(),
        TsType::TsTypeRef(r) if r.type_name == "Array" || r.type_name == "ReadonlyArray" => {
            empty_array()
        }
        TsType::TsTypeRef(_) | TsType::TsUnionType(_) => Expr::Object(ObjectLit {
            props: Vec::new(),
            span,
        }),
        TsType::TsParenType(p) => return default_value(&p.ty),
        _ => return Err(unsupported(ty)),
    };
    Ok(expr)
}

fn empty_array() -> Expr {
    Expr::Array(ArrayLit {
        elems: Vec::new(),
        span: dummy_span(),
    })
}

fn unsupported(ty: &TsType) -> LowerError {
    LowerError::TypeUnsupported {
        ty: type_to_string(ty),
        span: ty.span(),
    }
}
