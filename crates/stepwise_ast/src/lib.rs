//! Stepwise AST definitions
//!
//! This crate defines the abstract syntax tree for the TypeScript subset the
//! stepwise lowering understands. It is the contract between the parser and
//! the lowering core: the parser produces it, the core rewrites it, and the
//! printer in [`print`] renders it back to source text.

pub mod print;

use std::ops::Range;

/// Represents a source code span as a byte range.
pub type Span = Range<usize>;

/// Span used for nodes synthesized by the lowering (they have no source).
pub fn dummy_span() -> Span {
    0..0
}

/// The top-level module AST node.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Statements in the AST.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    FnDecl(FnDecl),
    ClassDecl(ClassDecl),
    VarDecl(VarDecl),
    Export(ExportDecl),
    ExprStmt(ExprStmt),
    If(IfStmt),
    For(ForStmt),
    ForIn(ForInStmt),
    ForOf(ForOfStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    Switch(SwitchStmt),
    Try(TryStmt),
    Block(BlockStmt),
    Return(ReturnStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Throw(ThrowStmt),
    Labeled(LabeledStmt),
    Empty(EmptyStmt),
    /// A top-level item the parser skipped without modeling it (imports,
    /// interfaces, type aliases, enums, ambient declarations). The original
    /// text is kept so the printer can reproduce it verbatim.
    Opaque(OpaqueStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::FnDecl(s) => s.span.clone(),
            Stmt::ClassDecl(s) => s.span.clone(),
            Stmt::VarDecl(s) => s.span.clone(),
            Stmt::Export(s) => s.span.clone(),
            Stmt::ExprStmt(s) => s.span.clone(),
            Stmt::If(s) => s.span.clone(),
            Stmt::For(s) => s.span.clone(),
            Stmt::ForIn(s) => s.span.clone(),
            Stmt::ForOf(s) => s.span.clone(),
            Stmt::While(s) => s.span.clone(),
            Stmt::DoWhile(s) => s.span.clone(),
            Stmt::Switch(s) => s.span.clone(),
            Stmt::Try(s) => s.span.clone(),
            Stmt::Block(s) => s.span.clone(),
            Stmt::Return(s) => s.span.clone(),
            Stmt::Break(s) => s.span.clone(),
            Stmt::Continue(s) => s.span.clone(),
            Stmt::Throw(s) => s.span.clone(),
            Stmt::Labeled(s) => s.span.clone(),
            Stmt::Empty(s) => s.span.clone(),
            Stmt::Opaque(s) => s.span.clone(),
        }
    }
}

/// Function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub ident: Ident,
    pub function: Function,
    pub span: Span,
}

/// `export` / `export default` wrapper around a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDecl {
    pub decl: Box<Stmt>,
    pub is_default: bool,
    pub span: Span,
}

/// Class declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub ident: Ident,
    pub type_params: Vec<TsTypeParam>,
    pub super_class: Option<Expr>,
    pub implements: Vec<TsType>,
    pub body: Vec<ClassMember>,
    pub span: Span,
}

/// Class member.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Field(FieldDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
}

/// Member accessibility modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessibility {
    Public,
    Private,
    Protected,
}

/// Field declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub ident: Ident,
    pub accessibility: Option<Accessibility>,
    pub is_static: bool,
    pub readonly: bool,
    pub optional: bool,
    pub ty: Option<TsType>,
    pub value: Option<Expr>,
    pub span: Span,
}

/// Method kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Getter,
    Setter,
}

/// Method declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub ident: Ident,
    pub accessibility: Option<Accessibility>,
    pub is_static: bool,
    pub kind: MethodKind,
    pub function: Function,
    pub span: Span,
}

/// Constructor declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    pub accessibility: Option<Accessibility>,
    pub params: Vec<Param>,
    pub body: Option<BlockStmt>,
    pub span: Span,
}

/// Function (shared by declarations, expressions and methods).
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub type_params: Vec<TsTypeParam>,
    pub params: Vec<Param>,
    pub body: Option<BlockStmt>,
    pub return_type: Option<TsType>,
    pub is_async: bool,
    pub is_generator: bool,
    pub span: Span,
}

/// Function parameter.
///
/// Default values and rest markers live on the parameter rather than in the
/// pattern so the type annotation keeps its source position when printed.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub pat: Pat,
    pub ty: Option<TsType>,
    pub optional: bool,
    pub rest: bool,
    pub default: Option<Expr>,
    pub span: Span,
}

/// Generic type parameter: `T extends U = V`.
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeParam {
    pub ident: Ident,
    pub constraint: Option<TsType>,
    pub default: Option<TsType>,
    pub span: Span,
}

/// Variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: VarDeclKind,
    pub decls: Vec<VarDeclarator>,
    pub span: Span,
}

/// Variable declaration kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarDeclKind {
    Var,
    Let,
    Const,
}

/// Variable declarator.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    pub name: Pat,
    pub ty: Option<TsType>,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Expression statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

/// If statement.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub test: Expr,
    pub cons: Box<Stmt>,
    pub alt: Option<Box<Stmt>>,
    pub span: Span,
}

/// For statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<ForInit>,
    pub test: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// For initialization.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    VarDecl(VarDecl),
    Expr(Expr),
}

/// For-of statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ForOfStmt {
    pub left: ForHead,
    pub right: Expr,
    pub body: Box<Stmt>,
    pub is_await: bool,
    pub span: Span,
}

/// For-in statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ForInStmt {
    pub left: ForHead,
    pub right: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// Left side of a for-in/for-of: a fresh declaration or an assignment
/// target.
#[derive(Debug, Clone, PartialEq)]
pub enum ForHead {
    VarDecl(VarDecl),
    Expr(Expr),
}

/// While statement.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub test: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// Do-while statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStmt {
    pub body: Box<Stmt>,
    pub test: Expr,
    pub span: Span,
}

/// Switch statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub discriminant: Expr,
    pub cases: Vec<SwitchCase>,
    pub span: Span,
}

/// Switch case; `test` is `None` for `default:`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub test: Option<Expr>,
    pub cons: Vec<Stmt>,
    pub span: Span,
}

/// Try statement.
#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub block: BlockStmt,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<BlockStmt>,
    pub span: Span,
}

/// Catch clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<Pat>,
    pub ty: Option<TsType>,
    pub body: BlockStmt,
    pub span: Span,
}

/// Block statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// Return statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub arg: Option<Expr>,
    pub span: Span,
}

/// Break statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakStmt {
    pub label: Option<Ident>,
    pub span: Span,
}

/// Continue statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinueStmt {
    pub label: Option<Ident>,
    pub span: Span,
}

/// Throw statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStmt {
    pub arg: Expr,
    pub span: Span,
}

/// Labeled statement.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStmt {
    pub label: Ident,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// Empty statement (a lone `;`).
#[derive(Debug, Clone, PartialEq)]
pub struct EmptyStmt {
    pub span: Span,
}

/// Unmodeled top-level item, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueStmt {
    pub text: String,
    pub span: Span,
}

/// Binding pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Pat {
    Ident(Ident),
    Array(ArrayPat),
    Object(ObjectPat),
}

impl Pat {
    pub fn span(&self) -> Span {
        match self {
            Pat::Ident(i) => i.span.clone(),
            Pat::Array(a) => a.span.clone(),
            Pat::Object(o) => o.span.clone(),
        }
    }

    /// The bound identifier when the pattern is a single identifier.
    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Pat::Ident(i) => Some(i),
            _ => None,
        }
    }
}

/// Array destructuring pattern: `[a, , ...rest]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPat {
    pub elems: Vec<Option<PatElem>>,
    pub rest: Option<Box<Pat>>,
    pub span: Span,
}

/// Element of an array pattern with an optional default.
#[derive(Debug, Clone, PartialEq)]
pub struct PatElem {
    pub pat: Pat,
    pub default: Option<Expr>,
}

/// Object destructuring pattern: `{ a, b: c = 1, ...rest }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPat {
    pub props: Vec<ObjectPatProp>,
    pub rest: Option<Ident>,
    pub span: Span,
}

/// Property of an object pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPatProp {
    pub key: PropName,
    /// `None` for shorthand `{ a }`.
    pub value: Option<Pat>,
    pub default: Option<Expr>,
    pub span: Span,
}

/// Identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub sym: String,
    pub span: Span,
}

impl Ident {
    pub fn new(sym: impl Into<String>, span: Span) -> Self {
        Ident {
            sym: sym.into(),
            span,
        }
    }
}

/// Property name.
#[derive(Debug, Clone, PartialEq)]
pub enum PropName {
    Ident(Ident),
    Str(String),
    /// Numeric key, kept as its source text.
    Num(String),
    Computed(Box<Expr>),
}

/// Expressions in the AST.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    This(ThisExpr),
    Ident(Ident),
    Lit(Lit),
    Tpl(TplExpr),
    Unary(UnaryExpr),
    Update(UpdateExpr),
    Bin(BinExpr),
    Assign(AssignExpr),
    Cond(CondExpr),
    Call(CallExpr),
    New(NewExpr),
    Member(MemberExpr),
    Array(ArrayLit),
    Object(ObjectLit),
    Fn(FnExpr),
    Arrow(ArrowExpr),
    Seq(SeqExpr),
    Paren(ParenExpr),
    Await(AwaitExpr),
    Yield(YieldExpr),
    As(AsExpr),
    NonNull(NonNullExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::This(e) => e.span.clone(),
            Expr::Ident(e) => e.span.clone(),
            Expr::Lit(e) => e.span.clone(),
            Expr::Tpl(e) => e.span.clone(),
            Expr::Unary(e) => e.span.clone(),
            Expr::Update(e) => e.span.clone(),
            Expr::Bin(e) => e.span.clone(),
            Expr::Assign(e) => e.span.clone(),
            Expr::Cond(e) => e.span.clone(),
            Expr::Call(e) => e.span.clone(),
            Expr::New(e) => e.span.clone(),
            Expr::Member(e) => e.span.clone(),
            Expr::Array(e) => e.span.clone(),
            Expr::Object(e) => e.span.clone(),
            Expr::Fn(e) => e.span.clone(),
            Expr::Arrow(e) => e.span.clone(),
            Expr::Seq(e) => e.span.clone(),
            Expr::Paren(e) => e.span.clone(),
            Expr::Await(e) => e.span.clone(),
            Expr::Yield(e) => e.span.clone(),
            Expr::As(e) => e.span.clone(),
            Expr::NonNull(e) => e.span.clone(),
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        match self {
            Expr::Paren(p) => p.expr.unparen(),
            other => other,
        }
    }
}

/// This expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ThisExpr {
    pub span: Span,
}

/// Literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Lit {
    pub kind: LitKind,
    pub span: Span,
}

/// Literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum LitKind {
    Str(String),
    /// Numeric literal; `raw` keeps the source spelling (`0x1F`, `1_000`).
    Num { value: f64, raw: String },
    Bool(bool),
    Null,
}

/// Template literal expression.
#[derive(Debug, Clone, PartialEq)]
pub struct TplExpr {
    /// Raw text of each quasi; always one more than `exprs`.
    pub quasis: Vec<String>,
    pub exprs: Vec<Expr>,
    pub span: Span,
}

/// Unary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub arg: Box<Expr>,
    pub span: Span,
}

/// Unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitwiseNot,
    TypeOf,
    Void,
    Delete,
}

/// Update expression (++x, x++, --x, x--).
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpr {
    pub op: UpdateOp,
    pub prefix: bool,
    pub arg: Box<Expr>,
    pub span: Span,
}

/// Update operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Inc,
    Dec,
}

/// Binary expression (arithmetic, comparison and logical operators).
#[derive(Debug, Clone, PartialEq)]
pub struct BinExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

/// Binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    EqEq,
    NotEq,
    EqEqEq,
    NotEqEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    Exp,
    And,
    Or,
    NullishCoalesce,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LShift,
    RShift,
    URShift,
    In,
    InstanceOf,
}

/// Assignment expression.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpr {
    pub op: AssignOp,
    /// Target: an identifier, member expression, or destructuring literal.
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

/// Assignment operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Eq,
    PlusEq,
    MinusEq,
    MulEq,
    DivEq,
    ModEq,
    ExpEq,
    LShiftEq,
    RShiftEq,
    URShiftEq,
    BitAndEq,
    BitOrEq,
    BitXorEq,
    AndEq,
    OrEq,
    NullishEq,
}

/// Conditional expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CondExpr {
    pub test: Box<Expr>,
    pub cons: Box<Expr>,
    pub alt: Box<Expr>,
    pub span: Span,
}

/// Call or `new` argument, possibly spread.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprOrSpread {
    pub spread: bool,
    pub expr: Expr,
}

impl ExprOrSpread {
    pub fn plain(expr: Expr) -> Self {
        ExprOrSpread {
            spread: false,
            expr,
        }
    }
}

/// Call expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<ExprOrSpread>,
    /// `f?.()`
    pub optional: bool,
    pub span: Span,
}

/// New expression.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    pub callee: Box<Expr>,
    pub args: Vec<ExprOrSpread>,
    pub span: Span,
}

/// Member expression.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub obj: Box<Expr>,
    pub prop: MemberProp,
    /// `a?.b`
    pub optional: bool,
    pub span: Span,
}

/// Member property.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberProp {
    Ident(Ident),
    Computed(Box<Expr>),
}

/// Array literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLit {
    pub elems: Vec<Option<ExprOrSpread>>,
    pub span: Span,
}

/// Object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLit {
    pub props: Vec<PropOrSpread>,
    pub span: Span,
}

/// Property or spread.
#[derive(Debug, Clone, PartialEq)]
pub enum PropOrSpread {
    Prop(Prop),
    Spread(SpreadElement),
}

/// Property.
#[derive(Debug, Clone, PartialEq)]
pub enum Prop {
    Shorthand(Ident),
    KeyValue(KeyValueProp),
}

/// Key-value property.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueProp {
    pub key: PropName,
    pub value: Expr,
    pub span: Span,
}

/// Spread element.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadElement {
    pub expr: Expr,
    pub span: Span,
}

/// Function expression.
#[derive(Debug, Clone, PartialEq)]
pub struct FnExpr {
    pub ident: Option<Ident>,
    pub function: Function,
    pub span: Span,
}

/// Arrow expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowExpr {
    pub params: Vec<Param>,
    pub body: ArrowBody,
    pub return_type: Option<TsType>,
    pub is_async: bool,
    pub span: Span,
}

/// Arrow body.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Expr(Box<Expr>),
    Block(BlockStmt),
}

/// Sequence expression.
#[derive(Debug, Clone, PartialEq)]
pub struct SeqExpr {
    pub exprs: Vec<Expr>,
    pub span: Span,
}

/// Parenthesized expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub expr: Box<Expr>,
    pub span: Span,
}

/// Await expression.
#[derive(Debug, Clone, PartialEq)]
pub struct AwaitExpr {
    pub arg: Box<Expr>,
    pub span: Span,
}

/// Yield expression; `delegate` marks `yield*`.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldExpr {
    pub arg: Option<Box<Expr>>,
    pub delegate: bool,
    pub span: Span,
}

/// Type assertion: `expr as T`.
#[derive(Debug, Clone, PartialEq)]
pub struct AsExpr {
    pub expr: Box<Expr>,
    pub ty: TsType,
    pub span: Span,
}

/// Non-null assertion: `expr!`.
#[derive(Debug, Clone, PartialEq)]
pub struct NonNullExpr {
    pub expr: Box<Expr>,
    pub span: Span,
}

/// Type annotations.
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    TsKeywordType(TsKeywordType),
    TsTypeRef(TsTypeRef),
    TsArrayType(TsArrayType),
    TsUnionType(TsUnionType),
    TsIntersectionType(TsIntersectionType),
    TsFunctionType(TsFunctionType),
    TsTupleType(TsTupleType),
    TsTypeLit(TsTypeLit),
    TsLitType(TsLitType),
    TsParenType(TsParenType),
}

impl TsType {
    pub fn span(&self) -> Span {
        match self {
            TsType::TsKeywordType(t) => t.span.clone(),
            TsType::TsTypeRef(t) => t.span.clone(),
            TsType::TsArrayType(t) => t.span.clone(),
            TsType::TsUnionType(t) => t.span.clone(),
            TsType::TsIntersectionType(t) => t.span.clone(),
            TsType::TsFunctionType(t) => t.span.clone(),
            TsType::TsTupleType(t) => t.span.clone(),
            TsType::TsTypeLit(t) => t.span.clone(),
            TsType::TsLitType(t) => t.span.clone(),
            TsType::TsParenType(t) => t.span.clone(),
        }
    }

    /// Build a keyword type with a synthesized span.
    pub fn keyword(kind: TsKeywordKind) -> Self {
        TsType::TsKeywordType(TsKeywordType {
            kind,
            span: dummy_span(),
        })
    }

    /// Build a type reference with a synthesized span.
    pub fn reference(name: impl Into<String>, type_args: Vec<TsType>) -> Self {
        TsType::TsTypeRef(TsTypeRef {
            type_name: name.into(),
            type_args,
            span: dummy_span(),
        })
    }
}

/// Keyword type.
#[derive(Debug, Clone, PartialEq)]
pub struct TsKeywordType {
    pub kind: TsKeywordKind,
    pub span: Span,
}

/// Keyword type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsKeywordKind {
    Number,
    String,
    Boolean,
    Any,
    Unknown,
    Void,
    Undefined,
    Null,
    Never,
    Object,
    BigInt,
    Symbol,
}

impl TsKeywordKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "number" => TsKeywordKind::Number,
            "string" => TsKeywordKind::String,
            "boolean" => TsKeywordKind::Boolean,
            "any" => TsKeywordKind::Any,
            "unknown" => TsKeywordKind::Unknown,
            "void" => TsKeywordKind::Void,
            "undefined" => TsKeywordKind::Undefined,
            "null" => TsKeywordKind::Null,
            "never" => TsKeywordKind::Never,
            "object" => TsKeywordKind::Object,
            "bigint" => TsKeywordKind::BigInt,
            "symbol" => TsKeywordKind::Symbol,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TsKeywordKind::Number => "number",
            TsKeywordKind::String => "string",
            TsKeywordKind::Boolean => "boolean",
            TsKeywordKind::Any => "any",
            TsKeywordKind::Unknown => "unknown",
            TsKeywordKind::Void => "void",
            TsKeywordKind::Undefined => "undefined",
            TsKeywordKind::Null => "null",
            TsKeywordKind::Never => "never",
            TsKeywordKind::Object => "object",
            TsKeywordKind::BigInt => "bigint",
            TsKeywordKind::Symbol => "symbol",
        }
    }
}

/// Type reference: `Foo`, `ns.Foo<T, U>`.
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeRef {
    /// Possibly dotted name, as written.
    pub type_name: String,
    pub type_args: Vec<TsType>,
    pub span: Span,
}

/// Array type: `T[]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TsArrayType {
    pub elem_type: Box<TsType>,
    pub span: Span,
}

/// Union type.
#[derive(Debug, Clone, PartialEq)]
pub struct TsUnionType {
    pub types: Vec<TsType>,
    pub span: Span,
}

/// Intersection type.
#[derive(Debug, Clone, PartialEq)]
pub struct TsIntersectionType {
    pub types: Vec<TsType>,
    pub span: Span,
}

/// Function type: `(a: T) => U`.
#[derive(Debug, Clone, PartialEq)]
pub struct TsFunctionType {
    pub params: Vec<Param>,
    pub return_type: Box<TsType>,
    pub span: Span,
}

/// Tuple type.
#[derive(Debug, Clone, PartialEq)]
pub struct TsTupleType {
    pub elem_types: Vec<TsType>,
    pub span: Span,
}

/// Type literal: `{ a: T; b?: U; [key: string]: V }`.
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeLit {
    pub members: Vec<TsTypeElement>,
    pub span: Span,
}

/// Member of a type literal.
#[derive(Debug, Clone, PartialEq)]
pub enum TsTypeElement {
    Property(TsPropertySignature),
    Index(TsIndexSignature),
}

/// Property signature.
#[derive(Debug, Clone, PartialEq)]
pub struct TsPropertySignature {
    pub key: Ident,
    pub ty: Option<TsType>,
    pub optional: bool,
    pub readonly: bool,
    pub span: Span,
}

/// Index signature.
#[derive(Debug, Clone, PartialEq)]
pub struct TsIndexSignature {
    pub key_name: Ident,
    pub key_type: Box<TsType>,
    pub value_type: Box<TsType>,
    pub readonly: bool,
    pub span: Span,
}

/// Literal type: `"a"`, `42`, `true`.
#[derive(Debug, Clone, PartialEq)]
pub struct TsLitType {
    pub lit: LitKind,
    pub span: Span,
}

/// Parenthesized type.
#[derive(Debug, Clone, PartialEq)]
pub struct TsParenType {
    pub ty: Box<TsType>,
    pub span: Span,
}
