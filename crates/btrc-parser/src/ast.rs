//! AST node definitions for the btrc language.
//!
//! Nodes are owned tagged enums in three categories: declarations
//! ([`Decl`]), statements ([`StmtKind`]), and expressions ([`ExprKind`]),
//! plus the supporting records (types, parameters, case clauses, map
//! entries, f-string parts). Every node carries a 1-based line/column
//! position; expressions additionally carry a parser-assigned [`ExprId`]
//! that keys the analyzer's node-type map.
//!
//! The tree is deliberately mutable: the analyzer rewrites it in place,
//! filling inferred `var` types, upgrading class-reference types, and
//! populating lambda captures.

use std::fmt;

use serde::Serialize;

/// Identity of an expression node, unique within a parsed program.
///
/// Sub-parsers (f-string bodies) continue the parent parser's id
/// sequence, so ids never collide across the whole tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ExprId(pub u32);

/// Root node: the ordered list of top-level items in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub declarations: Vec<Decl>,
}

// ── Declarations ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Decl {
    Preprocessor(PreprocessorDirective),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Function(FunctionDecl),
    Struct(StructDecl),
    Enum(EnumDecl),
    RichEnum(RichEnumDecl),
    Typedef(TypedefDecl),
    Var(VarDeclStmt),
}

/// A `#...` line carried through verbatim for the C back-end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreprocessorDirective {
    pub text: String,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDecl {
    pub name: String,
    pub generic_params: Vec<String>,
    pub members: Vec<ClassMember>,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    pub is_abstract: bool,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ClassMember {
    Field(FieldDecl),
    Method(MethodDecl),
    Property(PropertyDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceDecl {
    pub name: String,
    pub methods: Vec<MethodSig>,
    pub parent: Option<String>,
    pub generic_params: Vec<String>,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub return_type: TypeExpr,
    pub name: String,
    pub params: Vec<Param>,
    /// `None` for forward declarations.
    pub body: Option<Block>,
    pub is_gpu: bool,
    pub keep_return: bool,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<FieldDef>,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDecl {
    pub name: String,
    pub values: Vec<EnumValue>,
    pub line: u32,
    pub col: u32,
}

/// An `enum class` declaration whose variants may carry typed payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichEnumDecl {
    pub name: String,
    pub variants: Vec<RichEnumVariant>,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedefDecl {
    pub original: TypeExpr,
    pub alias: String,
    pub line: u32,
    pub col: u32,
}

// ── Class members ──────────────────────────────────────────────────────

/// Member access specifier. `class` members are static.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Access {
    Public,
    Private,
    Class,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Public => write!(f, "public"),
            Access::Private => write!(f, "private"),
            Access::Class => write!(f, "class"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDecl {
    pub access: Access,
    pub ty: TypeExpr,
    pub name: String,
    pub initializer: Option<Expr>,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDecl {
    pub access: Access,
    pub return_type: TypeExpr,
    pub name: String,
    pub params: Vec<Param>,
    /// `None` for abstract methods.
    pub body: Option<Block>,
    pub is_gpu: bool,
    pub is_abstract: bool,
    pub keep_return: bool,
    pub line: u32,
    pub col: u32,
}

/// C#-style property: `type name { get; set; }` with optional bodies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDecl {
    pub access: Access,
    pub ty: TypeExpr,
    pub name: String,
    pub has_getter: bool,
    pub has_setter: bool,
    pub getter_body: Option<Block>,
    pub setter_body: Option<Block>,
    pub line: u32,
    pub col: u32,
}

/// A method signature inside an interface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSig {
    pub return_type: TypeExpr,
    pub name: String,
    pub params: Vec<Param>,
    pub keep_return: bool,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichEnumVariant {
    pub name: String,
    pub params: Vec<Param>,
}

/// A plain C struct field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDef {
    pub ty: TypeExpr,
    pub name: String,
}

// ── Types ──────────────────────────────────────────────────────────────

/// The canonical type reference.
///
/// Equality is structural and position-independent: line/column and the
/// array-size expression are excluded from comparison.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeExpr {
    pub base: String,
    pub generic_args: Vec<TypeExpr>,
    pub pointer_depth: u32,
    pub is_array: bool,
    pub array_size: Option<Box<Expr>>,
    pub is_const: bool,
    pub is_nullable: bool,
    pub line: u32,
    pub col: u32,
}

impl TypeExpr {
    /// A bare named type with no generics, pointers, or qualifiers.
    pub fn named(base: impl Into<String>) -> TypeExpr {
        TypeExpr {
            base: base.into(),
            ..TypeExpr::default()
        }
    }

    /// Builder helper: set generic arguments.
    pub fn with_args(mut self, args: Vec<TypeExpr>) -> TypeExpr {
        self.generic_args = args;
        self
    }

    /// Builder helper: set pointer depth.
    pub fn with_pointer(mut self, depth: u32) -> TypeExpr {
        self.pointer_depth = depth;
        self
    }

    /// Builder helper: mark nullable.
    pub fn nullable(mut self) -> TypeExpr {
        self.is_nullable = true;
        self
    }
}

impl PartialEq for TypeExpr {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
            && self.generic_args == other.generic_args
            && self.pointer_depth == other.pointer_depth
            && self.is_array == other.is_array
            && self.is_const == other.is_const
            && self.is_nullable == other.is_nullable
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if !self.generic_args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.generic_args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ">")?;
        }
        for _ in 0..self.pointer_depth {
            write!(f, "*")?;
        }
        Ok(())
    }
}

/// A function, method, or lambda parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub ty: TypeExpr,
    pub name: String,
    pub default: Option<Expr>,
    pub keep: bool,
    pub line: u32,
    pub col: u32,
}

// ── Statements ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StmtKind {
    VarDecl(VarDeclStmt),
    Return(Option<Expr>),
    If(IfStmt),
    While { condition: Expr, body: Block },
    DoWhile { body: Block, condition: Expr },
    ForIn(ForInStmt),
    CFor(CForStmt),
    ParallelFor(ForInStmt),
    Switch(SwitchStmt),
    Break,
    Continue,
    Expr(Expr),
    Delete(Expr),
    TryCatch(TryCatchStmt),
    Throw(Expr),
    Keep(Expr),
    Release(Expr),
    Block(Block),
}

/// A variable declaration. `ty` is `None` for `var` declarations until
/// the analyzer fills in the inferred type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDeclStmt {
    pub ty: Option<TypeExpr>,
    pub name: String,
    pub initializer: Option<Expr>,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ElseBranch {
    /// A plain `else { ... }` block.
    Else(Block),
    /// An `else if ...` chain; the statement is always an `If`.
    ElseIf(Box<Stmt>),
}

/// `for x in it { }` or `for k, v in it { }`. Also used by `parallel for`
/// (which has no two-variable form; `var_name2` stays `None`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForInStmt {
    pub var_name: String,
    pub var_name2: Option<String>,
    pub iterable: Expr,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CForStmt {
    pub init: Option<ForInit>,
    pub condition: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ForInit {
    Var(VarDeclStmt),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchStmt {
    pub value: Expr,
    pub cases: Vec<CaseClause>,
}

/// A `case expr:` or `default:` clause. `value` is `None` for `default`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseClause {
    pub value: Option<Expr>,
    pub body: Vec<Stmt>,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TryCatchStmt {
    pub try_block: Block,
    pub catch_var: String,
    pub catch_block: Block,
    pub finally_block: Option<Block>,
}

// ── Expressions ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExprKind {
    IntLit { value: i64, raw: String },
    FloatLit { value: f64, raw: String },
    /// Value includes the surrounding quotes, as lexed.
    StringLit { value: String },
    CharLit { value: String },
    BoolLit { value: bool },
    NullLit,
    Ident { name: String },
    SelfRef,
    SuperRef,
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        prefix: bool,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        obj: Box<Expr>,
        index: Box<Expr>,
    },
    FieldAccess {
        obj: Box<Expr>,
        field: String,
        arrow: bool,
        optional: bool,
    },
    Cast {
        target_type: TypeExpr,
        operand: Box<Expr>,
    },
    Sizeof(SizeofArg),
    Ternary {
        condition: Box<Expr>,
        true_expr: Box<Expr>,
        false_expr: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        op: AssignOp,
        value: Box<Expr>,
    },
    ListLit { elements: Vec<Expr> },
    MapLit { entries: Vec<MapEntry> },
    /// C-style brace initializer `{e1, e2, ...}`.
    BraceInit { elements: Vec<Expr> },
    FString { parts: Vec<FStringPart> },
    New {
        ty: TypeExpr,
        args: Vec<Expr>,
    },
    TupleLit { elements: Vec<Expr> },
    Lambda(LambdaExpr),
    Spawn { callee: Box<Expr> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SizeofArg {
    Type(TypeExpr),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapEntry {
    pub key: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FStringPart {
    Text(String),
    Expr(Expr),
}

/// A lambda in either surface form (verbose or arrow). `captures` is
/// populated by the analyzer, never by the parser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LambdaExpr {
    /// Declared return type (verbose form only).
    pub return_type: Option<TypeExpr>,
    pub params: Vec<Param>,
    pub body: LambdaBody,
    pub captures: Vec<Capture>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LambdaBody {
    Block(Block),
    Expr(Box<Expr>),
}

/// An outer variable captured by a lambda.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capture {
    pub name: String,
    pub ty: TypeExpr,
}

// ── Operators ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    NullCoalesce,
}

impl BinaryOp {
    /// Whether the operator yields `bool` regardless of operand types.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Gt
                | BinaryOp::Le
                | BinaryOp::Ge
                | BinaryOp::And
                | BinaryOp::Or
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::NullCoalesce => "??",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `~`
    BitNot,
    /// `-`
    Neg,
    /// `*`
    Deref,
    /// `&`
    AddrOf,
    /// `++`
    Inc,
    /// `--`
    Dec,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::Neg => "-",
            UnaryOp::Deref => "*",
            UnaryOp::AddrOf => "&",
            UnaryOp::Inc => "++",
            UnaryOp::Dec => "--",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Rem => "%=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_expr_equality_ignores_positions() {
        let mut a = TypeExpr::named("Vector").with_args(vec![TypeExpr::named("int")]);
        a.line = 10;
        a.col = 4;
        let b = TypeExpr::named("Vector").with_args(vec![TypeExpr::named("int")]);
        assert_eq!(a, b);
    }

    #[test]
    fn type_expr_equality_is_structural() {
        let a = TypeExpr::named("Map")
            .with_args(vec![TypeExpr::named("string"), TypeExpr::named("int")]);
        let b = TypeExpr::named("Map")
            .with_args(vec![TypeExpr::named("int"), TypeExpr::named("string")]);
        assert_ne!(a, b);
        assert_ne!(TypeExpr::named("int"), TypeExpr::named("int").with_pointer(1));
        assert_ne!(TypeExpr::named("int"), TypeExpr::named("int").nullable());
    }

    #[test]
    fn type_expr_display() {
        let t = TypeExpr::named("Map")
            .with_args(vec![
                TypeExpr::named("string"),
                TypeExpr::named("Vector").with_args(vec![TypeExpr::named("int")]),
            ])
            .with_pointer(1);
        assert_eq!(t.to_string(), "Map<string, Vector<int>>*");
    }

    #[test]
    fn operator_display_round_trip() {
        assert_eq!(BinaryOp::NullCoalesce.to_string(), "??");
        assert_eq!(BinaryOp::Shl.to_string(), "<<");
        assert_eq!(UnaryOp::BitNot.to_string(), "~");
        assert_eq!(AssignOp::Shr.to_string(), ">>=");
    }
}
