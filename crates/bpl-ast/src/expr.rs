//! Expression nodes.
//!
//! Every node carries a [`NodeId`] for the checker's side table and the
//! [`Span`] it was parsed from. Child nodes are arena references.

use bpl_core::{NodeId, Span};

use crate::{AssignOp, BinaryOp, Block, Ident, TypeExpr, UnaryOp};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    Literal(&'ast LiteralExpr<'ast>),
    Ident(&'ast IdentExpr<'ast>),
    Binary(&'ast BinaryExpr<'ast>),
    Unary(&'ast UnaryExpr<'ast>),
    Call(&'ast CallExpr<'ast>),
    Member(&'ast MemberExpr<'ast>),
    Index(&'ast IndexExpr<'ast>),
    ArrayLiteral(&'ast ArrayLiteralExpr<'ast>),
    StructLiteral(&'ast StructLiteralExpr<'ast>),
    TupleLiteral(&'ast TupleLiteralExpr<'ast>),
    /// `Enum.Variant { field: value }`
    EnumStructVariant(&'ast EnumStructVariantExpr<'ast>),
    /// `cast<T>(expr)`
    Cast(&'ast CastExpr<'ast>),
    Sizeof(&'ast SizeofExpr<'ast>),
    Match(&'ast MatchExpr<'ast>),
    Assign(&'ast AssignExpr<'ast>),
    Ternary(&'ast TernaryExpr<'ast>),
    /// `name<T, U>` used as a value.
    GenericInstantiation(&'ast GenericInstantiationExpr<'ast>),
    Is(&'ast IsExpr<'ast>),
    As(&'ast AsExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    pub fn id(&self) -> NodeId {
        match self {
            Self::Literal(e) => e.id,
            Self::Ident(e) => e.id,
            Self::Binary(e) => e.id,
            Self::Unary(e) => e.id,
            Self::Call(e) => e.id,
            Self::Member(e) => e.id,
            Self::Index(e) => e.id,
            Self::ArrayLiteral(e) => e.id,
            Self::StructLiteral(e) => e.id,
            Self::TupleLiteral(e) => e.id,
            Self::EnumStructVariant(e) => e.id,
            Self::Cast(e) => e.id,
            Self::Sizeof(e) => e.id,
            Self::Match(e) => e.id,
            Self::Assign(e) => e.id,
            Self::Ternary(e) => e.id,
            Self::GenericInstantiation(e) => e.id,
            Self::Is(e) => e.id,
            Self::As(e) => e.id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Call(e) => e.span,
            Self::Member(e) => e.span,
            Self::Index(e) => e.span,
            Self::ArrayLiteral(e) => e.span,
            Self::StructLiteral(e) => e.span,
            Self::TupleLiteral(e) => e.span,
            Self::EnumStructVariant(e) => e.span,
            Self::Cast(e) => e.span,
            Self::Sizeof(e) => e.span,
            Self::Match(e) => e.span,
            Self::Assign(e) => e.span,
            Self::Ternary(e) => e.span,
            Self::GenericInstantiation(e) => e.span,
            Self::Is(e) => e.span,
            Self::As(e) => e.span,
        }
    }
}

/// The kind of literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// Integer or floating literal; the value is the raw text.
    Number,
    String,
    Char,
    Bool(bool),
    Null,
    Nullptr,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub id: NodeId,
    pub kind: LiteralKind,
    /// Source text of the literal (without quotes for strings and chars).
    pub raw: &'ast str,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentExpr<'ast> {
    pub id: NodeId,
    pub name: &'ast str,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub id: NodeId,
    pub left: Expr<'ast>,
    pub op: BinaryOp,
    pub right: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub id: NodeId,
    pub op: UnaryOp,
    pub operand: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub id: NodeId,
    pub callee: Expr<'ast>,
    pub args: &'ast [Expr<'ast>],
    /// Explicit generic arguments, `f<T>(..)`.
    pub generic_args: &'ast [TypeExpr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberExpr<'ast> {
    pub id: NodeId,
    pub object: Expr<'ast>,
    /// Field, method, variant, or tuple index (`t.0`).
    pub property: Ident<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    pub id: NodeId,
    pub object: Expr<'ast>,
    pub index: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayLiteralExpr<'ast> {
    pub id: NodeId,
    pub elements: &'ast [Expr<'ast>],
    pub span: Span,
}

/// `name: value` inside a struct or enum-struct literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldInit<'ast> {
    pub name: Ident<'ast>,
    pub value: Expr<'ast>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructLiteralExpr<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub generic_args: &'ast [TypeExpr<'ast>],
    pub fields: &'ast [FieldInit<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TupleLiteralExpr<'ast> {
    pub id: NodeId,
    pub elements: &'ast [Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnumStructVariantExpr<'ast> {
    pub id: NodeId,
    pub enum_name: Ident<'ast>,
    pub variant: Ident<'ast>,
    pub fields: &'ast [FieldInit<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastExpr<'ast> {
    pub id: NodeId,
    pub target: TypeExpr<'ast>,
    pub expr: Expr<'ast>,
    pub span: Span,
}

/// What `sizeof` measures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeofTarget<'ast> {
    Type(TypeExpr<'ast>),
    Expr(Expr<'ast>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeofExpr<'ast> {
    pub id: NodeId,
    pub target: SizeofTarget<'ast>,
    pub span: Span,
}

/// `match (value) { pattern if guard => body, ... }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchExpr<'ast> {
    pub id: NodeId,
    pub value: Expr<'ast>,
    pub arms: &'ast [MatchArm<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchArm<'ast> {
    pub id: NodeId,
    pub pattern: Pattern<'ast>,
    pub guard: Option<Expr<'ast>>,
    pub body: ArmBody<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArmBody<'ast> {
    Expr(Expr<'ast>),
    Block(&'ast Block<'ast>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pattern<'ast> {
    pub id: NodeId,
    pub kind: PatternKind<'ast>,
    pub span: Span,
}

/// `field: binding` inside an enum-struct pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBinding<'ast> {
    pub field: Ident<'ast>,
    pub binding: Ident<'ast>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatternKind<'ast> {
    /// `_`
    Wildcard,
    Literal(&'ast LiteralExpr<'ast>),
    /// Binds the whole value to a name.
    Binding {
        name: Ident<'ast>,
        ty: Option<TypeExpr<'ast>>,
    },
    /// `Enum.Variant`
    Enum {
        enum_name: Ident<'ast>,
        variant: Ident<'ast>,
        generic_args: &'ast [TypeExpr<'ast>],
    },
    /// `Enum.Variant(a, b)`
    EnumTuple {
        enum_name: Ident<'ast>,
        variant: Ident<'ast>,
        generic_args: &'ast [TypeExpr<'ast>],
        bindings: &'ast [Ident<'ast>],
    },
    /// `Enum.Variant { x: a, y: b }`
    EnumStruct {
        enum_name: Ident<'ast>,
        variant: Ident<'ast>,
        generic_args: &'ast [TypeExpr<'ast>],
        fields: &'ast [FieldBinding<'ast>],
    },
}

impl<'ast> PatternKind<'ast> {
    /// The variant named by an enum pattern.
    pub fn variant(&self) -> Option<Ident<'ast>> {
        match self {
            PatternKind::Enum { variant, .. }
            | PatternKind::EnumTuple { variant, .. }
            | PatternKind::EnumStruct { variant, .. } => Some(*variant),
            _ => None,
        }
    }

    /// Whether the pattern matches every value.
    pub fn is_catch_all(&self) -> bool {
        matches!(self, PatternKind::Wildcard | PatternKind::Binding { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    pub id: NodeId,
    pub target: Expr<'ast>,
    pub op: AssignOp,
    pub value: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TernaryExpr<'ast> {
    pub id: NodeId,
    pub condition: Expr<'ast>,
    pub then_expr: Expr<'ast>,
    pub else_expr: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenericInstantiationExpr<'ast> {
    pub id: NodeId,
    pub base: Expr<'ast>,
    pub generic_args: &'ast [TypeExpr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsExpr<'ast> {
    pub id: NodeId,
    pub expr: Expr<'ast>,
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsExpr<'ast> {
    pub id: NodeId,
    pub expr: Expr<'ast>,
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}
