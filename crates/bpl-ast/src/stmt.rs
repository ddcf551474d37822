//! Statement AST nodes.
//!
//! Provides nodes for:
//! - Variable declarations, including tuple destructuring
//! - Control flow (if, loop, switch)
//! - Jump statements (return, break, continue, throw)
//! - Exception handling (try-catch)
//! - Blocks and inline assembly
//!
//! Declarations that may appear at module level (functions, structs, imports
//! and so on) are also statements; their nodes live in [`crate::decl`].

use bpl_core::{NodeId, Span};

use crate::decl::{
    EnumDecl, ExportStmt, ExternDecl, FunctionDecl, ImportStmt, SpecDecl, StructDecl,
    TypeAliasDecl,
};
use crate::{Expr, Ident, TypeExpr};

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    VarDecl(&'ast VarDecl<'ast>),
    Function(&'ast FunctionDecl<'ast>),
    Struct(&'ast StructDecl<'ast>),
    Spec(&'ast SpecDecl<'ast>),
    Enum(&'ast EnumDecl<'ast>),
    TypeAlias(&'ast TypeAliasDecl<'ast>),
    Block(&'ast Block<'ast>),
    If(&'ast IfStmt<'ast>),
    Loop(&'ast LoopStmt<'ast>),
    Return(&'ast ReturnStmt<'ast>),
    Break(&'ast BreakStmt),
    Continue(&'ast ContinueStmt),
    Expr(&'ast ExprStmt<'ast>),
    Import(&'ast ImportStmt<'ast>),
    Export(&'ast ExportStmt<'ast>),
    Extern(&'ast ExternDecl<'ast>),
    Asm(&'ast AsmStmt<'ast>),
    Try(&'ast TryStmt<'ast>),
    Throw(&'ast ThrowStmt<'ast>),
    Switch(&'ast SwitchStmt<'ast>),
}

impl<'ast> Stmt<'ast> {
    pub fn id(&self) -> NodeId {
        match self {
            Self::VarDecl(s) => s.id,
            Self::Function(s) => s.id,
            Self::Struct(s) => s.id,
            Self::Spec(s) => s.id,
            Self::Enum(s) => s.id,
            Self::TypeAlias(s) => s.id,
            Self::Block(s) => s.id,
            Self::If(s) => s.id,
            Self::Loop(s) => s.id,
            Self::Return(s) => s.id,
            Self::Break(s) => s.id,
            Self::Continue(s) => s.id,
            Self::Expr(s) => s.id,
            Self::Import(s) => s.id,
            Self::Export(s) => s.id,
            Self::Extern(s) => s.id,
            Self::Asm(s) => s.id,
            Self::Try(s) => s.id,
            Self::Throw(s) => s.id,
            Self::Switch(s) => s.id,
        }
    }

    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::VarDecl(s) => s.span,
            Self::Function(s) => s.span,
            Self::Struct(s) => s.span,
            Self::Spec(s) => s.span,
            Self::Enum(s) => s.span,
            Self::TypeAlias(s) => s.span,
            Self::Block(s) => s.span,
            Self::If(s) => s.span,
            Self::Loop(s) => s.span,
            Self::Return(s) => s.span,
            Self::Break(s) => s.span,
            Self::Continue(s) => s.span,
            Self::Expr(s) => s.span,
            Self::Import(s) => s.span,
            Self::Export(s) => s.span,
            Self::Extern(s) => s.span,
            Self::Asm(s) => s.span,
            Self::Try(s) => s.span,
            Self::Throw(s) => s.span,
            Self::Switch(s) => s.span,
        }
    }
}

/// `{ stmts }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    pub id: NodeId,
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

/// A variable declaration.
///
/// Examples:
/// - `local x: i32 = 1;`
/// - `global const name = "bpl";`
/// - `local (a: int, b: int) = pair;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDecl<'ast> {
    pub id: NodeId,
    pub is_global: bool,
    pub is_const: bool,
    pub target: VarTarget<'ast>,
    pub ty: Option<TypeExpr<'ast>>,
    pub init: Option<Expr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarTarget<'ast> {
    Single(Ident<'ast>),
    Destructure(&'ast [DestructureItem<'ast>]),
}

/// One name in a destructuring declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestructureItem<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub ty: Option<TypeExpr<'ast>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub id: NodeId,
    pub condition: Expr<'ast>,
    pub then_branch: &'ast Block<'ast>,
    /// A block or a chained `if`.
    pub else_branch: Option<Stmt<'ast>>,
    pub span: Span,
}

/// `loop { }` or `loop (cond) { }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopStmt<'ast> {
    pub id: NodeId,
    pub condition: Option<Expr<'ast>>,
    pub body: &'ast Block<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    pub id: NodeId,
    pub value: Option<Expr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakStmt {
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinueStmt {
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    pub id: NodeId,
    pub expr: Expr<'ast>,
    pub span: Span,
}

/// Inline assembly, passed through unchecked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsmStmt<'ast> {
    pub id: NodeId,
    pub content: &'ast str,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TryStmt<'ast> {
    pub id: NodeId,
    pub body: &'ast Block<'ast>,
    pub catches: &'ast [CatchClause<'ast>],
    /// `catchOther { }`
    pub catch_other: Option<&'ast Block<'ast>>,
    pub span: Span,
}

/// `catch (name: Type) { }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatchClause<'ast> {
    pub id: NodeId,
    pub variable: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    pub body: &'ast Block<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowStmt<'ast> {
    pub id: NodeId,
    pub value: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchStmt<'ast> {
    pub id: NodeId,
    pub value: Expr<'ast>,
    pub cases: &'ast [SwitchCase<'ast>],
    pub default: Option<&'ast Block<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchCase<'ast> {
    pub id: NodeId,
    pub value: Expr<'ast>,
    pub body: &'ast Block<'ast>,
    pub span: Span,
}
