//! Syntactic type references.
//!
//! A [`TypeExpr`] is what the programmer wrote; the checker resolves it into
//! a semantic [`bpl_core::Type`] and records the result against the node's
//! [`NodeId`].

use bpl_core::{NodeId, Span};

/// A type as written in source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeExpr<'ast> {
    /// `**Name<Args>[N][]`
    Named(&'ast NamedType<'ast>),
    /// `(A, B)`
    Tuple(&'ast TupleType<'ast>),
    /// `Func<R>(A, B)`
    Function(&'ast FunctionTypeExpr<'ast>),
}

impl<'ast> TypeExpr<'ast> {
    pub fn id(&self) -> NodeId {
        match self {
            TypeExpr::Named(t) => t.id,
            TypeExpr::Tuple(t) => t.id,
            TypeExpr::Function(t) => t.id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Named(t) => t.span,
            TypeExpr::Tuple(t) => t.span,
            TypeExpr::Function(t) => t.span,
        }
    }

    pub fn as_named(&self) -> Option<&'ast NamedType<'ast>> {
        match self {
            TypeExpr::Named(t) => Some(t),
            _ => None,
        }
    }
}

/// A named type with optional generic arguments, pointer depth, and array
/// dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedType<'ast> {
    pub id: NodeId,
    pub name: &'ast str,
    pub generic_args: &'ast [TypeExpr<'ast>],
    pub pointer_depth: u32,
    /// Outermost first; `None` is an unsized `[]`.
    pub array_dims: &'ast [Option<u64>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TupleType<'ast> {
    pub id: NodeId,
    pub types: &'ast [TypeExpr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionTypeExpr<'ast> {
    pub id: NodeId,
    pub params: &'ast [TypeExpr<'ast>],
    pub ret: TypeExpr<'ast>,
    pub is_variadic: bool,
    pub span: Span,
}
