//! Declaration AST nodes.
//!
//! Provides nodes for:
//! - Functions, methods, and extern signatures
//! - Structs, specs (interfaces), and enums
//! - Type aliases
//! - Imports and exports

use bpl_core::{NodeId, Span};

use crate::{Block, Ident, Stmt, TypeExpr};

/// `T` or `T: Constraint` in a generic parameter list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenericParam<'ast> {
    pub name: Ident<'ast>,
    pub constraint: Option<TypeExpr<'ast>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    pub is_const: bool,
    pub span: Span,
}

/// A function or method (`frame name<T>(params) ret R { body }`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    /// Static methods have no implicit `this`.
    pub is_static: bool,
    pub generic_params: &'ast [GenericParam<'ast>],
    pub params: &'ast [Param<'ast>],
    /// `None` means `void`.
    pub ret: Option<TypeExpr<'ast>>,
    pub body: &'ast Block<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub generic_params: &'ast [GenericParam<'ast>],
    /// First entry may be the parent struct; the rest are specs.
    pub parents: &'ast [TypeExpr<'ast>],
    pub members: &'ast [StructMember<'ast>],
    pub span: Span,
}

impl<'ast> StructDecl<'ast> {
    pub fn fields(&self) -> impl Iterator<Item = &'ast FieldDecl<'ast>> + 'ast {
        let members = self.members;
        members.iter().filter_map(|m| match m {
            StructMember::Field(f) => Some(*f),
            StructMember::Method(_) => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &'ast FunctionDecl<'ast>> + 'ast {
        let members = self.members;
        members.iter().filter_map(|m| match m {
            StructMember::Method(f) => Some(*f),
            StructMember::Field(_) => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StructMember<'ast> {
    Field(&'ast FieldDecl<'ast>),
    Method(&'ast FunctionDecl<'ast>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}

/// An interface-like contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub generic_params: &'ast [GenericParam<'ast>],
    /// Parent specs.
    pub parents: &'ast [TypeExpr<'ast>],
    pub methods: &'ast [SpecMethod<'ast>],
    pub span: Span,
}

/// A required method signature inside a spec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecMethod<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub generic_params: &'ast [GenericParam<'ast>],
    pub params: &'ast [Param<'ast>],
    pub ret: Option<TypeExpr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnumDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub generic_params: &'ast [GenericParam<'ast>],
    pub variants: &'ast [EnumVariant<'ast>],
    pub methods: &'ast [FunctionDecl<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnumVariant<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub data: VariantData<'ast>,
    pub span: Span,
}

/// Payload carried by an enum variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariantData<'ast> {
    Unit,
    Tuple(&'ast [TypeExpr<'ast>]),
    Struct(&'ast [VariantField<'ast>]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantField<'ast> {
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
}

/// `type Name<T> = Target;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeAliasDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub generic_params: &'ast [GenericParam<'ast>],
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}

/// `extern name(params, ...) ret R;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExternDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub params: &'ast [Param<'ast>],
    pub is_variadic: bool,
    pub ret: Option<TypeExpr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportStmt<'ast> {
    pub id: NodeId,
    pub kind: ImportKind<'ast>,
    /// The path as written, e.g. `"std/io"` or `"./util.x"`.
    pub source: &'ast str,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImportKind<'ast> {
    /// `import * as ns from "m"`
    Namespace(Ident<'ast>),
    /// `import * from "m"`
    All,
    /// `import a, b as c from "m"`
    Items(&'ast [ImportItem<'ast>]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportItem<'ast> {
    pub name: Ident<'ast>,
    pub alias: Option<Ident<'ast>>,
}

impl<'ast> ImportItem<'ast> {
    /// The name the item is bound to locally.
    pub fn local_name(&self) -> &'ast str {
        self.alias.unwrap_or(self.name).name
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportStmt<'ast> {
    pub id: NodeId,
    pub items: &'ast [Ident<'ast>],
    pub span: Span,
}

/// A parsed source file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Program<'ast> {
    /// Path the program was loaded from; used for diagnostics and relative
    /// imports.
    pub file: &'ast str,
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}
