//! Core types shared by the BPL semantic analyzer.
//!
//! This crate provides the vocabulary every other crate speaks:
//!
//! - [`Span`] for source locations
//! - typed indices ([`NodeId`], [`StructId`], [`FunctionId`], ...)
//! - the semantic [`Type`] model and builtin primitive tables
//! - the [`SemanticError`] taxonomy and the [`Diagnostics`] collector

pub mod diagnostics;
pub mod error;
pub mod ids;
pub mod span;
pub mod types;

pub use diagnostics::{Diagnostic, Diagnostics, Severity, SourceLocation};
pub use error::{ErrorKind, SemanticError, SemanticResult};
pub use ids::{
    AliasId, DeclRef, EnumId, FunctionId, ModuleId, NodeId, ScopeId, SpecId, StructId, TypeDecl,
};
pub use span::Span;
pub use types::{ArrayDim, BasicType, FunctionType, Type, primitives};
