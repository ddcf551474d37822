//! Expression checking.
//!
//! [`Checker::check_expr`] computes the type of an expression and records
//! it in the side table against the expression's node. An optional
//! expected type flows downwards from declarations, returns, arguments and
//! fields:
//! - integer literals that fit the expected integer type take that type
//! - an enum variant written without generic arguments adopts the expected
//!   instantiation (`local o: Option<i32> = Option.None;`)
//!
//! The expected type is only a hint. Whether the result is acceptable is
//! decided by the caller, usually through [`Checker::check_assignable`].

mod assignment;
mod binary;
mod calls;
mod cast;
mod composite;
mod identifiers;
mod literals;
mod matching;
mod member;
mod ternary;

use bpl_ast::{Expr, TypeExpr};
use bpl_core::{BasicType, DeclRef, ScopeId, SemanticError, SemanticResult, Span, Type};

use crate::checker::Checker;
use crate::conversion::{integer_constant_value, is_assignable, literal_fits};
use crate::scope::{Symbol, SymbolKind, SymbolTarget};
use crate::type_resolver::TypeResolver;

impl<'ast> Checker<'ast> {
    /// Check `expr`, record its type, and return it.
    pub(crate) fn check_expr(&mut self, expr: &Expr<'ast>, expected: Option<&Type>) -> SemanticResult<Type> {
        let ty = match *expr {
            Expr::Literal(lit) => Ok(self.check_literal(lit, expected)),
            Expr::Ident(ident) => self.check_identifier(ident),
            Expr::Binary(binary) => self.check_binary(binary),
            Expr::Unary(unary) => self.check_unary(unary, expected),
            Expr::Call(call) => self.check_call(call, expected),
            Expr::Member(member) => self.check_member(member, expected),
            Expr::Index(index) => self.check_index(index),
            Expr::ArrayLiteral(array) => self.check_array_literal(array, expected),
            Expr::StructLiteral(lit) => self.check_struct_literal(lit, expected),
            Expr::TupleLiteral(tuple) => self.check_tuple_literal(tuple, expected),
            Expr::EnumStructVariant(lit) => self.check_enum_struct_variant(lit, expected),
            Expr::Cast(cast) => self.check_cast(cast),
            Expr::Sizeof(sizeof) => self.check_sizeof(sizeof),
            Expr::Match(match_expr) => self.check_match(match_expr, expected),
            Expr::Assign(assign) => self.check_assign(assign),
            Expr::Ternary(ternary) => self.check_ternary(ternary, expected),
            Expr::GenericInstantiation(inst) => self.check_generic_instantiation(inst),
            Expr::Is(is_expr) => self.check_is(is_expr),
            Expr::As(as_expr) => self.check_as(as_expr),
        }?;
        self.record(expr.id(), &ty);
        Ok(ty)
    }

    /// Check that a value of type `actual` produced by `value` may be
    /// stored where `target` is expected.
    ///
    /// An integer constant is accepted by any integer type whose range
    /// holds it and is an overflow error otherwise. Anything else must be
    /// compatible or widen to `target`; `mismatch` builds the error when it
    /// does neither.
    pub(crate) fn check_assignable(
        &self,
        target: &Type,
        actual: &Type,
        value: &Expr<'_>,
        mismatch: impl FnOnce() -> SemanticError,
    ) -> SemanticResult<()> {
        if is_integer_scalar(target) {
            if let Some(constant) = integer_constant_value(value) {
                if literal_fits(constant, target) {
                    return Ok(());
                }
                return Err(SemanticError::IntegerOverflow {
                    value: constant.to_string(),
                    target: target.to_string(),
                    span: value.span(),
                });
            }
        }
        if is_assignable(&self.ctx, target, actual) {
            Ok(())
        } else {
            Err(mismatch())
        }
    }

    /// The value a symbol denotes when named in an expression, and the
    /// declaration it refers to.
    ///
    /// `scope` is where type aliases are resolved; it differs from the
    /// current scope for namespace members.
    pub(crate) fn symbol_value(
        &self,
        symbol: &Symbol,
        scope: ScopeId,
        span: Span,
    ) -> SemanticResult<(Type, Option<DeclRef>)> {
        match (symbol.kind, symbol.target) {
            (SymbolKind::Module, SymbolTarget::Module(module)) => Ok((Type::Module(module), None)),
            (SymbolKind::Struct | SymbolKind::Enum | SymbolKind::Spec, target) => {
                let ty = symbol
                    .ty
                    .clone()
                    .unwrap_or_else(|| Type::named(symbol.name.clone()));
                let decl = match target {
                    SymbolTarget::Type(decl) => Some(DeclRef::Type(decl)),
                    _ => None,
                };
                Ok((Type::Meta(Box::new(ty)), decl))
            }
            (SymbolKind::TypeAlias, _) => {
                let resolver = TypeResolver::new(&self.ctx, scope);
                let ty = resolver.resolve(&Type::named(symbol.name.clone()), span)?;
                Ok((Type::Meta(Box::new(ty)), None))
            }
            (SymbolKind::Function, _) => {
                let ty = symbol.ty.clone().ok_or_else(|| untyped(symbol, span))?;
                let decl = match (&ty, symbol.overloads.is_empty()) {
                    (Type::Function(signature), true) => signature.decl.map(DeclRef::Function),
                    _ => None,
                };
                Ok((ty, decl))
            }
            (_, target) => {
                let ty = symbol.ty.clone().ok_or_else(|| untyped(symbol, span))?;
                let decl = match target {
                    SymbolTarget::Variable(node) => Some(DeclRef::Variable(node)),
                    _ => None,
                };
                Ok((ty, decl))
            }
        }
    }

    /// Resolve explicit generic arguments, returning them canonical and as
    /// written.
    pub(crate) fn explicit_generics(
        &mut self,
        args: &[TypeExpr<'_>],
    ) -> SemanticResult<(Vec<Type>, Vec<Type>)> {
        let written = args.iter().map(TypeResolver::raw).collect();
        let mut resolved = Vec::with_capacity(args.len());
        for arg in args {
            resolved.push(self.resolve_type_expr(arg)?);
        }
        Ok((resolved, written))
    }

    /// Check each argument without an expected type.
    pub(crate) fn check_args(&mut self, args: &[Expr<'ast>]) -> SemanticResult<Vec<Type>> {
        args.iter().map(|arg| self.check_expr(arg, None)).collect()
    }
}

/// An integer type that is neither a pointer nor an array.
pub(crate) fn is_integer_scalar(ty: &Type) -> bool {
    ty.as_basic().is_some_and(BasicType::is_scalar) && ty.is_integer()
}

/// A scalar value of an enum type.
pub(crate) fn enum_basic(ty: &Type) -> Option<&BasicType> {
    ty.as_basic()
        .filter(|b| b.is_scalar() && matches!(b.decl, Some(bpl_core::TypeDecl::Enum(_))))
}

fn untyped(symbol: &Symbol, span: Span) -> SemanticError {
    SemanticError::undefined_with(
        symbol.name.clone(),
        format!("Symbol '{}' has no type", symbol.name),
        span,
    )
}
