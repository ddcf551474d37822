//! Type resolution for converting syntactic type references to canonical types.
//!
//! This module provides [`TypeResolver`], which turns an AST [`TypeExpr`] (or
//! a not-yet-canonical [`Type`]) into a canonical [`Type`] by looking names
//! up in a scope.
//!
//! ## Features
//!
//! - Builtin names resolve through their alias to the base type (`int` → `i32`)
//! - Struct, enum, and spec names get their declaration attached
//! - User aliases are expanded and the use site's pointer depth, array
//!   dimensions, and generic arguments are merged onto the alias's shape
//! - Generic argument counts and constraints are validated
//! - Namespaced names (`ns.Point`) resolve through module symbols
//!
//! Resolution is idempotent: a canonical type resolves to itself.

use bpl_ast::TypeExpr;
use bpl_core::{BasicType, FunctionType, ScopeId, SemanticError, SemanticResult, Span, Type};

use crate::context::SemanticContext;
use crate::scope::{Symbol, SymbolTarget};
use crate::template::{build_type_map, check_constraints, substitute};

/// Alias expansions followed before a chain is reported as recursive.
const MAX_ALIAS_DEPTH: usize = 100;

/// Resolves types against one scope of a [`SemanticContext`].
pub struct TypeResolver<'a, 'ast> {
    ctx: &'a SemanticContext<'ast>,
    scope: ScopeId,
}

impl<'a, 'ast> TypeResolver<'a, 'ast> {
    pub fn new(ctx: &'a SemanticContext<'ast>, scope: ScopeId) -> Self {
        Self { ctx, scope }
    }

    /// Translate a type expression into a [`Type`] without resolving names.
    pub fn raw(type_expr: &TypeExpr<'_>) -> Type {
        match type_expr {
            TypeExpr::Named(named) => Type::Basic(BasicType {
                name: named.name.to_string(),
                pointer_depth: named.pointer_depth,
                array_dims: named.array_dims.to_vec(),
                generic_args: named.generic_args.iter().map(Self::raw).collect(),
                decl: None,
            }),
            TypeExpr::Tuple(tuple) => Type::Tuple(tuple.types.iter().map(Self::raw).collect()),
            TypeExpr::Function(func) => Type::Function(FunctionType {
                params: func.params.iter().map(Self::raw).collect(),
                ret: Box::new(Self::raw(&func.ret)),
                is_variadic: func.is_variadic,
                decl: None,
            }),
        }
    }

    /// Resolve a type expression as written in source.
    pub fn resolve_expr(&self, type_expr: &TypeExpr<'_>) -> SemanticResult<Type> {
        self.resolve(&Self::raw(type_expr), type_expr.span())
    }

    /// Canonicalize `ty`. Errors are reported at `span`.
    pub fn resolve(&self, ty: &Type, span: Span) -> SemanticResult<Type> {
        self.resolve_at_depth(ty, span, 0)
    }

    fn resolve_at_depth(&self, ty: &Type, span: Span, depth: usize) -> SemanticResult<Type> {
        match ty {
            Type::Basic(basic) => self.resolve_basic(basic, span, depth),
            Type::Function(func) => Ok(Type::Function(FunctionType {
                params: func
                    .params
                    .iter()
                    .map(|p| self.resolve_at_depth(p, span, depth))
                    .collect::<SemanticResult<_>>()?,
                ret: Box::new(self.resolve_at_depth(&func.ret, span, depth)?),
                is_variadic: func.is_variadic,
                decl: func.decl,
            })),
            Type::Tuple(types) => Ok(Type::Tuple(
                types
                    .iter()
                    .map(|t| self.resolve_at_depth(t, span, depth))
                    .collect::<SemanticResult<_>>()?,
            )),
            Type::Module(scope) => Ok(Type::Module(*scope)),
            Type::Meta(inner) => Ok(Type::Meta(Box::new(self.resolve_at_depth(inner, span, depth)?))),
        }
    }

    fn resolve_basic(&self, basic: &BasicType, span: Span, depth: usize) -> SemanticResult<Type> {
        if basic.decl.is_some() {
            return Ok(Type::Basic(basic.clone()));
        }
        if depth > MAX_ALIAS_DEPTH {
            return Err(SemanticError::type_mismatch(
                format!("Type alias '{}' is recursive", basic.name),
                "Break the cycle between the alias definitions.",
                span,
            ));
        }

        let symbol = self.lookup_type(&basic.name).ok_or_else(|| self.unknown(&basic.name, span))?;

        let args = basic
            .generic_args
            .iter()
            .map(|arg| self.resolve_at_depth(arg, span, depth))
            .collect::<SemanticResult<Vec<_>>>()?;

        match symbol.target {
            SymbolTarget::Type(decl) => {
                let params = self.ctx.type_generic_params(decl);
                if !args.is_empty() {
                    if args.len() != params.len() {
                        return Err(SemanticError::arity(
                            format!(
                                "Generic type '{}' expects {} arguments, but got {}",
                                basic.name,
                                params.len(),
                                args.len()
                            ),
                            "Provide the correct number of generic arguments.",
                            span,
                        ));
                    }
                    check_constraints(self.ctx, params, &args, &basic.generic_args, span)?;
                }
                Ok(Type::Basic(BasicType {
                    name: self.ctx.type_name(decl).to_string(),
                    pointer_depth: basic.pointer_depth,
                    array_dims: basic.array_dims.clone(),
                    generic_args: args,
                    decl: Some(decl),
                }))
            }
            SymbolTarget::Builtin => {
                let target = symbol.ty.clone().unwrap_or_else(Type::void);
                if target.name() == Some(basic.name.as_str()) {
                    return Ok(Type::Basic(BasicType {
                        generic_args: args,
                        ..basic.clone()
                    }));
                }
                let base = self.resolve_at_depth(&target, span, depth + 1)?;
                merge(base, basic, args, span)
            }
            SymbolTarget::Alias(id) => {
                let alias = self.ctx.alias(id);
                let inner = TypeResolver::new(self.ctx, alias.scope);
                if alias.generic_params.is_empty() {
                    let base = inner.resolve_at_depth(&alias.target, span, depth + 1)?;
                    return merge(base, basic, args, span);
                }
                if args.len() != alias.generic_params.len() {
                    return Err(SemanticError::arity(
                        format!(
                            "Generic type alias '{}' expects {} arguments, but got {}",
                            alias.name,
                            alias.generic_params.len(),
                            args.len()
                        ),
                        "Provide the correct number of generic arguments.",
                        span,
                    ));
                }
                check_constraints(self.ctx, &alias.generic_params, &args, &basic.generic_args, span)?;
                let expanded = substitute(&alias.target, &build_type_map(&alias.generic_params, &args));
                let base = inner.resolve_at_depth(&expanded, span, depth + 1)?;
                merge(base, basic, Vec::new(), span)
            }
            SymbolTarget::GenericParam(..) => Ok(Type::Basic(BasicType {
                generic_args: args,
                ..basic.clone()
            })),
            SymbolTarget::Function | SymbolTarget::Variable(_) | SymbolTarget::Module(_) => {
                Err(self.unknown(&basic.name, span))
            }
        }
    }

    /// Find the symbol a type name refers to, following `ns.Name` through
    /// namespace scopes.
    pub fn lookup_type(&self, name: &str) -> Option<&'a Symbol> {
        let scopes = &self.ctx.scopes;
        let Some((namespace, rest)) = name.split_once('.') else {
            return scopes.resolve(self.scope, name).filter(|s| s.is_type());
        };

        let mut current = match scopes.resolve(self.scope, namespace)?.target {
            SymbolTarget::Module(scope) => scope,
            _ => return None,
        };
        let mut remaining = rest;
        loop {
            match remaining.split_once('.') {
                Some((head, tail)) => {
                    current = match scopes.get_local(current, head)?.target {
                        SymbolTarget::Module(scope) => scope,
                        _ => return None,
                    };
                    remaining = tail;
                }
                None => return scopes.get_local(current, remaining).filter(|s| s.is_type()),
            }
        }
    }

    fn unknown(&self, name: &str, span: Span) -> SemanticError {
        SemanticError::UndefinedSymbol {
            name: name.to_string(),
            message: format!("Unknown type '{}'", name),
            suggestion: self.ctx.scopes.find_similar(self.scope, name),
            span,
        }
    }
}

/// Apply a use site's decorations to an alias's resolved shape.
fn merge(base: Type, use_site: &BasicType, args: Vec<Type>, span: Span) -> SemanticResult<Type> {
    match base {
        Type::Basic(mut shape) => {
            shape.pointer_depth += use_site.pointer_depth;
            shape.array_dims.extend(use_site.array_dims.iter().copied());
            shape.generic_args.extend(args);
            Ok(Type::Basic(shape))
        }
        other if use_site.is_scalar() && args.is_empty() => Ok(other),
        other => Err(SemanticError::unsupported(
            format!(
                "Cannot apply pointer, array, or generic modifiers to '{}' ({})",
                use_site.name, other
            ),
            "Only named types accept modifiers; wrap the type in a struct instead.",
            span,
        )),
    }
}
