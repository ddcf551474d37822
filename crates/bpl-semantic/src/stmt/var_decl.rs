//! Variable declaration checking.
//!
//! Handles `local`/`global` declarations with a single name, with or without
//! a type annotation, and tuple destructuring.

use bpl_ast::{DestructureItem, Ident, VarDecl, VarTarget};
use bpl_core::{DeclRef, NodeId, SemanticError, SemanticResult, Span, Type};

use crate::checker::Checker;
use crate::conversion::is_assignable;
use crate::scope::{Symbol, SymbolKind, SymbolTarget};

impl<'ast> Checker<'ast> {
    pub(crate) fn check_var_decl(&mut self, decl: &'ast VarDecl<'ast>) -> SemanticResult<()> {
        match decl.target {
            VarTarget::Single(name) => self.check_single_decl(decl, name),
            VarTarget::Destructure(items) => self.check_destructure(decl, items),
        }
    }

    fn check_single_decl(&mut self, decl: &'ast VarDecl<'ast>, name: Ident<'ast>) -> SemanticResult<()> {
        self.ensure_not_redeclared(name)?;

        let declared = match &decl.ty {
            Some(ty) => Some(self.resolve_type_expr(ty)?),
            None => None,
        };

        let ty = match (declared, &decl.init) {
            (Some(declared), Some(init)) => {
                let actual = self.check_expr(init, Some(&declared));
                // Keep the name usable by later statements even when the
                // initializer is broken.
                let actual = match actual {
                    Ok(actual) => actual,
                    Err(err) => {
                        self.bind_variable(name, &declared, decl.is_const, decl.id)?;
                        return Err(err);
                    }
                };
                self.check_assignable(&declared, &actual, init, || {
                    SemanticError::type_mismatch(
                        format!("Type mismatch: cannot assign {} to {}", actual, declared),
                        "Ensure the initializer type matches the declared type.",
                        init.span(),
                    )
                })?;
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(init)) => {
                let actual = self.check_expr(init, None)?;
                self.inferable(&actual, name.name, init.span())?;
                actual
            }
            (None, None) => {
                return Err(SemanticError::type_mismatch(
                    format!("Cannot infer type for variable '{}'", name.name),
                    "Either provide a type annotation or an initializer.",
                    decl.span,
                ));
            }
        };

        self.bind_variable(name, &ty, decl.is_const, decl.id)
    }

    /// `local (a: A, b) = init;`
    ///
    /// With a tuple initializer each name takes its annotation or the
    /// matching element type. `_` binds nothing.
    fn check_destructure(
        &mut self,
        decl: &'ast VarDecl<'ast>,
        items: &'ast [DestructureItem<'ast>],
    ) -> SemanticResult<()> {
        let init_ty = match &decl.init {
            Some(init) => Some(self.check_expr(init, None)?),
            None => None,
        };

        if let Some(Type::Tuple(elements)) = &init_ty {
            if elements.len() != items.len() {
                return Err(SemanticError::arity(
                    format!(
                        "Cannot destructure a tuple of {} elements into {} variables",
                        elements.len(),
                        items.len()
                    ),
                    "The number of names must match the tuple size.",
                    decl.span,
                ));
            }
        }

        for (index, item) in items.iter().enumerate() {
            if item.name.name == "_" {
                continue;
            }
            self.ensure_not_redeclared(item.name)?;

            let element = match &init_ty {
                Some(Type::Tuple(elements)) => elements.get(index).cloned(),
                other => other.clone(),
            };
            let ty = match (&item.ty, element) {
                (Some(ty), element) => {
                    let declared = self.resolve_type_expr(ty)?;
                    if let Some(element) = element {
                        if !is_assignable(&self.ctx, &declared, &element) {
                            return Err(SemanticError::type_mismatch(
                                format!("Type mismatch: cannot assign {} to {}", element, declared),
                                "Ensure the destructured element matches the declared type.",
                                item.name.span,
                            ));
                        }
                    }
                    declared
                }
                (None, Some(element)) => element,
                (None, None) => {
                    return Err(SemanticError::type_mismatch(
                        format!("Cannot infer type for variable '{}'", item.name.name),
                        "Either provide a type annotation or an initializer.",
                        item.name.span,
                    ));
                }
            };
            self.bind_variable(item.name, &ty, decl.is_const, item.id)?;
        }
        Ok(())
    }

    fn ensure_not_redeclared(&self, name: Ident<'ast>) -> SemanticResult<()> {
        match self.ctx.scopes.get_local(self.scope, name.name) {
            Some(_) => Err(SemanticError::duplicate(
                format!("Variable '{}' is already declared in this scope", name.name),
                format!("Cannot redeclare '{}' in the same scope.", name.name),
                name.span,
            )),
            None => Ok(()),
        }
    }

    /// Reject initializer types a variable cannot hold.
    fn inferable(&self, ty: &Type, name: &str, span: Span) -> SemanticResult<()> {
        let message = match ty {
            ty if ty.is_void() => format!("Cannot declare variable '{}' of type void", name),
            Type::Meta(_) | Type::Module(_) => {
                format!("Cannot infer type for variable '{}' from {}", name, ty)
            }
            _ => return Ok(()),
        };
        Err(SemanticError::type_mismatch(
            message,
            "Initialize the variable with a value.",
            span,
        ))
    }

    fn bind_variable(&mut self, name: Ident<'ast>, ty: &Type, is_const: bool, node: NodeId) -> SemanticResult<()> {
        self.record(node, ty);
        self.types.record_decl(node, DeclRef::Variable(node));
        self.define(
            Symbol::new(
                name.name,
                SymbolKind::Variable,
                Some(ty.clone()),
                SymbolTarget::Variable(node),
                name.span,
            )
            .with_const(is_const),
        )
    }
}
