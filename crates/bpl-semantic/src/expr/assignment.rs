//! Assignment expressions.

use bpl_ast::{AssignExpr, Expr, UnaryOp};
use bpl_core::{DeclRef, SemanticError, SemanticResult, Type};

use crate::checker::Checker;
use crate::conversion::is_assignable;
use crate::overload::{OperatorResolution, resolve_binary_operator};

impl<'ast> Checker<'ast> {
    /// An assignment evaluates to the target's type.
    ///
    /// Compound operators resolve like the binary operator they apply, and
    /// the operator's result must fit back into the target.
    pub(crate) fn check_assign(&mut self, assign: &AssignExpr<'ast>) -> SemanticResult<Type> {
        ensure_assignable_target(&assign.target)?;
        let target = self.check_expr(&assign.target, None)?;
        self.ensure_not_const(&assign.target)?;

        let value = self.check_expr(&assign.value, Some(&target))?;
        let mismatch = |actual: &Type| {
            SemanticError::type_mismatch(
                format!(
                    "Type mismatch in assignment: cannot assign {} to {}",
                    actual, target
                ),
                "The assigned value is not compatible with the target variable's type.",
                assign.value.span(),
            )
        };

        let Some(op) = assign.op.to_binary_op() else {
            self.check_assignable(&target, &value, &assign.value, || mismatch(&value))?;
            return Ok(target);
        };

        let resolution =
            resolve_binary_operator(&self.ctx, self.scope, &target, &value, op, assign.span)?;
        if let OperatorResolution::Method { candidate, .. } = &resolution {
            if let Some(id) = candidate.function {
                self.types.record_decl(assign.id, DeclRef::Function(id));
            }
        }
        let result = resolution.result();
        if !is_assignable(&self.ctx, &target, result) {
            return Err(mismatch(result));
        }
        Ok(target)
    }

    fn ensure_not_const(&self, target: &Expr<'_>) -> SemanticResult<()> {
        match target {
            Expr::Ident(ident) => match self.ctx.scopes.resolve(self.scope, ident.name) {
                Some(symbol) if symbol.is_const => Err(SemanticError::type_mismatch(
                    format!("Cannot assign to constant variable '{}'", ident.name),
                    "Constants cannot be modified after initialization.",
                    ident.span,
                )),
                _ => Ok(()),
            },
            Expr::TupleLiteral(tuple) => tuple.elements.iter().try_for_each(|e| self.ensure_not_const(e)),
            _ => Ok(()),
        }
    }
}

/// Variables, members, elements, dereferences, and tuples of those.
fn ensure_assignable_target(target: &Expr<'_>) -> SemanticResult<()> {
    if is_place(target) {
        return Ok(());
    }
    let Expr::TupleLiteral(tuple) = target else {
        return Err(SemanticError::type_mismatch(
            "Invalid assignment target",
            "Left-hand side of assignment must be a variable, member, array element, pointer dereference, or tuple destructuring.",
            target.span(),
        ));
    };
    match tuple.elements.iter().find(|e| !is_place(e)) {
        Some(bad) => Err(SemanticError::type_mismatch(
            "Invalid assignment target in tuple destructuring",
            "Tuple elements in assignment must be valid l-values (variable, member, array element, or pointer dereference).",
            bad.span(),
        )),
        None => Ok(()),
    }
}

fn is_place(expr: &Expr<'_>) -> bool {
    match expr {
        Expr::Ident(_) | Expr::Member(_) | Expr::Index(_) => true,
        Expr::Unary(unary) => unary.op == UnaryOp::Deref,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::test_support::{check, errors, in_main, type_of};
    use bpl_ast::{AssignOp, AstBuilder, UnaryOp};
    use bumpalo::Bump;

    #[test]
    fn simple_and_compound_assignment() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let set = b.assign(b.ident("x"), b.int(2));
        let add = b.assign_op(b.ident("x"), AssignOp::AddAssign, b.int(3));
        let program = in_main(
            &b,
            vec![],
            vec![
                b.local("x", Some(b.ty("u8")), Some(b.int(1))),
                b.expr_stmt(set),
                b.expr_stmt(add),
                b.expr_stmt(b.assign(b.ident("x"), b.int(300))),
                b.expr_stmt(b.assign(b.ident("x"), b.string("s"))),
            ],
        );
        let checker = check(program);
        assert_eq!(type_of(&checker, &set), "u8");
        assert_eq!(type_of(&checker, &add), "u8");
        assert_eq!(
            errors(&checker),
            vec![
                "Integer overflow: value 300 does not fit in type u8".to_string(),
                "Type mismatch in assignment: cannot assign *i8 to u8".to_string(),
            ]
        );
    }

    #[test]
    fn invalid_targets() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = in_main(
            &b,
            vec![],
            vec![
                b.local("x", None, Some(b.int(1))),
                b.expr_stmt(b.assign(b.int(1), b.int(2))),
                b.expr_stmt(b.assign(b.tuple([b.ident("x"), b.int(3)]), b.tuple([b.int(1), b.int(2)]))),
                b.expr_stmt(b.assign(b.unary(UnaryOp::Deref, b.unary(UnaryOp::AddressOf, b.ident("x"))), b.int(4))),
            ],
        );
        let checker = check(program);
        assert_eq!(
            errors(&checker),
            vec![
                "Invalid assignment target".to_string(),
                "Invalid assignment target in tuple destructuring".to_string(),
            ]
        );
    }

    #[test]
    fn constant_cannot_be_reassigned() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = in_main(
            &b,
            vec![],
            vec![
                b.const_local("limit", None, Some(b.int(10))),
                b.expr_stmt(b.assign(b.ident("limit"), b.int(11))),
            ],
        );
        let checker = check(program);
        assert_eq!(
            errors(&checker),
            vec!["Cannot assign to constant variable 'limit'".to_string()]
        );
    }

    #[test]
    fn tuple_swap() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = in_main(
            &b,
            vec![],
            vec![
                b.local("a", None, Some(b.int(1))),
                b.local("c", None, Some(b.int(2))),
                b.expr_stmt(b.assign(
                    b.tuple([b.ident("a"), b.ident("c")]),
                    b.tuple([b.ident("c"), b.ident("a")]),
                )),
            ],
        );
        let checker = check(program);
        assert!(errors(&checker).is_empty(), "{:?}", errors(&checker));
    }
}
