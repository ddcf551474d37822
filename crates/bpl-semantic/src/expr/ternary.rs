use bpl_ast::TernaryExpr;
use bpl_core::{SemanticError, SemanticResult, Type};

use crate::checker::Checker;
use crate::conversion::is_assignable;

impl<'ast> Checker<'ast> {
    /// The result takes the type of the `then` branch.
    pub(crate) fn check_ternary(
        &mut self,
        ternary: &TernaryExpr<'ast>,
        expected: Option<&Type>,
    ) -> SemanticResult<Type> {
        let condition = self.check_expr(&ternary.condition, None)?;
        if !condition.is_bool() {
            return Err(SemanticError::type_mismatch(
                format!("Ternary condition must be boolean, got {}", condition),
                "Ensure the condition evaluates to a boolean.",
                ternary.condition.span(),
            ));
        }

        let then_ty = self.check_expr(&ternary.then_expr, expected)?;
        let else_ty = self.check_expr(&ternary.else_expr, Some(expected.unwrap_or(&then_ty)))?;
        if !is_assignable(&self.ctx, &then_ty, &else_ty) {
            return Err(SemanticError::type_mismatch(
                format!(
                    "Ternary branches must have compatible types: {} vs {}",
                    then_ty, else_ty
                ),
                "Both branches must return the same type.",
                ternary.span,
            ));
        }
        Ok(then_ty)
    }
}
