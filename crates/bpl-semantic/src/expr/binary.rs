//! Binary and unary operators.

use bpl_ast::{BinaryExpr, BinaryOp, UnaryExpr, UnaryOp};
use bpl_core::{DeclRef, SemanticError, SemanticResult, Type};

use super::is_integer_scalar;
use crate::checker::Checker;
use crate::conversion::integer_constant_value;
use crate::overload::{OperatorResolution, resolve_binary_operator, resolve_unary_operator};

impl<'ast> Checker<'ast> {
    /// The right operand is checked against the left operand's type, so
    /// `x + 1` keeps `x`'s integer width. A constant on the left adopts the
    /// right operand's integer type instead.
    pub(crate) fn check_binary(&mut self, binary: &BinaryExpr<'ast>) -> SemanticResult<Type> {
        let mut left = self.check_expr(&binary.left, None)?;
        let right = self.check_expr(&binary.right, Some(&left))?;
        if integer_constant_value(&binary.left).is_some()
            && is_integer_scalar(&right)
            && left != right
        {
            left = self.check_expr(&binary.left, Some(&right))?;
        }

        let resolution =
            resolve_binary_operator(&self.ctx, self.scope, &left, &right, binary.op, binary.span)?;
        match &resolution {
            OperatorResolution::Method { candidate, .. } => {
                if let Some(id) = candidate.function {
                    self.types.record_decl(binary.id, DeclRef::Function(id));
                }
            }
            OperatorResolution::Primitive { .. } => {
                if matches!(binary.op, BinaryOp::Div | BinaryOp::Mod)
                    && integer_constant_value(&binary.right) == Some(0)
                {
                    let operation = if binary.op == BinaryOp::Div { "division" } else { "modulo" };
                    return Err(SemanticError::type_mismatch(
                        "Division by zero",
                        format!("The divisor in a {} operation cannot be zero.", operation),
                        binary.right.span(),
                    ));
                }
            }
        }
        Ok(resolution.result().clone())
    }

    pub(crate) fn check_unary(
        &mut self,
        unary: &UnaryExpr<'ast>,
        expected: Option<&Type>,
    ) -> SemanticResult<Type> {
        let hint = match unary.op {
            UnaryOp::Neg | UnaryOp::Plus | UnaryOp::BitNot => expected,
            _ => None,
        };
        let operand = self.check_expr(&unary.operand, hint)?;
        let resolution =
            resolve_unary_operator(&self.ctx, self.scope, &operand, unary.op, unary.span)?;
        if let OperatorResolution::Method { candidate, .. } = &resolution {
            if let Some(id) = candidate.function {
                self.types.record_decl(unary.id, DeclRef::Function(id));
            }
        }
        Ok(resolution.result().clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::test_support::{check, errors, in_main, type_of};
    use bpl_ast::{AstBuilder, BinaryOp, UnaryOp};
    use bpl_core::DeclRef;
    use bumpalo::Bump;

    #[test]
    fn arithmetic_keeps_left_width() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let sum = b.binary(b.ident("x"), BinaryOp::Add, b.int(1));
        let flipped = b.binary(b.int(1), BinaryOp::Add, b.ident("x"));
        let program = in_main(
            &b,
            vec![],
            vec![
                b.local("x", Some(b.ty("long")), Some(b.int(5))),
                b.expr_stmt(sum),
                b.expr_stmt(flipped),
            ],
        );
        let checker = check(program);
        assert!(errors(&checker).is_empty(), "{:?}", errors(&checker));
        assert_eq!(type_of(&checker, &sum), "i64");
        assert_eq!(type_of(&checker, &flipped), "i64");
    }

    #[test]
    fn comparison_is_bool() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let cmp = b.binary(b.int(1), BinaryOp::Lt, b.int(2));
        let program = in_main(&b, vec![], vec![b.expr_stmt(cmp)]);
        let checker = check(program);
        assert_eq!(type_of(&checker, &cmp), "i1");
    }

    #[test]
    fn division_by_constant_zero() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = in_main(
            &b,
            vec![],
            vec![
                b.expr_stmt(b.binary(b.int(10), BinaryOp::Div, b.int(0))),
                b.expr_stmt(b.binary(b.int(10), BinaryOp::Mod, b.int(0))),
            ],
        );
        let checker = check(program);
        let hints: Vec<String> = checker.diagnostics().errors().map(|d| d.hint.clone()).collect();
        assert_eq!(errors(&checker), vec!["Division by zero".to_string(); 2]);
        assert_eq!(hints[1], "The divisor in a modulo operation cannot be zero.");
    }

    #[test]
    fn logical_operators_need_booleans() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = in_main(
            &b,
            vec![],
            vec![b.expr_stmt(b.binary(b.int(1), BinaryOp::And, b.bool_lit(true)))],
        );
        let checker = check(program);
        assert_eq!(
            errors(&checker),
            vec!["Logical operators require boolean operands, got i32 and i1".to_string()]
        );
    }

    #[test]
    fn operator_overload_records_method() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let vec2 = b.struct_decl(
            "Vec2",
            [],
            [],
            [
                b.field("x", b.ty("int")),
                b.method(
                    "__add__",
                    [b.param("other", b.ty("Vec2"))],
                    Some(b.ty("Vec2")),
                    [b.ret_value(b.ident("other"))],
                ),
            ],
        );
        let sum = b.binary(b.ident("a"), BinaryOp::Add, b.ident("a"));
        let program = in_main(
            &b,
            vec![vec2],
            vec![
                b.local("a", Some(b.ty("Vec2")), None),
                b.local("c", Some(b.ty("Vec2")), Some(sum)),
            ],
        );
        let checker = check(program);
        assert!(errors(&checker).is_empty(), "{:?}", errors(&checker));
        assert_eq!(type_of(&checker, &sum), "Vec2");
        assert!(matches!(checker.types().decl_of(sum.id()), Some(DeclRef::Function(_))));
    }

    #[test]
    fn negated_literal_takes_expected_type() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let neg = b.unary(UnaryOp::Neg, b.int(128));
        let program = in_main(&b, vec![], vec![b.local("x", Some(b.ty("i8")), Some(neg))]);
        let checker = check(program);
        assert!(errors(&checker).is_empty(), "{:?}", errors(&checker));
    }

    #[test]
    fn address_of_and_deref() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let addr = b.unary(UnaryOp::AddressOf, b.ident("x"));
        let deref = b.unary(UnaryOp::Deref, b.ident("p"));
        let program = in_main(
            &b,
            vec![],
            vec![
                b.local("x", Some(b.ty("int")), Some(b.int(1))),
                b.local("p", None, Some(addr)),
                b.expr_stmt(deref),
                b.expr_stmt(b.unary(UnaryOp::Deref, b.ident("x"))),
            ],
        );
        let checker = check(program);
        assert_eq!(type_of(&checker, &addr), "*i32");
        assert_eq!(type_of(&checker, &deref), "i32");
        assert_eq!(
            errors(&checker),
            vec!["Cannot dereference non-pointer type i32".to_string()]
        );
    }
}
