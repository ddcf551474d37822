//! Switch statement checking.
//!
//! The switched value must be an integer or an enum. Case labels must be
//! compatible with it, and two labels may not denote the same value.

use bpl_ast::{Expr, SwitchStmt};
use bpl_core::{SemanticError, SemanticResult, Type, TypeDecl};
use rustc_hash::FxHashSet;

use crate::checker::Checker;
use crate::conversion::{integer_constant_value, is_assignable, literal_fits};

impl<'ast> Checker<'ast> {
    pub(crate) fn check_switch(&mut self, stmt: &'ast SwitchStmt<'ast>) -> SemanticResult<()> {
        let value_ty = self.check_expr(&stmt.value, None)?;
        if !value_ty.is_integer() && !is_enum_value(&value_ty) {
            return Err(SemanticError::type_mismatch(
                format!("Switch value must be an integer or enum type, got {}", value_ty),
                "Ensure the switch expression evaluates to an integer or enum.",
                stmt.value.span(),
            ));
        }

        self.loop_depth += 1;
        let result = self.check_cases(stmt, &value_ty);
        self.loop_depth -= 1;
        result
    }

    fn check_cases(&mut self, stmt: &'ast SwitchStmt<'ast>, value_ty: &Type) -> SemanticResult<()> {
        let mut seen = FxHashSet::default();
        for case in stmt.cases {
            let label = self.check_case_label(&case.value, value_ty, &mut seen);
            self.recover(label)?;
            let body = self.check_block(case.body);
            self.recover(body)?;
        }
        match stmt.default {
            Some(block) => self.check_block(block),
            None => Ok(()),
        }
    }

    fn check_case_label(
        &mut self,
        label: &Expr<'ast>,
        value_ty: &Type,
        seen: &mut FxHashSet<String>,
    ) -> SemanticResult<()> {
        let label_ty = self.check_expr(label, Some(value_ty))?;
        let constant = integer_constant_value(label);
        let fits = constant.is_some_and(|v| value_ty.is_integer() && literal_fits(v, value_ty));
        if !fits && !is_assignable(&self.ctx, value_ty, &label_ty) {
            return Err(SemanticError::type_mismatch(
                format!(
                    "Case pattern type {} not compatible with switch value type {}",
                    label_ty, value_ty
                ),
                "Ensure case patterns match the switch value type.",
                label.span(),
            ));
        }

        let key = match (constant, label) {
            (Some(value), _) => Some(value.to_string()),
            (None, Expr::Member(member)) if is_enum_value(&label_ty) => {
                Some(member.property.name.to_string())
            }
            _ => None,
        };
        if let Some(key) = key {
            if !seen.insert(key.clone()) {
                return Err(SemanticError::duplicate(
                    format!("Duplicate case value '{}'", key),
                    "Switch cases must have unique values.",
                    label.span(),
                ));
            }
        }
        Ok(())
    }
}

fn is_enum_value(ty: &Type) -> bool {
    matches!(ty, Type::Basic(b) if b.is_scalar() && matches!(b.decl, Some(TypeDecl::Enum(_))))
}

#[cfg(test)]
mod tests {
    use crate::checker::Checker;
    use crate::options::CheckerOptions;
    use bpl_ast::{AstBuilder, Program};
    use bumpalo::Bump;

    fn errors<'ast>(program: &'ast Program<'ast>) -> Vec<String> {
        let mut checker = Checker::new(CheckerOptions::default());
        checker.check_program(program).unwrap();
        checker.diagnostics().errors().map(|d| d.message.clone()).collect()
    }

    #[test]
    fn integer_switch_with_break() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let switch = b.switch(
            b.ident("n"),
            [b.case(b.int(1), [b.brk()]), b.case(b.int(2), [])],
            Some(b.block([b.brk()])),
        );
        let program = b.program(
            "main.x",
            [b.function("f", [b.param("n", b.ty("int"))], None, [switch])],
        );
        assert!(errors(program).is_empty());
    }

    #[test]
    fn string_switch_is_rejected() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let switch = b.switch(b.string("s"), [], None);
        let program = b.program("main.x", [b.function("f", [], None, [switch])]);
        assert_eq!(
            errors(program),
            vec!["Switch value must be an integer or enum type, got *i8".to_string()]
        );
    }

    #[test]
    fn duplicate_integer_case() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let switch = b.switch(
            b.ident("n"),
            [b.case(b.int(1), []), b.case(b.number("0x1"), [])],
            None,
        );
        let program = b.program(
            "main.x",
            [b.function("f", [b.param("n", b.ty("int"))], None, [switch])],
        );
        assert_eq!(errors(program), vec!["Duplicate case value '1'".to_string()]);
    }

    #[test]
    fn enum_switch_rejects_repeated_variant() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let color = b.enum_decl(
            "Color",
            [],
            [b.unit_variant("Red"), b.unit_variant("Green")],
            [],
        );
        let switch = b.switch(
            b.ident("c"),
            [
                b.case(b.member(b.ident("Color"), "Red"), []),
                b.case(b.member(b.ident("Color"), "Green"), []),
                b.case(b.member(b.ident("Color"), "Red"), []),
            ],
            None,
        );
        let program = b.program(
            "main.x",
            [color, b.function("f", [b.param("c", b.ty("Color"))], None, [switch])],
        );
        assert_eq!(errors(program), vec!["Duplicate case value 'Red'".to_string()]);
    }

    #[test]
    fn case_type_must_match() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let switch = b.switch(b.ident("n"), [b.case(b.string("one"), [])], None);
        let program = b.program(
            "main.x",
            [b.function("f", [b.param("n", b.ty("int"))], None, [switch])],
        );
        assert_eq!(
            errors(program),
            vec!["Case pattern type *i8 not compatible with switch value type i32".to_string()]
        );
    }
}
