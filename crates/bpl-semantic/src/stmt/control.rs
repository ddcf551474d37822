//! Control flow statements: `if`, `loop`, `return`, `break`, `continue` and
//! `throw`.

use bpl_ast::{Expr, IfStmt, LoopStmt, ReturnStmt, ThrowStmt};
use bpl_core::{SemanticError, SemanticResult, Span, Type};

use crate::checker::Checker;

impl<'ast> Checker<'ast> {
    pub(crate) fn check_if(&mut self, stmt: &'ast IfStmt<'ast>) -> SemanticResult<()> {
        self.check_condition(&stmt.condition, "If")?;
        self.check_block(stmt.then_branch)?;
        match &stmt.else_branch {
            Some(branch) => self.check_stmt(branch),
            None => Ok(()),
        }
    }

    pub(crate) fn check_loop(&mut self, stmt: &'ast LoopStmt<'ast>) -> SemanticResult<()> {
        if let Some(condition) = &stmt.condition {
            self.check_condition(condition, "Loop")?;
        }
        self.loop_depth += 1;
        let result = self.check_block(stmt.body);
        self.loop_depth -= 1;
        result
    }

    fn check_condition(&mut self, condition: &Expr<'ast>, what: &str) -> SemanticResult<()> {
        let ty = self.check_expr(condition, None)?;
        if ty.is_bool() {
            return Ok(());
        }
        Err(SemanticError::type_mismatch(
            format!("{} condition must be boolean, got {}", what, ty),
            "Ensure the condition evaluates to a boolean.",
            condition.span(),
        ))
    }

    /// Inside a match-arm block, `return` yields the arm's value instead of
    /// leaving the function.
    pub(crate) fn check_return(&mut self, stmt: &'ast ReturnStmt<'ast>) -> SemanticResult<()> {
        if !self.match_returns.is_empty() {
            let ty = match &stmt.value {
                Some(value) => self.check_expr(value, None)?,
                None => Type::void(),
            };
            if let Some(arm) = self.match_returns.last_mut() {
                arm.push(ty);
            }
            return Ok(());
        }

        let Some(expected) = self.function.as_ref().map(|f| f.ret.clone()) else {
            return Err(SemanticError::control_flow(
                "Return statement outside of function",
                "Return statements can only be used inside functions.",
                stmt.span,
            ));
        };

        let Some(value) = &stmt.value else {
            if expected.is_void() {
                return Ok(());
            }
            return Err(SemanticError::type_mismatch(
                format!("Return type mismatch: expected {}, got void", expected),
                "Ensure the returned value matches the function's return type.",
                stmt.span,
            ));
        };

        let actual = self.check_expr(value, Some(&expected))?;
        self.check_assignable(&expected, &actual, value, || {
            SemanticError::type_mismatch(
                format!("Return type mismatch: expected {}, got {}", expected, actual),
                "Ensure the returned value matches the function's return type.",
                stmt.span,
            )
        })
    }

    /// `break` and `continue` must be inside a loop or switch.
    pub(crate) fn check_jump(&mut self, keyword: &str, span: Span) -> SemanticResult<()> {
        if self.loop_depth > 0 {
            return Ok(());
        }
        Err(SemanticError::control_flow(
            format!("'{}' statement outside of loop", keyword),
            format!("{} statements can only be used inside loops.", capitalize(keyword)),
            span,
        ))
    }

    pub(crate) fn check_throw(&mut self, stmt: &'ast ThrowStmt<'ast>) -> SemanticResult<()> {
        self.check_expr(&stmt.value, None).map(|_| ())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::checker::Checker;
    use crate::options::CheckerOptions;
    use bpl_ast::{AstBuilder, BinaryOp, Program};
    use bumpalo::Bump;

    fn errors<'ast>(program: &'ast Program<'ast>) -> Vec<String> {
        let mut checker = Checker::new(CheckerOptions::default());
        checker.check_program(program).unwrap();
        checker.diagnostics().errors().map(|d| d.message.clone()).collect()
    }

    #[test]
    fn if_condition_must_be_bool() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program(
            "main.x",
            [b.function("f", [], None, [b.if_stmt(b.int(1), [], None)])],
        );
        assert_eq!(errors(program), vec!["If condition must be boolean, got i32".to_string()]);
    }

    #[test]
    fn comparison_is_a_valid_condition() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let cond = b.binary(b.int(1), BinaryOp::Lt, b.int(2));
        let program = b.program(
            "main.x",
            [b.function("f", [], None, [b.if_else(cond, [], [])])],
        );
        assert!(errors(program).is_empty());
    }

    #[test]
    fn loop_condition_must_be_bool() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program(
            "main.x",
            [b.function("f", [], None, [b.loop_stmt(Some(b.string("x")), [b.brk()])])],
        );
        assert_eq!(errors(program), vec!["Loop condition must be boolean, got *i8".to_string()]);
    }

    #[test]
    fn break_inside_loop_is_fine() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let body = [b.if_stmt(b.bool_lit(true), [b.brk()], None), b.cont()];
        let program = b.program("main.x", [b.function("f", [], None, [b.loop_stmt(None, body)])]);
        assert!(errors(program).is_empty());
    }

    #[test]
    fn break_outside_loop() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program("main.x", [b.function("f", [], None, [b.brk()])]);
        assert_eq!(errors(program), vec!["'break' statement outside of loop".to_string()]);
    }

    #[test]
    fn return_value_must_match() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program(
            "main.x",
            [b.function("f", [], Some(b.ty("int")), [b.ret_value(b.string("s"))])],
        );
        assert_eq!(
            errors(program),
            vec!["Return type mismatch: expected i32, got *i8".to_string()]
        );
    }

    #[test]
    fn bare_return_in_non_void_function() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program("main.x", [b.function("f", [], Some(b.ty("int")), [b.ret(None)])]);
        assert_eq!(
            errors(program),
            vec!["Return type mismatch: expected i32, got void".to_string()]
        );
    }

    #[test]
    fn returned_literal_must_fit() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program(
            "main.x",
            [b.function("f", [], Some(b.ty("i8")), [b.ret_value(b.int(300))])],
        );
        assert_eq!(
            errors(program),
            vec!["Integer overflow: value 300 does not fit in type i8".to_string()]
        );
    }

    #[test]
    fn return_at_module_level() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program("main.x", [b.ret(None)]);
        assert_eq!(errors(program), vec!["Return statement outside of function".to_string()]);
    }

    #[test]
    fn throw_checks_its_value() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program("main.x", [b.function("f", [], None, [b.throw(b.ident("err"))])]);
        assert_eq!(errors(program), vec!["Undefined symbol 'err'".to_string()]);
    }
}
