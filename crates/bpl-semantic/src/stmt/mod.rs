//! Statement checking.
//!
//! Statements are checked in the current scope of the [`Checker`]; blocks
//! open a child scope. Each statement inside a block is checked through
//! [`Checker::recover`], so one bad statement does not hide errors in the
//! ones after it.
//!
//! Declarations other than variables are only legal at module level; they
//! are hoisted there and never reach this module except by mistake.

mod control;
mod switch_stmt;
mod try_catch;
mod var_decl;

use bitflags::bitflags;
use bpl_ast::{Block, Stmt};
use bpl_core::{SemanticError, SemanticResult};

use crate::checker::Checker;

bitflags! {
    /// How a statement leaves the enclosing block.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct Exit: u8 {
        const RETURN = 1 << 0;
        const THROW = 1 << 1;
        const BREAK = 1 << 2;
        const CONTINUE = 1 << 3;
    }
}

impl Exit {
    /// The unconditional exit performed by `stmt` itself.
    ///
    /// Only the jump statements count; an `if` whose branches all return is
    /// not treated as terminating here.
    pub(crate) fn of(stmt: &Stmt<'_>) -> Exit {
        match stmt {
            Stmt::Return(_) => Exit::RETURN,
            Stmt::Throw(_) => Exit::THROW,
            Stmt::Break(_) => Exit::BREAK,
            Stmt::Continue(_) => Exit::CONTINUE,
            _ => Exit::empty(),
        }
    }
}

impl<'ast> Checker<'ast> {
    /// Check a statement in the current scope.
    pub(crate) fn check_stmt(&mut self, stmt: &Stmt<'ast>) -> SemanticResult<()> {
        match *stmt {
            Stmt::VarDecl(decl) => self.check_var_decl(decl),
            Stmt::Block(block) => self.check_block(block),
            Stmt::If(stmt) => self.check_if(stmt),
            Stmt::Loop(stmt) => self.check_loop(stmt),
            Stmt::Return(stmt) => self.check_return(stmt),
            Stmt::Break(stmt) => self.check_jump("break", stmt.span),
            Stmt::Continue(stmt) => self.check_jump("continue", stmt.span),
            Stmt::Expr(stmt) => self.check_expr(&stmt.expr, None).map(|_| ()),
            Stmt::Asm(_) => Ok(()),
            Stmt::Try(stmt) => self.check_try(stmt),
            Stmt::Throw(stmt) => self.check_throw(stmt),
            Stmt::Switch(stmt) => self.check_switch(stmt),
            Stmt::Function(_)
            | Stmt::Struct(_)
            | Stmt::Spec(_)
            | Stmt::Enum(_)
            | Stmt::TypeAlias(_)
            | Stmt::Import(_)
            | Stmt::Export(_)
            | Stmt::Extern(_) => Err(SemanticError::unsupported(
                "Declarations are only allowed at module level",
                "Move the declaration out of the function body.",
                stmt.span(),
            )),
        }
    }

    /// Check a block in a fresh child scope.
    pub(crate) fn check_block(&mut self, block: &'ast Block<'ast>) -> SemanticResult<()> {
        self.in_scope(|this| this.check_block_stmts(block.stmts))
    }

    /// Check statements in the current scope, recovering after each one.
    ///
    /// Statements after a `return`, `break`, `continue` or `throw` are still
    /// checked; the first of them gets an unreachable-code warning.
    pub(crate) fn check_block_stmts(&mut self, stmts: &'ast [Stmt<'ast>]) -> SemanticResult<()> {
        let mut exit = Exit::empty();
        let mut warned = false;
        for stmt in stmts {
            if !exit.is_empty() && !warned && self.options.warn_unreachable {
                self.warn(
                    "Unreachable code detected.",
                    "This statement follows a return, break, continue, or throw statement and will never be executed.",
                    stmt.span(),
                );
                warned = true;
            }
            let result = self.check_stmt(stmt);
            self.recover(result)?;
            exit |= Exit::of(stmt);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CheckerOptions;
    use bpl_ast::AstBuilder;
    use bumpalo::Bump;

    #[test]
    fn exit_of_jump_statements() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        assert_eq!(Exit::of(&b.ret(None)), Exit::RETURN);
        assert_eq!(Exit::of(&b.brk()), Exit::BREAK);
        assert_eq!(Exit::of(&b.cont()), Exit::CONTINUE);
        assert_eq!(Exit::of(&b.throw(b.int(1))), Exit::THROW);
        assert!(Exit::of(&b.block_stmt([b.ret(None)])).is_empty());
    }

    #[test]
    fn unreachable_code_warns_once() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program(
            "main.x",
            [b.function(
                "f",
                [],
                None,
                [
                    b.ret(None),
                    b.local("a", None, Some(b.int(1))),
                    b.local("b", None, Some(b.int(2))),
                ],
            )],
        );
        let mut checker = Checker::new(CheckerOptions::default());
        checker.check_program(program).unwrap();
        assert_eq!(checker.diagnostics().warning_count(), 1);
        assert_eq!(checker.diagnostics().error_count(), 0);
        let warning = checker.diagnostics().warnings().next().unwrap();
        assert_eq!(warning.message, "Unreachable code detected.");
    }

    #[test]
    fn unreachable_warning_can_be_disabled() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program(
            "main.x",
            [b.function("f", [], None, [b.ret(None), b.ret(None)])],
        );
        let options = CheckerOptions::default().with_warn_unreachable(false);
        let mut checker = Checker::new(options);
        checker.check_program(program).unwrap();
        assert!(checker.diagnostics().is_empty());
    }

    #[test]
    fn nested_declaration_is_rejected() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let inner = b.function("inner", [], None, []);
        let program = b.program("main.x", [b.function("outer", [], None, [inner])]);
        let mut checker = Checker::new(CheckerOptions::default());
        checker.check_program(program).unwrap();
        let message = &checker.diagnostics().iter().next().unwrap().message;
        assert_eq!(message, "Declarations are only allowed at module level");
    }

    #[test]
    fn errors_in_sibling_statements_are_all_reported() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program(
            "main.x",
            [b.function(
                "f",
                [],
                None,
                [
                    b.expr_stmt(b.ident("missing1")),
                    b.expr_stmt(b.ident("missing2")),
                ],
            )],
        );
        let mut checker = Checker::new(CheckerOptions::default());
        checker.check_program(program).unwrap();
        assert_eq!(checker.diagnostics().error_count(), 2);
    }
}
