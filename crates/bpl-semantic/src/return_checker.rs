//! All-paths-return analysis.
//!
//! A conservative structural check run on the body of every function with
//! a non-void return type. No expression is evaluated: `if (true)` is
//! treated like any other condition and loops are never assumed to run.

use bpl_ast::{Block, FunctionDecl, Stmt};
use bpl_core::{SemanticError, SemanticResult};

/// Whether every path through `block` ends in `return` or `throw`.
///
/// A block qualifies when any one of its statements does; statements after
/// that one are unreachable.
pub fn block_returns(block: &Block<'_>) -> bool {
    block.stmts.iter().any(stmt_returns)
}

/// Whether `stmt` returns on every path.
pub fn stmt_returns(stmt: &Stmt<'_>) -> bool {
    match stmt {
        Stmt::Return(_) | Stmt::Throw(_) => true,
        Stmt::Block(block) => block_returns(block),
        Stmt::If(if_stmt) => {
            block_returns(if_stmt.then_branch)
                && if_stmt.else_branch.as_ref().is_some_and(stmt_returns)
        }
        Stmt::Loop(_) => false,
        Stmt::Switch(switch) => {
            switch.default.is_some_and(block_returns)
                && switch.cases.iter().all(|case| block_returns(case.body))
        }
        Stmt::Try(try_stmt) => {
            block_returns(try_stmt.body)
                && try_stmt.catches.iter().all(|c| block_returns(c.body))
                && try_stmt.catch_other.is_none_or(block_returns)
        }
        _ => false,
    }
}

/// Report a function whose body can finish without returning a value.
pub fn check_function_returns(decl: &FunctionDecl<'_>) -> SemanticResult<()> {
    if block_returns(decl.body) {
        return Ok(());
    }
    Err(SemanticError::control_flow(
        format!(
            "Function '{}' might not return a value on all code paths",
            decl.name.name
        ),
        "Ensure all paths return a value.",
        decl.span,
    ))
}
