//! Try/catch statement checking.

use bpl_ast::{CatchClause, TryStmt};
use bpl_core::{DeclRef, SemanticResult};

use crate::checker::Checker;
use crate::scope::{Symbol, SymbolKind, SymbolTarget};

impl<'ast> Checker<'ast> {
    /// Each catch clause gets its own scope holding the caught variable.
    pub(crate) fn check_try(&mut self, stmt: &'ast TryStmt<'ast>) -> SemanticResult<()> {
        self.check_block(stmt.body)?;
        for clause in stmt.catches {
            let result = self.in_scope(|this| this.check_catch(clause));
            self.recover(result)?;
        }
        match stmt.catch_other {
            Some(block) => self.check_block(block),
            None => Ok(()),
        }
    }

    fn check_catch(&mut self, clause: &'ast CatchClause<'ast>) -> SemanticResult<()> {
        let ty = self.resolve_type_expr(&clause.ty)?;
        self.record(clause.id, &ty);
        self.types.record_decl(clause.id, DeclRef::Variable(clause.id));
        self.define(Symbol::new(
            clause.variable.name,
            SymbolKind::Variable,
            Some(ty),
            SymbolTarget::Variable(clause.id),
            clause.variable.span,
        ))?;
        self.check_block_stmts(clause.body.stmts)
    }
}
