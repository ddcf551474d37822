//! Identifiers and generic instantiation.

use bpl_ast::{Expr, GenericInstantiationExpr, IdentExpr};
use bpl_core::{BasicType, DeclRef, FunctionType, SemanticError, SemanticResult, Type};

use crate::checker::Checker;
use crate::lookup::Candidate;
use crate::scope::SymbolKind;
use crate::template::{build_type_map, check_constraints, substitute_signature};

impl<'ast> Checker<'ast> {
    /// A name in value position.
    ///
    /// Type names evaluate to `Meta` types, namespaces to `Module`.
    pub(crate) fn check_identifier(&mut self, ident: &IdentExpr<'_>) -> SemanticResult<Type> {
        let Some(symbol) = self.ctx.scopes.resolve(self.scope, ident.name) else {
            let suggestion = self.ctx.scopes.find_similar(self.scope, ident.name);
            return Err(SemanticError::undefined(ident.name, suggestion, ident.span));
        };
        let (ty, decl) = self.symbol_value(symbol, self.scope, ident.span)?;
        if let Some(decl) = decl {
            self.types.record_decl(ident.id, decl);
        }
        Ok(ty)
    }

    /// `name<Args>` in value position.
    ///
    /// On a function this selects the generic overloads of that arity and
    /// substitutes the arguments. On a type it yields the instantiated type.
    pub(crate) fn check_generic_instantiation(
        &mut self,
        inst: &GenericInstantiationExpr<'ast>,
    ) -> SemanticResult<Type> {
        let (resolved, written) = self.explicit_generics(inst.generic_args)?;
        if let Some((name, candidates)) = self.function_candidates(&inst.base)? {
            let signature = self.instantiate_function(inst, &name, &candidates, &resolved, &written)?;
            return Ok(Type::Function(signature));
        }

        let base = self.check_expr(&inst.base, None)?;
        let Type::Meta(inner) = &base else {
            return Err(not_generic(&base.to_string(), inst));
        };
        let Some(basic) = inner.as_basic().filter(|b| b.generic_args.is_empty()) else {
            return Err(not_generic(&inner.to_string(), inst));
        };
        let Some(decl) = basic.decl else {
            return Err(not_generic(&basic.name, inst));
        };

        let params = self.ctx.type_generic_params(decl);
        if params.len() != resolved.len() {
            return Err(SemanticError::arity(
                format!(
                    "Generic type '{}' expects {} arguments, but got {}",
                    basic.name,
                    params.len(),
                    resolved.len()
                ),
                "Provide the correct number of generic arguments.",
                inst.span,
            ));
        }
        check_constraints(&self.ctx, params, &resolved, &written, inst.span)?;

        Ok(Type::Meta(Box::new(Type::Basic(BasicType {
            generic_args: resolved,
            ..basic.clone()
        }))))
    }

    /// The candidates behind a plain function name, if `callee` is one.
    pub(crate) fn function_candidates(
        &self,
        callee: &Expr<'ast>,
    ) -> SemanticResult<Option<(String, Vec<Candidate>)>> {
        let Expr::Ident(ident) = callee else {
            return Ok(None);
        };
        let Some(symbol) = self.ctx.scopes.resolve(self.scope, ident.name) else {
            return Ok(None);
        };
        if symbol.kind != SymbolKind::Function {
            return Ok(None);
        }
        let candidates = symbol
            .signatures()
            .map(|signature| Candidate::from_signature(&self.ctx, ident.name, signature))
            .collect();
        Ok(Some((ident.name.to_string(), candidates)))
    }

    fn instantiate_function(
        &mut self,
        inst: &GenericInstantiationExpr<'ast>,
        name: &str,
        candidates: &[Candidate],
        resolved: &[Type],
        written: &[Type],
    ) -> SemanticResult<FunctionType> {
        let matching: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| c.is_generic() && c.generic_params.len() == resolved.len())
            .collect();

        let Some(first) = matching.first() else {
            if candidates.iter().any(Candidate::is_generic) {
                return Err(SemanticError::arity(
                    format!(
                        "No overload of '{}' accepts {} generic arguments",
                        name,
                        resolved.len()
                    ),
                    "Check generic argument count.",
                    inst.span,
                ));
            }
            return Err(not_generic(name, inst));
        };

        check_constraints(&self.ctx, &first.generic_params, resolved, written, inst.span)?;
        let map = build_type_map(&first.generic_params, resolved);
        let signature = substitute_signature(&first.signature, &map);

        let base_ty = Type::Function(first.signature.clone());
        self.record(inst.base.id(), &base_ty);
        if let (1, Some(id)) = (matching.len(), first.function) {
            self.types.record_decl(inst.base.id(), DeclRef::Function(id));
            self.types.record_decl(inst.id, DeclRef::Function(id));
        }
        Ok(signature)
    }
}

fn not_generic(name: &str, inst: &GenericInstantiationExpr<'_>) -> SemanticError {
    SemanticError::arity(
        format!("Type '{}' is not generic", name),
        "Cannot provide generic arguments to a non-generic type or function.",
        inst.span,
    )
}

#[cfg(test)]
mod tests {
    use crate::expr::test_support::{check, errors, in_main, type_of};
    use bpl_ast::AstBuilder;
    use bumpalo::Bump;

    #[test]
    fn undefined_identifier_suggests_similar_name() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = in_main(
            &b,
            vec![],
            vec![
                b.local("counter", None, Some(b.int(0))),
                b.expr_stmt(b.ident("countr")),
            ],
        );
        let checker = check(program);
        let diagnostic = checker.diagnostics().iter().next().unwrap();
        assert_eq!(diagnostic.message, "Undefined symbol 'countr'");
        assert_eq!(diagnostic.hint, "Did you mean 'counter'?");
    }

    #[test]
    fn struct_name_is_a_meta_type() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let name = b.ident("Point");
        let program = in_main(
            &b,
            vec![b.struct_decl("Point", [], [], [b.field("x", b.ty("int"))])],
            vec![b.expr_stmt(name)],
        );
        let checker = check(program);
        assert_eq!(type_of(&checker, &name), "type Point");
    }

    #[test]
    fn generic_function_instantiation() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let identity = b.generic_function(
            "identity",
            [b.generic("T", None)],
            [b.param("v", b.ty("T"))],
            Some(b.ty("T")),
            [b.ret_value(b.ident("v"))],
        );
        let inst = b.generic_inst(b.ident("identity"), [b.ty("long")]);
        let program = in_main(&b, vec![identity], vec![b.local("f", None, Some(inst))]);
        let checker = check(program);
        assert!(errors(&checker).is_empty(), "{:?}", errors(&checker));
        assert_eq!(type_of(&checker, &inst), "(i64) => i64");
    }

    #[test]
    fn instantiating_non_generic_function() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let plain = b.function("plain", [], None, []);
        let inst = b.generic_inst(b.ident("plain"), [b.ty("int")]);
        let program = in_main(&b, vec![plain], vec![b.expr_stmt(inst)]);
        let checker = check(program);
        assert_eq!(errors(&checker), vec!["Type 'plain' is not generic".to_string()]);
    }

    #[test]
    fn generic_type_arity_is_checked() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let boxed = b.struct_decl("Box", [b.generic("T", None)], [], [b.field("value", b.ty("T"))]);
        let inst = b.generic_inst(b.ident("Box"), [b.ty("int"), b.ty("int")]);
        let program = in_main(&b, vec![boxed], vec![b.expr_stmt(inst)]);
        let checker = check(program);
        assert_eq!(
            errors(&checker),
            vec!["Generic type 'Box' expects 1 arguments, but got 2".to_string()]
        );
    }

    #[test]
    fn generic_type_instantiation_is_meta() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let boxed = b.struct_decl("Box", [b.generic("T", None)], [], [b.field("value", b.ty("T"))]);
        let inst = b.generic_inst(b.ident("Box"), [b.ty("int")]);
        let program = in_main(&b, vec![boxed], vec![b.expr_stmt(inst)]);
        let checker = check(program);
        assert_eq!(type_of(&checker, &inst), "type Box<i32>");
    }
}
