//! Checking Pass (Pass 2) - Check declarations and bodies.
//!
//! Walks the module's top-level statements in order. Declarations hoisted
//! in pass 1 are looked up through the side table rather than by name, so
//! a declaration that failed to hoist is silently skipped here.

use bpl_ast::{ExportStmt, FunctionDecl, Program, Stmt, StructDecl, VarDecl, VarTarget};
use bpl_core::{
    DeclRef, FunctionId, SemanticError, SemanticResult, StructId, Type, TypeDecl,
};
use rustc_hash::FxHashSet;

use crate::checker::{Checker, FunctionFrame};
use crate::conformance::check_spec_implementation;
use crate::linker::{LinkerSymbol, LinkerSymbolKind};
use crate::return_checker::check_function_returns;
use crate::scope::{Symbol, SymbolKind, SymbolTarget};

impl<'ast> Checker<'ast> {
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn check_top_level(&mut self, program: &'ast Program<'ast>) -> SemanticResult<()> {
        for stmt in program.stmts {
            let result = self.check_module_stmt(stmt);
            self.recover(result)?;
        }
        Ok(())
    }

    fn check_module_stmt(&mut self, stmt: &Stmt<'ast>) -> SemanticResult<()> {
        match *stmt {
            Stmt::Function(decl) => match self.types.decl_of(decl.id) {
                Some(DeclRef::Function(id)) => self.check_function(id, decl, None),
                _ => Ok(()),
            },
            Stmt::Struct(decl) => self.check_struct_body(decl),
            Stmt::Enum(decl) => {
                for method in decl.methods {
                    if let Some(DeclRef::Function(id)) = self.types.decl_of(method.id) {
                        let owner = self.types.decl_of(decl.id).and_then(|d| match d {
                            DeclRef::Type(owner) => Some(owner),
                            _ => None,
                        });
                        let result = self.check_function(id, method, owner);
                        self.recover(result)?;
                    }
                }
                Ok(())
            }
            Stmt::Export(export) => self.check_export(export),
            Stmt::VarDecl(decl) => self.check_global(decl),
            Stmt::Spec(_) | Stmt::TypeAlias(_) | Stmt::Import(_) | Stmt::Extern(_) => Ok(()),
            other => self.check_stmt(&other),
        }
    }

    fn check_global(&mut self, decl: &'ast VarDecl<'ast>) -> SemanticResult<()> {
        self.check_var_decl(decl)?;
        let VarTarget::Single(name) = decl.target else {
            return Ok(());
        };
        let ty = self.types.type_of(decl.id).cloned();
        self.linker.define(LinkerSymbol::new(
            name.name,
            LinkerSymbolKind::Variable,
            self.module.name.clone(),
            ty,
            decl.span,
        ))
    }

    fn check_export(&mut self, export: &ExportStmt<'ast>) -> SemanticResult<()> {
        for item in export.items {
            if self.ctx.scopes.get_local(self.module.scope, item.name).is_none() {
                return Err(SemanticError::undefined_with(
                    item.name,
                    format!("Cannot export undefined symbol '{}'", item.name),
                    item.span,
                ));
            }
            self.linker.mark_exported(&self.module.name, item.name);
        }
        Ok(())
    }

    // ==========================================================================
    // Structs
    // ==========================================================================

    fn check_struct_body(&mut self, decl: &'ast StructDecl<'ast>) -> SemanticResult<()> {
        let Some(DeclRef::Type(TypeDecl::Struct(id))) = self.types.decl_of(decl.id) else {
            return Ok(());
        };

        let specs = self.ctx.struct_info(id).specs.clone();
        for spec in &specs {
            if let Type::Basic(spec) = spec {
                let result = check_spec_implementation(&self.ctx, id, spec);
                self.recover(result)?;
            }
        }

        for field in decl.fields() {
            let result = self.check_recursive_field(decl, id, field);
            self.recover(result)?;
        }

        for method in decl.methods() {
            if let Some(DeclRef::Function(function)) = self.types.decl_of(method.id) {
                let result = self.check_function(function, method, Some(TypeDecl::Struct(id)));
                self.recover(result)?;
            }
        }
        Ok(())
    }

    fn check_recursive_field(
        &mut self,
        decl: &StructDecl<'_>,
        id: StructId,
        field: &bpl_ast::FieldDecl<'_>,
    ) -> SemanticResult<()> {
        let Some(Type::Basic(ty)) = self.types.type_of(field.id) else {
            return Ok(());
        };
        if ty.decl == Some(TypeDecl::Struct(id)) && ty.is_scalar() {
            return Err(SemanticError::type_mismatch(
                format!(
                    "Recursive struct '{}' contains field '{}' of type '{}' without pointer",
                    decl.name.name, field.name.name, decl.name.name
                ),
                format!(
                    "Recursive structs must use pointers for self-reference (e.g., *{} instead of {}) to have finite size.",
                    decl.name.name, decl.name.name
                ),
                field.span,
            ));
        }
        Ok(())
    }

    // ==========================================================================
    // Functions
    // ==========================================================================

    /// Check a function or method body.
    ///
    /// Parameters live in the same scope as the body's statements. The
    /// scope's parent holds the function's generic parameters.
    pub(crate) fn check_function(
        &mut self,
        id: FunctionId,
        decl: &'ast FunctionDecl<'ast>,
        owner: Option<TypeDecl>,
    ) -> SemanticResult<()> {
        if let Some(owner) = owner {
            self.check_generic_shadowing(decl, owner)?;
        }

        let signature = self.ctx.function(id).signature.clone();
        let ret = (*signature.ret).clone();
        let signature_scope = self.signature_scopes.get(&id).copied().unwrap_or(self.scope);

        let outer_function = self.function.replace(FunctionFrame {
            id,
            ret: ret.clone(),
        });
        let outer_loops = std::mem::take(&mut self.loop_depth);
        let outer_matches = std::mem::take(&mut self.match_returns);

        let result = self.with_scope(signature_scope, |this| {
            this.in_scope(|this| {
                this.bind_parameters(decl, &signature.params, owner)?;
                this.check_block_stmts(decl.body.stmts)
            })
        });

        self.function = outer_function;
        self.loop_depth = outer_loops;
        self.match_returns = outer_matches;
        result?;

        if !ret.is_void() {
            check_function_returns(decl)?;
        }
        Ok(())
    }

    fn check_generic_shadowing(&self, decl: &FunctionDecl<'_>, owner: TypeDecl) -> SemanticResult<()> {
        let owner_params = self.ctx.type_generic_params(owner);
        for param in decl.generic_params {
            if owner_params.iter().any(|p| p.name == param.name.name) {
                let owner_kind = match owner {
                    TypeDecl::Enum(_) => "enum",
                    _ => "struct",
                };
                return Err(SemanticError::duplicate(
                    format!("Shadowing of generic parameter '{}'", param.name.name),
                    format!(
                        "The generic parameter '{}' is already defined in the parent {} '{}'. Please use a different name.",
                        param.name.name,
                        owner_kind,
                        self.ctx.type_name(owner)
                    ),
                    decl.span,
                ));
            }
        }
        Ok(())
    }

    fn bind_parameters(
        &mut self,
        decl: &'ast FunctionDecl<'ast>,
        params: &[Type],
        owner: Option<TypeDecl>,
    ) -> SemanticResult<()> {
        if let Some(owner) = owner.filter(|_| !decl.is_static) {
            let this_type = self.owner_type(owner).address_of().unwrap_or_else(Type::void);
            self.define(Symbol::new(
                "this",
                SymbolKind::Parameter,
                Some(this_type),
                SymbolTarget::Variable(decl.id),
                decl.span,
            ))?;
        }

        let mut seen = FxHashSet::default();
        for (param, ty) in decl.params.iter().zip(params) {
            if !seen.insert(param.name.name) {
                return Err(SemanticError::duplicate(
                    format!("Duplicate parameter name '{}'", param.name.name),
                    format!(
                        "The parameter '{}' is declared multiple times in function '{}'.",
                        param.name.name, decl.name.name
                    ),
                    param.span,
                ));
            }
            self.record(param.id, ty);
            self.types.record_decl(param.id, DeclRef::Variable(param.id));
            self.define(
                Symbol::new(
                    param.name.name,
                    SymbolKind::Parameter,
                    Some(ty.clone()),
                    SymbolTarget::Variable(param.id),
                    param.span,
                )
                .with_const(param.is_const),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::checker::Checker;
    use crate::options::CheckerOptions;
    use bpl_ast::{AstBuilder, Program};
    use bumpalo::Bump;

    fn check<'ast>(program: &'ast Program<'ast>) -> Checker<'ast> {
        let mut checker = Checker::new(CheckerOptions::default());
        checker.check_program(program).unwrap();
        checker
    }

    fn messages(checker: &Checker<'_>) -> Vec<String> {
        checker.diagnostics().errors().map(|d| d.message.clone()).collect()
    }

    #[test]
    fn missing_return_path() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program(
            "main.x",
            [b.function(
                "test",
                [],
                Some(b.ty("i32")),
                [b.if_stmt(b.bool_lit(true), [b.ret_value(b.int(1))], None)],
            )],
        );
        let checker = check(program);
        assert_eq!(
            messages(&checker),
            vec!["Function 'test' might not return a value on all code paths".to_string()]
        );
    }

    #[test]
    fn duplicate_parameter_name() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program(
            "main.x",
            [b.function("f", [b.param("a", b.ty("int")), b.param("a", b.ty("int"))], None, [])],
        );
        let checker = check(program);
        assert_eq!(messages(&checker), vec!["Duplicate parameter name 'a'".to_string()]);
        let hint = &checker.diagnostics().iter().next().unwrap().hint;
        assert_eq!(hint, "The parameter 'a' is declared multiple times in function 'f'.");
    }

    #[test]
    fn method_sees_this_and_fields() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program(
            "main.x",
            [b.struct_decl(
                "Counter",
                [],
                [],
                [
                    b.field("count", b.ty("int")),
                    b.method(
                        "get",
                        [],
                        Some(b.ty("int")),
                        [b.ret_value(b.member(b.ident("this"), "count"))],
                    ),
                ],
            )],
        );
        let checker = check(program);
        assert!(checker.diagnostics().is_empty(), "{}", checker.diagnostics());
    }

    #[test]
    fn static_method_has_no_this() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let make = b.function_decl("make", true, [], [], None, [b.expr_stmt(b.ident("this"))]);
        let program = b.program("main.x", [b.struct_decl("S", [], [], [b.member_fn(make)])]);
        let checker = check(program);
        assert_eq!(checker.diagnostics().error_count(), 1);
        assert_eq!(checker.diagnostics().iter().next().unwrap().message, "Undefined symbol 'this'");
    }

    #[test]
    fn generic_shadowing_error() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let method = b.function_decl("map", false, [b.generic("T", None)], [], None, []);
        let program = b.program(
            "main.x",
            [b.struct_decl("Box", [b.generic("T", None)], [], [b.member_fn(method)])],
        );
        let checker = check(program);
        assert_eq!(messages(&checker), vec!["Shadowing of generic parameter 'T'".to_string()]);
    }

    #[test]
    fn recursive_field_without_pointer() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program(
            "main.x",
            [
                b.struct_decl("Node", [], [], [b.field("next", b.ty("Node"))]),
                b.struct_decl("List", [], [], [b.field("head", b.ptr("List", 1))]),
            ],
        );
        let checker = check(program);
        assert_eq!(
            messages(&checker),
            vec!["Recursive struct 'Node' contains field 'next' of type 'Node' without pointer".to_string()]
        );
    }

    #[test]
    fn spec_conformance_is_checked() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program(
            "main.x",
            [
                b.spec_decl("Shape", [], [], [b.spec_method("area", [], Some(b.ty("float")))]),
                b.struct_decl("Square", [], [b.ty("Shape")], [b.field("side", b.ty("float"))]),
            ],
        );
        let checker = check(program);
        assert_eq!(
            messages(&checker),
            vec!["Struct 'Square' does not implement method 'area' from spec 'Shape'".to_string()]
        );
    }

    #[test]
    fn export_requires_definition() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program(
            "lib.x",
            [
                b.function("helper", [], None, []),
                b.export(["helper", "helpr2"]),
            ],
        );
        let checker = check(program);
        assert!(checker.linker().get("lib", "helper").unwrap().is_exported);
        assert_eq!(messages(&checker), vec!["Cannot export undefined symbol 'helpr2'".to_string()]);
    }

    #[test]
    fn globals_are_linker_variables() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program("main.x", [b.global("counter", Some(b.ty("int")), Some(b.int(0)))]);
        let checker = check(program);
        let symbol = checker.linker().get("main", "counter").unwrap();
        assert_eq!(symbol.ty.as_ref().unwrap().to_string(), "i32");
    }
}
