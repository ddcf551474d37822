//! Casts, `sizeof`, and runtime type tests.

use bpl_ast::{AsExpr, CastExpr, Expr, IsExpr, SizeofExpr, SizeofTarget, TypeExpr};
use bpl_core::{DeclRef, SemanticError, SemanticResult, Span, Type, TypeDecl};

use super::is_integer_scalar;
use crate::checker::Checker;
use crate::conversion::is_cast_allowed;
use crate::scope::{SymbolKind, SymbolTarget};

impl<'ast> Checker<'ast> {
    pub(crate) fn check_cast(&mut self, cast: &CastExpr<'ast>) -> SemanticResult<Type> {
        self.check_conversion(&cast.expr, &cast.target, cast.span)
    }

    /// `expr as T` follows the same rules as `cast<T>(expr)`.
    pub(crate) fn check_as(&mut self, as_expr: &AsExpr<'ast>) -> SemanticResult<Type> {
        self.check_conversion(&as_expr.expr, &as_expr.ty, as_expr.span)
    }

    fn check_conversion(
        &mut self,
        expr: &Expr<'ast>,
        target: &TypeExpr<'ast>,
        span: Span,
    ) -> SemanticResult<Type> {
        let source = self.check_expr(expr, None)?;
        let resolved = self.resolve_type_expr(target)?;

        let names_string = target
            .as_named()
            .is_some_and(|n| n.name == "string" && n.pointer_depth == 0 && n.array_dims.is_empty());
        if names_string && is_integer_scalar(&source) {
            return Err(SemanticError::unsupported(
                format!("Cannot cast integer type '{}' to 'string'", source),
                "Casting integers to string is not allowed. Use a formatting function instead.",
                span,
            ));
        }
        if !is_cast_allowed(&self.ctx, &source, &resolved) {
            return Err(SemanticError::unsupported(
                format!("Cannot cast {} to {}", source, resolved),
                "This cast is not allowed.",
                span,
            ));
        }
        Ok(resolved)
    }

    /// `sizeof` is always `i64`.
    pub(crate) fn check_sizeof(&mut self, sizeof: &SizeofExpr<'ast>) -> SemanticResult<Type> {
        let measured = match sizeof.target {
            SizeofTarget::Type(ty) => self.resolve_type_expr(&ty)?,
            SizeofTarget::Expr(expr) => self.check_expr(&expr, None)?,
        };
        if measured.is_void() {
            return Err(SemanticError::type_mismatch(
                "Cannot take size of void",
                "Void type has no size.",
                sizeof.span,
            ));
        }
        Ok(Type::named("i64"))
    }

    /// `value is T` or `value is Enum.Variant`.
    ///
    /// A dotted name that is not itself a type names an enum variant; the
    /// part before the last dot must resolve to an enum.
    pub(crate) fn check_is(&mut self, is_expr: &IsExpr<'ast>) -> SemanticResult<Type> {
        self.check_expr(&is_expr.expr, None)?;

        let variant_test = is_expr
            .ty
            .as_named()
            .filter(|n| n.generic_args.is_empty() && n.pointer_depth == 0 && n.array_dims.is_empty())
            .filter(|n| self.resolver().lookup_type(n.name).is_none())
            .and_then(|n| n.name.rsplit_once('.'));

        let Some((enum_path, variant)) = variant_test else {
            self.resolve_type_expr(&is_expr.ty)?;
            return Ok(Type::bool());
        };

        let enum_id = self
            .resolver()
            .lookup_type(enum_path)
            .and_then(|symbol| match (symbol.kind, symbol.target) {
                (SymbolKind::Enum, SymbolTarget::Type(TypeDecl::Enum(id))) => Some(id),
                _ => None,
            });
        let Some(id) = enum_id else {
            return Err(SemanticError::undefined_with(
                enum_path,
                format!("Cannot find enum '{}'", enum_path),
                is_expr.span,
            ));
        };
        if self.ctx.enum_info(id).variant(variant).is_none() {
            return Err(SemanticError::undefined_with(
                variant,
                format!("Enum '{}' has no variant '{}'", enum_path, variant),
                is_expr.span,
            ));
        }
        self.types.record_decl(is_expr.id, DeclRef::Type(TypeDecl::Enum(id)));
        Ok(Type::bool())
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::test_support::{check, errors, in_main, type_of};
    use bpl_ast::AstBuilder;
    use bumpalo::Bump;

    #[test]
    fn numeric_and_pointer_casts() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let widened = b.cast(b.ty("long"), b.ident("n"));
        let to_float = b.as_expr(b.ident("n"), b.ty("double"));
        let program = in_main(
            &b,
            vec![],
            vec![
                b.local("n", Some(b.ty("int")), Some(b.int(1))),
                b.expr_stmt(widened),
                b.expr_stmt(to_float),
            ],
        );
        let checker = check(program);
        assert!(errors(&checker).is_empty(), "{:?}", errors(&checker));
        assert_eq!(type_of(&checker, &widened), "i64");
        assert_eq!(type_of(&checker, &to_float), "double");
    }

    #[test]
    fn integer_to_string_cast_is_rejected() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = in_main(
            &b,
            vec![],
            vec![b.expr_stmt(b.cast(b.ty("string"), b.int(5)))],
        );
        let checker = check(program);
        assert_eq!(
            errors(&checker),
            vec!["Cannot cast integer type 'i32' to 'string'".to_string()]
        );
    }

    #[test]
    fn sizeof_is_i64() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let of_type = b.sizeof_type(b.ty("int"));
        let of_expr = b.sizeof_expr(b.string("abc"));
        let program = in_main(
            &b,
            vec![],
            vec![
                b.expr_stmt(of_type),
                b.expr_stmt(of_expr),
                b.expr_stmt(b.sizeof_type(b.ty("void"))),
            ],
        );
        let checker = check(program);
        assert_eq!(type_of(&checker, &of_type), "i64");
        assert_eq!(type_of(&checker, &of_expr), "i64");
        assert_eq!(errors(&checker), vec!["Cannot take size of void".to_string()]);
    }

    #[test]
    fn is_expressions() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let option = b.enum_decl(
            "Option",
            [b.generic("T", None)],
            [b.tuple_variant("Some", [b.ty("T")]), b.unit_variant("None")],
            [],
        );
        let test = b.is_expr(b.ident("o"), b.ty("Option.Some"));
        let program = in_main(
            &b,
            vec![option],
            vec![
                b.local("o", Some(b.generic_ty("Option", [b.ty("int")])), None),
                b.expr_stmt(test),
                b.expr_stmt(b.is_expr(b.ident("o"), b.ty("Option.Maybe"))),
                b.expr_stmt(b.is_expr(b.ident("o"), b.ty("Result.Ok"))),
                b.expr_stmt(b.is_expr(b.ident("o"), b.ty("int"))),
            ],
        );
        let checker = check(program);
        assert_eq!(type_of(&checker, &test), "i1");
        assert_eq!(
            errors(&checker),
            vec![
                "Enum 'Option' has no variant 'Maybe'".to_string(),
                "Cannot find enum 'Result'".to_string(),
            ]
        );
    }
}
