//! Array, struct, tuple, and enum-struct literals.

use bpl_ast::{
    ArrayLiteralExpr, EnumStructVariantExpr, FieldInit, StructLiteralExpr, TupleLiteralExpr,
};
use bpl_core::{
    BasicType, DeclRef, EnumId, SemanticError, SemanticResult, Span, StructId, Type, TypeDecl,
};

use crate::checker::Checker;
use crate::context::VariantPayload;
use crate::lookup::all_fields;
use crate::scope::{SymbolKind, SymbolTarget};
use crate::template::{build_type_map, check_constraints, substitute};

impl<'ast> Checker<'ast> {
    /// Every element must agree with the first one. The literal's length
    /// becomes the outermost dimension of the result.
    pub(crate) fn check_array_literal(
        &mut self,
        array: &ArrayLiteralExpr<'ast>,
        expected: Option<&Type>,
    ) -> SemanticResult<Type> {
        let expected = expected.filter(|t| t.is_array());
        let Some((first, rest)) = array.elements.split_first() else {
            return expected.cloned().ok_or_else(|| {
                SemanticError::type_mismatch(
                    "Cannot infer the element type of an empty array literal",
                    "Declare the variable with an explicit array type.",
                    array.span,
                )
            });
        };

        let element_hint = expected.and_then(Type::element);
        let first_ty = self.check_expr(first, element_hint.as_ref())?;
        for element in rest {
            let ty = self.check_expr(element, Some(&first_ty))?;
            self.check_assignable(&first_ty, &ty, element, || {
                SemanticError::type_mismatch(
                    format!(
                        "Array literal has inconsistent element types: {} vs {}",
                        first_ty, ty
                    ),
                    "All elements in an array literal must have the same type.",
                    element.span(),
                )
            })?;
        }

        let Type::Basic(mut basic) = first_ty else {
            return Err(SemanticError::unsupported(
                format!("Arrays of {} are not supported", first_ty),
                "Array elements must be named, pointer, or array types.",
                array.span,
            ));
        };
        basic.array_dims.insert(0, Some(array.elements.len() as u64));
        Ok(Type::Basic(basic))
    }

    /// `Name<Args> { field: value, ... }`.
    ///
    /// Every field, inherited ones included, must be initialised exactly
    /// once. A generic struct written without arguments takes them from
    /// the expected type.
    pub(crate) fn check_struct_literal(
        &mut self,
        lit: &StructLiteralExpr<'ast>,
        expected: Option<&Type>,
    ) -> SemanticResult<Type> {
        let struct_name = lit.name.name;
        let Some(id) = self.lookup_struct(struct_name) else {
            return Err(SemanticError::undefined_with(
                struct_name,
                format!("Unknown struct '{}'", struct_name),
                lit.span,
            ));
        };

        let (mut args, written) = self.explicit_generics(lit.generic_args)?;
        let params = self.ctx.struct_info(id).generic_params.clone();
        if args.is_empty() && !params.is_empty() {
            let from_expected = expected
                .and_then(Type::as_basic)
                .filter(|b| b.is_scalar() && b.decl == Some(TypeDecl::Struct(id)));
            if let Some(from_expected) = from_expected {
                args = from_expected.generic_args.clone();
            }
        } else if !args.is_empty() {
            if args.len() != params.len() {
                return Err(SemanticError::arity(
                    format!(
                        "Generic type '{}' expects {} arguments, but got {}",
                        struct_name,
                        params.len(),
                        args.len()
                    ),
                    "Provide the correct number of generic arguments.",
                    lit.span,
                ));
            }
            check_constraints(&self.ctx, &params, &args, &written, lit.span)?;
        }

        let basic = BasicType {
            generic_args: args,
            decl: Some(TypeDecl::Struct(id)),
            ..BasicType::named(self.ctx.struct_info(id).name.clone())
        };
        let fields = all_fields(&self.ctx, &basic);
        for (name, _) in &fields {
            if !lit.fields.iter().any(|init| init.name.name == name) {
                return Err(SemanticError::type_mismatch(
                    format!("Missing field '{}' in struct literal for '{}'", name, struct_name),
                    format!("Field '{}' is required.", name),
                    lit.span,
                ));
            }
        }

        for init in lit.fields {
            let Some((_, field_ty)) = fields.iter().find(|(name, _)| name == init.name.name) else {
                return Err(SemanticError::undefined_with(
                    init.name.name,
                    format!("Unknown field '{}' in struct '{}'", init.name.name, struct_name),
                    init.value.span(),
                ));
            };
            self.check_field_init(init, field_ty)?;
        }
        ensure_unique_fields(lit.fields)?;

        self.types.record_decl(lit.id, DeclRef::Type(TypeDecl::Struct(id)));
        Ok(Type::Basic(basic))
    }

    pub(crate) fn check_tuple_literal(
        &mut self,
        tuple: &TupleLiteralExpr<'ast>,
        expected: Option<&Type>,
    ) -> SemanticResult<Type> {
        let hints = match expected {
            Some(Type::Tuple(types)) if types.len() == tuple.elements.len() => Some(types.as_slice()),
            _ => None,
        };
        let mut types = Vec::with_capacity(tuple.elements.len());
        for (i, element) in tuple.elements.iter().enumerate() {
            types.push(self.check_expr(element, hints.and_then(|h| h.get(i)))?);
        }
        Ok(Type::Tuple(types))
    }

    /// `Enum.Variant { field: value, ... }`.
    pub(crate) fn check_enum_struct_variant(
        &mut self,
        lit: &EnumStructVariantExpr<'ast>,
        expected: Option<&Type>,
    ) -> SemanticResult<Type> {
        let enum_name = lit.enum_name.name;
        let variant_name = lit.variant.name;
        let Some(id) = self.lookup_enum(enum_name) else {
            return Err(SemanticError::undefined_with(
                enum_name,
                format!("Unknown enum '{}'", enum_name),
                lit.span,
            ));
        };

        let info = self.ctx.enum_info(id);
        let enum_ty = BasicType {
            decl: Some(TypeDecl::Enum(id)),
            ..BasicType::named(info.name.clone())
        };
        let params = info.generic_params.clone();
        let Some(variant) = info.variant(variant_name).cloned() else {
            return Err(SemanticError::undefined_with(
                variant_name,
                format!("Unknown variant '{}' in enum '{}'", variant_name, enum_name),
                lit.span,
            ));
        };
        let VariantPayload::Struct(fields) = variant.payload else {
            return Err(SemanticError::type_mismatch(
                format!("Variant '{}' is not a struct variant", variant_name),
                "Use tuple syntax for tuple variants.",
                lit.span,
            ));
        };

        let generic_args = self.variant_generic_args(&enum_ty, expected);
        let map = build_type_map(&params, &generic_args);
        for field in &fields {
            if !lit.fields.iter().any(|init| init.name.name == field.name) {
                return Err(SemanticError::type_mismatch(
                    format!("Missing field '{}' in variant '{}'", field.name, variant_name),
                    format!("Field '{}' is required.", field.name),
                    lit.span,
                ));
            }
        }
        for init in lit.fields {
            let Some(field) = fields.iter().find(|f| f.name == init.name.name) else {
                return Err(SemanticError::undefined_with(
                    init.name.name,
                    format!("Unknown field '{}' in variant '{}'", init.name.name, variant_name),
                    init.value.span(),
                ));
            };
            let field_ty = substitute(&field.ty, &map);
            self.check_field_init(init, &field_ty)?;
        }
        ensure_unique_fields(lit.fields)?;

        self.types.record_decl(lit.id, DeclRef::Type(TypeDecl::Enum(id)));
        Ok(Type::Basic(BasicType {
            generic_args,
            ..enum_ty
        }))
    }

    fn check_field_init(&mut self, init: &FieldInit<'ast>, field_ty: &Type) -> SemanticResult<()> {
        let actual = self.check_expr(&init.value, Some(field_ty))?;
        self.check_assignable(field_ty, &actual, &init.value, || {
            SemanticError::type_mismatch(
                format!(
                    "Type mismatch for field '{}': expected {}, got {}",
                    init.name.name, field_ty, actual
                ),
                "Field value must match the declared type.",
                init.value.span(),
            )
        })
    }

    fn lookup_struct(&self, name: &str) -> Option<StructId> {
        let symbol = self.resolver().lookup_type(name)?;
        match (symbol.kind, symbol.target) {
            (SymbolKind::Struct, SymbolTarget::Type(TypeDecl::Struct(id))) => Some(id),
            _ => None,
        }
    }

    fn lookup_enum(&self, name: &str) -> Option<EnumId> {
        let symbol = self.resolver().lookup_type(name)?;
        match (symbol.kind, symbol.target) {
            (SymbolKind::Enum, SymbolTarget::Type(TypeDecl::Enum(id))) => Some(id),
            _ => None,
        }
    }
}

fn ensure_unique_fields(fields: &[FieldInit<'_>]) -> SemanticResult<()> {
    for (i, init) in fields.iter().enumerate() {
        if fields[..i].iter().any(|earlier| earlier.name.name == init.name.name) {
            return Err(duplicate_field(init.name.name, init.name.span));
        }
    }
    Ok(())
}

fn duplicate_field(name: &str, span: Span) -> SemanticError {
    SemanticError::duplicate(
        format!("Field '{}' is initialised more than once", name),
        "Remove the repeated field initialiser.",
        span,
    )
}

#[cfg(test)]
mod tests {
    use crate::expr::test_support::{check, errors, in_main, type_of};
    use bpl_ast::AstBuilder;
    use bumpalo::Bump;

    #[test]
    fn array_literal_types() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let flat = b.array([b.int(1), b.int(2), b.int(3)]);
        let nested = b.array([b.array([b.int(1), b.int(2)]), b.array([b.int(3), b.int(4)])]);
        let typed = b.array([b.int(1), b.int(2)]);
        let program = in_main(
            &b,
            vec![],
            vec![
                b.expr_stmt(flat),
                b.expr_stmt(nested),
                b.local("bytes", Some(b.array_ty("u8", [Some(2)])), Some(typed)),
                b.local("empty", Some(b.array_ty("int", [Some(0)])), Some(b.array([]))),
            ],
        );
        let checker = check(program);
        assert!(errors(&checker).is_empty(), "{:?}", errors(&checker));
        assert_eq!(type_of(&checker, &flat), "i32[3]");
        assert_eq!(type_of(&checker, &nested), "i32[2][2]");
        assert_eq!(type_of(&checker, &typed), "u8[2]");
    }

    #[test]
    fn inconsistent_array_elements() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = in_main(
            &b,
            vec![],
            vec![
                b.expr_stmt(b.array([b.int(1), b.string("two")])),
                b.expr_stmt(b.array([])),
            ],
        );
        let checker = check(program);
        assert_eq!(
            errors(&checker),
            vec![
                "Array literal has inconsistent element types: i32 vs *i8".to_string(),
                "Cannot infer the element type of an empty array literal".to_string(),
            ]
        );
    }

    #[test]
    fn struct_literal_fields() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let point = b.struct_decl(
            "Point",
            [],
            [],
            [b.field("x", b.ty("int")), b.field("y", b.ty("int"))],
        );
        let ok = b.struct_lit("Point", [], [("x", b.int(1)), ("y", b.int(2))]);
        let program = in_main(
            &b,
            vec![point],
            vec![
                b.expr_stmt(ok),
                b.expr_stmt(b.struct_lit("Point", [], [("x", b.int(1))])),
                b.expr_stmt(b.struct_lit("Point", [], [("x", b.int(1)), ("y", b.int(2)), ("z", b.int(3))])),
                b.expr_stmt(b.struct_lit("Point", [], [("x", b.int(1)), ("y", b.string("2"))])),
                b.expr_stmt(b.struct_lit("Pointe", [], [])),
            ],
        );
        let checker = check(program);
        assert_eq!(type_of(&checker, &ok), "Point");
        assert_eq!(
            errors(&checker),
            vec![
                "Missing field 'y' in struct literal for 'Point'".to_string(),
                "Unknown field 'z' in struct 'Point'".to_string(),
                "Type mismatch for field 'y': expected i32, got *i8".to_string(),
                "Unknown struct 'Pointe'".to_string(),
            ]
        );
    }

    #[test]
    fn generic_struct_literal() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let boxed = b.struct_decl("Box", [b.generic("T", None)], [], [b.field("value", b.ty("T"))]);
        let explicit = b.struct_lit("Box", [b.ty("long")], [("value", b.int(1))]);
        let inferred = b.struct_lit("Box", [], [("value", b.int(2))]);
        let program = in_main(
            &b,
            vec![boxed],
            vec![
                b.expr_stmt(explicit),
                b.local("u", Some(b.generic_ty("Box", [b.ty("u8")])), Some(inferred)),
                b.expr_stmt(b.struct_lit("Box", [b.ty("int")], [("value", b.string("s"))])),
            ],
        );
        let checker = check(program);
        assert_eq!(type_of(&checker, &explicit), "Box<i64>");
        assert_eq!(type_of(&checker, &inferred), "Box<u8>");
        assert_eq!(
            errors(&checker),
            vec!["Type mismatch for field 'value': expected i32, got *i8".to_string()]
        );
    }

    #[test]
    fn tuple_literal_uses_expected_elements() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let pair = b.tuple([b.int(1), b.bool_lit(false)]);
        let program = in_main(
            &b,
            vec![],
            vec![b.local(
                "p",
                Some(b.tuple_ty([b.ty("u16"), b.ty("bool")])),
                Some(pair),
            )],
        );
        let checker = check(program);
        assert!(errors(&checker).is_empty(), "{:?}", errors(&checker));
        assert_eq!(type_of(&checker, &pair), "(u16, i1)");
    }

    #[test]
    fn enum_struct_variant_literal() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let shape = b.enum_decl(
            "Shape",
            [],
            [
                b.struct_variant("Rect", [("w", b.ty("int")), ("h", b.ty("int"))]),
                b.tuple_variant("Circle", [b.ty("int")]),
            ],
            [],
        );
        let rect = b.enum_struct("Shape", "Rect", [("w", b.int(1)), ("h", b.int(2))]);
        let program = in_main(
            &b,
            vec![shape],
            vec![
                b.expr_stmt(rect),
                b.expr_stmt(b.enum_struct("Shape", "Circle", [])),
                b.expr_stmt(b.enum_struct("Shape", "Square", [])),
                b.expr_stmt(b.enum_struct("Shape", "Rect", [("w", b.int(1)), ("h", b.int(2)), ("d", b.int(3))])),
                b.expr_stmt(b.enum_struct("Shapes", "Rect", [])),
            ],
        );
        let checker = check(program);
        assert_eq!(type_of(&checker, &rect), "Shape");
        assert_eq!(
            errors(&checker),
            vec![
                "Variant 'Circle' is not a struct variant".to_string(),
                "Unknown variant 'Square' in enum 'Shape'".to_string(),
                "Unknown field 'd' in variant 'Rect'".to_string(),
                "Unknown enum 'Shapes'".to_string(),
            ]
        );
    }
}
