//! `match` expressions over enum values.
//!
//! Each arm gets its own scope holding the pattern's bindings. A block
//! arm's value is the first `return` inside it; a block without one is
//! `void`. Guarded arms never count towards exhaustiveness.

use bpl_ast::{ArmBody, Ident, MatchArm, MatchExpr, Pattern, PatternKind};
use bpl_core::{DeclRef, EnumId, NodeId, SemanticError, SemanticResult, Type, TypeDecl};
use rustc_hash::FxHashSet;

use super::enum_basic;
use crate::checker::Checker;
use crate::context::{VariantInfo, VariantPayload};
use crate::conversion::{is_assignable, is_compatible};
use crate::scope::{Symbol, SymbolKind, SymbolTarget};
use crate::template::{TypeMap, build_type_map, substitute};

/// The enum a match inspects, with its generic arguments bound.
struct Scrutinee {
    id: EnumId,
    name: String,
    ty: Type,
    map: TypeMap,
}

impl<'ast> Checker<'ast> {
    pub(crate) fn check_match(
        &mut self,
        m: &MatchExpr<'ast>,
        expected: Option<&Type>,
    ) -> SemanticResult<Type> {
        let value = self.check_expr(&m.value, None)?;
        let scrutinee = self.scrutinee(&value).ok_or_else(|| {
            SemanticError::type_mismatch(
                format!("Match value must be an enum type, got {}", value),
                "Match expressions are currently only supported on enum types.",
                m.value.span(),
            )
        })?;

        let mut result: Option<Type> = None;
        for arm in m.arms {
            let hint = expected.or(result.as_ref()).cloned();
            let arm_ty = self.in_scope(|this| this.check_arm(arm, &scrutinee, hint.as_ref()))?;
            match &result {
                None => result = Some(arm_ty),
                Some(first) if !is_assignable(&self.ctx, first, &arm_ty) => {
                    return Err(SemanticError::type_mismatch(
                        format!(
                            "Match arms must have compatible types: {} vs {}",
                            first, arm_ty
                        ),
                        "All match arms must return the same type.",
                        arm.span,
                    ));
                }
                Some(_) => {}
            }
        }

        self.check_exhaustive(m, &scrutinee)?;
        Ok(result.unwrap_or_else(Type::void))
    }

    fn scrutinee(&self, value: &Type) -> Option<Scrutinee> {
        let basic = enum_basic(value)?;
        let Some(TypeDecl::Enum(id)) = basic.decl else {
            return None;
        };
        let info = self.ctx.enum_info(id);
        Some(Scrutinee {
            id,
            name: info.name.clone(),
            ty: value.clone(),
            map: build_type_map(&info.generic_params, &basic.generic_args),
        })
    }

    fn check_arm(
        &mut self,
        arm: &MatchArm<'ast>,
        scrutinee: &Scrutinee,
        expected: Option<&Type>,
    ) -> SemanticResult<Type> {
        self.check_pattern(&arm.pattern, scrutinee)?;

        if let Some(guard) = &arm.guard {
            let ty = self.check_expr(guard, None)?;
            if !ty.is_bool() {
                return Err(SemanticError::type_mismatch(
                    format!("Match guard must be a boolean expression, got {}", ty),
                    "Guards must evaluate to bool.",
                    guard.span(),
                ));
            }
        }

        match arm.body {
            ArmBody::Expr(body) => self.check_expr(&body, expected),
            ArmBody::Block(block) => {
                self.match_returns.push(Vec::new());
                let checked = self.check_block(block);
                let returns = self.match_returns.pop().unwrap_or_default();
                checked?;
                Ok(returns.into_iter().next().unwrap_or_else(Type::void))
            }
        }
    }

    fn check_pattern(&mut self, pattern: &Pattern<'ast>, scrutinee: &Scrutinee) -> SemanticResult<()> {
        self.record(pattern.id, &scrutinee.ty);
        match pattern.kind {
            PatternKind::Wildcard => Ok(()),
            PatternKind::Literal(lit) => {
                let ty = self.check_literal(lit, Some(&scrutinee.ty));
                if is_assignable(&self.ctx, &scrutinee.ty, &ty) {
                    return Ok(());
                }
                Err(SemanticError::type_mismatch(
                    format!("Pattern of type {} cannot match a value of type {}", ty, scrutinee.ty),
                    "Use a variant pattern to match enum values.",
                    pattern.span,
                ))
            }
            PatternKind::Binding { name, ty } => {
                if let Some(written) = ty {
                    let declared = self.resolve_type_expr(&written)?;
                    if !is_compatible(&self.ctx, &declared, &scrutinee.ty) {
                        return Err(SemanticError::type_mismatch(
                            format!(
                                "Pattern of type {} cannot match a value of type {}",
                                declared, scrutinee.ty
                            ),
                            "The binding's type must match the matched value.",
                            pattern.span,
                        ));
                    }
                }
                self.bind_pattern(name, scrutinee.ty.clone(), pattern.id)
            }
            PatternKind::Enum { enum_name, variant, .. } => {
                let info = self.pattern_variant(pattern, enum_name, variant, scrutinee)?;
                if info.payload != VariantPayload::Unit {
                    return Err(SemanticError::type_mismatch(
                        format!(
                            "Variant '{}' has associated data, use tuple or struct pattern",
                            variant.name
                        ),
                        "This variant requires destructuring.",
                        variant.span,
                    ));
                }
                Ok(())
            }
            PatternKind::EnumTuple { enum_name, variant, bindings, .. } => {
                let info = self.pattern_variant(pattern, enum_name, variant, scrutinee)?;
                let VariantPayload::Tuple(types) = &info.payload else {
                    return Err(SemanticError::type_mismatch(
                        format!("Variant '{}' is not a tuple variant", variant.name),
                        "Use the correct pattern syntax.",
                        variant.span,
                    ));
                };
                if types.len() != bindings.len() {
                    return Err(SemanticError::arity(
                        format!("Expected {} bindings, got {}", types.len(), bindings.len()),
                        format!("Variant '{}' requires {} values.", variant.name, types.len()),
                        pattern.span,
                    ));
                }
                for (binding, ty) in bindings.iter().zip(types) {
                    self.bind_pattern(*binding, substitute(ty, &scrutinee.map), pattern.id)?;
                }
                Ok(())
            }
            PatternKind::EnumStruct { enum_name, variant, fields, .. } => {
                let info = self.pattern_variant(pattern, enum_name, variant, scrutinee)?;
                let VariantPayload::Struct(declared) = &info.payload else {
                    return Err(SemanticError::type_mismatch(
                        format!("Variant '{}' is not a struct variant", variant.name),
                        "Use the correct pattern syntax.",
                        variant.span,
                    ));
                };
                for field in fields {
                    let Some(found) = declared.iter().find(|f| f.name == field.field.name) else {
                        return Err(SemanticError::undefined_with(
                            field.field.name,
                            format!(
                                "Unknown field '{}' in variant '{}'",
                                field.field.name, variant.name
                            ),
                            field.field.span,
                        ));
                    };
                    self.bind_pattern(field.binding, substitute(&found.ty, &scrutinee.map), pattern.id)?;
                }
                Ok(())
            }
        }
    }

    /// The variant a pattern names, after checking the pattern names the
    /// matched enum.
    fn pattern_variant(
        &mut self,
        pattern: &Pattern<'_>,
        enum_name: Ident<'_>,
        variant: Ident<'_>,
        scrutinee: &Scrutinee,
    ) -> SemanticResult<VariantInfo> {
        let named = self
            .resolver()
            .lookup_type(enum_name.name)
            .map(|symbol| symbol.target);
        if let Some(SymbolTarget::Type(decl)) = named {
            if decl != TypeDecl::Enum(scrutinee.id) {
                return Err(SemanticError::type_mismatch(
                    format!(
                        "Pattern enum '{}' does not match value type {}",
                        enum_name.name, scrutinee.ty
                    ),
                    "Match arms must name variants of the matched enum.",
                    enum_name.span,
                ));
            }
        }

        let info = self
            .ctx
            .enum_info(scrutinee.id)
            .variant(variant.name)
            .cloned()
            .ok_or_else(|| {
                SemanticError::undefined_with(
                    variant.name,
                    format!("Unknown variant '{}' in enum '{}'", variant.name, scrutinee.name),
                    variant.span,
                )
            })?;
        self.types
            .record_decl(pattern.id, DeclRef::Type(TypeDecl::Enum(scrutinee.id)));
        Ok(info)
    }

    /// `_` discards the value without binding it.
    fn bind_pattern(&mut self, name: Ident<'_>, ty: Type, node: NodeId) -> SemanticResult<()> {
        if name.name == "_" {
            return Ok(());
        }
        self.define(Symbol::new(
            name.name,
            SymbolKind::Variable,
            Some(ty),
            SymbolTarget::Variable(node),
            name.span,
        ))
    }

    fn check_exhaustive(&self, m: &MatchExpr<'_>, scrutinee: &Scrutinee) -> SemanticResult<()> {
        let unguarded = m.arms.iter().filter(|arm| arm.guard.is_none());
        let mut covered = FxHashSet::default();
        for arm in unguarded {
            if arm.pattern.kind.is_catch_all() {
                return Ok(());
            }
            if let Some(variant) = arm.pattern.kind.variant() {
                covered.insert(variant.name);
            }
        }

        let missing: Vec<&str> = self
            .ctx
            .enum_info(scrutinee.id)
            .variants
            .iter()
            .map(|v| v.name.as_str())
            .filter(|name| !covered.contains(name))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(SemanticError::control_flow(
            format!("Non-exhaustive match: missing variants: {}", missing.join(", ")),
            "Match expressions must handle all enum variants or include a wildcard (_) pattern. Note: Guarded arms do not contribute to exhaustiveness.",
            m.span,
        ))
    }
}
