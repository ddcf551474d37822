//! Spec conformance.
//!
//! A struct listing a spec among its parents must provide every method the
//! spec (and its parent specs) requires. Requirements are compared after
//! substituting the spec's generic arguments and binding `Self` to the
//! implementing struct.

use bpl_core::{BasicType, SemanticError, SemanticResult, Span, StructId, Type, TypeDecl};

use crate::context::{SemanticContext, SpecMethodInfo};
use crate::conversion::{MAX_INHERITANCE_DEPTH, is_compatible};
use crate::lookup::{Candidate, find_methods};
use crate::template::{TypeMap, build_type_map, substitute};

/// The struct's own type as seen from inside its declaration: its generic
/// parameters are passed through as arguments.
pub fn self_type(ctx: &SemanticContext<'_>, id: StructId) -> Type {
    let info = ctx.struct_info(id);
    Type::Basic(BasicType {
        generic_args: info
            .generic_params
            .iter()
            .map(|p| Type::named(p.name.clone()))
            .collect(),
        decl: Some(TypeDecl::Struct(id)),
        ..BasicType::named(info.name.clone())
    })
}

/// Check that struct `id` implements `spec` (a resolved spec reference).
pub fn check_spec_implementation(
    ctx: &SemanticContext<'_>,
    id: StructId,
    spec: &BasicType,
) -> SemanticResult<()> {
    let self_ty = self_type(ctx, id);
    let Type::Basic(self_base) = &self_ty else {
        return Ok(());
    };
    let struct_name = &ctx.struct_info(id).name;
    let struct_span = ctx.struct_info(id).span;

    for (spec_name, requirement, map) in requirements(ctx, spec, &self_ty) {
        let implementation = find_methods(ctx, self_base, &requirement.name, &self_ty)
            .and_then(|lookup| pick_implementation(lookup.candidates, requirement.params.len()));
        let Some(implementation) = implementation else {
            return Err(SemanticError::conformance(
                format!(
                    "Struct '{}' does not implement method '{}' from spec '{}'",
                    struct_name, requirement.name, spec_name
                ),
                format!("Missing implementation of: {}", requirement.name),
                struct_span,
            ));
        };
        let method_span = implementation
            .function
            .map(|f| ctx.function(f).span)
            .unwrap_or(struct_span);

        let expected_ret = substitute(&requirement.ret, &map);
        let actual_ret = &*implementation.signature.ret;
        if !is_compatible(ctx, &expected_ret, actual_ret) {
            return Err(SemanticError::conformance(
                format!(
                    "Method '{}' in struct '{}' has incorrect return type",
                    requirement.name, struct_name
                ),
                format!("Expected '{}', got '{}'", expected_ret, actual_ret),
                method_span,
            ));
        }

        let actual_params = &implementation.signature.params;
        if actual_params.len() != requirement.params.len() {
            return Err(SemanticError::conformance(
                format!(
                    "Method '{}' in struct '{}' has incorrect parameter count",
                    requirement.name, struct_name
                ),
                format!(
                    "Expected {}, got {}",
                    requirement.params.len(),
                    actual_params.len()
                ),
                method_span,
            ));
        }

        for ((param_name, required, _), actual) in requirement.params.iter().zip(actual_params) {
            let expected = substitute(required, &map);
            if !is_compatible(ctx, &expected, actual) {
                let span = param_span(ctx, &implementation, param_name).unwrap_or(method_span);
                return Err(SemanticError::conformance(
                    format!(
                        "Parameter '{}' of method '{}' has incorrect type",
                        param_name, requirement.name
                    ),
                    format!("Expected '{}', got '{}'", expected, actual),
                    span,
                ));
            }
        }
    }
    Ok(())
}

/// Every method `spec` requires, with the owning spec's name and the
/// substitution that applies to it. Parent specs contribute theirs too.
fn requirements(
    ctx: &SemanticContext<'_>,
    spec: &BasicType,
    self_ty: &Type,
) -> Vec<(String, SpecMethodInfo, TypeMap)> {
    let mut out = Vec::new();
    let mut pending = vec![spec.clone()];
    let mut visited = Vec::new();

    while let Some(current) = pending.pop() {
        let Some(TypeDecl::Spec(id)) = current.decl else {
            continue;
        };
        if visited.contains(&id) || visited.len() >= MAX_INHERITANCE_DEPTH {
            continue;
        }
        visited.push(id);

        let info = ctx.spec_info(id);
        let mut map = build_type_map(&info.generic_params, &current.generic_args);
        map.insert("Self".to_string(), self_ty.clone());

        for method in &info.methods {
            out.push((info.name.clone(), method.clone(), map.clone()));
        }
        for parent in &info.parents {
            if let Type::Basic(parent) = substitute(parent, &map) {
                pending.push(parent);
            }
        }
    }
    out
}

/// Prefer the overload whose arity matches; otherwise any, so the arity
/// mismatch is reported.
fn pick_implementation(candidates: Vec<Candidate>, arity: usize) -> Option<Candidate> {
    let matching = candidates
        .iter()
        .position(|c| c.signature.params.len() == arity)
        .unwrap_or(0);
    candidates.into_iter().nth(matching)
}

fn param_span(ctx: &SemanticContext<'_>, candidate: &Candidate, name: &str) -> Option<Span> {
    let decl = ctx.function(candidate.function?).decl?;
    let index = ctx
        .function(candidate.function?)
        .param_names
        .iter()
        .position(|n| n == name);
    match index {
        Some(i) => decl.params.get(i).map(|p| p.ty.span()),
        None => None,
    }
}
