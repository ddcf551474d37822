//! Generic constraint validation.

use bpl_core::{SemanticError, SemanticResult, Span, Type, primitives};

use super::substitution::{TypeMap, build_type_map, substitute};
use crate::context::{GenericParamInfo, SemanticContext};
use crate::conversion::is_compatible;

/// Check each generic argument against its parameter's constraint.
///
/// `args` are canonical; `written` are the same arguments as the user wrote
/// them and are only used to render the diagnostic. A constraint may refer
/// to earlier parameters (`<T, U: Box<T>>`), so it is substituted with the
/// full argument map before the comparison.
///
/// Arguments that are themselves unbound generic parameters are accepted
/// here; they are checked where the enclosing generic is instantiated.
pub fn check_constraints(
    ctx: &SemanticContext<'_>,
    params: &[GenericParamInfo],
    args: &[Type],
    written: &[Type],
    span: Span,
) -> SemanticResult<()> {
    if params.iter().all(|p| p.constraint.is_none()) {
        return Ok(());
    }

    let canonical = build_type_map(params, args);
    let as_written: TypeMap = build_type_map(params, written);

    for (index, (param, arg)) in params.iter().zip(args).enumerate() {
        let Some(constraint) = &param.constraint else {
            continue;
        };
        if is_unbound_parameter(arg) {
            continue;
        }

        let expected = substitute(constraint, &canonical);
        if is_compatible(ctx, &expected, arg) {
            continue;
        }

        let shown_arg = written.get(index).unwrap_or(arg);
        let shown_constraint = param.constraint_src.as_ref().unwrap_or(constraint);
        tracing::debug!(param = %param.name, argument = %shown_arg, "generic constraint violated");
        return Err(SemanticError::ConstraintViolation {
            argument: shown_arg.to_string(),
            constraint: substitute(shown_constraint, &as_written).to_string(),
            span,
        });
    }
    Ok(())
}

/// A named type with no declaration that is not a builtin: a generic
/// parameter still waiting for its argument.
fn is_unbound_parameter(ty: &Type) -> bool {
    match ty.as_basic() {
        Some(basic) => {
            basic.decl.is_none()
                && !primitives::BASE_TYPES.contains(&primitives::canonical_name(&basic.name))
        }
        None => false,
    }
}
