//! Overload resolution for function calls.
//!
//! This module selects the function a call binds to from a set of
//! same-named candidates.
//!
//! ## Algorithm
//!
//! 1. Filter candidates by argument count (variadic candidates accept extra
//!    arguments)
//! 2. Filter by generic arity: with explicit generic arguments only generic
//!    candidates of that arity survive; without them generic candidates are
//!    skipped, since generic arguments are never inferred
//! 3. Substitute explicit generic arguments into each survivor's signature
//! 4. Place each survivor in a tier: exact when every argument is exact,
//!    widening when any argument widens, compatible otherwise
//! 5. Keep the best tier, prefer non-generic candidates, and report
//!    ambiguity when more than one remains
//! 6. Check the winner's generic constraints

mod operators;
mod ranking;

pub use operators::{OperatorResolution, resolve_binary_operator, resolve_unary_operator};
pub use ranking::find_best_match;

use bpl_core::{FunctionType, SemanticError, SemanticResult, Span, Type};

use crate::context::SemanticContext;
use crate::conversion::{Conversion, ConversionKind, find_conversion};
use crate::lookup::Candidate;
use crate::template::{build_type_map, check_constraints, substitute_signature};

/// Result of successful overload resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct OverloadMatch {
    /// Index into the candidate list.
    pub index: usize,
    /// The candidate's signature with generic arguments substituted.
    pub signature: FunctionType,
    /// Conversion applied to each fixed argument.
    pub arg_conversions: Vec<Conversion>,
    pub is_generic: bool,
}

impl OverloadMatch {
    /// The ranking tier of this match.
    ///
    /// One widened argument is enough to place the whole call in the
    /// widening tier, even when another argument only converts through
    /// general compatibility.
    pub fn tier(&self) -> ConversionKind {
        let kinds = || self.arg_conversions.iter().map(|c| c.kind);
        if kinds().all(|k| k == ConversionKind::Identity) {
            ConversionKind::Identity
        } else if kinds().any(|k| k == ConversionKind::Widening) {
            ConversionKind::Widening
        } else {
            ConversionKind::Compatible
        }
    }
}

/// Explicit generic arguments at a call site.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericArgs<'a> {
    /// Canonical types.
    pub resolved: &'a [Type],
    /// The same types as written, for diagnostics.
    pub written: &'a [Type],
}

impl GenericArgs<'_> {
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// Resolve a call of `name` with `args` against `candidates`.
pub fn resolve_overload(
    ctx: &SemanticContext<'_>,
    name: &str,
    candidates: &[Candidate],
    args: &[Type],
    generics: GenericArgs<'_>,
    span: Span,
) -> SemanticResult<OverloadMatch> {
    let surviving: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| accepts_arity(&c.signature, args.len()))
        .filter(|(_, c)| {
            if generics.is_empty() {
                !c.is_generic()
            } else {
                c.generic_params.len() == generics.resolved.len()
            }
        })
        .map(|(i, _)| i)
        .collect();

    if surviving.is_empty() {
        let mut message = format!(
            "No matching function for call to '{}' with {} arguments",
            name,
            args.len()
        );
        if !generics.is_empty() {
            message.push_str(&format!(" and {} generic arguments", generics.resolved.len()));
        }
        message.push('.');
        return Err(no_matching_overload(name, message, candidates, span));
    }

    let viable: Vec<OverloadMatch> = surviving
        .into_iter()
        .filter_map(|index| try_match_candidate(ctx, index, &candidates[index], args, generics))
        .collect();

    if viable.is_empty() {
        return Err(no_matching_overload(
            name,
            format!(
                "No matching function for call to '{}' with provided argument types.",
                name
            ),
            candidates,
            span,
        ));
    }

    let best = find_best_match(&viable, candidates, name, span)?;
    let chosen = &candidates[best.index];
    if chosen.is_generic() {
        check_constraints(
            ctx,
            &chosen.generic_params,
            generics.resolved,
            generics.written,
            span,
        )?;
    }

    tracing::debug!(
        function = name,
        selected = %chosen.describe(),
        "resolved overload"
    );
    Ok(best)
}

fn accepts_arity(signature: &FunctionType, arg_count: usize) -> bool {
    if signature.is_variadic {
        signature.params.len() <= arg_count
    } else {
        signature.params.len() == arg_count
    }
}

/// Substitute and compare one candidate; `None` if any argument fails.
fn try_match_candidate(
    ctx: &SemanticContext<'_>,
    index: usize,
    candidate: &Candidate,
    args: &[Type],
    generics: GenericArgs<'_>,
) -> Option<OverloadMatch> {
    let signature = if candidate.is_generic() {
        let map = build_type_map(&candidate.generic_params, generics.resolved);
        substitute_signature(&candidate.signature, &map)
    } else {
        candidate.signature.clone()
    };

    let arg_conversions = signature
        .params
        .iter()
        .zip(args)
        .map(|(param, arg)| find_conversion(ctx, arg, param))
        .collect::<Option<Vec<_>>>()?;

    Some(OverloadMatch {
        index,
        signature,
        arg_conversions,
        is_generic: candidate.is_generic(),
    })
}

fn no_matching_overload(
    name: &str,
    message: String,
    candidates: &[Candidate],
    span: Span,
) -> SemanticError {
    SemanticError::NoMatchingOverload {
        name: name.to_string(),
        message,
        candidates: candidates.iter().map(Candidate::describe).collect(),
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{GenericParamInfo, StructInfo};
    use bpl_core::{BasicType, ErrorKind, ScopeId, StructId, TypeDecl};

    fn candidate(params: Vec<Type>) -> Candidate {
        Candidate {
            function: None,
            name: "f".to_string(),
            generic_params: Vec::new(),
            signature: FunctionType {
                params,
                ret: Box::new(Type::void()),
                is_variadic: false,
                decl: None,
            },
            is_static: false,
        }
    }

    fn add_struct(ctx: &mut SemanticContext<'_>, name: &str, parent: Option<Type>) -> Type {
        let id = ctx.add_struct(StructInfo {
            name: name.to_string(),
            decl: None,
            generic_params: Vec::new(),
            parent,
            specs: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            scope: ScopeId::new(0),
            span: Span::default(),
        });
        struct_ty(name, id)
    }

    fn struct_ty(name: &str, id: StructId) -> Type {
        Type::Basic(BasicType {
            decl: Some(TypeDecl::Struct(id)),
            ..BasicType::named(name)
        })
    }

    fn resolve(candidates: &[Candidate], args: &[Type]) -> SemanticResult<OverloadMatch> {
        let ctx = SemanticContext::new();
        resolve_overload(&ctx, "f", candidates, args, GenericArgs::default(), Span::default())
    }

    #[test]
    fn selects_by_arity() {
        let candidates = [candidate(vec![]), candidate(vec![Type::named("i32")])];
        assert_eq!(resolve(&candidates, &[]).unwrap().index, 0);
        assert_eq!(resolve(&candidates, &[Type::named("i32")]).unwrap().index, 1);
    }

    #[test]
    fn exact_match_beats_compatible() {
        let int = Type::named("i32");
        let float = Type::named("double");
        let candidates = [
            candidate(vec![int.clone(), int.clone()]),
            candidate(vec![float.clone(), float.clone()]),
        ];
        assert_eq!(resolve(&candidates, &[float.clone(), float]).unwrap().index, 1);
        assert_eq!(resolve(&candidates, &[int.clone(), int]).unwrap().index, 0);
    }

    #[test]
    fn widening_beats_compatible() {
        let candidates = [
            candidate(vec![Type::named("i8")]),
            candidate(vec![Type::named("i64")]),
        ];
        let picked = resolve(&candidates, &[Type::named("i32")]).unwrap();
        assert_eq!(picked.index, 1);
        assert_eq!(picked.tier(), ConversionKind::Widening);
    }

    #[test]
    fn resolution_is_deterministic() {
        let candidates = [
            candidate(vec![Type::named("i16")]),
            candidate(vec![Type::named("i64")]),
            candidate(vec![Type::named("double")]),
        ];
        let args = [Type::named("i16")];
        let first = resolve(&candidates, &args).unwrap();
        for _ in 0..10 {
            assert_eq!(resolve(&candidates, &args).unwrap(), first);
        }
    }

    #[test]
    fn equally_good_candidates_are_ambiguous() {
        let candidates = [
            candidate(vec![Type::named("i32")]),
            candidate(vec![Type::named("u32")]),
        ];
        let err = resolve(&candidates, &[Type::named("i16")]).unwrap_err();
        assert!(matches!(err, SemanticError::AmbiguousOverload { .. }));
    }

    #[test]
    fn narrowing_argument_has_no_match() {
        let candidates = [
            candidate(vec![Type::named("i8")]),
            candidate(vec![Type::named("u8")]),
        ];
        let err = resolve(&candidates, &[Type::named("i64")]).unwrap_err();
        assert!(err.message().contains("with provided argument types"));
    }

    #[test]
    fn any_widened_argument_outranks_compatible_only() {
        let mut ctx = SemanticContext::new();
        let base = add_struct(&mut ctx, "Base", None);
        let derived = add_struct(&mut ctx, "Derived", Some(base.clone()));

        // f(i64, Base) widens the first argument; f(i16, Base) is exact on
        // it but both need Derived -> Base.
        let candidates = [
            candidate(vec![Type::named("i64"), base.clone()]),
            candidate(vec![Type::named("i16"), base]),
        ];
        let args = [Type::named("i16"), derived];
        let picked =
            resolve_overload(&ctx, "f", &candidates, &args, GenericArgs::default(), Span::default())
                .unwrap();
        assert_eq!(picked.index, 0);
        assert_eq!(picked.tier(), ConversionKind::Widening);
    }

    #[test]
    fn no_match_lists_every_candidate() {
        let candidates = [candidate(vec![]), candidate(vec![Type::named("i32")])];
        let err = resolve(&candidates, &[Type::named("i32"), Type::named("i32")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(
            err.message(),
            "No matching function for call to 'f' with 2 arguments."
        );
        assert_eq!(err.hint(), "Available overloads:\nf() => void\nf(i32) => void");
    }

    #[test]
    fn type_mismatch_after_filtering() {
        let candidates = [candidate(vec![Type::pointer("i8", 1)])];
        let err = resolve(&candidates, &[Type::named("double")]).unwrap_err();
        assert!(err.message().contains("with provided argument types"));
    }

    #[test]
    fn variadic_accepts_extra_arguments() {
        let mut printf = candidate(vec![Type::pointer("i8", 1)]);
        printf.signature.is_variadic = true;
        let args = [Type::pointer("i8", 1), Type::named("i32"), Type::named("double")];
        assert!(resolve(&[printf.clone()], &args).is_ok());
        assert!(resolve(&[printf], &[]).is_err());
    }

    #[test]
    fn generics_require_explicit_arguments() {
        let mut generic = candidate(vec![Type::named("T")]);
        generic.generic_params = vec![GenericParamInfo::unconstrained("T")];
        let ctx = SemanticContext::new();

        let err = resolve(&[generic.clone()], &[Type::named("i32")]).unwrap_err();
        assert!(err.message().contains("with 1 arguments."));

        let explicit = [Type::named("i32")];
        let picked = resolve_overload(
            &ctx,
            "f",
            &[generic],
            &[Type::named("i32")],
            GenericArgs {
                resolved: &explicit,
                written: &explicit,
            },
            Span::default(),
        )
        .unwrap();
        assert!(picked.is_generic);
        assert_eq!(picked.signature.params, vec![Type::named("i32")]);
    }

    #[test]
    fn explicit_generics_skip_plain_candidates() {
        let plain = candidate(vec![Type::named("i32")]);
        let mut generic = candidate(vec![Type::named("T")]);
        generic.generic_params = vec![GenericParamInfo::unconstrained("T")];
        let ctx = SemanticContext::new();
        let explicit = [Type::named("i32")];
        let picked = resolve_overload(
            &ctx,
            "f",
            &[plain, generic],
            &[Type::named("i32")],
            GenericArgs {
                resolved: &explicit,
                written: &explicit,
            },
            Span::default(),
        )
        .unwrap();
        assert_eq!(picked.index, 1);
    }
}
