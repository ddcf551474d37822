//! Type relations.
//!
//! This module answers the questions the checker asks about two types:
//!
//! - Are they the same type? ([`is_exact_match`])
//! - Are they related without any numeric conversion? ([`is_compatible`])
//! - Does a numeric value promote implicitly? ([`is_implicit_widening`])
//! - Can a value of one be assigned or passed where the other is expected?
//!   ([`is_assignable`])
//! - Is one a subtype of the other? ([`is_subtype`])
//! - Is an explicit cast legal? ([`is_cast_allowed`])
//!
//! ## Conversion Priority
//!
//! Overload resolution ranks each argument by the cheapest relation that
//! holds:
//! 1. Identity (exact match)
//! 2. Primitive widening
//! 3. General compatibility (subtyping, decay, `null`, `void` pointers)
//!
//! Integers of different widths are never merely compatible. A variable
//! only moves between them through widening; an integer constant may also
//! initialise any integer type whose range holds it ([`literal_fits`]).

use bpl_core::{BasicType, Type, TypeDecl, primitives};

use crate::context::SemanticContext;

mod primitive;

pub use primitive::{
    integer_constant_value, is_float_literal, is_implicit_widening, literal_fits, parse_integer,
};

/// Maximum number of supertype hops followed when walking an inheritance
/// graph. Deeper (or cyclic) hierarchies are treated as unrelated.
pub const MAX_INHERITANCE_DEPTH: usize = 100;

/// The relation that lets an argument reach a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConversionKind {
    Identity,
    Widening,
    Compatible,
}

/// A conversion with its ranking cost (lower is better).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub kind: ConversionKind,
    pub cost: u32,
}

impl Conversion {
    pub const IDENTITY_COST: u32 = 0;
    pub const WIDENING_COST: u32 = 1;
    pub const COMPATIBLE_COST: u32 = 2;

    pub fn identity() -> Self {
        Self {
            kind: ConversionKind::Identity,
            cost: Self::IDENTITY_COST,
        }
    }

    pub fn widening() -> Self {
        Self {
            kind: ConversionKind::Widening,
            cost: Self::WIDENING_COST,
        }
    }

    pub fn compatible() -> Self {
        Self {
            kind: ConversionKind::Compatible,
            cost: Self::COMPATIBLE_COST,
        }
    }
}

/// Find the cheapest conversion from `source` to `target`.
pub fn find_conversion(
    ctx: &SemanticContext<'_>,
    source: &Type,
    target: &Type,
) -> Option<Conversion> {
    if is_exact_match(source, target) {
        return Some(Conversion::identity());
    }
    if is_implicit_widening(source, target) {
        return Some(Conversion::widening());
    }
    if is_compatible(ctx, target, source) {
        return Some(Conversion::compatible());
    }
    None
}

// ============================================================================
// Exact Match
// ============================================================================

/// Structural identity after alias canonicalisation of builtin names.
pub fn is_exact_match(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Basic(a), Type::Basic(b)) => {
            primitives::canonical_name(&a.name) == primitives::canonical_name(&b.name)
                && a.pointer_depth == b.pointer_depth
                && a.array_dims == b.array_dims
                && all_pairs(&a.generic_args, &b.generic_args, is_exact_match)
        }
        (Type::Function(a), Type::Function(b)) => {
            a.is_variadic == b.is_variadic
                && is_exact_match(&a.ret, &b.ret)
                && all_pairs(&a.params, &b.params, is_exact_match)
        }
        (Type::Tuple(a), Type::Tuple(b)) => all_pairs(a, b, is_exact_match),
        (Type::Module(a), Type::Module(b)) => a == b,
        (Type::Meta(a), Type::Meta(b)) => is_exact_match(a, b),
        _ => false,
    }
}

fn all_pairs(a: &[Type], b: &[Type], mut f: impl FnMut(&Type, &Type) -> bool) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| f(x, y))
}

// ============================================================================
// Compatibility
// ============================================================================

/// Whether a `source` value may be assigned or passed to a `target` slot.
pub fn is_compatible(ctx: &SemanticContext<'_>, target: &Type, source: &Type) -> bool {
    match (target, source) {
        (Type::Basic(t), Type::Basic(s)) => basic_compatible(ctx, t, s),
        (Type::Function(t), Type::Function(s)) => {
            is_compatible(ctx, &t.ret, &s.ret)
                && all_pairs(&t.params, &s.params, |tp, sp| is_compatible(ctx, tp, sp))
        }
        (Type::Tuple(t), Type::Tuple(s)) => all_pairs(t, s, |a, b| is_compatible(ctx, a, b)),
        (Type::Module(t), Type::Module(s)) => t == s,
        (Type::Meta(t), Type::Meta(s)) => is_compatible(ctx, t, s),
        _ => false,
    }
}

/// [`is_compatible`], or `source` widens implicitly to `target`.
pub fn is_assignable(ctx: &SemanticContext<'_>, target: &Type, source: &Type) -> bool {
    is_compatible(ctx, target, source) || is_implicit_widening(source, target)
}

fn basic_compatible(ctx: &SemanticContext<'_>, target: &BasicType, source: &BasicType) -> bool {
    let t_name = primitives::canonical_name(&target.name);
    let s_name = primitives::canonical_name(&source.name);

    if s_name == primitives::NULLPTR || t_name == primitives::NULLPTR {
        let (other, other_name) = if s_name == primitives::NULLPTR {
            (target, t_name)
        } else {
            (source, s_name)
        };
        return other.pointer_depth > 0 || other_name == primitives::NULLPTR;
    }

    if s_name == primitives::NULL || t_name == primitives::NULL {
        let (other, other_name) = if s_name == primitives::NULL {
            (target, t_name)
        } else {
            (source, s_name)
        };
        return other.pointer_depth > 0
            || other_name == primitives::NULL
            || (other.pointer_depth == 0 && matches!(other.decl, Some(TypeDecl::Struct(_))));
    }

    if (t_name == primitives::VOID || s_name == primitives::VOID)
        && target.pointer_depth > 0
        && source.pointer_depth > 0
    {
        return true;
    }

    let same_entity = match (target.decl, source.decl) {
        (Some(t), Some(s)) => t == s,
        _ => t_name == s_name,
    };
    if !same_entity && !is_subtype(ctx, source, target) {
        return false;
    }

    if target.pointer_depth == source.pointer_depth {
        if !dims_match(&target.array_dims, &source.array_dims) {
            return false;
        }
    } else if !decays_to(target, source) {
        return false;
    }

    if is_wildcard(ctx, target) {
        return true;
    }
    all_pairs(&target.generic_args, &source.generic_args, |t, s| {
        is_compatible(ctx, t, s)
    })
}

/// `T[N]` decays to `*T`: one more pointer level on the target, one fewer
/// array dimension, with the remaining dimensions agreeing.
fn decays_to(target: &BasicType, source: &BasicType) -> bool {
    target.pointer_depth == source.pointer_depth + 1
        && source.array_dims.len() == target.array_dims.len() + 1
        && dims_match(&target.array_dims, &source.array_dims[1..])
}

/// Dimensions agree when sizes are equal or either side is unsized.
fn dims_match(target: &[Option<u64>], source: &[Option<u64>]) -> bool {
    target.len() == source.len()
        && target
            .iter()
            .zip(source)
            .all(|(t, s)| t.is_none() || s.is_none() || t == s)
}

/// A bare reference to a generic declaration accepts every instantiation.
fn is_wildcard(ctx: &SemanticContext<'_>, target: &BasicType) -> bool {
    target.generic_args.is_empty()
        && target
            .decl
            .is_some_and(|decl| !ctx.type_generic_params(decl).is_empty())
}

// ============================================================================
// Subtyping
// ============================================================================

/// Whether `sub` names `sup` or a type that inherits from it.
///
/// Structs inherit from their parent and from the specs they implement;
/// specs inherit from their parent specs. The walk is bounded by
/// [`MAX_INHERITANCE_DEPTH`] so cyclic declarations terminate.
pub fn is_subtype(ctx: &SemanticContext<'_>, sub: &BasicType, sup: &BasicType) -> bool {
    let matches_target = |decl: TypeDecl| match sup.decl {
        Some(target) => decl == target,
        None => ctx.type_name(decl) == sup.name,
    };

    let Some(start) = sub.decl else {
        return sup.decl.is_none()
            && primitives::canonical_name(&sub.name) == primitives::canonical_name(&sup.name);
    };
    if matches_target(start) {
        return true;
    }

    let mut pending = supertypes(ctx, start);
    let mut hops = 0;
    while let Some(decl) = pending.pop() {
        hops += 1;
        if hops > MAX_INHERITANCE_DEPTH {
            tracing::debug!(sub = %sub.name, sup = %sup.name, "inheritance walk hit depth limit");
            return false;
        }
        if matches_target(decl) {
            return true;
        }
        pending.extend(supertypes(ctx, decl));
    }
    false
}

/// Direct supertypes of a declaration.
pub fn supertypes(ctx: &SemanticContext<'_>, decl: TypeDecl) -> Vec<TypeDecl> {
    let decl_of = |ty: &Type| ty.as_basic().and_then(|b| b.decl);
    match decl {
        TypeDecl::Struct(id) => {
            let info = ctx.struct_info(id);
            info.parent
                .iter()
                .chain(info.specs.iter())
                .filter_map(decl_of)
                .collect()
        }
        TypeDecl::Spec(id) => ctx.spec_info(id).parents.iter().filter_map(decl_of).collect(),
        TypeDecl::Enum(_) => Vec::new(),
    }
}

// ============================================================================
// Casts
// ============================================================================

/// Whether `source as target` is legal.
///
/// Beyond compatible pairs, casts are allowed between numeric scalars,
/// between any two pointers, between functions and pointers, and between
/// pointers and address-width integers.
pub fn is_cast_allowed(ctx: &SemanticContext<'_>, source: &Type, target: &Type) -> bool {
    if is_compatible(ctx, target, source) {
        return true;
    }

    match (source, target) {
        (Type::Function(_), Type::Basic(b)) | (Type::Basic(b), Type::Function(_)) => {
            b.pointer_depth > 0
        }
        (Type::Basic(s), Type::Basic(t)) => {
            if source.is_numeric() && target.is_numeric() {
                return true;
            }
            if s.pointer_depth > 0 && t.pointer_depth > 0 {
                return true;
            }
            let address_int = |b: &BasicType| b.is_scalar() && primitives::is_address_width_name(&b.name);
            (s.pointer_depth > 0 && address_int(t)) || (t.pointer_depth > 0 && address_int(s))
        }
        _ => false,
    }
}
