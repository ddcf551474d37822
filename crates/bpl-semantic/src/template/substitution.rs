//! Type substitution for generic parameters.

use bpl_core::{BasicType, FunctionType, Type};
use rustc_hash::FxHashMap;

use crate::context::GenericParamInfo;

/// Maps generic parameter names to the types they stand for.
pub type TypeMap = FxHashMap<String, Type>;

/// Pair each parameter with the argument in the same position.
///
/// Extra parameters or arguments are ignored; callers check arity first.
pub fn build_type_map(params: &[GenericParamInfo], args: &[Type]) -> TypeMap {
    params
        .iter()
        .zip(args)
        .map(|(param, arg)| (param.name.clone(), arg.clone()))
        .collect()
}

/// Replace every generic parameter in `ty` that `map` binds.
///
/// A parameter used with decorations keeps them: with `T = *i8`, the type
/// `*T[4]` becomes `**i8[4]`.
pub fn substitute(ty: &Type, map: &TypeMap) -> Type {
    if map.is_empty() {
        return ty.clone();
    }
    match ty {
        Type::Basic(basic) => substitute_basic(basic, map),
        Type::Function(func) => Type::Function(substitute_signature(func, map)),
        Type::Tuple(types) => Type::Tuple(types.iter().map(|t| substitute(t, map)).collect()),
        Type::Module(scope) => Type::Module(*scope),
        Type::Meta(inner) => Type::Meta(Box::new(substitute(inner, map))),
    }
}

fn substitute_basic(basic: &BasicType, map: &TypeMap) -> Type {
    let generic_args: Vec<Type> = basic.generic_args.iter().map(|t| substitute(t, map)).collect();

    let replacement = match basic.decl {
        None => map.get(&basic.name),
        Some(_) => None,
    };
    match replacement {
        Some(Type::Basic(bound)) => {
            let mut merged = bound.clone();
            merged.pointer_depth += basic.pointer_depth;
            merged.array_dims.extend(basic.array_dims.iter().copied());
            merged.generic_args.extend(generic_args);
            Type::Basic(merged)
        }
        Some(other) if basic.is_scalar() && generic_args.is_empty() => other.clone(),
        _ => Type::Basic(BasicType {
            generic_args,
            ..basic.clone()
        }),
    }
}

/// Substitute through a signature's parameters and return type.
pub fn substitute_signature(func: &FunctionType, map: &TypeMap) -> FunctionType {
    FunctionType {
        params: func.params.iter().map(|p| substitute(p, map)).collect(),
        ret: Box::new(substitute(&func.ret, map)),
        is_variadic: func.is_variadic,
        decl: func.decl,
    }
}
