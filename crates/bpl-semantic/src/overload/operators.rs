//! Operator resolution.
//!
//! An operator on a struct, enum, or spec value is first looked up as an
//! overload method on the left operand (`a + b` calls `a.__add__(b)`). When
//! that fails the builtin rules for pointers, strings, booleans, and numbers
//! apply.

use bpl_ast::{BinaryOp, UnaryOp};
use bpl_core::{ScopeId, SemanticError, SemanticResult, Span, Type};

use super::{GenericArgs, resolve_overload};
use crate::builtins::string_type;
use crate::context::SemanticContext;
use crate::conversion::{is_assignable, is_exact_match};
use crate::lookup::{Candidate, find_methods, member_base};

/// How an operator expression is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorResolution {
    /// Builtin operation.
    Primitive { result: Type },
    /// User-defined operator method.
    Method {
        candidate: Candidate,
        /// The method is called on the right operand with the left as argument.
        swapped: bool,
        /// The method result is logically negated (`!=` through `__eq__`).
        negated: bool,
        result: Type,
    },
}

impl OperatorResolution {
    pub fn result(&self) -> &Type {
        match self {
            OperatorResolution::Primitive { result } => result,
            OperatorResolution::Method { result, .. } => result,
        }
    }
}

/// Resolve a binary operator for the given operand types.
///
/// Tries in order:
/// 1. `left.__op__(right)`
/// 2. For `!=`, `!left.__eq__(right)`
/// 3. For `>`, `right.__lt__(left)`
/// 4. Builtin rules
pub fn resolve_binary_operator(
    ctx: &SemanticContext<'_>,
    scope: ScopeId,
    left: &Type,
    right: &Type,
    op: BinaryOp,
    span: Span,
) -> SemanticResult<OperatorResolution> {
    if let Some(method) = op.overload_method() {
        if let Some(resolution) = try_method(ctx, scope, left, right, method, span)? {
            return Ok(resolution);
        }
        let fallback = match op {
            BinaryOp::Ne => try_method(ctx, scope, left, right, "__eq__", span)?.map(|r| {
                with_flags(r, false, true, Type::bool())
            }),
            BinaryOp::Gt => try_method(ctx, scope, right, left, "__lt__", span)?.map(|r| {
                let result = r.result().clone();
                with_flags(r, true, false, result)
            }),
            _ => None,
        };
        if let Some(resolution) = fallback {
            return Ok(resolution);
        }
    }

    primitive_binary(ctx, left, right, op, span).map(|result| OperatorResolution::Primitive { result })
}

/// Resolve a unary operator for the given operand type.
///
/// `&` only computes the pointer type; whether the operand is addressable is
/// the caller's concern.
pub fn resolve_unary_operator(
    ctx: &SemanticContext<'_>,
    scope: ScopeId,
    operand: &Type,
    op: UnaryOp,
    span: Span,
) -> SemanticResult<OperatorResolution> {
    let lookup = op.overload_method().and_then(|method| {
        let base = operator_receiver(ctx, scope, operand)?;
        find_methods(ctx, &base, method, operand).map(|lookup| (method, lookup))
    });
    if let Some((method, lookup)) = lookup {
        let matched = resolve_overload(ctx, method, &lookup.candidates, &[], GenericArgs::default(), span)?;
        return Ok(OperatorResolution::Method {
            candidate: lookup.candidates[matched.index].clone(),
            swapped: false,
            negated: false,
            result: (*matched.signature.ret).clone(),
        });
    }

    let result = match op {
        UnaryOp::AddressOf => operand.address_of().ok_or_else(|| {
            SemanticError::type_mismatch(
                format!("Cannot take address of {}", operand),
                "Address-of requires an lvalue.",
                span,
            )
        })?,
        UnaryOp::Deref => operand
            .pointee()
            .or_else(|| operand.element())
            .ok_or_else(|| {
                SemanticError::type_mismatch(
                    format!("Cannot dereference non-pointer type {}", operand),
                    "Dereference requires a pointer type.",
                    span,
                )
            })?,
        UnaryOp::Not => {
            if !operand.is_bool() {
                return Err(SemanticError::type_mismatch(
                    format!("Logical not requires boolean operand, got {}", operand),
                    "Ensure the operand is a boolean expression.",
                    span,
                ));
            }
            Type::bool()
        }
        UnaryOp::BitNot => {
            if !operand.is_integer() {
                return Err(SemanticError::type_mismatch(
                    format!("Bitwise not requires integer operand, got {}", operand),
                    "Ensure the operand is an integer.",
                    span,
                ));
            }
            operand.clone()
        }
        UnaryOp::Neg | UnaryOp::Plus => {
            if !operand.is_numeric() {
                let symbol = if op == UnaryOp::Neg { "-" } else { "+" };
                return Err(SemanticError::type_mismatch(
                    format!(
                        "Unary operator '{}' cannot be applied to type '{}'",
                        symbol, operand
                    ),
                    "Negation requires a numeric type.",
                    span,
                ));
            }
            operand.clone()
        }
    };
    Ok(OperatorResolution::Primitive { result })
}

/// The named type whose operator methods apply to a value of `ty`.
///
/// Pointers never dispatch to operator methods.
fn operator_receiver(
    ctx: &SemanticContext<'_>,
    scope: ScopeId,
    ty: &Type,
) -> Option<bpl_core::BasicType> {
    if ty.is_pointer() {
        return None;
    }
    member_base(ctx, scope, ty)
}

fn try_method(
    ctx: &SemanticContext<'_>,
    scope: ScopeId,
    receiver: &Type,
    argument: &Type,
    method: &str,
    span: Span,
) -> SemanticResult<Option<OperatorResolution>> {
    let Some(base) = operator_receiver(ctx, scope, receiver) else {
        return Ok(None);
    };
    let Some(lookup) = find_methods(ctx, &base, method, receiver) else {
        return Ok(None);
    };
    let matched = resolve_overload(
        ctx,
        method,
        &lookup.candidates,
        std::slice::from_ref(argument),
        GenericArgs::default(),
        span,
    )?;
    tracing::trace!(method, receiver = %receiver, "operator overload");
    Ok(Some(OperatorResolution::Method {
        candidate: lookup.candidates[matched.index].clone(),
        swapped: false,
        negated: false,
        result: (*matched.signature.ret).clone(),
    }))
}

fn with_flags(resolution: OperatorResolution, swap: bool, negate: bool, new_result: Type) -> OperatorResolution {
    match resolution {
        OperatorResolution::Method { candidate, .. } => OperatorResolution::Method {
            candidate,
            swapped: swap,
            negated: negate,
            result: new_result,
        },
        primitive => primitive,
    }
}

fn primitive_binary(
    ctx: &SemanticContext<'_>,
    left: &Type,
    right: &Type,
    op: BinaryOp,
    span: Span,
) -> SemanticResult<Type> {
    // Pointer arithmetic
    if matches!(op, BinaryOp::Add | BinaryOp::Sub)
        && (left.is_pointer() || left.is_array())
        && right.is_integer()
    {
        return Ok(left.clone());
    }
    if op == BinaryOp::Sub && left.is_pointer() && right.is_pointer() {
        return Ok(Type::named("i64"));
    }

    let string = string_type();
    if op == BinaryOp::Add && is_exact_match(left, &string) && is_exact_match(right, &string) {
        return Ok(string);
    }

    if op.is_logical() {
        if !left.is_bool() || !right.is_bool() {
            return Err(SemanticError::type_mismatch(
                format!(
                    "Logical operators require boolean operands, got {} and {}",
                    left, right
                ),
                "Ensure both operands are boolean expressions.",
                span,
            ));
        }
        return Ok(Type::bool());
    }

    if op.is_comparison() {
        if !is_assignable(ctx, left, right) && !is_assignable(ctx, right, left) {
            return Err(SemanticError::type_mismatch(
                format!("Cannot compare {} and {}", left, right),
                "Operands must be of compatible types.",
                span,
            ));
        }
        return Ok(Type::bool());
    }

    if op.is_bitwise() {
        if !left.is_integer() || !right.is_integer() {
            return Err(SemanticError::type_mismatch(
                format!(
                    "Bitwise operators require integer operands, got {} and {}",
                    left, right
                ),
                "Ensure both operands are integers.",
                span,
            ));
        }
        return Ok(left.clone());
    }

    if op == BinaryOp::Mod {
        if !left.is_integer() || !right.is_integer() {
            return Err(SemanticError::type_mismatch(
                format!(
                    "Modulo operator requires integer operands, got {} and {}",
                    left, right
                ),
                "Ensure both operands are integers.",
                span,
            ));
        }
        return Ok(left.clone());
    }

    // Add, Sub, Mul, Div: the right operand must fit the left's type.
    if !is_assignable(ctx, left, right) {
        return Err(SemanticError::type_mismatch(
            format!("Type mismatch: {} and {}", left, right),
            "Ensure operands have compatible types.",
            span,
        ));
    }
    if !left.is_numeric() || !right.is_numeric() {
        return Err(SemanticError::type_mismatch(
            format!(
                "Operator '{}' cannot be applied to types '{}' and '{}'",
                op, left, right
            ),
            "Arithmetic operators require numeric types.",
            span,
        ));
    }
    Ok(left.clone())
}
