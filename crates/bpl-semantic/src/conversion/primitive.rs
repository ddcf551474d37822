//! Primitive numeric conversions.
//!
//! This module handles implicit widening between integer and boolean types
//! and the range check that lets an integer constant initialise any integer
//! type it fits in.

use bpl_ast::{Expr, LiteralKind, UnaryOp};
use bpl_core::{Type, primitives};

/// Whether `source` widens implicitly to `target`.
///
/// Ranks follow bit width (`i1` < 8 < 16 < 32 < 64). Any move to a higher
/// rank is allowed. Two narrowings are also allowed so size-valued results
/// can land in the default integer types: `i64` to `i32` and `u64` to `u32`.
pub fn is_implicit_widening(source: &Type, target: &Type) -> bool {
    let (Some(source), Some(target)) = (source.as_basic(), target.as_basic()) else {
        return false;
    };
    if !source.is_scalar() || !target.is_scalar() {
        return false;
    }

    let (Some(from), Some(to)) = (
        primitives::integer_bits(&source.name),
        primitives::integer_bits(&target.name),
    ) else {
        return false;
    };
    if from < to {
        return true;
    }

    matches!(
        (
            primitives::canonical_name(&source.name),
            primitives::canonical_name(&target.name),
        ),
        ("i64", "i32") | ("u64", "u32")
    )
}

/// The value of an integer constant expression: a numeric literal, possibly
/// under one or more unary minus signs.
pub fn integer_constant_value(expr: &Expr<'_>) -> Option<i128> {
    match expr {
        Expr::Literal(lit) if lit.kind == LiteralKind::Number => parse_integer(lit.raw),
        Expr::Unary(unary) if unary.op == UnaryOp::Neg => {
            integer_constant_value(&unary.operand)?.checked_neg()
        }
        _ => None,
    }
}

/// Parse decimal, `0x`, `0o`, and `0b` integer literals. Underscores are
/// digit separators.
pub fn parse_integer(raw: &str) -> Option<i128> {
    let text: String = raw.chars().filter(|c| *c != '_').collect();
    let (digits, radix) = match text.get(..2) {
        Some("0x") | Some("0X") => (&text[2..], 16),
        Some("0o") | Some("0O") => (&text[2..], 8),
        Some("0b") | Some("0B") => (&text[2..], 2),
        _ => (text.as_str(), 10),
    };
    if digits.is_empty() {
        return None;
    }
    i128::from_str_radix(digits, radix).ok()
}

/// Whether a numeric literal's text denotes a floating value.
pub fn is_float_literal(raw: &str) -> bool {
    let hex = raw.starts_with("0x") || raw.starts_with("0X");
    raw.contains('.') || (!hex && (raw.contains('e') || raw.contains('E')))
}

/// Whether `value` lies in the range of integer type `target`.
pub fn literal_fits(value: i128, target: &Type) -> bool {
    let Some(basic) = target.as_basic() else {
        return false;
    };
    if !basic.is_scalar() {
        return false;
    }
    match primitives::integer_range(&basic.name) {
        Some((min, max)) => value >= min && value <= max,
        None => false,
    }
}
