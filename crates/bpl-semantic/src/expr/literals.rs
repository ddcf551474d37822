//! Literal typing.

use bpl_ast::{LiteralExpr, LiteralKind};
use bpl_core::{Type, primitives};

use super::is_integer_scalar;
use crate::builtins::string_type;
use crate::checker::Checker;
use crate::conversion::{is_float_literal, literal_fits, parse_integer};

impl<'ast> Checker<'ast> {
    /// Type a literal.
    ///
    /// Numbers with a fraction or exponent are `double`. Integers are `i32`
    /// when they fit and `i64` otherwise, unless `expected` is an integer
    /// type that holds the value.
    pub(crate) fn check_literal(&mut self, lit: &LiteralExpr<'_>, expected: Option<&Type>) -> Type {
        match lit.kind {
            LiteralKind::Number if is_float_literal(lit.raw) => Type::named("double"),
            LiteralKind::Number => {
                let value = parse_integer(lit.raw);
                if let (Some(value), Some(expected)) = (value, expected) {
                    if is_integer_scalar(expected) && literal_fits(value, expected) {
                        return expected.clone();
                    }
                }
                match value {
                    Some(value) if literal_fits(value, &Type::named("i32")) => Type::named("i32"),
                    _ => Type::named("i64"),
                }
            }
            LiteralKind::String => string_type(),
            LiteralKind::Char => Type::named(primitives::STRING_ELEMENT),
            LiteralKind::Bool(_) => Type::bool(),
            LiteralKind::Null => Type::named(primitives::NULL),
            LiteralKind::Nullptr => Type::named(primitives::NULLPTR),
        }
    }
}
