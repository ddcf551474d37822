//! Builtin type names and the numeric tables derived from them.
//!
//! Base types are registered as self-aliases; the friendly names are
//! aliases onto them. The tables below accept both spellings because
//! callers may query a type before or after alias resolution.

/// Types that resolve to themselves.
pub const BASE_TYPES: &[&str] = &[
    "i1", "i8", "u8", "i16", "u16", "i32", "u32", "i64", "u64", "double", "void", "null", "nullptr",
];

/// Friendly names and the base type each one stands for.
pub const TYPE_ALIASES: &[(&str, &str)] = &[
    ("int", "i32"),
    ("uint", "u32"),
    ("float", "double"),
    ("bool", "i1"),
    ("char", "i8"),
    ("uchar", "u8"),
    ("short", "i16"),
    ("ushort", "u16"),
    ("long", "i64"),
    ("ulong", "u64"),
];

/// `string` is an alias for a pointer to this element type.
pub const STRING_ELEMENT: &str = "i8";

/// Name of the builtin struct raised on null dereference.
pub const NULL_ACCESS_ERROR: &str = "NullAccessError";

/// Fields of [`NULL_ACCESS_ERROR`], all `*i8`.
pub const NULL_ACCESS_ERROR_FIELDS: &[&str] = &["message", "function", "expression"];

pub const VOID: &str = "void";
pub const NULL: &str = "null";
pub const NULLPTR: &str = "nullptr";

/// Map a friendly alias to its base name, or return the name unchanged.
pub fn canonical_name(name: &str) -> &str {
    TYPE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, base)| *base)
        .unwrap_or(name)
}

/// Whether `name` is one of the integer types (bool excluded).
pub fn is_integer_name(name: &str) -> bool {
    matches!(
        canonical_name(name),
        "i8" | "u8" | "i16" | "u16" | "i32" | "u32" | "i64" | "u64"
    )
}

/// Whether `name` is a scalar numeric type that casts freely to other numerics.
pub fn is_numeric_name(name: &str) -> bool {
    is_integer_name(name) || matches!(canonical_name(name), "i1" | "double")
}

/// Whether `name` is the boolean type.
pub fn is_bool_name(name: &str) -> bool {
    canonical_name(name) == "i1"
}

/// Whether `name` is a floating point type.
pub fn is_float_name(name: &str) -> bool {
    canonical_name(name) == "double"
}

pub fn is_signed_name(name: &str) -> bool {
    matches!(canonical_name(name), "i8" | "i16" | "i32" | "i64")
}

/// Width in bits of an integer or boolean type; `None` for anything else.
///
/// This is also the widening rank: `i1` < 8 < 16 < 32 < 64.
pub fn integer_bits(name: &str) -> Option<u32> {
    match canonical_name(name) {
        "i1" => Some(1),
        "i8" | "u8" => Some(8),
        "i16" | "u16" => Some(16),
        "i32" | "u32" => Some(32),
        "i64" | "u64" => Some(64),
        _ => None,
    }
}

/// Inclusive value range of an integer type.
pub fn integer_range(name: &str) -> Option<(i128, i128)> {
    let range = match canonical_name(name) {
        "i8" => (i8::MIN as i128, i8::MAX as i128),
        "u8" => (0, u8::MAX as i128),
        "i16" => (i16::MIN as i128, i16::MAX as i128),
        "u16" => (0, u16::MAX as i128),
        "i32" => (i32::MIN as i128, i32::MAX as i128),
        "u32" => (0, u32::MAX as i128),
        "i64" => (i64::MIN as i128, i64::MAX as i128),
        "u64" => (0, u64::MAX as i128),
        _ => return None,
    };
    Some(range)
}

/// Integer types wide enough to hold an address in a pointer cast.
pub fn is_address_width_name(name: &str) -> bool {
    matches!(canonical_name(name), "i32" | "u32" | "i64" | "u64")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_map_to_base_types() {
        assert_eq!(canonical_name("int"), "i32");
        assert_eq!(canonical_name("bool"), "i1");
        assert_eq!(canonical_name("float"), "double");
        assert_eq!(canonical_name("Point"), "Point");
        for (_, base) in TYPE_ALIASES {
            assert!(BASE_TYPES.contains(base));
        }
    }

    #[test]
    fn integer_classification() {
        assert!(is_integer_name("u16"));
        assert!(is_integer_name("long"));
        assert!(!is_integer_name("bool"));
        assert!(!is_integer_name("double"));
        assert!(is_numeric_name("bool"));
        assert!(is_numeric_name("float"));
        assert!(!is_numeric_name("void"));
    }

    #[test]
    fn ranges_follow_width_and_sign() {
        assert_eq!(integer_range("char"), Some((-128, 127)));
        assert_eq!(integer_range("uchar"), Some((0, 255)));
        assert_eq!(integer_range("u64"), Some((0, 18_446_744_073_709_551_615)));
        assert_eq!(integer_range("double"), None);
    }

    #[test]
    fn bits_rank_bool_lowest() {
        assert_eq!(integer_bits("bool"), Some(1));
        assert_eq!(integer_bits("short"), Some(16));
        assert_eq!(integer_bits("string"), None);
    }

    #[test]
    fn address_width_types() {
        assert!(is_address_width_name("long"));
        assert!(is_address_width_name("u32"));
        assert!(!is_address_width_name("i16"));
    }
}
