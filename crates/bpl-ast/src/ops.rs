//! Operator definitions for BPL expressions.

use std::fmt;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Logical
    /// `||`
    Or,
    /// `&&`
    And,

    // Bitwise
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `&`
    BitAnd,
    /// `<<`
    Shl,
    /// `>>`
    Shr,

    // Comparison
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,

    // Arithmetic
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl BinaryOp {
    pub fn is_comparison(&self) -> bool {
        use BinaryOp::*;
        matches!(self, Eq | Ne | Lt | Le | Gt | Ge)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_bitwise(&self) -> bool {
        use BinaryOp::*;
        matches!(self, BitOr | BitXor | BitAnd | Shl | Shr)
    }

    /// The method a user type implements to overload this operator.
    pub fn overload_method(&self) -> Option<&'static str> {
        use BinaryOp::*;
        Some(match self {
            Add => "__add__",
            Sub => "__sub__",
            Mul => "__mul__",
            Div => "__div__",
            Mod => "__mod__",
            BitAnd => "__and__",
            BitOr => "__or__",
            BitXor => "__xor__",
            Shl => "__lshift__",
            Shr => "__rshift__",
            Eq => "__eq__",
            Ne => "__ne__",
            Lt => "__lt__",
            Gt => "__gt__",
            Le => "__le__",
            Ge => "__ge__",
            And | Or => return None,
        })
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinaryOp::*;
        let s = match self {
            Or => "||",
            And => "&&",
            BitOr => "|",
            BitXor => "^",
            BitAnd => "&",
            Shl => "<<",
            Shr => ">>",
            Eq => "==",
            Ne => "!=",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">=",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
        };
        write!(f, "{}", s)
    }
}

/// Prefix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `+`
    Plus,
    /// `!`
    Not,
    /// `~`
    BitNot,
    /// `&`
    AddressOf,
    /// `*`
    Deref,
}

impl UnaryOp {
    pub fn overload_method(&self) -> Option<&'static str> {
        match self {
            UnaryOp::Neg => Some("__neg__"),
            UnaryOp::BitNot => Some("__not__"),
            UnaryOp::Plus => Some("__pos__"),
            _ => None,
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::AddressOf => "&",
            UnaryOp::Deref => "*",
        };
        write!(f, "{}", s)
    }
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubAssign,
    /// `*=`
    MulAssign,
    /// `/=`
    DivAssign,
    /// `%=`
    ModAssign,
    /// `&=`
    AndAssign,
    /// `|=`
    OrAssign,
    /// `^=`
    XorAssign,
    /// `<<=`
    ShlAssign,
    /// `>>=`
    ShrAssign,
}

impl AssignOp {
    /// The binary operator a compound assignment applies, if any.
    pub fn to_binary_op(&self) -> Option<BinaryOp> {
        use AssignOp::*;
        Some(match self {
            Assign => return None,
            AddAssign => BinaryOp::Add,
            SubAssign => BinaryOp::Sub,
            MulAssign => BinaryOp::Mul,
            DivAssign => BinaryOp::Div,
            ModAssign => BinaryOp::Mod,
            AndAssign => BinaryOp::BitAnd,
            OrAssign => BinaryOp::BitOr,
            XorAssign => BinaryOp::BitXor,
            ShlAssign => BinaryOp::Shl,
            ShrAssign => BinaryOp::Shr,
        })
    }

    pub fn is_simple(&self) -> bool {
        matches!(self, AssignOp::Assign)
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_binary_op() {
            Some(op) => write!(f, "{}=", op),
            None => f.write_str("="),
        }
    }
}
