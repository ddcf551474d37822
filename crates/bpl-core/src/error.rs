//! Error taxonomy for semantic analysis.
//!
//! Every check in the analyzer reports failure as a [`SemanticError`]. The
//! driver either records it as a [`Diagnostic`](crate::Diagnostic) and
//! resumes, or propagates it and aborts the module, depending on the
//! configured error mode.
//!
//! Each error carries a message, a remediation hint that differs from the
//! message, and the span of the offending node.

use thiserror::Error;

use crate::Span;

/// Coarse classification of a [`SemanticError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UndefinedSymbol,
    TypeMismatch,
    ArityMismatch,
    ConstraintViolation,
    DuplicateDeclaration,
    ControlFlow,
    Conformance,
    UnsupportedOperation,
    ModuleNotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UndefinedSymbol => "undefined symbol",
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::ArityMismatch => "arity mismatch",
            ErrorKind::ConstraintViolation => "constraint violation",
            ErrorKind::DuplicateDeclaration => "duplicate declaration",
            ErrorKind::ControlFlow => "control flow",
            ErrorKind::Conformance => "conformance",
            ErrorKind::UnsupportedOperation => "unsupported operation",
            ErrorKind::ModuleNotFound => "module not found",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Semantic Errors
// ============================================================================

/// Errors raised while checking a module.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    /// An identifier, type, field, or method could not be found.
    #[error("at {span}: {message}")]
    UndefinedSymbol {
        name: String,
        message: String,
        /// Closest visible name, if any was similar enough.
        suggestion: Option<String>,
        span: Span,
    },

    /// Assignment, argument, return, operand, or literal type mismatch.
    #[error("at {span}: {message}")]
    TypeMismatch {
        message: String,
        hint: String,
        span: Span,
    },

    /// An integer literal does not fit the target type.
    #[error("at {span}: Integer overflow: value {value} does not fit in type {target}")]
    IntegerOverflow {
        value: String,
        target: String,
        span: Span,
    },

    /// Wrong number of arguments, generic arguments, or destructured names.
    #[error("at {span}: {message}")]
    ArityMismatch {
        message: String,
        hint: String,
        span: Span,
    },

    /// A generic type argument does not satisfy its declared constraint.
    #[error("at {span}: Type '{argument}' does not satisfy constraint '{constraint}'")]
    ConstraintViolation {
        argument: String,
        constraint: String,
        span: Span,
    },

    /// Redeclaration, non-overloadable redefinition, or generic shadowing.
    #[error("at {span}: {message}")]
    DuplicateDeclaration {
        message: String,
        hint: String,
        span: Span,
    },

    /// Misplaced break/continue or a missing return path.
    #[error("at {span}: {message}")]
    ControlFlow {
        message: String,
        hint: String,
        span: Span,
    },

    /// A struct does not fulfil a spec it claims to implement.
    #[error("at {span}: {message}")]
    Conformance {
        message: String,
        hint: String,
        span: Span,
    },

    /// Illegal cast or operator for the operand types.
    #[error("at {span}: {message}")]
    UnsupportedOperation {
        message: String,
        hint: String,
        span: Span,
    },

    /// No overload accepts the call.
    #[error("at {span}: {message}")]
    NoMatchingOverload {
        name: String,
        message: String,
        /// Rendered signatures of every candidate considered.
        candidates: Vec<String>,
        span: Span,
    },

    /// More than one overload accepts the call equally well.
    #[error("at {span}: Ambiguous call to '{name}'")]
    AmbiguousOverload {
        name: String,
        candidates: Vec<String>,
        span: Span,
    },

    /// An import could not be located or loaded.
    #[error("at {span}: Module not found: {path}")]
    ModuleNotFound { path: String, span: Span },
}

impl SemanticError {
    /// An unknown name, with an optional "did you mean" suggestion.
    pub fn undefined(name: impl Into<String>, suggestion: Option<String>, span: Span) -> Self {
        let name = name.into();
        SemanticError::UndefinedSymbol {
            message: format!("Undefined symbol '{}'", name),
            name,
            suggestion,
            span,
        }
    }

    /// An unknown name with a custom message (fields, methods, exports).
    pub fn undefined_with(
        name: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        SemanticError::UndefinedSymbol {
            name: name.into(),
            message: message.into(),
            suggestion: None,
            span,
        }
    }

    pub fn type_mismatch(message: impl Into<String>, hint: impl Into<String>, span: Span) -> Self {
        SemanticError::TypeMismatch {
            message: message.into(),
            hint: hint.into(),
            span,
        }
    }

    pub fn arity(message: impl Into<String>, hint: impl Into<String>, span: Span) -> Self {
        SemanticError::ArityMismatch {
            message: message.into(),
            hint: hint.into(),
            span,
        }
    }

    pub fn duplicate(message: impl Into<String>, hint: impl Into<String>, span: Span) -> Self {
        SemanticError::DuplicateDeclaration {
            message: message.into(),
            hint: hint.into(),
            span,
        }
    }

    pub fn control_flow(message: impl Into<String>, hint: impl Into<String>, span: Span) -> Self {
        SemanticError::ControlFlow {
            message: message.into(),
            hint: hint.into(),
            span,
        }
    }

    pub fn conformance(message: impl Into<String>, hint: impl Into<String>, span: Span) -> Self {
        SemanticError::Conformance {
            message: message.into(),
            hint: hint.into(),
            span,
        }
    }

    pub fn unsupported(message: impl Into<String>, hint: impl Into<String>, span: Span) -> Self {
        SemanticError::UnsupportedOperation {
            message: message.into(),
            hint: hint.into(),
            span,
        }
    }

    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SemanticError::UndefinedSymbol { .. } => ErrorKind::UndefinedSymbol,
            SemanticError::TypeMismatch { .. } | SemanticError::IntegerOverflow { .. } => {
                ErrorKind::TypeMismatch
            }
            SemanticError::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            SemanticError::ConstraintViolation { .. } => ErrorKind::ConstraintViolation,
            SemanticError::DuplicateDeclaration { .. } => ErrorKind::DuplicateDeclaration,
            SemanticError::ControlFlow { .. } => ErrorKind::ControlFlow,
            SemanticError::Conformance { .. } => ErrorKind::Conformance,
            SemanticError::UnsupportedOperation { .. }
            | SemanticError::NoMatchingOverload { .. }
            | SemanticError::AmbiguousOverload { .. } => ErrorKind::TypeMismatch,
            SemanticError::ModuleNotFound { .. } => ErrorKind::ModuleNotFound,
        }
    }

    /// The message without the location prefix.
    pub fn message(&self) -> String {
        match self {
            SemanticError::UndefinedSymbol { message, .. }
            | SemanticError::TypeMismatch { message, .. }
            | SemanticError::ArityMismatch { message, .. }
            | SemanticError::DuplicateDeclaration { message, .. }
            | SemanticError::ControlFlow { message, .. }
            | SemanticError::Conformance { message, .. }
            | SemanticError::UnsupportedOperation { message, .. }
            | SemanticError::NoMatchingOverload { message, .. } => message.clone(),
            SemanticError::IntegerOverflow { value, target, .. } => {
                format!("Integer overflow: value {} does not fit in type {}", value, target)
            }
            SemanticError::ConstraintViolation {
                argument,
                constraint,
                ..
            } => format!(
                "Type '{}' does not satisfy constraint '{}'",
                argument, constraint
            ),
            SemanticError::AmbiguousOverload { name, .. } => {
                format!("Ambiguous call to '{}'", name)
            }
            SemanticError::ModuleNotFound { path, .. } => format!("Module not found: {}", path),
        }
    }

    /// How to fix the problem.
    pub fn hint(&self) -> String {
        match self {
            SemanticError::UndefinedSymbol { suggestion, .. } => match suggestion {
                Some(similar) => format!("Did you mean '{}'?", similar),
                None => "Ensure the variable or function is declared before use.".to_string(),
            },
            SemanticError::TypeMismatch { hint, .. }
            | SemanticError::ArityMismatch { hint, .. }
            | SemanticError::DuplicateDeclaration { hint, .. }
            | SemanticError::ControlFlow { hint, .. }
            | SemanticError::Conformance { hint, .. }
            | SemanticError::UnsupportedOperation { hint, .. } => hint.clone(),
            SemanticError::IntegerOverflow { target, .. } => {
                format!("Ensure the value is within the range of {}.", target)
            }
            SemanticError::ConstraintViolation { .. } => {
                "Ensure the type argument satisfies the constraint.".to_string()
            }
            SemanticError::NoMatchingOverload { candidates, .. } => {
                format!("Available overloads:\n{}", candidates.join("\n"))
            }
            SemanticError::AmbiguousOverload { candidates, .. } => format!(
                "Add explicit casts to select one of:\n{}",
                candidates.join("\n")
            ),
            SemanticError::ModuleNotFound { .. } => {
                "Check the import path and that the file exists.".to_string()
            }
        }
    }

    /// Where the error occurred.
    pub fn span(&self) -> Span {
        match self {
            SemanticError::UndefinedSymbol { span, .. }
            | SemanticError::TypeMismatch { span, .. }
            | SemanticError::IntegerOverflow { span, .. }
            | SemanticError::ArityMismatch { span, .. }
            | SemanticError::ConstraintViolation { span, .. }
            | SemanticError::DuplicateDeclaration { span, .. }
            | SemanticError::ControlFlow { span, .. }
            | SemanticError::Conformance { span, .. }
            | SemanticError::UnsupportedOperation { span, .. }
            | SemanticError::NoMatchingOverload { span, .. }
            | SemanticError::AmbiguousOverload { span, .. }
            | SemanticError::ModuleNotFound { span, .. } => *span,
        }
    }
}

/// Result alias used throughout the analyzer.
pub type SemanticResult<T> = Result<T, SemanticError>;
