//! Checker configuration.
//!
//! [`CheckerOptions`] is a plain value with chained `with_*` builders. The
//! environment is only consulted through [`CheckerOptions::from_env`].

use std::path::PathBuf;

/// What the driver does with a diagnostic raised inside a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Record the diagnostic and resume at the next statement or member.
    #[default]
    CollectAll,
    /// Abort the module on the first diagnostic.
    FailFast,
}

impl ErrorMode {
    /// Parse an error mode from user input such as an environment variable.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "collect" | "collect-all" | "all" => Some(ErrorMode::CollectAll),
            "fail-fast" | "fast" => Some(ErrorMode::FailFast),
            _ => None,
        }
    }
}

/// Options controlling a checker run.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckerOptions {
    pub error_mode: ErrorMode,
    /// Resolve imports against the pre-loaded module map only.
    pub skip_import_resolution: bool,
    /// Extensions tried after the bare import path.
    pub import_extensions: Vec<String>,
    /// Root used for `std/` imports.
    pub std_lib_path: Option<PathBuf>,
    /// Emit a warning for statements after a diverging statement.
    pub warn_unreachable: bool,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::CollectAll,
            skip_import_resolution: false,
            import_extensions: vec![".x".to_string(), ".bpl".to_string()],
            std_lib_path: None,
            warn_unreachable: true,
        }
    }
}

impl CheckerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults plus `BPL_HOME` (std lib at `$BPL_HOME/lib`) and
    /// `BPL_ERROR_MODE`.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Some(home) = std::env::var_os("BPL_HOME") {
            options.std_lib_path = Some(PathBuf::from(home).join("lib"));
        }
        if let Some(mode) = std::env::var("BPL_ERROR_MODE")
            .ok()
            .and_then(|value| ErrorMode::parse(&value))
        {
            options.error_mode = mode;
        }
        options
    }

    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    pub fn with_skip_import_resolution(mut self, skip: bool) -> Self {
        self.skip_import_resolution = skip;
        self
    }

    pub fn with_import_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.import_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_std_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.std_lib_path = Some(path.into());
        self
    }

    pub fn with_warn_unreachable(mut self, warn: bool) -> Self {
        self.warn_unreachable = warn;
        self
    }

    pub fn is_fail_fast(&self) -> bool {
        self.error_mode == ErrorMode::FailFast
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_modes() {
        assert_eq!(ErrorMode::parse("collect-all"), Some(ErrorMode::CollectAll));
        assert_eq!(ErrorMode::parse(" Fail-Fast "), Some(ErrorMode::FailFast));
        assert_eq!(ErrorMode::parse("sometimes"), None);
    }

    #[test]
    fn defaults() {
        let options = CheckerOptions::default();
        assert_eq!(options.error_mode, ErrorMode::CollectAll);
        assert!(!options.skip_import_resolution);
        assert_eq!(options.import_extensions, vec![".x", ".bpl"]);
        assert!(options.warn_unreachable);
    }

    #[test]
    fn builders_chain() {
        let options = CheckerOptions::new()
            .with_error_mode(ErrorMode::FailFast)
            .with_skip_import_resolution(true)
            .with_import_extensions([".bpl"])
            .with_std_lib_path("/opt/bpl/lib");
        assert!(options.is_fail_fast());
        assert!(options.skip_import_resolution);
        assert_eq!(options.import_extensions, vec![".bpl"]);
        assert_eq!(options.std_lib_path, Some(PathBuf::from("/opt/bpl/lib")));
    }
}
