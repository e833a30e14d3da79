//! Semantic checks on a loaded configuration.

use crate::schema::SkilldexConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "scan.max_depth"
    pub path: String,
    pub message: String,
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.to_string(),
            message: message.into(),
        });
    }
}

/// Check a configuration for values that would make a scan meaningless.
#[must_use]
pub fn validate(config: &SkilldexConfig) -> ValidationResult {
    let mut result = ValidationResult::default();
    let scan = &config.scan;

    if scan.max_depth == Some(0) {
        result.push(
            Severity::Error,
            "scan.max_depth",
            "max_depth = 0 never reaches any SKILL.md",
        );
    }

    for (i, dir) in scan.ignore_dirs.iter().enumerate() {
        if dir.trim().is_empty() {
            result.push(
                Severity::Error,
                &format!("scan.ignore_dirs[{i}]"),
                "empty directory name",
            );
        } else if dir.contains('/') || dir.contains('\\') {
            result.push(
                Severity::Warning,
                &format!("scan.ignore_dirs[{i}]"),
                format!("'{dir}' contains a path separator; entries match a single directory name"),
            );
        }
    }

    if let Some(root) = &scan.root
        && !root.is_dir()
    {
        result.push(
            Severity::Warning,
            "scan.root",
            format!("{} is not an existing directory", root.display()),
        );
    }

    result
}

#[cfg(test)]
mod tests {
    use {super::*, std::path::PathBuf};

    #[test]
    fn default_config_is_clean() {
        let result = validate(&SkilldexConfig::default());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn zero_depth_is_error() {
        let mut cfg = SkilldexConfig::default();
        cfg.scan.max_depth = Some(0);
        let result = validate(&cfg);
        assert!(result.has_errors());
        assert_eq!(result.diagnostics[0].path, "scan.max_depth");
    }

    #[test]
    fn ignore_dir_entries_checked() {
        let mut cfg = SkilldexConfig::default();
        cfg.scan.ignore_dirs = vec![" ".into(), "a/b".into(), "dist".into()];
        let result = validate(&cfg);
        assert_eq!(result.count(Severity::Error), 1);
        assert_eq!(result.count(Severity::Warning), 1);
        assert_eq!(result.diagnostics[0].path, "scan.ignore_dirs[0]");
    }

    #[test]
    fn missing_root_is_warning() {
        let mut cfg = SkilldexConfig::default();
        cfg.scan.root = Some(PathBuf::from("/nonexistent/skilldex/root"));
        let result = validate(&cfg);
        assert!(!result.has_errors());
        assert_eq!(result.count(Severity::Warning), 1);
    }
}
