/// Config schema types for the skill loader.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How a scan reacts to a per-file failure (unreadable entry, malformed
/// front matter, missing field, invalid name, duplicate name).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Record the failure in the scan report and keep going.
    #[default]
    SkipAndReport,
    /// Stop at the first failure and return it.
    Abort,
}

impl std::fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SkipAndReport => write!(f, "skip_and_report"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

impl std::str::FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "skip_and_report" | "skip" => Ok(Self::SkipAndReport),
            "abort" => Ok(Self::Abort),
            other => Err(format!("unknown error policy '{other}'")),
        }
    }
}

/// Options controlling one scan pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory to scan when the caller does not pass one explicitly.
    pub root: Option<PathBuf>,
    pub error_policy: ErrorPolicy,
    /// Enforce the lowercase/hyphen/colon naming rule on skill names. Off by
    /// default: any non-empty name is accepted.
    pub validate_names: bool,
    pub follow_symlinks: bool,
    /// Maximum walk depth below the root. `None` = unlimited.
    pub max_depth: Option<usize>,
    /// Directory names the walker never enters.
    pub ignore_dirs: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: None,
            error_policy: ErrorPolicy::default(),
            validate_names: false,
            follow_symlinks: false,
            max_depth: None,
            ignore_dirs: vec![".git".into(), "node_modules".into(), "target".into()],
        }
    }
}

impl ScanConfig {
    /// Whether the walker should skip a directory with this file name.
    #[must_use]
    pub fn is_ignored(&self, dir_name: &str) -> bool {
        self.ignore_dirs.iter().any(|d| d == dir_name)
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkilldexConfig {
    pub scan: ScanConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_skip_without_name_rule() {
        let cfg = SkilldexConfig::default();
        assert_eq!(cfg.scan.error_policy, ErrorPolicy::SkipAndReport);
        assert!(!cfg.scan.validate_names);
        assert!(!cfg.scan.follow_symlinks);
        assert!(cfg.scan.is_ignored(".git"));
        assert!(!cfg.scan.is_ignored(".claude"));
    }

    #[test]
    fn error_policy_from_str() {
        assert_eq!("abort".parse::<ErrorPolicy>(), Ok(ErrorPolicy::Abort));
        assert_eq!(
            "skip-and-report".parse::<ErrorPolicy>(),
            Ok(ErrorPolicy::SkipAndReport)
        );
        assert!("explode".parse::<ErrorPolicy>().is_err());
    }
}
