use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{error::Error, frontmatter::FrontMatter};

// ── Skill manifest ──────────────────────────────────────────────────────────

/// One discovered, validated skill.
///
/// Built once per scan pass and never mutated afterwards; a rescan builds a
/// fresh set of manifests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillManifest {
    /// Unique skill identifier from the `name` front-matter key.
    pub name: String,
    /// When the skill applies, from the `description` key.
    pub description: String,
    /// Tools the skill may use, in declaration order without duplicates.
    /// An absent `allowed-tools` key yields an empty list; the loader assigns
    /// no meaning to that.
    pub allowed_tools: Vec<String>,
    /// SPDX license identifier.
    pub license: Option<String>,
    /// Environment requirements (intended product, system packages, network access, etc.).
    pub compatibility: Option<String>,
    /// Every other declared front-matter key, in declaration order.
    pub extra: FrontMatter,
    /// Directory containing `SKILL.md`.
    pub root: PathBuf,
    /// The `SKILL.md` file itself.
    pub body_path: PathBuf,
    /// Markdown instructions after the front matter, unparsed.
    pub body: String,
    /// Files under `assets/`, relative to `root`.
    pub asset_paths: Vec<PathBuf>,
    /// Files under `references/`, relative to `root`.
    pub reference_paths: Vec<PathBuf>,
    /// Files under `scripts/`, relative to `root`.
    pub script_paths: Vec<PathBuf>,
}

impl SkillManifest {
    pub fn resolved_asset_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.resolve(&self.asset_paths)
    }

    pub fn resolved_reference_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.resolve(&self.reference_paths)
    }

    pub fn resolved_script_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.resolve(&self.script_paths)
    }

    #[must_use]
    pub fn allows_tool(&self, tool: &str) -> bool {
        self.allowed_tools.iter().any(|t| t == tool)
    }

    fn resolve<'a>(&'a self, paths: &'a [PathBuf]) -> impl Iterator<Item = PathBuf> + 'a {
        paths.iter().map(|p| self.root.join(p))
    }
}

// ── Scan failures ───────────────────────────────────────────────────────────

/// Category of a per-file scan failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Scan,
    MalformedManifest,
    MissingField,
    InvalidName,
    DuplicateSkill,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Scan => "scan",
            Self::MalformedManifest => "malformed_manifest",
            Self::MissingField => "missing_field",
            Self::InvalidName => "invalid_name",
            Self::DuplicateSkill => "duplicate_skill",
        };
        f.write_str(s)
    }
}

/// A file that could not be turned into a registered skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
    /// For duplicates: the `SKILL.md` that registered the name first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<PathBuf>,
}

impl ScanFailure {
    #[must_use]
    pub fn from_error(err: &Error) -> Self {
        let kind = match err {
            Error::MalformedManifest { .. } => FailureKind::MalformedManifest,
            Error::MissingField { .. } => FailureKind::MissingField,
            Error::InvalidName { .. } => FailureKind::InvalidName,
            Error::DuplicateSkill { .. } => FailureKind::DuplicateSkill,
            Error::Scan { .. } | Error::NotFound { .. } | Error::Io(_) | Error::Json(_) => {
                FailureKind::Scan
            },
        };
        let related = match err {
            Error::DuplicateSkill { existing, .. } => Some(existing.clone()),
            _ => None,
        };
        Self {
            path: err.path().map(Path::to_path_buf).unwrap_or_default(),
            kind,
            message: err.to_string(),
            related,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> SkillManifest {
        SkillManifest {
            name: "market-research".into(),
            description: "Research a market".into(),
            allowed_tools: vec!["WebSearch".into(), "Read".into()],
            license: None,
            compatibility: None,
            extra: FrontMatter::default(),
            root: PathBuf::from("/skills/market-research"),
            body_path: PathBuf::from("/skills/market-research/SKILL.md"),
            body: "# Market research".into(),
            asset_paths: vec![PathBuf::from("assets/report.md")],
            reference_paths: vec![],
            script_paths: vec![],
        }
    }

    #[test]
    fn resolves_relative_paths_against_root() {
        let m = manifest();
        let assets: Vec<_> = m.resolved_asset_paths().collect();
        assert_eq!(
            assets,
            vec![PathBuf::from("/skills/market-research/assets/report.md")]
        );
        assert_eq!(m.resolved_reference_paths().count(), 0);
    }

    #[test]
    fn allows_tool_is_exact() {
        let m = manifest();
        assert!(m.allows_tool("Read"));
        assert!(!m.allows_tool("read"));
    }

    #[test]
    fn duplicate_failure_keeps_both_paths() {
        let err = Error::DuplicateSkill {
            name: "dup".into(),
            existing: PathBuf::from("/a/SKILL.md"),
            duplicate: PathBuf::from("/b/SKILL.md"),
        };
        let failure = ScanFailure::from_error(&err);
        assert_eq!(failure.kind, FailureKind::DuplicateSkill);
        assert_eq!(failure.path, PathBuf::from("/b/SKILL.md"));
        assert_eq!(failure.related, Some(PathBuf::from("/a/SKILL.md")));
        assert!(failure.message.contains("/a/SKILL.md"));
    }

    #[test]
    fn failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::MalformedManifest).unwrap_or_default();
        assert_eq!(json, "\"malformed_manifest\"");
    }
}
