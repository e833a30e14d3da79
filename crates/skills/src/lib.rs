//! Skill manifest loader: discovery, front-matter parsing, validation, and
//! registry.
//!
//! Skills are directories containing a `SKILL.md` file with front matter and
//! markdown instructions, plus optional `assets/`, `references/` and
//! `scripts/` directories.

pub mod error;
pub mod frontmatter;
pub mod load;
pub mod parse;
pub mod registry;
pub mod scan;
pub mod types;
#[cfg(feature = "file-watcher")]
pub mod watcher;

pub use {
    error::{Error, Result},
    load::{ScanReport, load, load_async, load_configured, load_from, load_skill_dir},
    registry::{RegistryBuilder, SkillRegistry},
    scan::{FsSkillDiscoverer, SkillCandidate, SkillDiscoverer},
    skilldex_config::{ErrorPolicy, ScanConfig},
    types::{FailureKind, ScanFailure, SkillManifest},
};
