//! Filesystem discovery of skill directories.
//!
//! A skill root is any directory holding a file named exactly `SKILL.md`.
//! Its `assets/`, `references/` and `scripts/` subdirectories are listed
//! alongside, and are never searched for further skills.

use std::path::{Path, PathBuf};

use {
    skilldex_config::ScanConfig,
    tracing::{debug, trace},
    walkdir::{DirEntry, WalkDir},
};

use crate::error::{Error, Result};

pub const SKILL_FILE: &str = "SKILL.md";
pub const ASSETS_DIR: &str = "assets";
pub const REFERENCES_DIR: &str = "references";
pub const SCRIPTS_DIR: &str = "scripts";

const ATTACHMENT_DIRS: &[&str] = &[ASSETS_DIR, REFERENCES_DIR, SCRIPTS_DIR];

/// A `SKILL.md` found on disk, read but not yet parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillCandidate {
    /// Directory containing `SKILL.md`.
    pub root: PathBuf,
    pub skill_md: PathBuf,
    pub content: String,
    /// Relative to `root`, sorted.
    pub asset_paths: Vec<PathBuf>,
    pub reference_paths: Vec<PathBuf>,
    pub script_paths: Vec<PathBuf>,
}

/// Produces skill candidates for the loader.
pub trait SkillDiscoverer {
    /// Start a fresh pass. Every call walks from the beginning.
    fn discover(&self) -> Box<dyn Iterator<Item = Result<SkillCandidate>> + '_>;
}

/// Default filesystem-based discoverer rooted at one directory.
#[derive(Debug, Clone)]
pub struct FsSkillDiscoverer {
    root: PathBuf,
    config: ScanConfig,
}

impl FsSkillDiscoverer {
    /// Fails with [`Error::Scan`] if `root` is missing, unreadable, or not a
    /// directory.
    pub fn new(root: impl Into<PathBuf>, config: ScanConfig) -> Result<Self> {
        let root = root.into();
        let meta = std::fs::metadata(&root).map_err(|e| Error::scan(&root, e))?;
        if !meta.is_dir() {
            return Err(Error::scan(
                &root,
                std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            ));
        }
        std::fs::read_dir(&root).map_err(|e| Error::scan(&root, e))?;
        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily walk the tree, yielding one item per `SKILL.md`.
    ///
    /// Unreadable entries come out as `Err` items; the walk continues past
    /// them.
    pub fn candidates(&self) -> Candidates<'_> {
        let mut walker = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }
        let config = &self.config;
        let entries = walker
            .into_iter()
            .filter_entry(move |entry| should_descend(entry, config));
        Candidates {
            entries: Box::new(entries),
            config,
        }
    }
}

impl SkillDiscoverer for FsSkillDiscoverer {
    fn discover(&self) -> Box<dyn Iterator<Item = Result<SkillCandidate>> + '_> {
        Box::new(self.candidates())
    }
}

/// Iterator returned by [`FsSkillDiscoverer::candidates`].
pub struct Candidates<'a> {
    entries: Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + 'a>,
    config: &'a ScanConfig,
}

impl Iterator for Candidates<'_> {
    type Item = Result<SkillCandidate>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };
            if !entry.file_type().is_file() || entry.file_name() != SKILL_FILE {
                continue;
            }
            let skill_md = entry.into_path();
            let root = skill_md
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            debug!(path = %skill_md.display(), "found SKILL.md");
            return Some(read_candidate(root, skill_md, self.config));
        }
    }
}

/// Read one skill directory without walking anything else.
pub fn read_skill_dir(root: &Path, config: &ScanConfig) -> Result<SkillCandidate> {
    let skill_md = root.join(SKILL_FILE);
    if !skill_md.is_file() {
        return Err(Error::scan(
            &skill_md,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no SKILL.md in directory"),
        ));
    }
    read_candidate(root.to_path_buf(), skill_md, config)
}

fn read_candidate(root: PathBuf, skill_md: PathBuf, config: &ScanConfig) -> Result<SkillCandidate> {
    let content = std::fs::read_to_string(&skill_md).map_err(|e| Error::scan(&skill_md, e))?;
    Ok(SkillCandidate {
        asset_paths: list_files(&root, ASSETS_DIR, config)?,
        reference_paths: list_files(&root, REFERENCES_DIR, config)?,
        script_paths: list_files(&root, SCRIPTS_DIR, config)?,
        root,
        skill_md,
        content,
    })
}

/// Every regular file below `root/sub`, relative to `root`.
fn list_files(root: &Path, sub: &str, config: &ScanConfig) -> Result<Vec<PathBuf>> {
    let dir = root.join(sub);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(&dir)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_or_else(|_| entry.path().to_path_buf(), Path::to_path_buf);
        trace!(file = %relative.display(), "skill attachment");
        files.push(relative);
    }
    Ok(files)
}

fn should_descend(entry: &DirEntry, config: &ScanConfig) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let Some(name) = entry.file_name().to_str() else {
        return true;
    };
    if config.is_ignored(name) {
        trace!(dir = %entry.path().display(), "ignored directory");
        return false;
    }
    // Attachments of a skill are content, not more skills.
    let is_attachment = ATTACHMENT_DIRS.contains(&name)
        && entry
            .path()
            .parent()
            .is_some_and(|p| p.join(SKILL_FILE).is_file());
    !is_attachment
}
