use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed SKILL.md at {path}: {reason}")]
    MalformedManifest { path: PathBuf, reason: String },

    #[error("{path}: missing required field '{field}'")]
    MissingField { path: PathBuf, field: &'static str },

    #[error(
        "{path}: invalid skill name '{name}': must be 1-64 lowercase alphanumeric, hyphen, or colon chars"
    )]
    InvalidName { path: PathBuf, name: String },

    #[error("duplicate skill '{name}': {duplicate} conflicts with {existing}")]
    DuplicateSkill {
        name: String,
        existing: PathBuf,
        duplicate: PathBuf,
    },

    #[error("skill '{name}' not found")]
    NotFound { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn scan(path: &Path, source: std::io::Error) -> Self {
        Self::Scan {
            path: path.to_path_buf(),
            source,
        }
    }

    #[must_use]
    pub fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        Self::MalformedManifest {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn missing_field(path: &Path, field: &'static str) -> Self {
        Self::MissingField {
            path: path.to_path_buf(),
            field,
        }
    }

    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Path of the file or directory the error is about, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Scan { path, .. }
            | Self::MalformedManifest { path, .. }
            | Self::MissingField { path, .. }
            | Self::InvalidName { path, .. } => Some(path),
            Self::DuplicateSkill { duplicate, .. } => Some(duplicate),
            Self::NotFound { .. } | Self::Io(_) | Self::Json(_) => None,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
        Self::Scan { path, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
