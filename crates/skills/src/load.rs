//! One scan pass: discover, parse, validate, register.

use std::path::{Path, PathBuf};

use {
    serde::Serialize,
    skilldex_config::{ErrorPolicy, ScanConfig},
    tracing::{info, warn},
};

use crate::{
    error::{Error, Result},
    parse,
    registry::{RegistryBuilder, SkillRegistry},
    scan::{self, FsSkillDiscoverer, SkillCandidate, SkillDiscoverer},
    types::{ScanFailure, SkillManifest},
};

/// Outcome of a scan: every registered skill plus every file that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub registry: SkillRegistry,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    /// `true` when no file failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Scan `root` and build a registry.
///
/// A root that cannot be read is always an error. Per-file failures follow
/// `config.error_policy`.
pub fn load(root: &Path, config: &ScanConfig) -> Result<ScanReport> {
    let discoverer = FsSkillDiscoverer::new(root, config.clone())?;
    load_from(&discoverer, config)
}

/// Scan the configured root, falling back to `default_root`.
pub fn load_configured(default_root: &Path, config: &ScanConfig) -> Result<ScanReport> {
    let root = config.root.as_deref().unwrap_or(default_root);
    load(root, config)
}

/// Run [`load`] on the blocking thread pool.
pub async fn load_async(root: PathBuf, config: ScanConfig) -> Result<ScanReport> {
    tokio::task::spawn_blocking(move || load(&root, &config))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
}

/// Build a registry from any discoverer.
pub fn load_from(discoverer: &dyn SkillDiscoverer, config: &ScanConfig) -> Result<ScanReport> {
    let mut builder = RegistryBuilder::new();
    let mut failures = Vec::new();

    for candidate in discoverer.discover() {
        let outcome = candidate
            .and_then(|c| build_manifest(c, config))
            .and_then(|m| builder.register(m));
        let Err(err) = outcome else {
            continue;
        };
        match config.error_policy {
            ErrorPolicy::Abort => {
                warn!(error = %err, "aborting skill scan");
                return Err(err);
            },
            ErrorPolicy::SkipAndReport => {
                warn!(error = %err, "skipping skill");
                failures.push(ScanFailure::from_error(&err));
            },
        }
    }

    info!(
        registered = builder.len(),
        failed = failures.len(),
        "skill scan complete"
    );
    Ok(ScanReport {
        registry: builder.finish(),
        failures,
    })
}

/// Parse and validate a single skill directory.
pub fn load_skill_dir(dir: &Path, config: &ScanConfig) -> Result<SkillManifest> {
    build_manifest(scan::read_skill_dir(dir, config)?, config)
}

/// Turn a discovered candidate into a manifest.
pub fn build_manifest(candidate: SkillCandidate, config: &ScanConfig) -> Result<SkillManifest> {
    let parsed = parse::parse_skill(
        &candidate.content,
        &candidate.skill_md,
        config.validate_names,
    )?;

    for rel in candidate
        .asset_paths
        .iter()
        .chain(&candidate.reference_paths)
        .chain(&candidate.script_paths)
    {
        let full = candidate.root.join(rel);
        if !full.is_file() {
            return Err(Error::scan(
                &full,
                std::io::Error::new(std::io::ErrorKind::NotFound, "skill file disappeared"),
            ));
        }
    }

    Ok(SkillManifest {
        name: parsed.name,
        description: parsed.description,
        allowed_tools: parsed.allowed_tools,
        license: parsed.license,
        compatibility: parsed.compatibility,
        extra: parsed.extra,
        root: candidate.root,
        body_path: candidate.skill_md,
        body: parsed.body,
        asset_paths: candidate.asset_paths,
        reference_paths: candidate.reference_paths,
        script_paths: candidate.script_paths,
    })
}
