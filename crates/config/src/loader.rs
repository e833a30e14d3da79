use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    env_subst::substitute_env,
    schema::{ErrorPolicy, SkilldexConfig},
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "skilldex.toml",
    "skilldex.yaml",
    "skilldex.yml",
    "skilldex.json",
];

/// Overrides the configured scan root.
pub const ENV_ROOT: &str = "SKILLDEX_ROOT";
/// Overrides the configured error policy (`skip_and_report` or `abort`).
pub const ENV_ERROR_POLICY: &str = "SKILLDEX_ERROR_POLICY";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<SkilldexConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations, then apply environment
/// overrides.
///
/// Search order:
/// 1. `./skilldex.{toml,yaml,yml,json}` (project-local)
/// 2. `<user config dir>/skilldex/skilldex.{toml,yaml,yml,json}`
///
/// A missing or unparseable file yields `SkilldexConfig::default()`.
pub fn discover_and_load() -> SkilldexConfig {
    let mut config = match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                SkilldexConfig::default()
            })
        },
        None => {
            debug!("no config file found, using defaults");
            SkilldexConfig::default()
        },
    };
    apply_env_overrides(&mut config);
    config
}

/// Apply `SKILLDEX_*` environment overrides on top of a loaded config.
pub fn apply_env_overrides(config: &mut SkilldexConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(config: &mut SkilldexConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(root) = lookup(ENV_ROOT).filter(|v| !v.trim().is_empty()) {
        debug!(root = %root, "scan root overridden from environment");
        config.scan.root = Some(PathBuf::from(root));
    }
    if let Some(raw) = lookup(ENV_ERROR_POLICY) {
        match raw.parse::<ErrorPolicy>() {
            Ok(policy) => config.scan.error_policy = policy,
            Err(e) => warn!(value = %raw, error = %e, "ignoring {ENV_ERROR_POLICY}"),
        }
    }
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    let local = CONFIG_FILENAMES.iter().map(PathBuf::from);
    let global = config_dir()
        .into_iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)));
    local.chain(global).find(|p| p.exists())
}

/// Returns the user-global config directory (e.g. `~/.config/skilldex/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "skilldex").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<SkilldexConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
