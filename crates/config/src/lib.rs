//! Configuration loading, validation, and env substitution for the skill loader.
//!
//! Config files: `skilldex.toml`, `skilldex.yaml`, or `skilldex.json`
//! Searched in `./` then the user config directory.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        ENV_ERROR_POLICY, ENV_ROOT, apply_env_overrides, config_dir, discover_and_load,
        load_config,
    },
    schema::{ErrorPolicy, ScanConfig, SkilldexConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
