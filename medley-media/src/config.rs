//! Configuration loading and resolution
//!
//! Each setting resolves with the same priority order the rest of the
//! workspace uses:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use std::path::PathBuf;

use serde::Deserialize;

use crate::{Error, Result};

/// Default prefix under which removable storage is mounted.
pub const DEFAULT_EXTERNAL_STORAGE_ROOT: &str = "/storage/external/";

/// Default bound on the explicit redirect chain (the legacy behavior was
/// unbounded; see DESIGN.md).
pub const DEFAULT_MAX_REDIRECT_HOPS: usize = 10;

const ENV_EXTERNAL_ROOT: &str = "MEDLEY_EXTERNAL_ROOT";
const ENV_TEMP_DIR: &str = "MEDLEY_TEMP_DIR";
const ENV_MAX_REDIRECTS: &str = "MEDLEY_MAX_REDIRECTS";

/// Resolved pipeline configuration
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Path prefix identifying removable storage (the legacy `/sdcard/`
    /// prefix is recognized in addition to this one).
    pub external_storage_root: String,

    /// Directory for materialized temp files. `None` uses the OS temp dir.
    pub temp_dir: Option<PathBuf>,

    /// Maximum number of explicit redirect hops a remote fetch may follow.
    pub max_redirect_hops: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            external_storage_root: DEFAULT_EXTERNAL_STORAGE_ROOT.to_string(),
            temp_dir: None,
            max_redirect_hops: DEFAULT_MAX_REDIRECT_HOPS,
        }
    }
}

/// CLI-provided values, each optional. Anything absent falls through to
/// environment, config file, then default.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub external_storage_root: Option<String>,
    pub temp_dir: Option<PathBuf>,
    pub max_redirect_hops: Option<usize>,
}

/// On-disk config file shape (all keys optional)
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    external_storage_root: Option<String>,
    temp_dir: Option<PathBuf>,
    max_redirect_hops: Option<usize>,
}

impl MediaConfig {
    /// Resolve configuration from CLI overrides, environment, config file,
    /// and compiled defaults, in that order.
    pub fn load(overrides: ConfigOverrides) -> Result<MediaConfig> {
        let file = load_config_file()?;
        let defaults = MediaConfig::default();

        let external_storage_root = overrides
            .external_storage_root
            .or_else(|| std::env::var(ENV_EXTERNAL_ROOT).ok())
            .or(file.external_storage_root)
            .unwrap_or(defaults.external_storage_root);

        let temp_dir = overrides
            .temp_dir
            .or_else(|| std::env::var(ENV_TEMP_DIR).ok().map(PathBuf::from))
            .or(file.temp_dir);

        let max_redirect_hops = match overrides
            .max_redirect_hops
            .or_else(|| parse_env_hops())
            .or(file.max_redirect_hops)
        {
            Some(hops) => hops,
            None => defaults.max_redirect_hops,
        };

        Ok(MediaConfig { external_storage_root, temp_dir, max_redirect_hops })
    }
}

fn parse_env_hops() -> Option<usize> {
    let raw = std::env::var(ENV_MAX_REDIRECTS).ok()?;
    raw.parse().ok()
}

/// Read the platform config file if one exists. A missing file is not an
/// error; a malformed one is.
fn load_config_file() -> Result<FileConfig> {
    for path in candidate_config_paths() {
        if !path.is_file() {
            continue;
        }
        let contents = std::fs::read_to_string(&path)?;
        return toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())));
    }
    Ok(FileConfig::default())
}

/// Candidate config file locations, most specific first.
fn candidate_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("medley").join("config.toml"));
    }
    if cfg!(target_os = "linux") {
        paths.push(PathBuf::from("/etc/medley/config.toml"));
    }
    paths
}
