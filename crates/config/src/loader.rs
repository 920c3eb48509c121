//! Config discovery, loading, and atomic saves.

use std::{
    path::{Path, PathBuf},
    sync::RwLock,
};

use tracing::{debug, warn};

use crate::schema::Config;

pub const CONFIG_FILENAME: &str = "waypoint.toml";

/// Programmatic config-dir override, used by `--config-dir` and by tests.
static CONFIG_DIR_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);

pub fn set_config_dir(dir: impl Into<PathBuf>) {
    if let Ok(mut guard) = CONFIG_DIR_OVERRIDE.write() {
        *guard = Some(dir.into());
    }
}

pub fn clear_config_dir() {
    if let Ok(mut guard) = CONFIG_DIR_OVERRIDE.write() {
        *guard = None;
    }
}

/// Returns the user-global config directory.
///
/// Resolution order:
/// 1. programmatic override (`set_config_dir`)
/// 2. `WAYPOINT_CONFIG_DIR`
/// 3. `~/.config/waypoint/`
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(guard) = CONFIG_DIR_OVERRIDE.read()
        && let Some(dir) = guard.as_ref()
    {
        return Some(dir.clone());
    }
    if let Ok(dir) = std::env::var("WAYPOINT_CONFIG_DIR")
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    directories::ProjectDirs::from("", "", "waypoint").map(|d| d.config_dir().to_path_buf())
}

/// Find an existing config file: project-local first, then user-global.
fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }
    let global = config_dir()?.join(CONFIG_FILENAME);
    if global.exists() {
        return Some(global);
    }
    None
}

/// Returns the path of an existing config file, or the default global path.
pub fn find_or_default_config_path() -> PathBuf {
    if let Some(path) = find_config_file() {
        return path;
    }
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILENAME)
}

/// Load config from the given path.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))
}

/// Discover and load config from standard locations.
///
/// Returns `Config::default()` if no file is found; an unreadable file is
/// logged and treated as absent.
pub fn discover_and_load() -> Config {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    Config::default()
}

/// Serialize `config` to TOML and write it to the config path.
///
/// Creates parent directories if needed. The write goes through a sibling
/// temp file and a rename, so a crash never leaves a half-written config.
/// Returns the path written to.
pub fn save_config(config: &Config) -> anyhow::Result<PathBuf> {
    let path = find_or_default_config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("serialize config: {e}"))?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, toml_str)?;
    std::fs::rename(&tmp, &path)?;
    debug!(path = %path.display(), "saved config");
    Ok(path)
}
