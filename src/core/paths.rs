//! Centralized path helpers for the config directory and the files stored in it.

use std::path::PathBuf;

use crate::core::app;

/// Env var overriding the config directory (tests, sandboxes, portable installs).
pub const CONFIG_DIR_ENV: &str = "PLAN_GATE_CONFIG_DIR";

/// Project directories from the standard platform locations.
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", app::VENDOR, app::NAME)
}

/// Config directory (~/.config/plan-gate/), or `PLAN_GATE_CONFIG_DIR` when set.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|s| !s.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    project_dirs().map(|d| d.config_dir().to_path_buf())
}

/// Default location of the committed selections file.
pub fn selections_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("selections.json"))
}

/// Location of the local favorites file.
pub fn favorites_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("favorites.json"))
}
