use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::catalog::{Catalog, CatalogError, builtin_catalog};
use crate::core::paths;
use crate::core::selection::JsonFileStore;

pub const PLAN_ENV: &str = "PLAN_GATE_PLAN";
pub const CATALOG_ENV: &str = "PLAN_GATE_CATALOG";
pub const STORE_ENV: &str = "PLAN_GATE_STORE";

/// Plan used when neither `--plan` nor `PLAN_GATE_PLAN` is given.
pub const DEFAULT_PLAN: &str = "free";

/// Where the raw plan identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSource {
    Flag,
    Env,
    Default,
}

impl PlanSource {
    pub fn label(self) -> &'static str {
        match self {
            PlanSource::Flag => "from --plan",
            PlanSource::Env => "from PLAN_GATE_PLAN",
            PlanSource::Default => "default",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Raw plan identifier, decoded on use.
    pub plan_id: String,
    pub plan_source: PlanSource,
    /// Catalog JSON file; `None` means the built-in catalog.
    pub catalog_path: Option<PathBuf>,
    pub store_path: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    NoConfigDir,
    CatalogNotFound(PathBuf),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(
                f,
                "No config directory available; set {} to choose a selection store",
                STORE_ENV
            ),
            ConfigError::CatalogNotFound(path) => {
                write!(f, "{} points to a missing file: {}", CATALOG_ENV, path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn resolve_plan(flag: Option<&str>, env_value: Option<String>) -> (String, PlanSource) {
    match (flag, env_value) {
        (Some(plan), _) => (plan.to_string(), PlanSource::Flag),
        (None, Some(plan)) => (plan, PlanSource::Env),
        (None, None) => (DEFAULT_PLAN.to_string(), PlanSource::Default),
    }
}

/// Load configuration from the environment. `plan_override` (the `--plan` flag) wins
/// over `PLAN_GATE_PLAN`.
pub fn load(plan_override: Option<&str>) -> Result<Config, ConfigError> {
    let (plan_id, plan_source) = resolve_plan(plan_override, non_empty_var(PLAN_ENV));

    let catalog_path = non_empty_var(CATALOG_ENV).map(PathBuf::from);
    if let Some(path) = &catalog_path
        && !path.exists()
    {
        return Err(ConfigError::CatalogNotFound(path.clone()));
    }

    let store_path = match non_empty_var(STORE_ENV) {
        Some(p) => PathBuf::from(p),
        None => paths::selections_path().ok_or(ConfigError::NoConfigDir)?,
    };

    Ok(Config {
        plan_id,
        plan_source,
        catalog_path,
        store_path,
    })
}

impl Config {
    /// Catalog snapshot: the configured file, or the built-in catalog.
    pub fn catalog(&self) -> Result<Arc<Catalog>, CatalogError> {
        match &self.catalog_path {
            Some(path) => Catalog::load_file(path).map(Arc::new),
            None => Ok(Arc::new(builtin_catalog().clone())),
        }
    }

    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.store_path)
    }
}
