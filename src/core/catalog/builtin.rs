//! Built-in catalog, embedded at compile time from `config/default-catalog.json`.

use std::sync::OnceLock;

use super::Catalog;

static BUILTIN_CATALOG: OnceLock<Catalog> = OnceLock::new();

fn load_builtin_catalog() -> Catalog {
    let json = include_str!("../../../config/default-catalog.json");
    Catalog::from_json(json).expect("default-catalog.json is validated by build.rs")
}

/// Returns the built-in catalog, parsing it on first access.
pub fn builtin_catalog() -> &'static Catalog {
    BUILTIN_CATALOG.get_or_init(load_builtin_catalog)
}
