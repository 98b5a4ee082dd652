//! Build script: validates default-catalog.json at compile time.

use std::collections::HashSet;
use std::path::PathBuf;

fn main() {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR set by Cargo");
    let catalog_path: PathBuf = [&manifest_dir, "config", "default-catalog.json"]
        .iter()
        .collect();
    println!("cargo:rerun-if-changed={}", catalog_path.display());

    let json = std::fs::read_to_string(&catalog_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read {}: {}. default-catalog.json must exist and be valid.",
            catalog_path.display(),
            e
        )
    });

    #[derive(serde::Deserialize)]
    struct CatalogFile {
        models: Vec<ModelEntry>,
    }
    #[derive(serde::Deserialize)]
    struct ModelEntry {
        id: String,
        required_tier: String,
        category: String,
        audio_category: Option<String>,
    }

    let file: CatalogFile = serde_json::from_str(&json).unwrap_or_else(|e| {
        panic!(
            "default-catalog.json is invalid JSON: {}. Fix the file and rebuild.",
            e
        )
    });

    let mut seen = HashSet::new();
    for m in &file.models {
        if !seen.insert(m.id.as_str()) {
            panic!("default-catalog.json: duplicate model id '{}'", m.id);
        }
        if !["free", "standard", "plus"].contains(&m.required_tier.as_str()) {
            panic!(
                "default-catalog.json: model '{}' has invalid required_tier '{}'",
                m.id, m.required_tier
            );
        }
        if !["chat", "image", "audio", "video"].contains(&m.category.as_str()) {
            panic!(
                "default-catalog.json: model '{}' has invalid category '{}'",
                m.id, m.category
            );
        }
        let audio_ok = match (m.category.as_str(), m.audio_category.as_deref()) {
            ("audio", Some(cat)) => ["tts", "stt", "ag"].contains(&cat),
            ("audio", None) => false,
            (_, other) => other.is_none(),
        };
        if !audio_ok {
            panic!(
                "default-catalog.json: model '{}' has an inconsistent audio_category",
                m.id
            );
        }
    }
}
