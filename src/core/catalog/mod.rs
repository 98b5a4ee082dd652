//! Model catalog: descriptors, lookup, filtering, and the built-in catalog.
//!
//! The catalog is owned by an external fetch collaborator; this module only indexes a
//! snapshot of it so that policy queries are constant-time per model.

mod builtin;
pub mod favorites;
mod info;

pub use builtin::builtin_catalog;
pub use info::{AudioCategory, ModelDescriptor};

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::entitlement;
use crate::core::plan::{ContentType, ParsedPlan};

/// Error loading or validating a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate model id '{0}'")]
    DuplicateId(String),
    #[error("Audio model '{0}' has no audio_category")]
    MissingAudioCategory(String),
    #[error("Model '{0}' is not an audio model but has an audio_category")]
    UnexpectedAudioCategory(String),
}

/// JSON structure on disk.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    models: Vec<ModelDescriptor>,
}

/// Validated, indexed snapshot of the model catalog.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    models: Vec<ModelDescriptor>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids and inconsistent audio categories.
    pub fn new(models: Vec<ModelDescriptor>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(models.len());
        for (i, m) in models.iter().enumerate() {
            match (m.category, m.audio_category) {
                (ContentType::Audio, None) => {
                    return Err(CatalogError::MissingAudioCategory(m.id.clone()));
                }
                (ContentType::Chat | ContentType::Image | ContentType::Video, Some(_)) => {
                    return Err(CatalogError::UnexpectedAudioCategory(m.id.clone()));
                }
                _ => {}
            }
            if by_id.insert(m.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateId(m.id.clone()));
            }
        }
        Ok(Self { models, by_id })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.models)
    }

    /// Load a catalog snapshot from a JSON file (`{"models": [...]}`).
    pub fn load_file(path: &Path) -> Result<Self, CatalogError> {
        let data = fs::read_to_string(path)?;
        let catalog = Self::from_json(&data)?;
        log::debug!(
            "Loaded {} models from {}",
            catalog.models.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&ModelDescriptor> {
        self.by_id.get(id).map(|&i| &self.models[i])
    }

    pub fn for_content_type(&self, content_type: ContentType) -> Vec<&ModelDescriptor> {
        self.models
            .iter()
            .filter(|m| m.category == content_type)
            .collect()
    }

    pub fn for_audio_category(&self, audio_category: AudioCategory) -> Vec<&ModelDescriptor> {
        self.models
            .iter()
            .filter(|m| m.audio_category == Some(audio_category))
            .collect()
    }

    /// Models of `content_type` the plan may use.
    pub fn accessible(&self, plan: &ParsedPlan, content_type: ContentType) -> Vec<&ModelDescriptor> {
        self.models
            .iter()
            .filter(|m| m.category == content_type && entitlement::is_accessible(m, plan))
            .collect()
    }

    /// Filter models by query (case-insensitive match on id or name).
    pub fn filter(&self, query: &str) -> Vec<&ModelDescriptor> {
        if query.is_empty() {
            return self.models.iter().collect();
        }
        let q = query.to_lowercase();
        self.models
            .iter()
            .filter(|m| m.id.to_lowercase().contains(&q) || m.name.to_lowercase().contains(&q))
            .collect()
    }

    /// Update the local favorite flag. Returns false when the id is unknown.
    pub fn set_favorite(&mut self, id: &str, favorite: bool) -> bool {
        match self.by_id.get(id) {
            Some(&i) => {
                self.models[i].favorite = favorite;
                true
            }
            None => false,
        }
    }
}
