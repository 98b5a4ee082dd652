//! Catalog favorites: fire-and-forget toggling against a favorites service.
//!
//! Favoriting is independent of entitlement. A toggle runs on a background thread and
//! reports through a channel; selection state never waits on it and is never rolled
//! back when it fails.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::core::paths;

/// Errors from a favorites service.
#[derive(Debug, thiserror::Error)]
pub enum FavoriteError {
    #[error("No config directory available")]
    NoConfigDir,
    #[error("Failed to access favorites file: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid favorites JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Favorite update for '{model_id}' rejected: {reason}")]
    Rejected { model_id: String, reason: String },
}

/// Remote or local store of favorite model ids.
pub trait FavoriteService: Send + Sync {
    fn set_favorite(&self, model_id: &str, favorite: bool) -> Result<(), FavoriteError>;
}

/// Outcome of a detached favorite toggle.
#[derive(Debug)]
pub struct FavoriteReport {
    pub model_id: String,
    pub favorite: bool,
    /// Error message on failure.
    pub result: Result<(), String>,
}

/// Toggle a favorite on a background thread. Returns the receiver for the report;
/// dropping it is fine, the toggle still runs.
pub fn spawn_favorite_toggle(
    service: Arc<dyn FavoriteService>,
    model_id: &str,
    favorite: bool,
) -> mpsc::Receiver<FavoriteReport> {
    let (tx, rx) = mpsc::channel();
    let model_id = model_id.to_string();
    std::thread::spawn(move || {
        let result = service
            .set_favorite(&model_id, favorite)
            .map_err(|e| e.to_string());
        if let Err(e) = &result {
            log::warn!("Failed to set favorite for {}: {}", model_id, e);
        }
        let _ = tx.send(FavoriteReport {
            model_id,
            favorite,
            result,
        });
    });
    rx
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct FavoritesFile {
    favorites: BTreeSet<String>,
}

/// Favorites persisted as JSON in the config directory.
#[derive(Debug)]
pub struct LocalFavorites {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalFavorites {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Favorites stored in `~/.config/plan-gate/favorites.json`.
    pub fn open_default() -> Result<Self, FavoriteError> {
        paths::favorites_path()
            .map(Self::new)
            .ok_or(FavoriteError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Favorite ids. Empty when the file does not exist yet.
    pub fn load(&self) -> Result<BTreeSet<String>, FavoriteError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(e.into()),
        };
        let file: FavoritesFile = serde_json::from_str(&data)?;
        Ok(file.favorites)
    }

    fn save(&self, favorites: BTreeSet<String>) -> Result<(), FavoriteError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&FavoritesFile { favorites })?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(tmp, &self.path)?;
        Ok(())
    }
}

impl FavoriteService for LocalFavorites {
    fn set_favorite(&self, model_id: &str, favorite: bool) -> Result<(), FavoriteError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut favorites = self.load()?;
        let changed = if favorite {
            favorites.insert(model_id.to_string())
        } else {
            favorites.remove(model_id)
        };
        if changed {
            self.save(favorites)?;
        }
        Ok(())
    }
}
