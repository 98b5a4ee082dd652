//! Committed selection persistence: a small key-value store keyed by content type and,
//! for audio, by category.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::catalog::AudioCategory;
use crate::core::paths;
use crate::core::plan::ContentType;

use super::AudioSlots;

/// Error reading or writing committed selections.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("No config directory available")]
    NoConfigDir,
    #[error("Failed to access selection store: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid selection store JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where a committed selection lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionKey {
    /// Multi-select content types (chat, image, video).
    Models(ContentType),
    /// One slot per audio category.
    Audio(AudioCategory),
}

impl SelectionKey {
    /// Stable string key, e.g. `chat` or `audio.tts`.
    pub fn as_key(&self) -> String {
        match self {
            SelectionKey::Models(ct) => ct.label().to_string(),
            SelectionKey::Audio(cat) => format!("{}.{}", ContentType::Audio, cat),
        }
    }
}

pub trait SelectionStore {
    /// Stored ids for `key`; empty when nothing was ever committed.
    fn get(&self, key: SelectionKey) -> Result<Vec<String>, StoreError>;

    /// Write several keys. Implementations should apply them all or none.
    fn put_many(&mut self, entries: &[(SelectionKey, Vec<String>)]) -> Result<(), StoreError>;

    /// Audio tab the user had open last.
    fn last_audio_category(&self) -> Result<Option<AudioCategory>, StoreError>;

    fn set_last_audio_category(&mut self, category: AudioCategory) -> Result<(), StoreError>;

    fn put(&mut self, key: SelectionKey, ids: Vec<String>) -> Result<(), StoreError> {
        self.put_many(&[(key, ids)])
    }

    fn load_models(&self, content_type: ContentType) -> Result<BTreeSet<String>, StoreError> {
        Ok(self
            .get(SelectionKey::Models(content_type))?
            .into_iter()
            .collect())
    }

    /// Committed audio slots; only the first stored id of each category counts.
    fn load_audio(&self) -> Result<AudioSlots, StoreError> {
        let mut slots = AudioSlots::default();
        for cat in AudioCategory::ALL {
            let ids = self.get(SelectionKey::Audio(cat))?;
            slots.set(cat, ids.into_iter().next());
        }
        Ok(slots)
    }
}

/// In-process store for hosts that persist elsewhere, and for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<String>>,
    last_audio_category: Option<AudioCategory>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStore for MemoryStore {
    fn get(&self, key: SelectionKey) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.get(&key.as_key()).cloned().unwrap_or_default())
    }

    fn put_many(&mut self, entries: &[(SelectionKey, Vec<String>)]) -> Result<(), StoreError> {
        for (key, ids) in entries {
            self.entries.insert(key.as_key(), ids.clone());
        }
        Ok(())
    }

    fn last_audio_category(&self) -> Result<Option<AudioCategory>, StoreError> {
        Ok(self.last_audio_category)
    }

    fn set_last_audio_category(&mut self, category: AudioCategory) -> Result<(), StoreError> {
        self.last_audio_category = Some(category);
        Ok(())
    }
}

/// JSON structure on disk.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    selections: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_audio_category: Option<AudioCategory>,
}

/// Selections persisted in `~/.config/plan-gate/selections.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location in the config directory.
    pub fn open_default() -> Result<Self, StoreError> {
        paths::selections_path()
            .map(Self::new)
            .ok_or(StoreError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns an empty store file when the file does not exist yet (first run).
    fn load(&self) -> Result<StoreFile, StoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(StoreFile::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&data)?)
    }

    fn save(&self, file: &StoreFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(file)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(tmp, &self.path)?;
        Ok(())
    }
}

impl SelectionStore for JsonFileStore {
    fn get(&self, key: SelectionKey) -> Result<Vec<String>, StoreError> {
        let mut file = self.load()?;
        Ok(file.selections.remove(&key.as_key()).unwrap_or_default())
    }

    fn put_many(&mut self, entries: &[(SelectionKey, Vec<String>)]) -> Result<(), StoreError> {
        let mut file = self.load()?;
        for (key, ids) in entries {
            file.selections.insert(key.as_key(), ids.clone());
        }
        self.save(&file)
    }

    fn last_audio_category(&self) -> Result<Option<AudioCategory>, StoreError> {
        Ok(self.load()?.last_audio_category)
    }

    fn set_last_audio_category(&mut self, category: AudioCategory) -> Result<(), StoreError> {
        let mut file = self.load()?;
        file.last_audio_category = Some(category);
        self.save(&file)
    }
}
