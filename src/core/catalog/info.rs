//! Catalog item types (no dependencies on loading or favorites).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::plan::{AccessTier, ContentType};

/// Sub-scope of `audio`, each with its own single-selection slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCategory {
    /// Text to speech.
    Tts,
    /// Speech to text.
    Stt,
    /// Audio generation.
    Ag,
}

impl AudioCategory {
    pub const ALL: [AudioCategory; 3] = [AudioCategory::Tts, AudioCategory::Stt, AudioCategory::Ag];

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == token)
    }

    pub fn label(self) -> &'static str {
        match self {
            AudioCategory::Tts => "tts",
            AudioCategory::Stt => "stt",
            AudioCategory::Ag => "ag",
        }
    }
}

impl fmt::Display for AudioCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for AudioCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(&s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown audio category '{}' (tts, stt, ag)", s))
    }
}

/// A selectable catalog item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    /// Display name; falls back to `id` when empty.
    #[serde(default)]
    pub name: String,
    pub required_tier: AccessTier,
    pub category: ContentType,
    /// Set for, and only for, `audio` models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_category: Option<AudioCategory>,
    #[serde(default)]
    pub favorite: bool,
}

impl ModelDescriptor {
    pub fn new(id: impl Into<String>, required_tier: AccessTier, category: ContentType) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            required_tier,
            category,
            audio_category: None,
            favorite: false,
        }
    }

    pub fn with_audio_category(mut self, audio_category: AudioCategory) -> Self {
        self.audio_category = Some(audio_category);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}
