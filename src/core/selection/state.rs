//! Working-copy state while a selection is being edited.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::catalog::AudioCategory;
use crate::core::plan::ContentType;

use super::outcome::{Toggled, Violation};
use super::store::SelectionKey;

/// One optional model per audio category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSlots {
    pub tts: Option<String>,
    pub stt: Option<String>,
    pub ag: Option<String>,
}

impl AudioSlots {
    pub fn get(&self, category: AudioCategory) -> Option<&str> {
        self.slot(category).as_deref()
    }

    pub fn set(&mut self, category: AudioCategory, model_id: Option<String>) {
        *self.slot_mut(category) = model_id;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn iter(&self) -> impl Iterator<Item = (AudioCategory, Option<&str>)> {
        AudioCategory::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    fn slot(&self, category: AudioCategory) -> &Option<String> {
        match category {
            AudioCategory::Tts => &self.tts,
            AudioCategory::Stt => &self.stt,
            AudioCategory::Ag => &self.ag,
        }
    }

    fn slot_mut(&mut self, category: AudioCategory) -> &mut Option<String> {
        match category {
            AudioCategory::Tts => &mut self.tts,
            AudioCategory::Stt => &mut self.stt,
            AudioCategory::Ag => &mut self.ag,
        }
    }
}

/// Fewest models a saved selection may hold.
pub fn min_selection(content_type: ContentType) -> usize {
    match content_type {
        ContentType::Chat => 2,
        ContentType::Image | ContentType::Video | ContentType::Audio => 1,
    }
}

#[derive(Debug)]
pub(super) struct AudioEdit {
    pub(super) active: AudioCategory,
    /// Working slot of the active category.
    pub(super) temp: Option<String>,
    /// Per-category slots for the whole session; the active one is refreshed on switch.
    pub(super) cache: AudioSlots,
    /// Categories whose slot was written by the user this session.
    pub(super) touched: BTreeSet<AudioCategory>,
}

impl AudioEdit {
    pub(super) fn open(active: AudioCategory, committed: AudioSlots) -> Self {
        Self {
            active,
            temp: committed.get(active).map(String::from),
            cache: committed,
            touched: BTreeSet::new(),
        }
    }

    pub(super) fn switch_to(&mut self, category: AudioCategory) {
        self.cache.set(self.active, self.temp.take());
        self.active = category;
        self.temp = self.cache.get(category).map(String::from);
    }

    /// Session slots with the active category's working value applied.
    pub(super) fn slots(&self) -> AudioSlots {
        let mut slots = self.cache.clone();
        slots.set(self.active, self.temp.clone());
        slots
    }
}

#[derive(Debug)]
pub(super) enum Editing {
    Models {
        content_type: ContentType,
        temp: BTreeSet<String>,
    },
    Audio(AudioEdit),
}

impl Editing {
    pub(super) fn content_type(&self) -> ContentType {
        match self {
            Editing::Models { content_type, .. } => *content_type,
            Editing::Audio(_) => ContentType::Audio,
        }
    }

    /// Selection the policy counts against: the temp set, or the active audio slot.
    pub(super) fn current_selection(&self) -> BTreeSet<String> {
        match self {
            Editing::Models { temp, .. } => temp.clone(),
            Editing::Audio(audio) => audio.temp.iter().cloned().collect(),
        }
    }

    /// Apply an allowed toggle.
    pub(super) fn apply(&mut self, model_id: &str) -> Toggled {
        match self {
            Editing::Models { temp, .. } => {
                if temp.remove(model_id) {
                    Toggled::Deselected(model_id.to_string())
                } else {
                    temp.insert(model_id.to_string());
                    Toggled::Selected(model_id.to_string())
                }
            }
            Editing::Audio(audio) => {
                audio.touched.insert(audio.active);
                if audio.temp.as_deref() == Some(model_id) {
                    audio.temp = None;
                    return Toggled::Deselected(model_id.to_string());
                }
                match audio.temp.replace(model_id.to_string()) {
                    Some(previous) => Toggled::Replaced {
                        previous,
                        current: model_id.to_string(),
                    },
                    None => Toggled::Selected(model_id.to_string()),
                }
            }
        }
    }

    pub(super) fn clear(&mut self) {
        match self {
            Editing::Models { temp, .. } => temp.clear(),
            Editing::Audio(audio) => {
                audio.temp = None;
                audio.cache.clear();
                audio.touched.extend(AudioCategory::ALL);
            }
        }
    }

    /// `Some` when the working selection may not be saved.
    pub(super) fn too_few(&self) -> Option<Violation> {
        let content_type = self.content_type();
        let required = min_selection(content_type);
        match self {
            Editing::Models { temp, .. } if temp.len() < required => {
                Some(Violation::TooFewModels {
                    content_type,
                    audio_category: None,
                    required,
                    selected: temp.len(),
                })
            }
            Editing::Audio(audio) if audio.temp.is_none() => Some(Violation::TooFewModels {
                content_type,
                audio_category: Some(audio.active),
                required,
                selected: 0,
            }),
            _ => None,
        }
    }

    /// Store writes that commit this session.
    ///
    /// Multi-select content types are replaced wholesale. Audio writes every category
    /// the user touched this session, an emptied slot as an empty list; untouched
    /// categories keep their committed value.
    pub(super) fn commit_entries(&self) -> Vec<(SelectionKey, Vec<String>)> {
        match self {
            Editing::Models { content_type, temp } => {
                vec![(
                    SelectionKey::Models(*content_type),
                    temp.iter().cloned().collect(),
                )]
            }
            Editing::Audio(audio) => {
                let slots = audio.slots();
                audio
                    .touched
                    .iter()
                    .map(|&cat| {
                        let ids = slots.get(cat).map(String::from).into_iter().collect();
                        (SelectionKey::Audio(cat), ids)
                    })
                    .collect()
            }
        }
    }
}
