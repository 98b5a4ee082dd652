//! Selection workflow: open a content type, toggle models in a working copy, then save
//! or cancel.
//!
//! `SelectionSession` is `Idle` until [`SelectionSession::open`] and returns to `Idle`
//! on a successful save or a cancel. Committed selections live in a [`SelectionStore`]
//! and are only written by save. Policy denials come back as [`Violation`] values;
//! API misuse (toggling while idle, ids from another content type) is a
//! [`SessionError`].

mod outcome;
mod state;
pub mod store;

pub use outcome::{SelectionChange, SessionError, Saved, Toggled, Violation, ViolationKind};
pub use state::{AudioSlots, min_selection};
pub use store::{JsonFileStore, MemoryStore, SelectionKey, SelectionStore, StoreError};

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::mpsc;

use crate::core::catalog::{AudioCategory, Catalog, ModelDescriptor};
use crate::core::entitlement;
use crate::core::limits::{self, Outcome};
use crate::core::plan::{ContentType, ParsedPlan};

use state::{AudioEdit, Editing};

/// Stateful selection workflow over a plan, a catalog snapshot, and a store.
pub struct SelectionSession<S: SelectionStore> {
    plan: ParsedPlan,
    catalog: Arc<Catalog>,
    store: S,
    editing: Option<Editing>,
    /// Audio tab to reopen on; loaded from the store on first audio open.
    last_audio_category: Option<AudioCategory>,
    subscribers: Vec<mpsc::Sender<SelectionChange>>,
}

impl<S: SelectionStore> SelectionSession<S> {
    pub fn new(plan: ParsedPlan, catalog: Arc<Catalog>, store: S) -> Self {
        Self {
            plan,
            catalog,
            store,
            editing: None,
            last_audio_category: None,
            subscribers: Vec::new(),
        }
    }

    pub fn plan(&self) -> &ParsedPlan {
        &self.plan
    }

    /// Replace the entitlement after an upgrade or downgrade. Selections are untouched;
    /// later toggles are evaluated against the new plan.
    pub fn set_plan(&mut self, plan: ParsedPlan) {
        if plan != self.plan {
            log::info!("Plan changed from {} to {}", self.plan.label(), plan.label());
        }
        self.plan = plan;
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Swap in a refreshed catalog snapshot.
    pub fn set_catalog(&mut self, catalog: Arc<Catalog>) {
        self.catalog = catalog;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Receive a [`SelectionChange`] for every transition and mutation from now on.
    pub fn subscribe(&mut self) -> mpsc::Receiver<SelectionChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Content type being edited, if any.
    pub fn editing(&self) -> Option<ContentType> {
        self.editing.as_ref().map(Editing::content_type)
    }

    /// Working selection of a chat, image, or video session.
    pub fn temp_models(&self) -> Option<&BTreeSet<String>> {
        match &self.editing {
            Some(Editing::Models { temp, .. }) => Some(temp),
            _ => None,
        }
    }

    /// Working slots of an audio session, including categories visited earlier.
    pub fn temp_audio(&self) -> Option<AudioSlots> {
        match &self.editing {
            Some(Editing::Audio(audio)) => Some(audio.slots()),
            _ => None,
        }
    }

    pub fn active_audio_category(&self) -> Option<AudioCategory> {
        match &self.editing {
            Some(Editing::Audio(audio)) => Some(audio.active),
            _ => None,
        }
    }

    /// Cap for the content type being edited.
    pub fn max_selectable(&self) -> Option<usize> {
        self.editing().map(|ct| limits::max_selectable(&self.plan, ct))
    }

    pub fn committed_models(
        &self,
        content_type: ContentType,
    ) -> Result<BTreeSet<String>, StoreError> {
        self.store.load_models(content_type)
    }

    pub fn committed_audio(&self) -> Result<AudioSlots, StoreError> {
        self.store.load_audio()
    }

    /// Start editing `content_type` from its committed selection.
    pub fn open(&mut self, content_type: ContentType) -> Result<(), SessionError> {
        if let Some(current) = self.editing() {
            return Err(SessionError::AlreadyEditing(current));
        }
        let editing = match content_type {
            ContentType::Audio => {
                let active = self.resolve_last_audio_category()?;
                Editing::Audio(AudioEdit::open(active, self.store.load_audio()?))
            }
            ct => Editing::Models {
                content_type: ct,
                temp: self.store.load_models(ct)?,
            },
        };
        log::debug!("Opened {} selection", content_type);
        self.editing = Some(editing);
        self.notify(SelectionChange::Opened(content_type));
        Ok(())
    }

    /// Evaluate toggling `model_id` without changing anything.
    pub fn evaluate_toggle(&self, model_id: &str) -> Result<Outcome, SessionError> {
        let editing = self.editing.as_ref().ok_or(SessionError::NotEditing)?;
        let model = self.checked_model(editing, model_id)?;
        Ok(limits::evaluate_toggle(
            &self.plan,
            &editing.current_selection(),
            model,
            editing.content_type(),
        ))
    }

    /// Toggle `model_id` in the working selection, or report why the plan forbids it.
    pub fn toggle(&mut self, model_id: &str) -> Result<Toggled, SessionError> {
        let outcome = self.evaluate_toggle(model_id)?;
        let editing = self.editing.as_mut().ok_or(SessionError::NotEditing)?;
        let content_type = editing.content_type();

        let toggled = match outcome {
            Outcome::Allow => editing.apply(model_id),
            Outcome::DenyPremium { required } => Toggled::Denied(Violation::Premium {
                model_id: model_id.to_string(),
                content_type,
                required,
                effective: entitlement::effective_tier(&self.plan, content_type),
            }),
            Outcome::DenyLimit { cap } => {
                let selected = editing.current_selection();
                Toggled::Denied(Violation::Limit {
                    model_id: model_id.to_string(),
                    content_type,
                    cap,
                    deselecting: selected.contains(model_id),
                    selected: selected.into_iter().collect(),
                })
            }
        };

        match &toggled {
            Toggled::Denied(violation) => log::debug!("Toggle denied: {}", violation),
            _ => self.notify(SelectionChange::TempChanged(content_type)),
        }
        Ok(toggled)
    }

    /// Park the active audio slot and continue editing `category`. Nothing is committed.
    pub fn switch_audio_category(&mut self, category: AudioCategory) -> Result<(), SessionError> {
        let audio = match self.editing.as_mut() {
            Some(Editing::Audio(audio)) => audio,
            Some(other) => return Err(SessionError::NotAudioSession(other.content_type())),
            None => return Err(SessionError::NotEditing),
        };
        if audio.active == category {
            return Ok(());
        }
        log::debug!("Switching audio category {} -> {}", audio.active, category);
        audio.switch_to(category);
        self.last_audio_category = Some(category);
        self.notify(SelectionChange::TempChanged(ContentType::Audio));
        Ok(())
    }

    /// Clear the working selection (every category, for audio).
    pub fn remove_all(&mut self) -> Result<(), SessionError> {
        let editing = self.editing.as_mut().ok_or(SessionError::NotEditing)?;
        editing.clear();
        let content_type = editing.content_type();
        self.notify(SelectionChange::TempChanged(content_type));
        Ok(())
    }

    /// Whether the working selection may be saved.
    pub fn is_valid(&self) -> Result<bool, SessionError> {
        let editing = self.editing.as_ref().ok_or(SessionError::NotEditing)?;
        Ok(editing.too_few().is_none())
    }

    /// Commit the working selection and return to idle.
    ///
    /// An invalid selection is rejected with `TooFewModels` and the session stays open.
    /// A store failure is returned as an error, also leaving the session open.
    pub fn save(&mut self) -> Result<Saved, SessionError> {
        let editing = self.editing.as_ref().ok_or(SessionError::NotEditing)?;
        if let Some(violation) = editing.too_few() {
            log::debug!("Save rejected: {}", violation);
            return Ok(Saved::Rejected(violation));
        }

        let content_type = editing.content_type();
        let entries = editing.commit_entries();
        self.store.put_many(&entries)?;

        if let Editing::Audio(audio) = editing {
            let active = audio.active;
            if let Err(e) = self.store.set_last_audio_category(active) {
                log::warn!("Failed to remember audio category {}: {}", active, e);
            }
        }

        log::info!(
            "Committed {} selection: {}",
            content_type,
            entries
                .iter()
                .map(|(key, ids)| format!("{}={}", key.as_key(), ids.join(",")))
                .collect::<Vec<_>>()
                .join(" ")
        );
        self.editing = None;
        self.notify(SelectionChange::Committed(content_type));
        self.notify(SelectionChange::Closed(content_type));
        Ok(Saved::Committed(content_type))
    }

    /// Discard the working selection and return to idle.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        let editing = self.editing.take().ok_or(SessionError::NotEditing)?;
        let content_type = editing.content_type();
        log::debug!("Cancelled {} selection", content_type);
        self.notify(SelectionChange::Closed(content_type));
        Ok(())
    }

    fn checked_model(
        &self,
        editing: &Editing,
        model_id: &str,
    ) -> Result<&ModelDescriptor, SessionError> {
        let model = self
            .catalog
            .find(model_id)
            .ok_or_else(|| SessionError::UnknownModel(model_id.to_string()))?;
        let expected = editing.content_type();
        if model.category != expected {
            return Err(SessionError::WrongContentType {
                model_id: model_id.to_string(),
                expected,
                actual: model.category,
            });
        }
        if let Editing::Audio(audio) = editing
            && model.audio_category != Some(audio.active)
        {
            return Err(SessionError::WrongAudioCategory {
                model_id: model_id.to_string(),
                active: audio.active,
            });
        }
        Ok(model)
    }

    fn resolve_last_audio_category(&mut self) -> Result<AudioCategory, SessionError> {
        if let Some(category) = self.last_audio_category {
            return Ok(category);
        }
        let category = self
            .store
            .last_audio_category()?
            .unwrap_or(AudioCategory::Tts);
        self.last_audio_category = Some(category);
        Ok(category)
    }

    fn notify(&mut self, change: SelectionChange) {
        self.subscribers.retain(|tx| tx.send(change).is_ok());
    }
}

#[cfg(test)]
mod tests;
