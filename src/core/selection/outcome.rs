//! What selection operations hand back to the presentation layer.

use std::fmt;

use crate::core::catalog::AudioCategory;
use crate::core::plan::{AccessTier, ContentType};

use super::store::StoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    Premium,
    Limit,
    TooFewModels,
}

/// A user-facing denial, with enough context to render an upgrade or remediation prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    Premium {
        model_id: String,
        content_type: ContentType,
        required: AccessTier,
        /// What the plan currently grants for `content_type`.
        effective: AccessTier,
    },
    Limit {
        model_id: String,
        content_type: ContentType,
        cap: usize,
        /// Current selection; deselecting any of these makes room.
        selected: Vec<String>,
        /// `model_id` is already selected: the selection is over the cap (after a
        /// downgrade) and single deselects are refused until it is cleared.
        deselecting: bool,
    },
    TooFewModels {
        content_type: ContentType,
        audio_category: Option<AudioCategory>,
        required: usize,
        selected: usize,
    },
}

impl Violation {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Violation::Premium { .. } => ViolationKind::Premium,
            Violation::Limit { .. } => ViolationKind::Limit,
            Violation::TooFewModels { .. } => ViolationKind::TooFewModels,
        }
    }

    /// Model ids the remediation applies to.
    pub fn affected_models(&self) -> Vec<&str> {
        match self {
            Violation::Premium { model_id, .. } => vec![model_id.as_str()],
            Violation::Limit {
                selected,
                deselecting: true,
                ..
            } => selected.iter().map(String::as_str).collect(),
            Violation::Limit {
                model_id, selected, ..
            } => std::iter::once(model_id.as_str())
                .chain(selected.iter().map(String::as_str))
                .collect(),
            Violation::TooFewModels { .. } => vec![],
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Premium {
                model_id,
                content_type,
                required,
                effective,
            } => write!(
                f,
                "'{}' requires {} access; your plan grants {} access to {} models",
                model_id, required, effective, content_type
            ),
            Violation::Limit {
                content_type,
                cap,
                selected,
                deselecting: true,
                ..
            } => write!(
                f,
                "Your plan allows up to {} {} models at once and {} are selected; \
                 remove all models to start over, or upgrade your plan",
                cap,
                content_type,
                selected.len()
            ),
            Violation::Limit {
                content_type,
                cap,
                selected,
                ..
            } => write!(
                f,
                "Your plan allows up to {} {} models at once; deselect one of: {}",
                cap,
                content_type,
                selected.join(", ")
            ),
            Violation::TooFewModels {
                content_type,
                audio_category: Some(cat),
                ..
            } => write!(f, "Select a {} model ({}) before saving", content_type, cat),
            Violation::TooFewModels {
                content_type,
                audio_category: None,
                required,
                selected,
            } => write!(
                f,
                "Select at least {} {} model{} before saving ({} selected)",
                required,
                content_type,
                if *required == 1 { "" } else { "s" },
                selected
            ),
        }
    }
}

/// Result of a toggle that reached the policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Toggled {
    Selected(String),
    Deselected(String),
    /// Audio only: the active category's slot moved to another model.
    Replaced {
        previous: String,
        current: String,
    },
    /// Working selection unchanged.
    Denied(Violation),
}

/// Result of a save attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Saved {
    Committed(ContentType),
    /// Session stays open and nothing is persisted.
    Rejected(Violation),
}

/// Change notification for re-rendering selection indicators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionChange {
    Opened(ContentType),
    TempChanged(ContentType),
    Committed(ContentType),
    Closed(ContentType),
}

/// Misuse of the session API, distinct from user-facing [`Violation`]s.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No selection is being edited")]
    NotEditing,
    #[error("A {0} selection is already being edited")]
    AlreadyEditing(ContentType),
    #[error("The {0} selection being edited has no audio categories")]
    NotAudioSession(ContentType),
    #[error("Unknown model '{0}'")]
    UnknownModel(String),
    #[error("Model '{model_id}' is a {actual} model, not {expected}")]
    WrongContentType {
        model_id: String,
        expected: ContentType,
        actual: ContentType,
    },
    #[error("Model '{model_id}' does not belong to the active {active} category")]
    WrongAudioCategory {
        model_id: String,
        active: AudioCategory,
    },
    #[error("Selection store error: {0}")]
    Store(#[from] StoreError),
}
