//! Selection caps and per-toggle policy evaluation.

use std::collections::BTreeSet;

use crate::core::catalog::ModelDescriptor;
use crate::core::entitlement;
use crate::core::plan::{AccessTier, ContentType, ParsedPlan, Tier};

/// Result of evaluating one selection toggle. Pure; rendering is the caller's job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Allow,
    /// The model needs a higher access tier than the plan grants for its content type.
    DenyPremium { required: AccessTier },
    /// The toggle would push the selection past the plan's cap.
    DenyLimit { cap: usize },
}

/// Maximum number of models selectable at once.
///
/// Keyed by the plan tier itself, not the per-content-type effective tier: a composite
/// plan gets the `plus` cap for every content type, unlocked or not.
pub fn max_selectable(plan: &ParsedPlan, _content_type: ContentType) -> usize {
    match plan.tier {
        Tier::Free => 2,
        Tier::Standard => 3,
        Tier::Plus | Tier::Custom | Tier::Pro => 5,
    }
}

/// Evaluate toggling `model` against the current selection for `content_type`.
///
/// Toggling a selected id removes it, any other id adds it; the prospective count is
/// checked against [`max_selectable`]. Audio holds one model per category and replaces
/// on select, so it is never limit-denied.
pub fn evaluate_toggle(
    plan: &ParsedPlan,
    selected: &BTreeSet<String>,
    model: &ModelDescriptor,
    content_type: ContentType,
) -> Outcome {
    if !entitlement::is_accessible(model, plan) {
        return Outcome::DenyPremium {
            required: model.required_tier,
        };
    }
    if content_type == ContentType::Audio {
        return Outcome::Allow;
    }

    let prospective = if selected.contains(&model.id) {
        selected.len().saturating_sub(1)
    } else {
        selected.len() + 1
    };
    let cap = max_selectable(plan, content_type);
    if prospective > cap {
        Outcome::DenyLimit { cap }
    } else {
        Outcome::Allow
    }
}
