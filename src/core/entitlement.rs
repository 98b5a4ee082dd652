//! Per-content-type access resolution for a decoded plan.

use crate::core::catalog::ModelDescriptor;
use crate::core::plan::{AccessTier, ContentType, ParsedPlan, Tier};

/// Access level the plan grants for `content_type`.
///
/// Composite plans (`custom`, `pro`) resolve to `plus` for unlocked content types and
/// to `free` for everything else; other tiers map to themselves.
pub fn effective_tier(plan: &ParsedPlan, content_type: ContentType) -> AccessTier {
    match plan.tier {
        Tier::Custom | Tier::Pro => {
            if plan.has_feature(content_type) {
                AccessTier::Plus
            } else {
                AccessTier::Free
            }
        }
        Tier::Free => AccessTier::Free,
        Tier::Standard => AccessTier::Standard,
        Tier::Plus => AccessTier::Plus,
    }
}

/// Whether the plan may use `model` in its own content type.
pub fn is_accessible(model: &ModelDescriptor, plan: &ParsedPlan) -> bool {
    effective_tier(plan, model.category) >= model.required_tier
}
