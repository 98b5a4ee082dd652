//! Subscription plans: tiers, billing cycles, content types, and the decoded plan.
//!
//! A raw plan identifier such as `custom_chat_video_monthly` is decoded once into a
//! [`ParsedPlan`] (see [`decode`]) and then queried by the entitlement and limit policies.

mod cache;
mod decode;

pub use cache::PlanCache;
pub use decode::{SEPARATOR, decode};

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Subscription tier as written in the plan identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Standard,
    Plus,
    /// Composite plan: access is unlocked per content type.
    Custom,
    /// Composite plan: access is unlocked per content type.
    Pro,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Free,
        Tier::Standard,
        Tier::Plus,
        Tier::Custom,
        Tier::Pro,
    ];

    /// Parse a lowercase tier token.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == token)
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Standard => "standard",
            Tier::Plus => "plus",
            Tier::Custom => "custom",
            Tier::Pro => "pro",
        }
    }

    /// Composite tiers gate access per content type through the plan's features.
    pub fn is_composite(self) -> bool {
        matches!(self, Tier::Custom | Tier::Pro)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Effective access level, totally ordered `free < standard < plus`.
///
/// Catalog items declare the level they require; plans resolve to one per content type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessTier {
    Free,
    Standard,
    Plus,
}

impl AccessTier {
    pub fn label(self) -> &'static str {
        match self {
            AccessTier::Free => "free",
            AccessTier::Standard => "standard",
            AccessTier::Plus => "plus",
        }
    }
}

impl fmt::Display for AccessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "monthly" => Some(BillingCycle::Monthly),
            "yearly" => Some(BillingCycle::Yearly),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        }
    }
}

/// Axis along which catalog items, feature flags, and selections are scoped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Chat,
    Image,
    Audio,
    Video,
}

impl ContentType {
    pub const ALL: [ContentType; 4] = [
        ContentType::Chat,
        ContentType::Image,
        ContentType::Audio,
        ContentType::Video,
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == token)
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentType::Chat => "chat",
            ContentType::Image => "image",
            ContentType::Audio => "audio",
            ContentType::Video => "video",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(&s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown content type '{}' (chat, image, audio, video)", s))
    }
}

/// Structured entitlement decoded from a plan identifier. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPlan {
    pub tier: Tier,
    pub billing_cycle: Option<BillingCycle>,
    /// Unlocked content types. Always empty unless `tier` is composite.
    pub features: BTreeSet<ContentType>,
}

impl ParsedPlan {
    /// The most conservative entitlement; what any malformed identifier degrades to.
    pub fn free() -> Self {
        Self {
            tier: Tier::Free,
            billing_cycle: None,
            features: BTreeSet::new(),
        }
    }

    pub fn has_feature(&self, content_type: ContentType) -> bool {
        self.tier.is_composite() && self.features.contains(&content_type)
    }

    /// Canonical identifier for this plan, e.g. `custom_chat_video_monthly`.
    /// Decoding the label yields an equal plan.
    pub fn label(&self) -> String {
        let mut parts = vec![self.tier.label()];
        if self.tier.is_composite() {
            parts.extend(
                ContentType::ALL
                    .into_iter()
                    .filter(|c| self.features.contains(c))
                    .map(ContentType::label),
            );
        }
        if let Some(cycle) = self.billing_cycle {
            parts.push(cycle.label());
        }
        parts.join(SEPARATOR.to_string().as_str())
    }

    /// Whether `raw` denotes this same plan (tier, billing cycle, and features).
    pub fn is_same_plan(&self, raw: &str) -> bool {
        decode(raw) == *self
    }
}

impl Default for ParsedPlan {
    fn default() -> Self {
        Self::free()
    }
}
