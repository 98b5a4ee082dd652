//! Memoized plan decoding for the life of a signed-in session.

use super::{ParsedPlan, decode};

/// Single-entry decode cache keyed by the raw plan identifier.
///
/// A different raw string (upgrade, downgrade, sign-in as someone else) replaces the
/// entry immediately, so a stale decode is never served.
#[derive(Debug, Default)]
pub struct PlanCache {
    entry: Option<(String, ParsedPlan)>,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoded plan for `raw`, decoding only when `raw` differs from the cached key.
    pub fn get(&mut self, raw: &str) -> &ParsedPlan {
        if self.entry.as_ref().is_none_or(|(key, _)| key != raw) {
            log::debug!("Decoding plan identifier '{}'", raw);
            self.entry = None;
        }
        let (_, plan) = self
            .entry
            .get_or_insert_with(|| (raw.to_string(), decode(raw)));
        plan
    }

    /// Raw identifier currently cached, if any.
    pub fn cached_key(&self) -> Option<&str> {
        self.entry.as_ref().map(|(key, _)| key.as_str())
    }

    /// Drop the cached entry (sign-out).
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
