//! Plan identifier decoding. Total: every input yields a plan, never an error.

use std::collections::BTreeSet;

use super::{BillingCycle, ContentType, ParsedPlan, Tier};

/// Token separator in plan identifiers.
pub const SEPARATOR: char = '_';

/// Marker granting every content type on a composite plan.
const UNLIMITED: &str = "unlimited";

/// Decode a raw plan identifier.
///
/// Layout: `<tier>[_<feature>...][_<cycle>]`. Tokens are trimmed and compared
/// case-insensitively; empty tokens are dropped. An unknown tier degrades to `free`.
/// Features are only read for composite tiers (`custom`, `pro`); an `unlimited`
/// marker, or all four content types present together, unlocks every content type.
pub fn decode(raw: &str) -> ParsedPlan {
    let tokens = tokenize(raw);

    let Some(first) = tokens.first() else {
        log::debug!("Empty plan identifier, using free tier");
        return ParsedPlan::free();
    };
    let Some(tier) = Tier::from_token(first) else {
        log::warn!(
            "Unrecognized plan tier '{}' in '{}', falling back to free",
            first,
            raw
        );
        return ParsedPlan::free();
    };

    let mut rest = &tokens[1..];
    let mut billing_cycle = None;
    if tier != Tier::Free
        && let Some((last, init)) = rest.split_last()
        && let Some(cycle) = BillingCycle::from_token(last)
    {
        billing_cycle = Some(cycle);
        rest = init;
    }

    if !tier.is_composite() {
        if !rest.is_empty() {
            log::debug!(
                "Ignoring feature tokens {:?} on non-composite plan '{}'",
                rest,
                raw
            );
        }
        return ParsedPlan {
            tier,
            billing_cycle,
            features: BTreeSet::new(),
        };
    }

    let features = if denotes_all_content_types(&tokens) {
        ContentType::ALL.into_iter().collect()
    } else {
        rest.iter()
            .filter_map(|token| {
                let content_type = ContentType::from_token(token);
                if content_type.is_none() {
                    log::debug!("Ignoring unknown feature token '{}' in '{}'", token, raw);
                }
                content_type
            })
            .collect()
    };

    ParsedPlan {
        tier,
        billing_cycle,
        features,
    }
}

fn tokenize(raw: &str) -> Vec<String> {
    raw.split(SEPARATOR)
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Compatibility shortcut: `unlimited`, or the full enumeration of content types.
fn denotes_all_content_types(tokens: &[String]) -> bool {
    tokens.iter().any(|t| t == UNLIMITED)
        || ContentType::ALL
            .into_iter()
            .all(|c| tokens.iter().any(|t| t == c.label()))
}
