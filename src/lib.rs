//! # Plan Gate - plan entitlements and model selection policy
//!
//! Decodes a subscriber's plan identifier, decides which catalog models the plan may
//! use per content type, caps concurrent selections, and runs the edit/commit
//! workflow for building a selection.
//!
//! ## Layout
//! - `core::plan`: plan identifier decoding and caching
//! - `core::entitlement`: effective access tier per content type
//! - `core::limits`: selection caps and toggle evaluation
//! - `core::selection`: the stateful selection session and its store
//! - `core::catalog`: catalog snapshot, built-in catalog, favorites

pub mod core;
