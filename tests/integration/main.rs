//! Integration Tests
//!
//! Cross-crate tests through the facade:
//! - Version gates: catalogue validation, lookups, gate activation
//! - Startup: store markers and the minimum-version floor
//! - Migration: multi-member relocation under a changing gate

#[path = "../common/mod.rs"]
mod common;

mod migration;
mod startup;
mod version_gates;
