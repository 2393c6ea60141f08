//! Shared test utilities for the integration suites.
//!
//! Import via `mod common;` from a test's main.rs.

#![allow(dead_code)]

use std::sync::{Arc, Once};

pub use stratagate::*;
use tempfile::TempDir;

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness writer.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Scenario catalogue
// ============================================================================

/// Gate keys of the small scenario catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    A,
    B,
    C,
    D,
}

impl GateKey for Key {
    fn name(&self) -> &'static str {
        match self {
            Key::A => "A",
            Key::B => "B",
            Key::C => "C",
            Key::D => "D",
        }
    }
}

/// `[(A, 1.0), (B, 1.0.0-1), (C, 1.1)]`
pub fn scenario_entries() -> Vec<CatalogueEntry<Key>> {
    vec![
        CatalogueEntry::new(Key::A, Version::new(1, 0), "base"),
        CatalogueEntry::new(Key::B, Version::new(1, 0).with_unstable(1), "first increment"),
        CatalogueEntry::new(Key::C, Version::new(1, 1), "next release"),
    ]
}

/// Registry over the scenario catalogue with minimum supported A.
pub fn scenario_registry() -> VersionRegistry<Key> {
    VersionRegistry::from_entries(scenario_entries(), RegistryConfig::new(Key::A))
        .expect("scenario catalogue is valid")
}

// ============================================================================
// TestStore - store directory wrapper
// ============================================================================

/// Temporary store directory with a marker handle.
pub struct TestStore {
    pub dir: TempDir,
}

impl TestStore {
    /// Empty store directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        TestStore { dir }
    }

    /// Store directory whose marker records `version`.
    pub fn at(version: Version) -> Self {
        let store = Self::new();
        store
            .marker()
            .write(version)
            .expect("Failed to write marker");
        store
    }

    pub fn marker(&self) -> StoreVersionMarker {
        StoreVersionMarker::new(self.dir.path(), DEFAULT_MARKER_FILE)
    }

    pub fn recorded(&self) -> Option<Version> {
        self.marker().read().expect("Failed to read marker")
    }
}

// ============================================================================
// Migration fixtures
// ============================================================================

/// A relocated record whose boundary is its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Watermark {
    pub index: u64,
}

impl Relocatable for Watermark {
    type Boundary = u64;

    fn boundary(&self) -> u64 {
        self.index
    }
}

pub fn watermark(index: u64) -> Watermark {
    Watermark { index }
}

/// One member of a replicated unit: its own store and protocol instance.
pub struct Member {
    pub store: Arc<MemStore>,
    pub protocol: RelocationProtocol<Key, Watermark>,
}

impl Member {
    /// Member whose protocol is gated on `Key::C`.
    pub fn new(registry: &VersionRegistry<Key>, active: Arc<ActiveVersion>) -> Self {
        let store = Arc::new(MemStore::new());
        let protocol = RelocationProtocol::new(registry.gate(Key::C, active), store.clone());
        Member { store, protocol }
    }

    pub fn keys(&self, unit: UnitId) -> Vec<StoreKey> {
        self.store.keys_of(unit)
    }
}
