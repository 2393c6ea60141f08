//! Version Gate Tests
//!
//! Catalogue validation, registry lookups and gate activation as seen by a
//! feature that only holds the facade crate.

use crate::common::*;
use proptest::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

// ============================================================================
// Scenario catalogue
// ============================================================================

#[test]
fn gates_open_up_to_the_active_version() {
    init_tracing();
    let registry = scenario_registry();
    let active = ActiveVersion::new("1.0.0-1".parse().unwrap());

    assert!(registry.is_active(Key::A, &active));
    assert!(registry.is_active(Key::B, &active));
    assert!(!registry.is_active(Key::C, &active));
}

#[test]
fn by_key_returns_declared_versions() {
    let registry = scenario_registry();
    for entry in scenario_entries() {
        assert_eq!(registry.by_key(entry.key), entry.version);
    }
    assert_eq!(registry.try_by_key(Key::D), None);
}

#[test]
#[should_panic(expected = "unknown gate key D")]
fn by_key_outside_catalogue_is_fatal() {
    scenario_registry().by_key(Key::D);
}

#[test]
fn minimum_supported_never_exceeds_binary() {
    let registry = scenario_registry();
    assert_eq!(registry.minimum_supported_version(), Version::new(1, 0));
    assert_eq!(registry.binary_version(), Version::new(1, 1));
    assert!(registry.minimum_supported_version() <= registry.binary_version());

    let builtin = VersionRegistry::builtin().unwrap();
    assert!(builtin.minimum_supported_version() <= builtin.binary_version());
}

#[test]
fn duplicate_version_makes_catalogue_malformed() {
    let mut entries = scenario_entries();
    entries.push(CatalogueEntry::new(
        Key::D,
        Version::new(1, 0).with_unstable(1),
        "duplicates B",
    ));

    let err = VersionRegistry::from_entries(entries, RegistryConfig::new(Key::A)).unwrap_err();
    assert_eq!(
        err,
        RegistryError::Catalogue(CatalogueError::DuplicateVersion {
            key: "D",
            previous: "B",
            version: Version::new(1, 0).with_unstable(1),
        })
    );
    assert!(err.to_string().starts_with("malformed version catalogue"));
}

#[test]
fn inversion_makes_catalogue_malformed() {
    let entries = vec![
        CatalogueEntry::new(Key::A, Version::new(1, 0), "base"),
        CatalogueEntry::new(Key::B, Version::new(1, 1), "swapped"),
        CatalogueEntry::new(Key::C, Version::new(1, 0).with_unstable(1), "swapped"),
    ];
    let err = Catalogue::validate(entries).unwrap_err();
    assert!(matches!(err, CatalogueError::VersionOutOfOrder { key: "C", .. }));
}

#[test]
fn gates_crossed_by_an_upgrade() {
    let registry = scenario_registry();
    let crossed: Vec<Key> = registry
        .catalogue()
        .gates_between(Version::new(1, 0), Version::new(1, 1))
        .map(|e| e.key)
        .collect();
    assert_eq!(crossed, vec![Key::B, Key::C]);
}

// ============================================================================
// Gate handles
// ============================================================================

#[test]
fn gate_is_closed_until_a_version_is_published() {
    let registry = scenario_registry();
    let active = Arc::new(ActiveVersion::unset());
    let gate = registry.gate(Key::A, Arc::clone(&active));

    assert!(!gate.is_active());
    registry.advance(&active, Version::new(1, 0)).unwrap();
    assert!(gate.is_active());
}

#[test]
fn advance_refuses_to_regress() {
    let registry = scenario_registry();
    let active = ActiveVersion::new(Version::new(1, 1));
    let err = registry.advance(&active, Version::new(1, 0)).unwrap_err();
    assert_eq!(
        err,
        ActiveVersionError::Regression {
            current: Version::new(1, 1),
            proposed: Version::new(1, 0),
        }
    );
    assert_eq!(active.current(), Some(Version::new(1, 1)));
}

#[test]
fn readers_never_see_a_gate_close() {
    let registry = scenario_registry();
    let active = Arc::new(ActiveVersion::new(Version::new(1, 0)));
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = [Key::A, Key::B, Key::C]
        .into_iter()
        .map(|key| {
            let gate = registry.gate(key, Arc::clone(&active));
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut seen_open = false;
                while !done.load(Ordering::Acquire) {
                    let open = gate.is_active();
                    assert!(open || !seen_open, "gate {:?} closed again", key);
                    seen_open |= open;
                }
            })
        })
        .collect();

    for entry in scenario_entries() {
        registry.advance(&active, entry.version).unwrap();
    }
    done.store(true, Ordering::Release);
    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn builtin_truncated_state_gate() {
    let registry = VersionRegistry::builtin().unwrap();
    let threshold = registry.by_key(VersionKey::VersionUnreplicatedRaftTruncatedState);
    assert!(threshold > registry.minimum_supported_version());
    assert!(threshold <= registry.binary_version());
}

#[test]
fn version_serialises_as_text() {
    let version = Version::new(2, 1).with_unstable(7);
    assert_eq!(serde_json::to_string(&version).unwrap(), "\"2.1-7\"");
    let back: Version = serde_json::from_str("\"2.1-7\"").unwrap();
    assert_eq!(back, version);
    assert!(serde_json::from_str::<Version>("\"2.x\"").is_err());
}

proptest! {
    #[test]
    fn gate_activation_is_monotone(
        mut updates in prop::collection::vec((0u32..3, 0u32..3, 0u32..4), 1..20),
    ) {
        updates.sort();
        let registry = scenario_registry();
        let active = Arc::new(ActiveVersion::unset());
        let gates: Vec<_> = [Key::A, Key::B, Key::C]
            .into_iter()
            .map(|k| registry.gate(k, Arc::clone(&active)))
            .collect();
        let mut opened = [false; 3];

        for (major, minor, unstable) in updates {
            active
                .publish(Version::new(major, minor).with_unstable(unstable))
                .unwrap();
            for (i, gate) in gates.iter().enumerate() {
                let open = gate.is_active();
                prop_assert!(open || !opened[i]);
                opened[i] = open;
            }
        }
    }
}
