//! Startup Tests
//!
//! The store version marker and the minimum-version floor check.

use crate::common::*;

#[test]
fn store_at_minimum_passes() {
    init_tracing();
    let registry = scenario_registry();
    let store = TestStore::at(Version::new(1, 0));

    let active = open_store(store.dir.path(), &registry, &StoreConfig::existing_only()).unwrap();
    assert_eq!(active.current(), Some(Version::new(1, 0)));
    assert!(registry.is_active(Key::A, &active));
    assert!(!registry.is_active(Key::B, &active));
}

#[test]
fn store_below_minimum_is_refused() {
    let registry = scenario_registry();
    let store = TestStore::at(Version::new(0, 9));

    let err = open_store(store.dir.path(), &registry, &StoreConfig::default()).unwrap_err();
    match &err {
        StartupError::Unsupported { source, .. } => assert_eq!(
            *source,
            StoreVersionError::StoreBelowMinimumVersion {
                store: Version::new(0, 9),
                minimum: Version::new(1, 0),
            }
        ),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("wipe the store"));
    assert_eq!(store.recorded(), Some(Version::new(0, 9)));
}

#[test]
fn validate_store_version_directly() {
    let registry = scenario_registry();
    assert!(registry.validate_store_version(Version::new(1, 0)).is_ok());
    assert!(registry
        .validate_store_version(Version::new(1, 0).with_unstable(1))
        .is_ok());
    assert!(matches!(
        registry.validate_store_version(Version::new(0, 9)),
        Err(StoreVersionError::StoreBelowMinimumVersion { .. })
    ));
    assert!(matches!(
        registry.validate_store_version(Version::new(1, 2)),
        Err(StoreVersionError::StoreAboveBinaryVersion { .. })
    ));
}

#[test]
fn fresh_store_is_stamped_with_binary_version() {
    let registry = scenario_registry();
    let store = TestStore::new();

    let active = open_store(store.dir.path(), &registry, &StoreConfig::default()).unwrap();
    assert_eq!(active.current(), Some(Version::new(1, 1)));
    assert_eq!(store.recorded(), Some(Version::new(1, 1)));
}

#[test]
fn corrupt_marker_is_refused() {
    let registry = scenario_registry();
    let store = TestStore::new();
    std::fs::write(store.marker().path(), "1.0-x\n").unwrap();

    let err = open_store(store.dir.path(), &registry, &StoreConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        StartupError::InvalidMarker {
            source: VersionParseError::InvalidComponent { .. },
            ..
        }
    ));
}

#[test]
fn rolling_upgrade_bumps_the_marker() {
    let registry = scenario_registry();
    let store = TestStore::at(Version::new(1, 0));
    let config = StoreConfig::default();

    let previous = bump_store_version(
        store.dir.path(),
        &registry,
        &config,
        Version::new(1, 0).with_unstable(1),
    )
    .unwrap();
    assert_eq!(previous, Version::new(1, 0));

    let active = open_store(store.dir.path(), &registry, &config).unwrap();
    assert!(registry.is_active(Key::B, &active));
    assert!(!registry.is_active(Key::C, &active));

    // Reopening after a restart sees the same value.
    assert_eq!(store.recorded(), Some(Version::new(1, 0).with_unstable(1)));
}
