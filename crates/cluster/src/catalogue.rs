//! Version catalogue and validator
//!
//! The catalogue is the ordered list of `(gate key, version)` pairs covering
//! the full history of the product. It is fixed at build time and validated
//! exactly once, when the process starts.
//!
//! ## Invariants
//!
//! Checked by [`Catalogue::validate`], fatal if violated:
//!
//! | # | Invariant |
//! |---|-----------|
//! | 1 | Versions strictly increase down the table |
//! | 2 | No two entries share a version |
//! | 3 | No two entries share a key |
//! | 4 | Keys appear in declaration order |
//! | 5 | No gate is attached to a patch release |
//!
//! The first entry is the floor: the oldest format the binary understands.
//!
//! Versions seen by a cluster must be monotonic. Once a release version has
//! been added, an unstable increment of an older series cannot be slotted in
//! before it, because clusters already past the release would never migrate
//! through it. Do not add a new release entry until no further migrations
//! are expected for the series being closed.

use crate::error::CatalogueError;
use crate::key::GateKey;
use rustc_hash::{FxHashMap, FxHashSet};
use strata_core::Version;
use tracing::error;

/// One row of the catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogueEntry<K> {
    /// Gate key
    pub key: K,
    /// Version at which the gate becomes active
    pub version: Version,
    /// What the gate enables
    pub description: &'static str,
}

impl<K: GateKey> CatalogueEntry<K> {
    /// Create an entry
    pub const fn new(key: K, version: Version, description: &'static str) -> Self {
        CatalogueEntry {
            key,
            version,
            description,
        }
    }
}

/// A validated, immutable catalogue
#[derive(Debug, Clone)]
pub struct Catalogue<K> {
    entries: Vec<CatalogueEntry<K>>,
}

impl<K: GateKey> Catalogue<K> {
    /// Validate entries in declaration order
    ///
    /// Walks the entries once, tracking the keys and versions seen so far
    /// and the previous entry. Duplicates are reported before ordering
    /// violations.
    pub fn validate(
        entries: impl IntoIterator<Item = CatalogueEntry<K>>,
    ) -> Result<Self, CatalogueError> {
        let entries: Vec<_> = entries.into_iter().collect();
        match check_entries(&entries) {
            Ok(()) => Ok(Catalogue { entries }),
            Err(e) => {
                error!(target: "strata::versions", error = %e, "Rejected version catalogue");
                Err(e)
            }
        }
    }

    /// Validate a `'static` table
    pub fn from_static(entries: &'static [CatalogueEntry<K>]) -> Result<Self, CatalogueError> {
        Self::validate(entries.iter().copied())
    }

    /// The oldest entry (the binary's version floor)
    pub fn floor(&self) -> &CatalogueEntry<K> {
        // Non-empty after validation
        &self.entries[0]
    }

    /// The newest entry (the binary's own version)
    pub fn newest(&self) -> &CatalogueEntry<K> {
        &self.entries[self.entries.len() - 1]
    }

    /// Look up an entry by key
    pub fn get(&self, key: K) -> Option<&CatalogueEntry<K>> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[CatalogueEntry<K>] {
        &self.entries
    }

    /// Iterate entries, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &CatalogueEntry<K>> {
        self.entries.iter()
    }

    /// Number of live gates
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a validated catalogue
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries crossed by an upgrade from `from` (exclusive) to `to` (inclusive)
    pub fn gates_between(
        &self,
        from: Version,
        to: Version,
    ) -> impl Iterator<Item = &CatalogueEntry<K>> {
        self.entries
            .iter()
            .filter(move |e| e.version > from && e.version <= to)
    }
}

fn check_entries<K: GateKey>(entries: &[CatalogueEntry<K>]) -> Result<(), CatalogueError> {
    if entries.is_empty() {
        return Err(CatalogueError::Empty);
    }

    let mut keys: FxHashSet<K> = FxHashSet::default();
    let mut versions: FxHashMap<Version, K> = FxHashMap::default();
    let mut previous: Option<&CatalogueEntry<K>> = None;

    for (position, entry) in entries.iter().enumerate() {
        if !keys.insert(entry.key) {
            return Err(CatalogueError::DuplicateKey {
                key: entry.key.name(),
                position,
            });
        }

        if let Some(first) = versions.insert(entry.version, entry.key) {
            return Err(CatalogueError::DuplicateVersion {
                key: entry.key.name(),
                previous: first.name(),
                version: entry.version,
            });
        }

        if entry.version.is_patch_release() {
            return Err(CatalogueError::PatchReleaseGate {
                key: entry.key.name(),
                version: entry.version,
            });
        }

        if let Some(prev) = previous {
            if entry.key <= prev.key {
                return Err(CatalogueError::KeyOutOfOrder {
                    key: entry.key.name(),
                    previous: prev.key.name(),
                });
            }
            if entry.version <= prev.version {
                return Err(CatalogueError::VersionOutOfOrder {
                    key: entry.key.name(),
                    version: entry.version,
                    previous: prev.key.name(),
                    previous_version: prev.version,
                });
            }
        }

        previous = Some(entry);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    enum Key {
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

    fn entry(key: Key, version: &str) -> CatalogueEntry<Key> {
        CatalogueEntry::new(key, version.parse().unwrap(), "test")
    }

    fn abc() -> Vec<CatalogueEntry<Key>> {
        vec![
            entry(Key::A, "1.0"),
            entry(Key::B, "1.0.0-1"),
            entry(Key::C, "1.1"),
        ]
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        let catalogue = Catalogue::validate(abc()).unwrap();
        assert_eq!(catalogue.len(), 3);
        assert_eq!(catalogue.floor().key, Key::A);
        assert_eq!(catalogue.newest().key, Key::C);
        assert_eq!(
            catalogue.get(Key::B).map(|e| e.version),
            Some(Version::new(1, 0).with_unstable(1))
        );
        assert!(catalogue.get(Key::D).is_none());
    }

    #[test]
    fn test_validate_rejects_empty() {
        let err = Catalogue::<Key>::validate(Vec::new()).unwrap_err();
        assert_eq!(err, CatalogueError::Empty);
    }

    #[test]
    fn test_validate_rejects_duplicate_version() {
        let mut entries = abc();
        entries.push(entry(Key::D, "1.0.0-1"));
        let err = Catalogue::validate(entries).unwrap_err();
        assert_eq!(
            err,
            CatalogueError::DuplicateVersion {
                key: "D",
                previous: "B",
                version: Version::new(1, 0).with_unstable(1),
            }
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_key() {
        let mut entries = abc();
        entries.push(entry(Key::C, "1.1-1"));
        let err = Catalogue::validate(entries).unwrap_err();
        assert_eq!(
            err,
            CatalogueError::DuplicateKey {
                key: "C",
                position: 3
            }
        );
    }

    #[test]
    fn test_validate_rejects_version_inversion() {
        let entries = vec![
            entry(Key::A, "1.0"),
            entry(Key::B, "1.1"),
            entry(Key::C, "1.0-4"),
        ];
        let err = Catalogue::validate(entries).unwrap_err();
        assert!(matches!(
            err,
            CatalogueError::VersionOutOfOrder { key: "C", previous: "B", .. }
        ));
    }

    #[test]
    fn test_validate_rejects_key_out_of_declaration_order() {
        let entries = vec![
            entry(Key::A, "1.0"),
            entry(Key::C, "1.0-1"),
            entry(Key::B, "1.1"),
        ];
        let err = Catalogue::validate(entries).unwrap_err();
        assert_eq!(
            err,
            CatalogueError::KeyOutOfOrder {
                key: "B",
                previous: "C"
            }
        );
    }

    #[test]
    fn test_validate_rejects_patch_release_gate() {
        let entries = vec![entry(Key::A, "1.0"), entry(Key::B, "1.0.1")];
        let err = Catalogue::validate(entries).unwrap_err();
        assert!(matches!(err, CatalogueError::PatchReleaseGate { key: "B", .. }));
    }

    #[test]
    fn test_gates_between() {
        let catalogue = Catalogue::validate(abc()).unwrap();
        let crossed: Vec<_> = catalogue
            .gates_between(Version::new(1, 0), Version::new(1, 1))
            .map(|e| e.key)
            .collect();
        assert_eq!(crossed, vec![Key::B, Key::C]);

        let none: Vec<_> = catalogue
            .gates_between(Version::new(1, 1), Version::new(1, 1))
            .collect();
        assert!(none.is_empty());
    }

    const ALL_KEYS: [Key; 4] = [Key::A, Key::B, Key::C, Key::D];

    fn versions_strategy() -> impl Strategy<Value = Vec<Version>> {
        prop::collection::vec((0u32..3, 0u32..3, 0u32..4), 1..=4).prop_map(|parts| {
            parts
                .into_iter()
                .map(|(major, minor, unstable)| Version::from_parts(major, minor, 0, unstable))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_validator_accepts_iff_strictly_increasing(versions in versions_strategy()) {
            let entries: Vec<_> = versions
                .iter()
                .zip(ALL_KEYS)
                .map(|(v, k)| CatalogueEntry::new(k, *v, "prop"))
                .collect();
            let strictly_increasing = versions.windows(2).all(|w| w[0] < w[1]);
            prop_assert_eq!(Catalogue::validate(entries).is_ok(), strictly_increasing);
        }

        #[test]
        fn prop_swapping_adjacent_entries_is_rejected(
            versions in versions_strategy(),
            idx in 0usize..3,
        ) {
            let mut sorted = versions.clone();
            sorted.sort();
            sorted.dedup();
            prop_assume!(sorted.len() >= 2);
            let idx = idx % (sorted.len() - 1);
            let mut entries: Vec<_> = sorted
                .iter()
                .zip(ALL_KEYS)
                .map(|(v, k)| CatalogueEntry::new(k, *v, "prop"))
                .collect();
            prop_assert!(Catalogue::validate(entries.clone()).is_ok());
            entries.swap(idx, idx + 1);
            prop_assert!(Catalogue::validate(entries).is_err());
        }
    }
}
