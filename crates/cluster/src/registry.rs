//! Version registry
//!
//! The registry is built once at process start from the validated catalogue
//! and is read-only afterwards. It is shared by `Arc` and handed to every
//! component that needs gating; there is no process-global instance.
//!
//! ## Operations
//!
//! - `by_key`: exact lookup. Unknown keys are a programming defect and panic.
//! - `minimum_supported_version`: oldest store format this binary attaches to.
//! - `binary_version`: newest catalogue entry, the version a fresh cluster
//!   starts at.
//! - `is_active` / `gate`: the gate query contract.

use crate::active::ActiveVersion;
use crate::builtin::{VersionKey, BUILTIN_CATALOGUE};
use crate::catalogue::{Catalogue, CatalogueEntry};
use crate::config::RegistryConfig;
use crate::error::{ActiveVersionError, RegistryError, StoreVersionError};
use crate::gate::{gate_open, Gate};
use crate::key::GateKey;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use strata_core::Version;
use tracing::info;

/// Validated, immutable version registry
#[derive(Debug, Clone)]
pub struct VersionRegistry<K> {
    catalogue: Catalogue<K>,
    index: FxHashMap<K, Version>,
    minimum_supported: Version,
    binary_version: Version,
}

impl<K: GateKey> VersionRegistry<K> {
    /// Build a registry from a validated catalogue
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownMinimumKey`] if the configured minimum
    /// supported key is not a catalogue entry.
    pub fn new(catalogue: Catalogue<K>, config: RegistryConfig<K>) -> Result<Self, RegistryError> {
        let index: FxHashMap<K, Version> =
            catalogue.iter().map(|e| (e.key, e.version)).collect();

        let minimum_supported = *index.get(&config.minimum_supported).ok_or(
            RegistryError::UnknownMinimumKey {
                key: config.minimum_supported.name(),
            },
        )?;
        let binary_version = catalogue.newest().version;

        info!(
            target: "strata::versions",
            binary = %binary_version,
            minimum_supported = %minimum_supported,
            gates = catalogue.len(),
            "Version registry initialised"
        );

        Ok(VersionRegistry {
            catalogue,
            index,
            minimum_supported,
            binary_version,
        })
    }

    /// Validate `entries` and build a registry from them
    pub fn from_entries(
        entries: impl IntoIterator<Item = CatalogueEntry<K>>,
        config: RegistryConfig<K>,
    ) -> Result<Self, RegistryError> {
        let catalogue = Catalogue::validate(entries)?;
        Self::new(catalogue, config)
    }

    /// Version for a gate key
    ///
    /// # Panics
    ///
    /// If `key` is not in the catalogue. Compiled-in call sites only use live
    /// keys, so this indicates a defect in the binary.
    #[track_caller]
    pub fn by_key(&self, key: K) -> Version {
        match self.index.get(&key) {
            Some(v) => *v,
            None => unknown_gate_key(key.name()),
        }
    }

    /// Version for a gate key, `None` if the key is not in the catalogue
    pub fn try_by_key(&self, key: K) -> Option<Version> {
        self.index.get(&key).copied()
    }

    /// Oldest store version this binary attaches to
    pub fn minimum_supported_version(&self) -> Version {
        self.minimum_supported
    }

    /// Version of this binary (newest catalogue entry)
    pub fn binary_version(&self) -> Version {
        self.binary_version
    }

    /// The validated catalogue
    pub fn catalogue(&self) -> &Catalogue<K> {
        &self.catalogue
    }

    /// Is `key`'s gate open under the given active version?
    ///
    /// Closed while `active` is unset.
    #[inline]
    #[track_caller]
    pub fn is_active(&self, key: K, active: &ActiveVersion) -> bool {
        gate_open(active.current(), self.by_key(key))
    }

    /// Build a pre-resolved gate handle for hot paths
    #[track_caller]
    pub fn gate(&self, key: K, active: Arc<ActiveVersion>) -> Gate<K> {
        Gate::new(key, self.by_key(key), active)
    }

    /// Check a store's recorded version against what this binary reads
    pub fn validate_store_version(&self, store: Version) -> Result<(), StoreVersionError> {
        if store < self.minimum_supported {
            return Err(StoreVersionError::StoreBelowMinimumVersion {
                store,
                minimum: self.minimum_supported,
            });
        }
        if store > self.binary_version {
            return Err(StoreVersionError::StoreAboveBinaryVersion {
                store,
                binary: self.binary_version,
            });
        }
        Ok(())
    }

    /// Check that `version` may become the cluster active version
    ///
    /// Acceptable versions lie in `[minimum_supported, binary_version]`.
    pub fn validate_active_version(&self, version: Version) -> Result<(), ActiveVersionError> {
        if version < self.minimum_supported {
            return Err(ActiveVersionError::BelowMinimum {
                proposed: version,
                minimum: self.minimum_supported,
            });
        }
        if version > self.binary_version {
            return Err(ActiveVersionError::AboveBinary {
                proposed: version,
                binary: self.binary_version,
            });
        }
        Ok(())
    }

    /// Validate `version` and publish it to `active`
    pub fn advance(
        &self,
        active: &ActiveVersion,
        version: Version,
    ) -> Result<Option<Version>, ActiveVersionError> {
        self.validate_active_version(version)?;
        active.publish(version)
    }
}

impl VersionRegistry<VersionKey> {
    /// Registry over the built-in catalogue with the default config
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(
            Catalogue::from_static(BUILTIN_CATALOGUE)?,
            RegistryConfig::default(),
        )
    }
}

#[cold]
#[inline(never)]
#[track_caller]
fn unknown_gate_key(name: &str) -> ! {
    panic!("unknown gate key {}: not present in the version catalogue", name)
}
