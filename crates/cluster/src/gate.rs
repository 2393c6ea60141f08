//! Gate query contract
//!
//! A gate is open once the cluster active version has reached the gate
//! key's version: `active >= threshold`. Queries are a single atomic load
//! and a comparison, safe on per-operation fast paths.
//!
//! When the active version is unknown (coordinator not yet initialised) the
//! gate reads as closed, so a node falls back to the oldest behaviour.
//!
//! Because the coordinator only ever advances the active version, a gate
//! that has opened never closes again for the lifetime of the process.

use crate::active::ActiveVersion;
use crate::key::GateKey;
use std::sync::Arc;
use strata_core::Version;

/// Evaluate a gate against an optional active version
#[inline]
pub fn gate_open(active: Option<Version>, threshold: Version) -> bool {
    matches!(active, Some(v) if v >= threshold)
}

/// A pre-resolved gate handle
///
/// Holds the gate's threshold version (looked up once, at construction) and
/// a reference to the published active version. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Gate<K> {
    key: K,
    threshold: Version,
    active: Arc<ActiveVersion>,
}

impl<K: GateKey> Gate<K> {
    pub(crate) fn new(key: K, threshold: Version, active: Arc<ActiveVersion>) -> Self {
        Gate {
            key,
            threshold,
            active,
        }
    }

    /// Gate key
    pub fn key(&self) -> K {
        self.key
    }

    /// Version at which the gate opens
    pub fn threshold(&self) -> Version {
        self.threshold
    }

    /// The active version holder this gate reads
    pub fn active_version(&self) -> &Arc<ActiveVersion> {
        &self.active
    }

    /// Is the gate open for the cluster right now?
    #[inline]
    pub fn is_active(&self) -> bool {
        gate_open(self.active.current(), self.threshold)
    }
}
