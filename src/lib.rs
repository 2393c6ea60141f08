//! Stratagate - cluster version gates for Strata
//!
//! Lets a Strata cluster run mixed binaries during a rolling upgrade and
//! switch on new behaviour (and new on-disk formats) only once every node
//! can handle it.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use stratagate::{ActiveVersion, VersionKey, VersionRegistry};
//!
//! let registry = VersionRegistry::builtin()?;
//! let active = Arc::new(ActiveVersion::new(registry.minimum_supported_version()));
//!
//! let gate = registry.gate(VersionKey::VersionCreateStats, Arc::clone(&active));
//! assert!(!gate.is_active());
//!
//! registry.advance(&active, registry.binary_version())?;
//! assert!(gate.is_active());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! - `strata-core`: the [`Version`] triple
//! - `strata-cluster`: catalogue, registry, active version, gates, store startup
//! - `strata-migration`: the representation migration protocol

pub use strata_cluster::*;
pub use strata_core::{Version, VersionParseError};
pub use strata_migration::{
    truncated_state_protocol, ApplyOutcome, BatchOp, MemStore, MigrationError, MigrationState,
    Proposal, Relocatable, RelocationProtocol, Replica, Representation, RepresentationStore,
    SnapshotPayload, StoreKey, Transition, TransitionError, TruncatedState,
    TruncatedStateProtocol, UnitId, WriteBatch,
};
