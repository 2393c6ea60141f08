//! Representation migration for Strata
//!
//! When a version gate changes how a record is persisted, the owning feature
//! uses this crate to move replicas across safely:
//!
//! - MigrationState: per-unit `Legacy` / `Transitioning` / `Migrated` machine
//! - RepresentationStore: atomic batch commits over a key/value store
//! - RelocationProtocol: read fallback, gated switch-over, snapshot and split
//!   propagation, stale-write rejection
//! - TruncatedState: the raft truncated state relocation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod protocol;
pub mod state;
pub mod store;
pub mod truncated_state;

pub use error::{MigrationError, Result, TransitionError};
pub use protocol::{ApplyOutcome, Proposal, Relocatable, RelocationProtocol, Replica, SnapshotPayload};
pub use state::{MigrationState, Representation, Transition};
pub use store::{BatchOp, MemStore, RepresentationStore, StoreKey, UnitId, WriteBatch};
pub use truncated_state::{truncated_state_protocol, TruncatedState, TruncatedStateProtocol};
