//! Raft truncated state relocation
//!
//! The truncated state records how far a range's raft log has been
//! truncated. It used to be a replicated key; once
//! [`VersionKey::VersionUnreplicatedRaftTruncatedState`] is active it moves
//! to an unreplicated key. The truncation index only grows, so a truncation
//! that would lower it is dropped.

use crate::protocol::{Relocatable, RelocationProtocol};
use crate::store::RepresentationStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strata_cluster::{ActiveVersion, VersionKey, VersionRegistry};

/// Highest truncated raft log position of a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TruncatedState {
    /// Index of the last truncated entry
    pub index: u64,
    /// Term of the last truncated entry
    pub term: u64,
}

impl TruncatedState {
    /// Create a truncated state
    pub fn new(index: u64, term: u64) -> Self {
        TruncatedState { index, term }
    }
}

impl Relocatable for TruncatedState {
    type Boundary = u64;

    fn boundary(&self) -> u64 {
        self.index
    }
}

/// Relocation protocol for the truncated state
pub type TruncatedStateProtocol = RelocationProtocol<VersionKey, TruncatedState>;

/// Build the truncated state protocol from the built-in registry
pub fn truncated_state_protocol(
    registry: &VersionRegistry<VersionKey>,
    active: Arc<ActiveVersion>,
    store: Arc<dyn RepresentationStore>,
) -> TruncatedStateProtocol {
    RelocationProtocol::new(
        registry.gate(VersionKey::VersionUnreplicatedRaftTruncatedState, active),
        store,
    )
}
