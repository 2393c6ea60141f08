//! Error types for representation migration
//!
//! Stale writes are not errors: they are an expected race under concurrent
//! migration and surface as [`ApplyOutcome::Stale`](crate::ApplyOutcome).
//! Everything here is either a storage fault or a corruption signal.

use crate::state::{MigrationState, Transition};
use crate::store::UnitId;
use thiserror::Error;

/// Result type alias for migration operations
pub type Result<T> = std::result::Result<T, MigrationError>;

/// Rejected state machine input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// `transition` is not allowed from state `from`
    #[error("invalid migration transition {transition:?} from state {from}")]
    Invalid {
        /// State the transition was applied to
        from: MigrationState,
        /// The rejected input
        transition: Transition,
    },
}

/// Errors from the relocation protocol
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Underlying store failed
    ///
    /// Raised by [`RepresentationStore`](crate::RepresentationStore)
    /// implementations; see [`MigrationError::store`].
    #[error("representation store error: {source}")]
    Store {
        /// Backend error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Record could not be encoded or decoded
    #[error("record codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// Legacy and migrated keys are both present for one unit
    ///
    /// The switch-over step is atomic, so this can only mean corruption.
    #[error("corruption: unit {unit} holds both legacy and migrated representations")]
    BothRepresentations {
        /// Affected unit
        unit: UnitId,
    },

    /// A unit expected to exist has no record in either representation
    #[error("unit {unit} has no record in either representation")]
    MissingRecord {
        /// Affected unit
        unit: UnitId,
    },

    /// A split or snapshot targeted a unit that already holds a record
    #[error("unit {unit} already holds a record")]
    UnitExists {
        /// Affected unit
        unit: UnitId,
    },

    /// State machine rejected an input
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl MigrationError {
    /// Wrap a storage backend error
    pub fn store(source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        MigrationError::Store {
            source: source.into(),
        }
    }
}
