//! Per-unit migration state machine
//!
//! Every replicated unit (for example one range of the keyspace) holds its
//! migrating record in exactly one representation at a time. The state
//! machine tracks which one, and whether a switch-over is in flight.
//!
//! ## States
//!
//! - `Legacy`: the legacy representation is persisted
//! - `Transitioning`: legacy is persisted and this replica has proposed a
//!   switch-over that has not been applied yet
//! - `Migrated`: the new representation is persisted
//!
//! ## Valid Transitions
//!
//! ```text
//! Legacy        --BeginSwitchOver-->        Transitioning
//! Legacy        --CompleteSwitchOver-->     Migrated       (proposed elsewhere)
//! Transitioning --CompleteSwitchOver-->     Migrated
//! Transitioning --AbandonSwitchOver-->      Legacy
//! Migrated      --BeginSwitchOver-->        Migrated       (already converged)
//! Migrated      --CompleteSwitchOver-->     Migrated       (already converged)
//! any           --InstallSnapshot(r)-->     state of r
//! ```
//!
//! Anything else is invalid. A snapshot supersedes a switch-over this
//! replica proposed but never applied. Nothing moves a unit from `Migrated`
//! back to `Legacy` except a snapshot that carries the legacy
//! representation.

use crate::error::TransitionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Persisted representation of a migrating record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Representation {
    /// Representation written before the gate
    Legacy,
    /// Representation written once the gate is active
    Migrated,
}

impl Representation {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Representation::Legacy => "legacy",
            Representation::Migrated => "migrated",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Migration state of one replicated unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MigrationState {
    /// Legacy representation persisted
    Legacy,
    /// Legacy persisted, switch-over proposed but not applied
    Transitioning,
    /// New representation persisted
    Migrated,
}

/// Inputs to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A write evaluated with the gate active proposes the switch-over
    BeginSwitchOver,
    /// The atomic delete-legacy/write-new batch was committed
    CompleteSwitchOver,
    /// The proposed switch-over was dropped before it committed
    AbandonSwitchOver,
    /// A snapshot carrying the given representation was installed
    InstallSnapshot(Representation),
}

impl MigrationState {
    /// Initial state for a unit whose persisted form is `representation`
    pub fn from_representation(representation: Representation) -> Self {
        match representation {
            Representation::Legacy => MigrationState::Legacy,
            Representation::Migrated => MigrationState::Migrated,
        }
    }

    /// The representation currently persisted
    ///
    /// A `Transitioning` unit has not committed its switch-over, so it is
    /// still legacy on disk.
    pub fn persisted(&self) -> Representation {
        match self {
            MigrationState::Legacy | MigrationState::Transitioning => Representation::Legacy,
            MigrationState::Migrated => Representation::Migrated,
        }
    }

    /// Check if the new representation is persisted
    pub fn is_migrated(&self) -> bool {
        matches!(self, MigrationState::Migrated)
    }

    /// Check if a switch-over is in flight
    pub fn is_transitioning(&self) -> bool {
        matches!(self, MigrationState::Transitioning)
    }

    /// Check if `transition` is valid from this state
    pub fn can_apply(&self, transition: Transition) -> bool {
        self.next(transition).is_some()
    }

    /// Apply `transition`, returning the next state
    pub fn apply(self, transition: Transition) -> Result<MigrationState, TransitionError> {
        self.next(transition)
            .ok_or(TransitionError::Invalid {
                from: self,
                transition,
            })
    }

    fn next(&self, transition: Transition) -> Option<MigrationState> {
        use MigrationState::*;
        use Transition::*;

        match (self, transition) {
            (Legacy, BeginSwitchOver) => Some(Transitioning),
            (Legacy, CompleteSwitchOver) => Some(Migrated),
            (Transitioning, CompleteSwitchOver) => Some(Migrated),
            (Transitioning, AbandonSwitchOver) => Some(Legacy),
            (Migrated, BeginSwitchOver) => Some(Migrated),
            (Migrated, CompleteSwitchOver) => Some(Migrated),
            (_, InstallSnapshot(r)) => Some(MigrationState::from_representation(r)),
            _ => None,
        }
    }

    /// State of a unit split off from this one
    ///
    /// The child inherits the parent's persisted representation, never the
    /// gate's current value, so siblings start out identical.
    pub fn derive_child(&self) -> MigrationState {
        MigrationState::from_representation(self.persisted())
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationState::Legacy => "Legacy",
            MigrationState::Transitioning => "Transitioning",
            MigrationState::Migrated => "Migrated",
        }
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
