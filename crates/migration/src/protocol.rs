//! Gated relocation of a replicated record
//!
//! When crossing a gate changes where (or how) a record is persisted, the
//! replicas of a unit cannot all switch at the same instant. The protocol
//! keeps them consistent:
//!
//! - Readers try the migrated key first and fall back to the legacy key.
//! - A write proposed while the gate is active carries a switch-over flag;
//!   applying it deletes the legacy key and writes the migrated key in one
//!   batch.
//! - Snapshots carry the sender's representation and the receiver
//!   materialises exactly that one.
//! - A split child inherits its parent's representation.
//! - A write whose boundary is behind the stored record is dropped.
//!
//! Callers hold `&mut Replica` for the duration of a mutation; that is the
//! per-unit exclusion the protocol relies on.

use crate::error::{MigrationError, Result};
use crate::state::{MigrationState, Representation, Transition};
use crate::store::{RepresentationStore, StoreKey, UnitId, WriteBatch};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;
use strata_cluster::{Gate, GateKey};
use tracing::{debug, warn};

/// A record whose persisted representation changes at a gate
pub trait Relocatable: Serialize + DeserializeOwned + Clone + Debug + Send + Sync {
    /// Monotone high-water mark of the record
    type Boundary: Ord + Copy + Debug;

    /// Current boundary
    fn boundary(&self) -> Self::Boundary;
}

/// One replica of a unit, as seen by the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replica {
    unit: UnitId,
    state: MigrationState,
}

impl Replica {
    /// Replica with no local record yet
    ///
    /// Starts in `Legacy`; the first snapshot it installs decides its
    /// representation.
    pub fn new(unit: UnitId) -> Self {
        Replica {
            unit,
            state: MigrationState::Legacy,
        }
    }

    fn with_state(unit: UnitId, state: MigrationState) -> Self {
        Replica { unit, state }
    }

    /// Unit this replica belongs to
    pub fn unit(&self) -> UnitId {
        self.unit
    }

    /// Current migration state
    pub fn state(&self) -> MigrationState {
        self.state
    }
}

/// A write evaluated upstream, ready to be applied by every replica
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal<R> {
    /// New record
    pub record: R,
    /// Whether applying this write moves the unit to the migrated key
    pub switch_over: bool,
}

/// Result of applying a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome<B> {
    /// The write was persisted
    Applied {
        /// Representation the record is now stored in
        representation: Representation,
        /// Whether this write performed the switch-over
        switched_over: bool,
    },
    /// The write would have moved the boundary backwards and was dropped
    Stale {
        /// Boundary of the stored record
        current: B,
        /// Boundary of the rejected record
        proposed: B,
    },
}

impl<B> ApplyOutcome<B> {
    /// Check if the write was persisted
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }
}

/// Wholesale copy of a unit's record, tagged with its representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPayload<R> {
    /// Representation the sender had persisted
    pub representation: Representation,
    /// The record itself
    pub record: R,
}

impl<R: Relocatable> SnapshotPayload<R> {
    /// Encode for transfer
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a transferred payload
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Relocation protocol for records of type `R`, gated on key `K`
pub struct RelocationProtocol<K: GateKey, R> {
    gate: Gate<K>,
    store: Arc<dyn RepresentationStore>,
    _record: PhantomData<fn() -> R>,
}

impl<K: GateKey, R> Clone for RelocationProtocol<K, R> {
    fn clone(&self) -> Self {
        RelocationProtocol {
            gate: self.gate.clone(),
            store: Arc::clone(&self.store),
            _record: PhantomData,
        }
    }
}

impl<K: GateKey, R: Relocatable> RelocationProtocol<K, R> {
    /// Bind the protocol to `gate` over `store`
    pub fn new(gate: Gate<K>, store: Arc<dyn RepresentationStore>) -> Self {
        RelocationProtocol {
            gate,
            store,
            _record: PhantomData,
        }
    }

    /// Gate that controls the switch-over
    pub fn gate(&self) -> &Gate<K> {
        &self.gate
    }

    /// Create the first record of a brand new unit
    ///
    /// The representation follows the gate at creation time.
    pub fn bootstrap(&self, unit: UnitId, record: &R) -> Result<Replica> {
        self.ensure_absent(unit)?;
        let representation = if self.gate.is_active() {
            Representation::Migrated
        } else {
            Representation::Legacy
        };

        let mut batch = WriteBatch::new();
        batch.put(StoreKey::of(unit, representation), encode(record)?);
        self.store.commit(batch)?;

        debug!(target: "strata::migration", unit = %unit, %representation, "Bootstrapped unit");
        Ok(Replica::with_state(
            unit,
            MigrationState::from_representation(representation),
        ))
    }

    /// Read the record of `unit` and the representation it was found in
    ///
    /// Returns `Ok(None)` if the unit has no record.
    ///
    /// # Errors
    ///
    /// `BothRepresentations` if both keys are present.
    pub fn load(&self, unit: UnitId) -> Result<Option<(Representation, R)>> {
        let migrated = self.store.get(&StoreKey::migrated(unit))?;
        let legacy = self.store.get(&StoreKey::legacy(unit))?;

        match (migrated, legacy) {
            (Some(_), Some(_)) => Err(MigrationError::BothRepresentations { unit }),
            (Some(bytes), None) => Ok(Some((Representation::Migrated, decode(&bytes)?))),
            (None, Some(bytes)) => Ok(Some((Representation::Legacy, decode(&bytes)?))),
            (None, None) => Ok(None),
        }
    }

    /// Rebuild a replica from what the store holds
    ///
    /// An uncommitted switch-over does not survive a restart, so a
    /// recovered replica is never `Transitioning`.
    pub fn recover(&self, unit: UnitId) -> Result<Replica> {
        let (representation, _) = self.require(unit)?;
        Ok(Replica::with_state(
            unit,
            MigrationState::from_representation(representation),
        ))
    }

    /// Evaluate a write upstream
    ///
    /// A replica that is still on the legacy key and observes the gate
    /// active marks the proposal as a switch-over.
    pub fn propose(&self, replica: &mut Replica, record: R) -> Result<Proposal<R>> {
        let switch_over = !replica.state.is_migrated() && self.gate.is_active();
        if switch_over && replica.state == MigrationState::Legacy {
            replica.state = replica.state.apply(Transition::BeginSwitchOver)?;
            debug!(target: "strata::migration", unit = %replica.unit, "Proposed switch-over");
        }
        Ok(Proposal {
            record,
            switch_over,
        })
    }

    /// Apply a proposal on this replica
    ///
    /// A proposal whose boundary is behind the stored record is dropped and
    /// reported as [`ApplyOutcome::Stale`]; nothing is written.
    pub fn apply(
        &self,
        replica: &mut Replica,
        proposal: Proposal<R>,
    ) -> Result<ApplyOutcome<R::Boundary>> {
        let unit = replica.unit;
        let (stored, current) = self.require(unit)?;

        let proposed = proposal.record.boundary();
        let existing = current.boundary();
        if proposed < existing {
            warn!(
                target: "strata::migration",
                unit = %unit,
                current = ?existing,
                proposed = ?proposed,
                "Dropping stale migration write"
            );
            if replica.state.is_transitioning() {
                replica.state = replica.state.apply(Transition::AbandonSwitchOver)?;
            }
            return Ok(ApplyOutcome::Stale {
                current: existing,
                proposed,
            });
        }

        let value = encode(&proposal.record)?;
        let mut batch = WriteBatch::new();
        let migrate = proposal.switch_over
            || stored == Representation::Migrated
            || replica.state.is_migrated();

        if !migrate {
            batch.put(StoreKey::legacy(unit), value);
            self.store.commit(batch)?;
            return Ok(ApplyOutcome::Applied {
                representation: Representation::Legacy,
                switched_over: false,
            });
        }

        batch
            .delete(StoreKey::legacy(unit))
            .put(StoreKey::migrated(unit), value);
        self.store.commit(batch)?;
        replica.state = replica.state.apply(Transition::CompleteSwitchOver)?;

        let switched_over = stored == Representation::Legacy;
        if switched_over {
            debug!(target: "strata::migration", unit = %unit, "Switched over to migrated representation");
        }
        Ok(ApplyOutcome::Applied {
            representation: Representation::Migrated,
            switched_over,
        })
    }

    /// Drop a switch-over this replica proposed but will never apply
    ///
    /// Used when the proposal is lost, for example after losing leadership.
    /// No-op unless the replica is `Transitioning`.
    pub fn abandon(&self, replica: &mut Replica) -> Result<()> {
        if replica.state.is_transitioning() {
            replica.state = replica.state.apply(Transition::AbandonSwitchOver)?;
            debug!(target: "strata::migration", unit = %replica.unit, "Abandoned switch-over");
        }
        Ok(())
    }

    /// Copy this replica's record for transfer
    pub fn snapshot(&self, replica: &Replica) -> Result<SnapshotPayload<R>> {
        let (representation, record) = self.require(replica.unit)?;
        Ok(SnapshotPayload {
            representation,
            record,
        })
    }

    /// Replace this replica's record with a received snapshot
    ///
    /// Whatever was stored locally is cleared and the sender's
    /// representation is written, even if the local gate says otherwise.
    /// A switch-over this replica proposed but never applied is superseded.
    pub fn install_snapshot(
        &self,
        replica: &mut Replica,
        payload: SnapshotPayload<R>,
    ) -> Result<()> {
        let unit = replica.unit;
        let next = replica
            .state
            .apply(Transition::InstallSnapshot(payload.representation))?;

        let mut batch = WriteBatch::new();
        batch
            .delete(StoreKey::legacy(unit))
            .delete(StoreKey::migrated(unit))
            .put(
                StoreKey::of(unit, payload.representation),
                encode(&payload.record)?,
            );
        self.store.commit(batch)?;
        replica.state = next;

        debug!(
            target: "strata::migration",
            unit = %unit,
            representation = %payload.representation,
            "Installed snapshot"
        );
        Ok(())
    }

    /// Create the record of a unit split off from `parent`
    ///
    /// The child is written in the parent's persisted representation,
    /// regardless of the gate.
    pub fn split(&self, parent: &Replica, child: UnitId, record: &R) -> Result<Replica> {
        self.ensure_absent(child)?;
        let state = parent.state.derive_child();
        let representation = state.persisted();

        let mut batch = WriteBatch::new();
        batch.put(StoreKey::of(child, representation), encode(record)?);
        self.store.commit(batch)?;

        debug!(
            target: "strata::migration",
            parent = %parent.unit,
            child = %child,
            %representation,
            "Split unit"
        );
        Ok(Replica::with_state(child, state))
    }

    fn require(&self, unit: UnitId) -> Result<(Representation, R)> {
        self.load(unit)?
            .ok_or(MigrationError::MissingRecord { unit })
    }

    fn ensure_absent(&self, unit: UnitId) -> Result<()> {
        if self.store.contains(&StoreKey::legacy(unit))?
            || self.store.contains(&StoreKey::migrated(unit))?
        {
            return Err(MigrationError::UnitExists { unit });
        }
        Ok(())
    }
}

fn encode<R: Serialize>(record: &R) -> Result<Vec<u8>> {
    Ok(bincode::serialize(record)?)
}

fn decode<R: DeserializeOwned>(bytes: &[u8]) -> Result<R> {
    Ok(bincode::deserialize(bytes)?)
}
