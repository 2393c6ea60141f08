//! Storage seam for migrating records
//!
//! The protocol never touches a storage engine directly. It reads one key at
//! a time and commits every mutation as a [`WriteBatch`], which the store
//! must apply all-or-nothing. That atomicity is what makes the
//! delete-legacy/write-new switch-over indivisible.

use crate::error::Result;
use crate::state::Representation;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a replicated unit (e.g. a range)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u64);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location of one representation of a unit's record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreKey {
    /// Owning unit
    pub unit: UnitId,
    /// Which representation lives at this key
    pub representation: Representation,
}

impl StoreKey {
    /// Legacy key of `unit`
    pub fn legacy(unit: UnitId) -> Self {
        StoreKey {
            unit,
            representation: Representation::Legacy,
        }
    }

    /// Migrated key of `unit`
    pub fn migrated(unit: UnitId) -> Self {
        StoreKey {
            unit,
            representation: Representation::Migrated,
        }
    }

    /// Key of `unit` in `representation`
    pub fn of(unit: UnitId, representation: Representation) -> Self {
        StoreKey {
            unit,
            representation,
        }
    }
}

/// One mutation in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Write `value` at the key
    Put(StoreKey, Vec<u8>),
    /// Remove the key (no-op if absent)
    Delete(StoreKey),
}

/// Ordered set of mutations committed atomically
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a put
    pub fn put(&mut self, key: StoreKey, value: Vec<u8>) -> &mut Self {
        self.ops.push(BatchOp::Put(key, value));
        self
    }

    /// Queue a delete
    pub fn delete(&mut self, key: StoreKey) -> &mut Self {
        self.ops.push(BatchOp::Delete(key));
        self
    }

    /// Queued operations in commit order
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    /// Number of queued operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Key/value store holding migrating records
///
/// Thread safety: All methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
pub trait RepresentationStore: Send + Sync {
    /// Read the value at `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>>;

    /// Apply every operation in `batch`, or none of them
    ///
    /// Concurrent readers must observe either the state before the batch or
    /// the state after it.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails. Nothing from the
    /// batch is applied in that case.
    fn commit(&self, batch: WriteBatch) -> Result<()>;

    /// Check whether `key` holds a value
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn contains(&self, key: &StoreKey) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// In-memory store: BTreeMap behind a single RwLock
#[derive(Debug, Default)]
pub struct MemStore {
    data: RwLock<BTreeMap<StoreKey, Vec<u8>>>,
}

impl MemStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Keys currently present for `unit`
    pub fn keys_of(&self, unit: UnitId) -> Vec<StoreKey> {
        self.data
            .read()
            .keys()
            .filter(|k| k.unit == unit)
            .copied()
            .collect()
    }
}

impl RepresentationStore for MemStore {
    fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn commit(&self, batch: WriteBatch) -> Result<()> {
        let mut data = self.data.write();
        for op in batch.ops {
            match op {
                BatchOp::Put(key, value) => {
                    data.insert(key, value);
                }
                BatchOp::Delete(key) => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }
}
