//! Cluster active version holder
//!
//! The active version is the version every node of the cluster agrees it may
//! safely assume. It is decided by the coordination subsystem; this module
//! only publishes and reads the decided value.
//!
//! ## Concurrency
//!
//! - Readers perform one atomic load (`ArcSwapOption::load`). They never
//!   take a lock and never allocate, so gate queries can run on every
//!   replicated operation.
//! - Writers are serialised by a mutex readers never touch.
//! - The value only moves forward. A regressing publish is refused.

use crate::error::ActiveVersionError;
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::sync::Arc;
use strata_core::Version;
use tracing::info;

/// Atomically published cluster active version
///
/// Starts unset when the coordinator has not yet decided a version. While
/// unset every gate reads as inactive.
#[derive(Debug, Default)]
pub struct ActiveVersion {
    current: ArcSwapOption<Version>,
    publish_lock: Mutex<()>,
}

impl ActiveVersion {
    /// Create an unset holder
    pub fn unset() -> Self {
        Self::default()
    }

    /// Create a holder initialised to `version`
    pub fn new(version: Version) -> Self {
        ActiveVersion {
            current: ArcSwapOption::from_pointee(version),
            publish_lock: Mutex::new(()),
        }
    }

    /// Current active version, `None` while unset
    #[inline]
    pub fn current(&self) -> Option<Version> {
        self.current.load().as_deref().copied()
    }

    /// Check whether a version has been published
    pub fn is_set(&self) -> bool {
        self.current.load().is_some()
    }

    /// Publish a new active version
    ///
    /// Returns the previously published version. Re-publishing the current
    /// version is a no-op.
    ///
    /// # Errors
    ///
    /// [`ActiveVersionError::Regression`] if `version` is older than the
    /// current value. The current value is left unchanged.
    pub fn publish(&self, version: Version) -> Result<Option<Version>, ActiveVersionError> {
        let _guard = self.publish_lock.lock();

        let previous = self.current();
        match previous {
            Some(current) if version < current => {
                return Err(ActiveVersionError::Regression {
                    current,
                    proposed: version,
                })
            }
            Some(current) if version == current => return Ok(previous),
            _ => {}
        }

        self.current.store(Some(Arc::new(version)));
        info!(
            target: "strata::versions",
            version = %version,
            previous = ?previous.map(|v| v.to_string()),
            "Published cluster active version"
        );
        Ok(previous)
    }
}
