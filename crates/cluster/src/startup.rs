//! Store attachment at process start
//!
//! Before serving traffic a node reads the version marker of its store and
//! refuses to continue if the store is older than the binary's minimum
//! supported version (or newer than the binary itself). A fresh store is
//! stamped with the binary version, which is where a new cluster starts.
//!
//! ## Startup Sequence
//!
//! ```text
//! 1. Validate StoreConfig
//! 2. Read marker
//!    - missing + create_if_missing: write binary_version
//!    - missing otherwise: MissingMarker
//! 3. validate_store_version(marker)
//! 4. Return ActiveVersion initialised to the marker
//! ```

use crate::active::ActiveVersion;
use crate::config::StoreConfig;
use crate::error::StartupError;
use crate::key::GateKey;
use crate::marker::StoreVersionMarker;
use crate::registry::VersionRegistry;
use std::path::Path;
use strata_core::Version;
use tracing::{error, info};

/// Attach to the store in `dir`
///
/// On success, returns the active version holder seeded with the store's
/// recorded version.
///
/// # Errors
///
/// Every error is fatal for the process; the caller must exit with the
/// error's message rather than run against an unsupported format.
pub fn open_store<K: GateKey>(
    dir: impl AsRef<Path>,
    registry: &VersionRegistry<K>,
    config: &StoreConfig,
) -> Result<ActiveVersion, StartupError> {
    let dir = dir.as_ref();
    match attach(dir, registry, config) {
        Ok(version) => Ok(ActiveVersion::new(version)),
        Err(e) => {
            error!(target: "strata::startup", path = %dir.display(), error = %e, "Refusing to attach to store");
            Err(e)
        }
    }
}

fn attach<K: GateKey>(
    dir: &Path,
    registry: &VersionRegistry<K>,
    config: &StoreConfig,
) -> Result<Version, StartupError> {
    config.validate()?;
    let marker = StoreVersionMarker::new(dir, &config.marker_file);

    let version = match marker.read()? {
        Some(v) => v,
        None if config.create_if_missing => {
            let v = registry.binary_version();
            marker.write(v)?;
            info!(target: "strata::startup", path = %dir.display(), version = %v, "Initialised store version");
            return Ok(v);
        }
        None => {
            return Err(StartupError::MissingMarker {
                path: marker.path().to_path_buf(),
            })
        }
    };

    registry
        .validate_store_version(version)
        .map_err(|source| StartupError::Unsupported {
            path: dir.to_path_buf(),
            source,
        })?;

    info!(
        target: "strata::startup",
        path = %dir.display(),
        version = %version,
        binary = %registry.binary_version(),
        "Attached to store"
    );
    Ok(version)
}

/// Advance the store's persisted version to `target`
///
/// The store must already pass the startup check. `target` must lie in
/// `[minimum_supported, binary_version]` and must not be older than the
/// recorded version. Returns the previously recorded version.
pub fn bump_store_version<K: GateKey>(
    dir: impl AsRef<Path>,
    registry: &VersionRegistry<K>,
    config: &StoreConfig,
    target: Version,
) -> Result<Version, StartupError> {
    let dir = dir.as_ref();
    let active = open_store(dir, registry, &config.clone().with_create_if_missing(false))?;
    let previous = active
        .current()
        .unwrap_or_else(|| registry.minimum_supported_version());

    registry.advance(&active, target)?;
    if target != previous {
        StoreVersionMarker::new(dir, &config.marker_file).write(target)?;
        info!(
            target: "strata::startup",
            path = %dir.display(),
            from = %previous,
            to = %target,
            "Advanced store version"
        );
    }
    Ok(previous)
}
