//! Error types for cluster versioning
//!
//! Startup-time construction errors are surfaced through fallible
//! constructors (`Catalogue::validate`, `VersionRegistry::new`, `open_store`)
//! which the process entry point must check and abort on. Lookups of unknown
//! gate keys are not represented here: they are programming defects and
//! panic at the call site.

use std::io;
use std::path::PathBuf;
use strata_core::{Version, VersionParseError};
use thiserror::Error;

/// Malformed version catalogue
///
/// Every variant indicates a defect in the shipped binary, never an
/// operational fault. A process that sees one must refuse to start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    /// The catalogue has no entries and therefore no version floor
    #[error("malformed version catalogue: no entries")]
    Empty,

    /// The same gate key appears twice
    #[error("malformed version catalogue: duplicate key {key} at position {position}")]
    DuplicateKey {
        /// Offending key
        key: &'static str,
        /// Zero-based position of the second occurrence
        position: usize,
    },

    /// Two entries share a version
    #[error("malformed version catalogue: {key} reuses version {version} of {previous}")]
    DuplicateVersion {
        /// Offending key
        key: &'static str,
        /// Key that first used the version
        previous: &'static str,
        /// Shared version
        version: Version,
    },

    /// Keys are not listed in declaration order
    #[error("malformed version catalogue: {key} is declared before {previous} but listed after it")]
    KeyOutOfOrder {
        /// Offending key
        key: &'static str,
        /// Preceding entry's key
        previous: &'static str,
    },

    /// Versions are not strictly increasing
    #[error("malformed version catalogue: {key} at {version} does not follow {previous} at {previous_version}")]
    VersionOutOfOrder {
        /// Offending key
        key: &'static str,
        /// Offending version
        version: Version,
        /// Preceding entry's key
        previous: &'static str,
        /// Preceding entry's version
        previous_version: Version,
    },

    /// A gate is attached to a patch release
    #[error("malformed version catalogue: {key} is attached to patch release {version}")]
    PatchReleaseGate {
        /// Offending key
        key: &'static str,
        /// Offending version
        version: Version,
    },
}

/// Registry construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The catalogue failed validation
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    /// The configured minimum supported key is not a catalogue entry
    #[error("minimum supported version key {key} is not in the catalogue")]
    UnknownMinimumKey {
        /// Configured key
        key: &'static str,
    },
}

/// Errors publishing a new cluster active version
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActiveVersionError {
    /// The proposed version is older than the current one
    #[error("cluster version cannot regress from {current} to {proposed}")]
    Regression {
        /// Currently published version
        current: Version,
        /// Rejected version
        proposed: Version,
    },

    /// The proposed version is below what this binary supports
    #[error("cluster version {proposed} is below the minimum supported version {minimum}")]
    BelowMinimum {
        /// Rejected version
        proposed: Version,
        /// Binary minimum supported version
        minimum: Version,
    },

    /// The proposed version is newer than this binary
    #[error("cluster version {proposed} is newer than binary version {binary}")]
    AboveBinary {
        /// Rejected version
        proposed: Version,
        /// Binary version
        binary: Version,
    },
}

/// A store's recorded version is outside what this binary can read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreVersionError {
    /// Store format predates what this binary understands
    #[error(
        "store version {store} predates the minimum supported version {minimum}; \
         upgrade through an intermediate release or wipe the store"
    )]
    StoreBelowMinimumVersion {
        /// Version recorded in the store
        store: Version,
        /// Binary minimum supported version
        minimum: Version,
    },

    /// Store was written by a newer binary
    #[error(
        "store version {store} is newer than this binary ({binary}); \
         run a binary at version {store} or later"
    )]
    StoreAboveBinaryVersion {
        /// Version recorded in the store
        store: Version,
        /// Binary version
        binary: Version,
    },
}

/// Errors raised while attaching to a store at startup
#[derive(Debug, Error)]
pub enum StartupError {
    /// The store's recorded version is not supported by this binary
    #[error("cannot attach to store at {}: {source}", .path.display())]
    Unsupported {
        /// Store directory
        path: PathBuf,
        /// Why the version is unsupported
        #[source]
        source: StoreVersionError,
    },

    /// No version marker and creation was not requested
    #[error("no cluster version marker at {}", .path.display())]
    MissingMarker {
        /// Expected marker path
        path: PathBuf,
    },

    /// The marker exists but does not hold a valid version
    #[error("invalid cluster version marker at {}: {source}", .path.display())]
    InvalidMarker {
        /// Marker path
        path: PathBuf,
        /// Parse failure
        #[source]
        source: VersionParseError,
    },

    /// The marker exists but is not UTF-8 text
    #[error("invalid cluster version marker at {}: contents are not UTF-8 text", .path.display())]
    MarkerNotText {
        /// Marker path
        path: PathBuf,
    },

    /// The requested marker update is not allowed
    #[error("cannot update cluster version marker: {0}")]
    Rejected(#[from] ActiveVersionError),

    /// Invalid store configuration
    #[error("invalid store config: {0}")]
    Config(#[from] ConfigError),

    /// I/O error reading or writing the marker
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Marker file name is empty or not a plain file name
    #[error("invalid marker file name {0:?}")]
    InvalidMarkerFile(String),
}
