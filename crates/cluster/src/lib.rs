//! Cluster version gating for Strata
//!
//! Lets nodes running different builds share a cluster during a rolling
//! upgrade:
//!
//! - Catalogue: ordered `(gate key, version)` table, validated once at start
//! - VersionRegistry: key lookup, minimum supported and binary versions
//! - ActiveVersion: atomically published cluster active version
//! - Gate: lock-free "is gate G active" query for hot paths
//! - Startup: store version marker and the minimum-version floor check
//!
//! The registry is an explicitly constructed value passed to the components
//! that need it. Agreement on the active version is the coordination
//! subsystem's job; this crate only publishes and reads the agreed value.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod active;
pub mod builtin;
pub mod catalogue;
pub mod config;
pub mod error;
pub mod gate;
pub mod key;
pub mod marker;
pub mod registry;
pub mod startup;

pub use active::ActiveVersion;
pub use builtin::{VersionKey, BUILTIN_CATALOGUE};
pub use catalogue::{Catalogue, CatalogueEntry};
pub use config::{RegistryConfig, StoreConfig, DEFAULT_MARKER_FILE};
pub use error::{
    ActiveVersionError, CatalogueError, ConfigError, RegistryError, StartupError,
    StoreVersionError,
};
pub use gate::{gate_open, Gate};
pub use key::GateKey;
pub use marker::StoreVersionMarker;
pub use registry::VersionRegistry;
pub use startup::{bump_store_version, open_store};
