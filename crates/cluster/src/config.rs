//! Version registry and store configuration

use crate::builtin::VersionKey;
use crate::error::ConfigError;
use crate::key::GateKey;

/// Default name of the persisted cluster version marker
pub const DEFAULT_MARKER_FILE: &str = "CLUSTER_VERSION";

/// Registry configuration
///
/// Controls which catalogue entry is the oldest on-disk format this binary
/// still reads. The key must name a catalogue entry; `VersionRegistry::new`
/// rejects it otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig<K> {
    /// Key whose version is the binary's minimum supported version
    pub minimum_supported: K,
}

impl<K: GateKey> RegistryConfig<K> {
    /// Create config with the given minimum supported key
    pub fn new(minimum_supported: K) -> Self {
        RegistryConfig { minimum_supported }
    }

    /// Set the minimum supported key
    pub fn with_minimum_supported(mut self, key: K) -> Self {
        self.minimum_supported = key;
        self
    }
}

impl Default for RegistryConfig<VersionKey> {
    /// The previous release: this binary reads stores from 2.0 onwards
    fn default() -> Self {
        RegistryConfig::new(VersionKey::Version2_0)
    }
}

/// Store attachment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Write a marker at the binary version when none exists
    pub create_if_missing: bool,
    /// Marker file name inside the store directory
    pub marker_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            create_if_missing: true,
            marker_file: DEFAULT_MARKER_FILE.to_string(),
        }
    }
}

impl StoreConfig {
    /// Config that refuses to initialise a fresh store
    pub fn existing_only() -> Self {
        StoreConfig {
            create_if_missing: false,
            ..Default::default()
        }
    }

    /// Set whether a missing marker is created
    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Set marker file name
    pub fn with_marker_file(mut self, name: impl Into<String>) -> Self {
        self.marker_file = name.into();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.marker_file.as_str();
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(ConfigError::InvalidMarkerFile(self.marker_file.clone()));
        }
        Ok(())
    }
}
