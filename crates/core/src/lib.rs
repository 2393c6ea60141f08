//! Core version types for Strata
//!
//! This crate defines the foundational value used by cluster version gating:
//! - Version: `MAJOR.MINOR[.PATCH][-UNSTABLE]` triple with a total order
//! - VersionParseError: the only fallible path (textual parsing)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod version;

pub use error::VersionParseError;
pub use version::Version;
