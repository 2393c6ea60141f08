//! Error types for version handling
//!
//! Parsing a textual version is the only fallible operation on a
//! [`Version`](crate::Version); everything else (comparison, rendering) is
//! total. We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.

use thiserror::Error;

/// Result type alias for version parsing
pub type Result<T> = std::result::Result<T, VersionParseError>;

/// Errors produced when parsing `MAJOR.MINOR[.PATCH][-UNSTABLE]`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    /// Empty input
    #[error("empty version string")]
    Empty,

    /// A required component is absent (e.g. `"1"` has no minor)
    #[error("invalid version {input:?}: missing {component} component")]
    MissingComponent {
        /// Input that was parsed
        input: String,
        /// Name of the missing component
        component: &'static str,
    },

    /// A component is negative
    #[error("invalid version {input:?}: components must not be negative")]
    Negative {
        /// Input that was parsed
        input: String,
    },

    /// A component is not a plain decimal number
    #[error("invalid version {input:?}: {component} component {value:?} is not a number")]
    InvalidComponent {
        /// Input that was parsed
        input: String,
        /// Name of the offending component
        component: &'static str,
        /// Raw text of the component
        value: String,
    },

    /// A component does not fit in 32 bits
    #[error("invalid version {input:?}: {component} component is out of range")]
    ComponentOverflow {
        /// Input that was parsed
        input: String,
        /// Name of the offending component
        component: &'static str,
    },

    /// More than three dot-separated components
    #[error("invalid version {input:?}: expected MAJOR.MINOR[.PATCH][-UNSTABLE]")]
    TooManyComponents {
        /// Input that was parsed
        input: String,
    },
}
