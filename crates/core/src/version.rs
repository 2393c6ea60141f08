//! Cluster version triples
//!
//! A [`Version`] identifies a release point of the product. It has the
//! colloquial form `MAJOR.MINOR[.PATCH][-UNSTABLE]`, where the patch and
//! unstable components are omitted when zero.
//!
//! ## Components
//!
//! - **major / minor**: the release series (`2.1`)
//! - **patch**: patch release within a series (`2.1.3`). Patch releases never
//!   carry migrations.
//! - **unstable**: pre-release increment developed after the last stable
//!   release and before the next one. `1.1-2` is newer than `1.1` and older
//!   than whatever release follows it (`1.2` or `2.0`).
//!
//! ## Ordering
//!
//! Versions are totally ordered, lexicographically over
//! `(major, minor, patch, unstable)` with numeric comparison of each
//! component.

use crate::error::VersionParseError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A version triple (plus unstable ordinal)
///
/// Immutable once constructed. Field order matters: the derived `Ord`
/// compares `major`, then `minor`, then `patch`, then `unstable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    major: u32,
    minor: u32,
    patch: u32,
    unstable: u32,
}

impl Version {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a release version `major.minor`
    pub const fn new(major: u32, minor: u32) -> Self {
        Version {
            major,
            minor,
            patch: 0,
            unstable: 0,
        }
    }

    /// Create a version from all four components
    pub const fn from_parts(major: u32, minor: u32, patch: u32, unstable: u32) -> Self {
        Version {
            major,
            minor,
            patch,
            unstable,
        }
    }

    /// Return a copy with the given patch component
    pub const fn with_patch(self, patch: u32) -> Self {
        Version { patch, ..self }
    }

    /// Return a copy with the given unstable component
    pub const fn with_unstable(self, unstable: u32) -> Self {
        Version { unstable, ..self }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Major component
    #[inline]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Minor component
    #[inline]
    pub const fn minor(&self) -> u32 {
        self.minor
    }

    /// Patch component
    #[inline]
    pub const fn patch(&self) -> u32 {
        self.patch
    }

    /// Unstable (pre-release) component
    #[inline]
    pub const fn unstable(&self) -> u32 {
        self.unstable
    }

    /// True if this is a release point rather than an unstable increment
    #[inline]
    pub const fn is_release(&self) -> bool {
        self.unstable == 0
    }

    /// True if this is a patch release (`2.1.3`)
    #[inline]
    pub const fn is_patch_release(&self) -> bool {
        self.patch > 0
    }

    /// The `major.minor` release series this version belongs to
    pub const fn release_series(&self) -> Version {
        Version::new(self.major, self.minor)
    }

    // =========================================================================
    // Comparison
    // =========================================================================

    /// Three-way comparison
    #[inline]
    pub fn compare(&self, other: &Version) -> Ordering {
        self.cmp(other)
    }

    /// True if `self <= other`
    #[inline]
    pub fn less_eq(&self, other: &Version) -> bool {
        self.compare(other) != Ordering::Greater
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if self.patch != 0 {
            write!(f, ".{}", self.patch)?;
        }
        if self.unstable != 0 {
            write!(f, "-{}", self.unstable)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }

        // Split off the unstable suffix first; a leading '-' is a negative
        // major component, not a suffix.
        let (release, unstable) = match s.find('-') {
            Some(0) => {
                return Err(VersionParseError::Negative {
                    input: s.to_string(),
                })
            }
            Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
            None => (s, None),
        };

        let mut parts = release.split('.');
        let major = parse_component(s, "major", parts.next())?;
        let minor = parse_component(s, "minor", parts.next())?;
        let patch = match parts.next() {
            Some(p) => parse_component(s, "patch", Some(p))?,
            None => 0,
        };
        if parts.next().is_some() {
            return Err(VersionParseError::TooManyComponents {
                input: s.to_string(),
            });
        }

        let unstable = match unstable {
            Some(u) => parse_component(s, "unstable", Some(u))?,
            None => 0,
        };

        Ok(Version::from_parts(major, minor, patch, unstable))
    }
}

fn parse_component(
    input: &str,
    component: &'static str,
    raw: Option<&str>,
) -> crate::error::Result<u32> {
    let raw = raw.ok_or_else(|| VersionParseError::MissingComponent {
        input: input.to_string(),
        component,
    })?;

    if raw.starts_with('-') {
        return Err(VersionParseError::Negative {
            input: input.to_string(),
        });
    }

    // u32::from_str would accept a leading '+'
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionParseError::InvalidComponent {
            input: input.to_string(),
            component,
            value: raw.to_string(),
        });
    }

    raw.parse::<u32>()
        .map_err(|_| VersionParseError::ComponentOverflow {
            input: input.to_string(),
            component,
        })
}

impl TryFrom<String> for Version {
    type Error = VersionParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
