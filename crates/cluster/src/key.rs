//! Gate key trait
//!
//! A gate key names one historical feature or format change. Keys are
//! enumerated at build time and ordered by declaration, which must match the
//! chronological order in which the gates were introduced. A key is never
//! reused after its gate is removed.

use std::fmt::Debug;
use std::hash::Hash;

/// Symbolic identifier for a version gate
///
/// `Ord` must follow declaration order; the catalogue validator checks that
/// the table lists keys in that order. Deriving `Ord` on a fieldless enum
/// gives exactly this.
pub trait GateKey: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// Stable human-readable name used in logs and operator output
    fn name(&self) -> &'static str;
}
