//! Hashers and hash containers, re-exports *hashbrown* and *foldhash*.
//!
//! - [`FixedHashState`]: seeded once at compile time, results depend only on
//!   the input. Used where a hash must be reproducible between two runs of
//!   the same build (archive fingerprints).
//! - [`NoOpHashState`]: passes an already well-distributed `u64` through.
//!   Used for [`TypeId`](core::any::TypeId) keys.

// -----------------------------------------------------------------------------
// Modules

mod hasher;

// -----------------------------------------------------------------------------
// Exports

pub use hasher::{FixedHashState, FixedHasher};
pub use hasher::{NoOpHashState, NoOpHasher};

/// A [`hashbrown::HashMap`] using [`FixedHashState`] by default.
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;

/// A [`hashbrown::HashSet`] using [`FixedHashState`] by default.
pub type HashSet<T, S = FixedHashState> = hashbrown::HashSet<T, S>;

/// Hash `value` with [`FixedHashState`].
///
/// # Examples
///
/// ```
/// use pr_utils::hash::hash_one;
///
/// assert_eq!(hash_one("packrat"), hash_one("packrat"));
/// assert_ne!(hash_one("packrat"), hash_one("pack rat"));
/// ```
#[inline]
pub fn hash_one<T: core::hash::Hash + ?Sized>(value: &T) -> u64 {
    use core::hash::BuildHasher;
    FixedHashState.hash_one(value)
}

// -----------------------------------------------------------------------------
// Re-export crates

pub use foldhash;
pub use hashbrown;
