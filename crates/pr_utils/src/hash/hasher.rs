use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHasher

/// Seed of every [`FixedHasher`]. Changing it changes every archive fingerprint.
const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x5EED_A4C1_7E0F_2B93);

/// A hasher whose result depends only on its input.
///
/// Alias of [`foldhash::fast::FoldHasher`], created through [`FixedHashState`].
pub type FixedHasher = FoldHasher<'static>;

/// Builds [`FixedHasher`]s from a compile-time seed.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use pr_utils::hash::FixedHashState;
///
/// let a = FixedHashState.hash_one(("Vec<u8>", 24_usize));
/// let b = FixedHashState.hash_one(("Vec<u8>", 24_usize));
/// assert_eq!(a, b);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// NoOpHasher

/// A hasher that keeps the last `u64` written to it.
///
/// Other writes fold the bytes in reverse order into the state, so that
/// `write_u32(n)` and `write_u64(n)` agree when called once.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHasher {
    hash: u64,
}

impl Hasher for NoOpHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes.iter().rev() {
            self.hash = self.hash.rotate_left(8).wrapping_add(*byte as u64);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }
}

/// Builds [`NoOpHasher`]s.
///
/// Meant for keys that already are hashes, such as [`TypeId`](core::any::TypeId).
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use pr_utils::hash::NoOpHashState;
///
/// assert_eq!(NoOpHashState.hash_one(3_u64), 3);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHashState;

impl BuildHasher for NoOpHashState {
    type Hasher = NoOpHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        NoOpHasher { hash: 0 }
    }
}

// -----------------------------------------------------------------------------
// Tests
