//! Count-prefixed encoding of collections.
//!
//! A container is written as `[count: u64][elements...]` in iteration
//! order; maps write each key followed by its value. Decoding builds a new
//! container and replaces the target, dropping its previous contents.
//!
//! Element types may use any strategy. When they are Trivial-Copy and the
//! storage is contiguous, a run of elements is written and read with one
//! call.
//!
//! A user collection opts in by implementing [`Sequence`] or
//! [`Associative`] and forwarding its [`Persist`] impl to the functions of
//! this module:
//!
//! ```
//! use pr_archive::channel::{ByteSink, ByteSource};
//! use pr_archive::container::{Sequence, load_sequence, save_sequence};
//! use pr_archive::{ArchiveError, InputArchive, OutputArchive, Persist, Strategy};
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Stack(Vec<u32>);
//!
//! impl Sequence for Stack {
//!     type Item = u32;
//!
//!     fn seq_len(&self) -> usize {
//!         self.0.len()
//!     }
//!
//!     fn seq_iter(&self) -> impl Iterator<Item = &u32> {
//!         self.0.iter()
//!     }
//!
//!     fn seq_push(&mut self, item: u32) {
//!         self.0.push(item);
//!     }
//! }
//!
//! impl Persist for Stack {
//!     const STRATEGY: Strategy = Strategy::ContainerRecursive;
//!
//!     fn save<W: ByteSink>(&self, ar: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError> {
//!         save_sequence(self, ar)
//!     }
//!
//!     fn load<R: ByteSource>(&mut self, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError> {
//!         load_sequence(self, ar)
//!     }
//! }
//!
//! let mut bytes = Vec::new();
//! OutputArchive::new(&mut bytes).save(&Stack(vec![4, 5])).unwrap();
//! let back: Stack = InputArchive::new(bytes.as_slice()).load_new().unwrap();
//! assert_eq!(back, Stack(vec![4, 5]));
//! ```

use alloc::vec::Vec;

use crate::archive::{InputArchive, OutputArchive, prealloc_len};
use crate::channel::{ByteSink, ByteSource};
use crate::{ArchiveError, Persist};

// -----------------------------------------------------------------------------
// Modules

mod impls;
mod string;

// -----------------------------------------------------------------------------
// Sequence

/// A collection of elements with an iteration order.
pub trait Sequence: Default {
    type Item: Persist;

    /// `true` if the storage is one buffer that [`seq_from_vec`](Self::seq_from_vec)
    /// can take over; decoding then reads elements in bulk.
    const CONTIGUOUS: bool = false;

    fn seq_len(&self) -> usize;

    /// Elements in the order they are written.
    fn seq_iter(&self) -> impl Iterator<Item = &Self::Item>;

    /// All elements as at most two contiguous runs, in order.
    #[inline]
    fn seq_slices(&self) -> Option<(&[Self::Item], &[Self::Item])> {
        None
    }

    /// Reserves room for `additional` more elements.
    #[inline]
    fn seq_reserve(&mut self, additional: usize) {
        let _ = additional;
    }

    fn seq_push(&mut self, item: Self::Item);

    /// Builds the collection from decoded elements.
    fn seq_from_vec(items: Vec<Self::Item>) -> Self {
        let mut seq = Self::default();
        seq.seq_reserve(items.len());
        items.into_iter().for_each(|item| seq.seq_push(item));
        seq
    }
}

/// Writes the count of `seq` followed by its elements.
pub fn save_sequence<S: Sequence, W: ByteSink>(
    seq: &S,
    ar: &mut OutputArchive<'_, W>,
) -> Result<(), ArchiveError> {
    ar.write_len(seq.seq_len())?;
    match seq.seq_slices() {
        Some((front, back)) => {
            S::Item::save_slice(front, ar)?;
            if back.is_empty() {
                return Ok(());
            }
            S::Item::save_slice(back, ar)
        }
        None => seq.seq_iter().try_for_each(|item| item.save(ar)),
    }
}

/// Replaces `seq` with a sequence read from `ar`.
pub fn load_sequence<S, R>(seq: &mut S, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError>
where
    S: Sequence,
    S::Item: Default,
    R: ByteSource,
{
    let len = ar.read_len(S::Item::MIN_ENCODED_LEN)?;

    if S::CONTIGUOUS {
        let mut items = Vec::new();
        S::Item::load_into_vec(len, &mut items, ar, S::Item::default)?;
        *seq = S::seq_from_vec(items);
        return Ok(());
    }

    let mut fresh = S::default();
    fresh.seq_reserve(prealloc_len::<S::Item>(len, ar.remaining()));
    for _ in 0..len {
        let mut item = S::Item::default();
        item.load(ar)?;
        fresh.seq_push(item);
    }
    *seq = fresh;
    Ok(())
}

// -----------------------------------------------------------------------------
// Associative

/// A collection of key-value pairs.
pub trait Associative: Default {
    type Key: Persist;
    type Value: Persist;

    fn map_len(&self) -> usize;

    /// Pairs in the order they are written.
    fn map_iter(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)>;

    #[inline]
    fn map_reserve(&mut self, additional: usize) {
        let _ = additional;
    }

    fn map_insert(&mut self, key: Self::Key, value: Self::Value);
}

/// Writes the count of `map` followed by each key and value.
pub fn save_associative<M: Associative, W: ByteSink>(
    map: &M,
    ar: &mut OutputArchive<'_, W>,
) -> Result<(), ArchiveError> {
    ar.write_len(map.map_len())?;
    map.map_iter().try_for_each(|(key, value)| {
        key.save(ar)?;
        value.save(ar)
    })
}

/// Replaces `map` with a map read from `ar`.
pub fn load_associative<M, R>(map: &mut M, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError>
where
    M: Associative,
    M::Key: Default,
    M::Value: Default,
    R: ByteSource,
{
    let pair_len = M::Key::MIN_ENCODED_LEN.saturating_add(M::Value::MIN_ENCODED_LEN);
    let len = ar.read_len(pair_len)?;

    let mut fresh = M::default();
    fresh.map_reserve(prealloc_len::<(M::Key, M::Value)>(len, ar.remaining()));
    for _ in 0..len {
        let mut key = M::Key::default();
        key.load(ar)?;
        let mut value = M::Value::default();
        value.load(ar)?;
        fresh.map_insert(key, value);
    }
    *map = fresh;
    Ok(())
}

/// Encoded size of an empty container.
pub(crate) const COUNT_LEN: usize = size_of::<u64>();
