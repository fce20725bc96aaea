//! The [`Persist`] trait and its implementations for built-in types.
//!
//! Dispatch is static: `archive.save(&value)` calls the `Persist` impl of
//! the value's type, and the impl's [`STRATEGY`](Persist::STRATEGY) says
//! which of the four encodings it follows.

use alloc::vec::Vec;

use crate::archive::{InputArchive, OutputArchive, prealloc_len};
use crate::channel::{ByteSink, ByteSource};
use crate::{ArchiveError, Strategy};

// -----------------------------------------------------------------------------
// Modules

mod composite;
mod primitives;
mod trivial;

// -----------------------------------------------------------------------------
// Exports

pub use trivial::Trivial;
pub use trivial::{load_pod, load_pod_slice, load_pod_vec, save_pod, save_pod_slice};

// -----------------------------------------------------------------------------
// Chunked loading

/// Appends `len` values to `out`, a bounded chunk at a time.
///
/// Each chunk is filled with `fresh()` values and then loaded in place by
/// `load_chunk`, so a type whose slice loading is cheaper than one value
/// at a time keeps that advantage. Memory grows with the input actually
/// read, never with the count alone.
///
/// # Examples
///
/// ```
/// use pr_archive::persist::load_vec_in_chunks;
/// use pr_archive::{InputArchive, Persist, Registry};
///
/// let bytes: Vec<u8> = [1_u16, 2, 3].iter().flat_map(|v| v.to_ne_bytes()).collect();
/// let mut ar = InputArchive::with_registry(bytes.as_slice(), Registry::empty_ref());
///
/// let mut out = Vec::new();
/// load_vec_in_chunks(3, &mut out, &mut ar, || 0_u16, u16::load_slice).unwrap();
/// assert_eq!(out, [1, 2, 3]);
/// ```
pub fn load_vec_in_chunks<T, R: ByteSource>(
    len: usize,
    out: &mut Vec<T>,
    ar: &mut InputArchive<'_, R>,
    mut fresh: impl FnMut() -> T,
    mut load_chunk: impl FnMut(&mut [T], &mut InputArchive<'_, R>) -> Result<(), ArchiveError>,
) -> Result<(), ArchiveError> {
    let step = prealloc_len::<T>(len, ar.remaining()).max(1);
    let mut left = len;
    while left > 0 {
        let n = left.min(step);
        let start = out.len();
        out.extend(core::iter::repeat_with(&mut fresh).take(n));
        load_chunk(&mut out[start..], &mut *ar)?;
        left -= n;
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Persist

/// A type that can be written to and read from an archive.
///
/// `load` must read exactly what `save` wrote, in the same order; nothing
/// checks this in [`Mode::Fast`](crate::Mode::Fast).
///
/// Implement it through `#[derive(Persist)]`, [`impl_trivial!`](crate::impl_trivial)
/// for plain-old-data types, [`Registered`](crate::Registered) for foreign
/// types, or by hand:
///
/// ```
/// use pr_archive::channel::{ByteSink, ByteSource};
/// use pr_archive::{ArchiveError, InputArchive, OutputArchive, Persist, Strategy};
///
/// #[derive(Default, Debug, PartialEq)]
/// struct Celsius(f32);
///
/// impl Persist for Celsius {
///     const STRATEGY: Strategy = Strategy::MemberDefined;
///     const MIN_ENCODED_LEN: usize = 4;
///
///     fn save<W: ByteSink>(&self, ar: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError> {
///         self.0.save(ar)
///     }
///
///     fn load<R: ByteSource>(&mut self, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError> {
///         self.0.load(ar)
///     }
/// }
///
/// let mut bytes = Vec::new();
/// OutputArchive::new(&mut bytes).save(&Celsius(21.5)).unwrap();
/// let back: Celsius = InputArchive::new(bytes.as_slice()).load_new().unwrap();
/// assert_eq!(back, Celsius(21.5));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be archived",
    label = "no encoding strategy for `{Self}`",
    note = "derive `Persist`, use `impl_trivial!` for plain-old-data, or wrap a foreign type in `Registered`"
)]
pub trait Persist: Sized {
    /// Encoding followed by `save` and `load`.
    const STRATEGY: Strategy;

    /// Lower bound of the bytes one value occupies.
    ///
    /// Used to reject container counts that exceed the input. Zero is
    /// always correct.
    const MIN_ENCODED_LEN: usize = 0;

    /// Writes `self`.
    fn save<W: ByteSink>(&self, ar: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError>;

    /// Overwrites `self` with a value read from `ar`.
    fn load<R: ByteSource>(&mut self, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError>;

    /// Writes every item of a contiguous run.
    ///
    /// Trivial-Copy types write the whole run at once.
    #[inline]
    fn save_slice<W: ByteSink>(
        items: &[Self],
        ar: &mut OutputArchive<'_, W>,
    ) -> Result<(), ArchiveError> {
        items.iter().try_for_each(|item| item.save(ar))
    }

    /// Loads every item of a contiguous run in place.
    #[inline]
    fn load_slice<R: ByteSource>(
        items: &mut [Self],
        ar: &mut InputArchive<'_, R>,
    ) -> Result<(), ArchiveError> {
        items.iter_mut().try_for_each(|item| item.load(ar))
    }

    /// Appends `len` values read from `ar` to `out`.
    ///
    /// Each value is loaded into a placeholder built by `fresh`. `len` must
    /// come from [`InputArchive::read_len`], which has bounded it.
    fn load_into_vec<R: ByteSource>(
        len: usize,
        out: &mut Vec<Self>,
        ar: &mut InputArchive<'_, R>,
        mut fresh: impl FnMut() -> Self,
    ) -> Result<(), ArchiveError> {
        out.reserve(prealloc_len::<Self>(len, ar.remaining()));
        for _ in 0..len {
            let mut item = fresh();
            item.load(ar)?;
            out.push(item);
        }
        Ok(())
    }
}
