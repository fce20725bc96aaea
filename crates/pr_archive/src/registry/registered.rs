use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};

use crate::archive::{InputArchive, OutputArchive};
use crate::channel::{ByteSink, ByteSource};
use crate::persist::load_vec_in_chunks;
use crate::{ArchiveError, Persist, Strategy};

/// Archives a `T` with the codec registered for it.
///
/// Gives foreign types a [`Persist`] impl, so they compose with containers
/// and derived types: `Vec<Registered<Foreign>>` writes a count followed by
/// whatever the registered function writes for each element.
///
/// Saving or loading fails with [`ArchiveError::Unregistered`] when the
/// archive's registry has no codec for `T`.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Registered<T>(pub T);

impl<T> Registered<T> {
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Registered<T> {
    #[inline]
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> Deref for Registered<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Registered<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: 'static> Persist for Registered<T> {
    const STRATEGY: Strategy = Strategy::ExternallyRegistered;

    #[inline]
    fn save<W: ByteSink>(&self, ar: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError> {
        ar.save_registered(&self.0)
    }

    #[inline]
    fn load<R: ByteSource>(&mut self, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError> {
        ar.load_registered(&mut self.0)
    }

    // One registry lookup per run of values.

    #[inline]
    fn save_slice<W: ByteSink>(
        items: &[Self],
        ar: &mut OutputArchive<'_, W>,
    ) -> Result<(), ArchiveError> {
        ar.save_registered_all(items.iter().map(|item| &item.0))
    }

    #[inline]
    fn load_slice<R: ByteSource>(
        items: &mut [Self],
        ar: &mut InputArchive<'_, R>,
    ) -> Result<(), ArchiveError> {
        ar.load_registered_all(items.iter_mut().map(|item| &mut item.0))
    }

    #[inline]
    fn load_into_vec<R: ByteSource>(
        len: usize,
        out: &mut Vec<Self>,
        ar: &mut InputArchive<'_, R>,
        fresh: impl FnMut() -> Self,
    ) -> Result<(), ArchiveError> {
        load_vec_in_chunks(len, out, ar, fresh, Self::load_slice)
    }
}

// -----------------------------------------------------------------------------
// Tests
