use alloc::vec::Vec;

use bytemuck::Pod;

use crate::archive::{InputArchive, OutputArchive};
use crate::channel::{ByteSink, ByteSource};
use crate::persist::load_vec_in_chunks;
use crate::{ArchiveError, Persist};

// -----------------------------------------------------------------------------
// Trivial

/// Marker of types archived by copying their memory.
///
/// Requires [`Pod`]: no padding, no pointers, every bit pattern valid.
/// Implemented by [`impl_trivial!`](crate::impl_trivial) and by
/// `#[derive(Persist)]` with `#[persist(trivial)]`.
pub trait Trivial: Persist + Pod {}

// -----------------------------------------------------------------------------
// Pod helpers

/// Writes the bytes of `value`.
#[inline]
pub fn save_pod<T: Pod, W: ByteSink>(
    value: &T,
    ar: &mut OutputArchive<'_, W>,
) -> Result<(), ArchiveError> {
    ar.write_bytes(bytemuck::bytes_of(value))
}

/// Overwrites the bytes of `value`.
#[inline]
pub fn load_pod<T: Pod, R: ByteSource>(
    value: &mut T,
    ar: &mut InputArchive<'_, R>,
) -> Result<(), ArchiveError> {
    ar.read_bytes(bytemuck::bytes_of_mut(value))
}

/// Writes the bytes of `items` in one call.
#[inline]
pub fn save_pod_slice<T: Pod, W: ByteSink>(
    items: &[T],
    ar: &mut OutputArchive<'_, W>,
) -> Result<(), ArchiveError> {
    ar.write_bytes(bytemuck::cast_slice(items))
}

/// Overwrites the bytes of `items` in one call.
#[inline]
pub fn load_pod_slice<T: Pod, R: ByteSource>(
    items: &mut [T],
    ar: &mut InputArchive<'_, R>,
) -> Result<(), ArchiveError> {
    ar.read_bytes(bytemuck::cast_slice_mut(items))
}

/// Appends `len` values to `out`, reading them in bulk.
///
/// From a source of unknown size the buffer grows in bounded steps, so a
/// corrupted count fails at the end of input instead of allocating it all.
pub fn load_pod_vec<T: Pod, R: ByteSource>(
    len: usize,
    out: &mut Vec<T>,
    ar: &mut InputArchive<'_, R>,
) -> Result<(), ArchiveError> {
    if size_of::<T>() == 0 {
        out.resize(out.len() + len, T::zeroed());
        return Ok(());
    }

    load_vec_in_chunks(len, out, ar, T::zeroed, load_pod_slice)
}

// -----------------------------------------------------------------------------
// impl_trivial

/// Implements [`Persist`] and [`Trivial`] for plain-old-data types.
///
/// Each type must implement [`bytemuck::Pod`].
///
/// # Examples
///
/// ```
/// use pr_archive::{InputArchive, OutputArchive, Strategy, impl_trivial};
/// use pr_archive::classify::strategy_of;
///
/// #[derive(Copy, Clone, Default, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
/// #[repr(C)]
/// struct Vec3 {
///     x: f32,
///     y: f32,
///     z: f32,
/// }
///
/// impl_trivial!(Vec3);
///
/// assert_eq!(strategy_of::<Vec3>(), Strategy::TrivialCopy);
///
/// let points = vec![Vec3 { x: 1.0, y: 2.0, z: 3.0 }; 4];
/// let mut bytes = Vec::new();
/// OutputArchive::new(&mut bytes).save(&points).unwrap();
/// assert_eq!(bytes.len(), 8 + 4 * 12);
///
/// let back: Vec<Vec3> = InputArchive::new(bytes.as_slice()).load_new().unwrap();
/// assert_eq!(back, points);
/// ```
#[macro_export]
macro_rules! impl_trivial {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Persist for $ty {
                const STRATEGY: $crate::Strategy = $crate::Strategy::TrivialCopy;
                const MIN_ENCODED_LEN: usize = ::core::mem::size_of::<$ty>();

                #[inline]
                fn save<W: $crate::channel::ByteSink>(
                    &self,
                    ar: &mut $crate::OutputArchive<'_, W>,
                ) -> ::core::result::Result<(), $crate::ArchiveError> {
                    $crate::persist::save_pod(self, ar)
                }

                #[inline]
                fn load<R: $crate::channel::ByteSource>(
                    &mut self,
                    ar: &mut $crate::InputArchive<'_, R>,
                ) -> ::core::result::Result<(), $crate::ArchiveError> {
                    $crate::persist::load_pod(self, ar)
                }

                #[inline]
                fn save_slice<W: $crate::channel::ByteSink>(
                    items: &[Self],
                    ar: &mut $crate::OutputArchive<'_, W>,
                ) -> ::core::result::Result<(), $crate::ArchiveError> {
                    $crate::persist::save_pod_slice(items, ar)
                }

                #[inline]
                fn load_slice<R: $crate::channel::ByteSource>(
                    items: &mut [Self],
                    ar: &mut $crate::InputArchive<'_, R>,
                ) -> ::core::result::Result<(), $crate::ArchiveError> {
                    $crate::persist::load_pod_slice(items, ar)
                }

                #[inline]
                fn load_into_vec<R: $crate::channel::ByteSource>(
                    len: usize,
                    out: &mut $crate::__macro_exports::Vec<Self>,
                    ar: &mut $crate::InputArchive<'_, R>,
                    _fresh: impl FnMut() -> Self,
                ) -> ::core::result::Result<(), $crate::ArchiveError> {
                    $crate::persist::load_pod_vec(len, out, ar)
                }
            }

            impl $crate::persist::Trivial for $ty {}
        )+
    };
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::archive::PREALLOC_LIMIT;
    use crate::channel::IoSource;
    use crate::{InputArchive, OutputArchive, Persist, Registry};
    use alloc::vec::Vec;

    #[test]
    fn bulk_and_per_element_bytes_agree() {
        let values: Vec<u32> = (0..100).collect();

        let mut bulk = Vec::new();
        {
            let mut ar = OutputArchive::with_registry(&mut bulk, Registry::empty_ref());
            u32::save_slice(&values, &mut ar).unwrap();
        }

        let mut single = Vec::new();
        {
            let mut ar = OutputArchive::with_registry(&mut single, Registry::empty_ref());
            values.iter().for_each(|v| v.save(&mut ar).unwrap());
        }

        assert_eq!(bulk, single);
    }

    #[cfg(feature = "std")]
    #[test]
    fn chunked_reads_from_unsized_source() {
        let len = PREALLOC_LIMIT / 8 * 3 + 5;
        let values: Vec<u64> = (0..len as u64).collect();
        let mut bytes = Vec::new();
        OutputArchive::with_registry(&mut bytes, Registry::empty_ref())
            .save(&values)
            .unwrap();

        let mut ar = InputArchive::with_registry(IoSource(bytes.as_slice()), Registry::empty_ref());
        assert_eq!(ar.remaining(), None);
        assert_eq!(ar.load_new::<Vec<u64>>().unwrap(), values);
    }

    #[cfg(feature = "std")]
    #[test]
    fn huge_count_fails_without_huge_allocation() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(u32::MAX as u64).to_ne_bytes());
        bytes.extend_from_slice(&[0; 16]);

        let mut ar = InputArchive::with_registry(IoSource(bytes.as_slice()), Registry::empty_ref());
        let err = ar.load_new::<Vec<u64>>().unwrap_err();
        assert!(err.is_unexpected_end());
    }
}
