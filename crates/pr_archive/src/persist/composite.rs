use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::archive::{InputArchive, OutputArchive};
use crate::channel::{ByteSink, ByteSource};
use crate::persist::load_vec_in_chunks;
use crate::{ArchiveError, Persist, Strategy};

// -----------------------------------------------------------------------------
// Tuples

macro_rules! impl_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Persist),+> Persist for ($($name,)+) {
            const STRATEGY: Strategy = Strategy::MemberDefined;
            const MIN_ENCODED_LEN: usize = 0 $(+ $name::MIN_ENCODED_LEN)+;

            #[inline]
            fn save<W: ByteSink>(&self, ar: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError> {
                $( self.$idx.save(ar)?; )+
                Ok(())
            }

            #[inline]
            fn load<R: ByteSource>(&mut self, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError> {
                $( self.$idx.load(ar)?; )+
                Ok(())
            }
        }
    };
}

impl_tuple!(A: 0);
impl_tuple!(A: 0, B: 1);
impl_tuple!(A: 0, B: 1, C: 2);
impl_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);

// -----------------------------------------------------------------------------
// Arrays

/// Elements only: the length is part of the type.
impl<T: Persist, const N: usize> Persist for [T; N] {
    const STRATEGY: Strategy = if T::STRATEGY.is_trivial() {
        Strategy::TrivialCopy
    } else {
        Strategy::ContainerRecursive
    };
    const MIN_ENCODED_LEN: usize = T::MIN_ENCODED_LEN.saturating_mul(N);

    #[inline]
    fn save<W: ByteSink>(&self, ar: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError> {
        T::save_slice(self, ar)
    }

    #[inline]
    fn load<R: ByteSource>(&mut self, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError> {
        T::load_slice(self, ar)
    }

    // Runs of arrays are runs of `T`: one bulk call when `T` is trivial.

    #[inline]
    fn save_slice<W: ByteSink>(
        items: &[Self],
        ar: &mut OutputArchive<'_, W>,
    ) -> Result<(), ArchiveError> {
        T::save_slice(items.as_flattened(), ar)
    }

    #[inline]
    fn load_slice<R: ByteSource>(
        items: &mut [Self],
        ar: &mut InputArchive<'_, R>,
    ) -> Result<(), ArchiveError> {
        T::load_slice(items.as_flattened_mut(), ar)
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
// Box

/// Writes the boxed value; the box itself is never copied byte-wise.
impl<T: Persist> Persist for Box<T> {
    const STRATEGY: Strategy = Strategy::MemberDefined;
    const MIN_ENCODED_LEN: usize = T::MIN_ENCODED_LEN;

    #[inline]
    fn save<W: ByteSink>(&self, ar: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError> {
        (**self).save(ar)
    }

    #[inline]
    fn load<R: ByteSource>(&mut self, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError> {
        (**self).load(ar)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::channel::ByteSink;
    use crate::classify::strategy_of;
    use crate::{ChannelError, InputArchive, OutputArchive, Persist, Registry, Strategy};
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct CallCounter {
        bytes: Vec<u8>,
        writes: usize,
    }

    impl ByteSink for CallCounter {
        fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
            self.writes += 1;
            self.bytes.extend_from_slice(bytes);
            Ok(())
        }
    }

    fn count_writes<T: Persist>(value: &T) -> (usize, Vec<u8>) {
        let mut sink = CallCounter::default();
        OutputArchive::with_registry(&mut sink, Registry::empty_ref())
            .save(value)
            .unwrap();
        (sink.writes, sink.bytes)
    }

    #[test]
    fn array_strategy_follows_elements() {
        assert_eq!(strategy_of::<[u16; 4]>(), Strategy::TrivialCopy);
        assert_eq!(strategy_of::<[String; 2]>(), Strategy::ContainerRecursive);
        assert_eq!(<[u16; 4]>::MIN_ENCODED_LEN, 8);
    }

    #[test]
    fn boxes_are_not_trivial() {
        assert_eq!(strategy_of::<Box<u32>>(), Strategy::MemberDefined);
        assert_eq!(strategy_of::<Vec<Box<u32>>>(), Strategy::ContainerRecursive);
    }

    #[test]
    fn runs_of_trivial_arrays_are_one_write() {
        let arrays = vec![[1.0_f32, 2.0, 3.0]; 100];
        let (writes, bytes) = count_writes(&arrays);
        assert_eq!(writes, 2);
        assert_eq!(bytes.len(), 8 + 100 * 12);

        let (flat_writes, flat_bytes) = count_writes(&arrays.as_flattened().to_vec());
        assert_eq!(flat_writes, 2);
        assert_eq!(flat_bytes, bytes);

        let mut ar = InputArchive::with_registry(bytes.as_slice(), Registry::empty_ref());
        assert_eq!(ar.load_new::<Vec<[f32; 3]>>().unwrap(), arrays);

        let boxed: Box<[[u8; 16]]> = vec![[7_u8; 16]; 4].into_boxed_slice();
        assert_eq!(count_writes(&boxed).0, 2);
    }

    #[test]
    fn runs_of_non_trivial_arrays_round_trip() {
        let value = vec![[String::from("a"), String::new()], [String::from("bc"), String::from("d")]];
        let mut bytes = Vec::new();
        OutputArchive::with_registry(&mut bytes, Registry::empty_ref())
            .save(&value)
            .unwrap();
        let mut ar = InputArchive::with_registry(bytes.as_slice(), Registry::empty_ref());
        assert_eq!(ar.load_new::<Vec<[String; 2]>>().unwrap(), value);
    }

    #[test]
    fn composite_round_trip() {
        let value = (3_i32, 7_i32, vec![1_i32, 2, 3]);
        let mut bytes = Vec::new();
        OutputArchive::with_registry(&mut bytes, Registry::empty_ref())
            .save(&value)
            .unwrap();
        assert_eq!(bytes.len(), 4 + 4 + 8 + 3 * 4);

        let mut ar = InputArchive::with_registry(bytes.as_slice(), Registry::empty_ref());
        assert_eq!(ar.load_new::<(i32, i32, Vec<i32>)>().unwrap(), value);
    }

    #[test]
    fn arrays_and_boxes() {
        let value = ([[1_u8, 2], [3, 4]], Box::new(9_u64));
        let mut bytes = Vec::new();
        OutputArchive::with_registry(&mut bytes, Registry::empty_ref())
            .save(&value)
            .unwrap();
        assert_eq!(bytes.len(), 4 + 8);

        let mut ar = InputArchive::with_registry(bytes.as_slice(), Registry::empty_ref());
        assert_eq!(ar.load_new::<([[u8; 2]; 2], Box<u64>)>().unwrap(), value);
    }
}
