use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet, LinkedList, VecDeque};
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};

use super::{Associative, COUNT_LEN, Sequence};
use super::{load_associative, load_sequence, save_associative, save_sequence};
use crate::archive::{InputArchive, OutputArchive};
use crate::channel::{ByteSink, ByteSource};
use crate::{ArchiveError, Persist, Strategy};

// -----------------------------------------------------------------------------
// Persist forwarding

macro_rules! impl_persist_sequence {
    (impl<$($gen:ident),*> for $ty:ty where $($bounds:tt)*) => {
        impl<$($gen),*> Persist for $ty
        where
            $($bounds)*
        {
            const STRATEGY: Strategy = Strategy::ContainerRecursive;
            const MIN_ENCODED_LEN: usize = COUNT_LEN;

            #[inline]
            fn save<W: ByteSink>(&self, ar: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError> {
                save_sequence(self, ar)
            }

            #[inline]
            fn load<R: ByteSource>(&mut self, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError> {
                load_sequence(self, ar)
            }
        }
    };
}

macro_rules! impl_persist_associative {
    (impl<$($gen:ident),*> for $ty:ty where $($bounds:tt)*) => {
        impl<$($gen),*> Persist for $ty
        where
            $($bounds)*
        {
            const STRATEGY: Strategy = Strategy::ContainerRecursive;
            const MIN_ENCODED_LEN: usize = COUNT_LEN;

            #[inline]
            fn save<W: ByteSink>(&self, ar: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError> {
                save_associative(self, ar)
            }

            #[inline]
            fn load<R: ByteSource>(&mut self, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError> {
                load_associative(self, ar)
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Vec

impl<T: Persist> Sequence for Vec<T> {
    type Item = T;
    const CONTIGUOUS: bool = true;

    #[inline]
    fn seq_len(&self) -> usize {
        self.len()
    }

    #[inline]
    fn seq_iter(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    #[inline]
    fn seq_slices(&self) -> Option<(&[T], &[T])> {
        Some((self.as_slice(), &[][..]))
    }

    #[inline]
    fn seq_reserve(&mut self, additional: usize) {
        self.reserve(additional);
    }

    #[inline]
    fn seq_push(&mut self, item: T) {
        self.push(item);
    }

    #[inline]
    fn seq_from_vec(items: Vec<T>) -> Self {
        items
    }
}

impl_persist_sequence!(impl<T> for Vec<T> where T: Persist + Default);

// -----------------------------------------------------------------------------
// VecDeque

impl<T: Persist> Sequence for VecDeque<T> {
    type Item = T;
    const CONTIGUOUS: bool = true;

    #[inline]
    fn seq_len(&self) -> usize {
        self.len()
    }

    #[inline]
    fn seq_iter(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    #[inline]
    fn seq_slices(&self) -> Option<(&[T], &[T])> {
        Some(self.as_slices())
    }

    #[inline]
    fn seq_reserve(&mut self, additional: usize) {
        self.reserve(additional);
    }

    #[inline]
    fn seq_push(&mut self, item: T) {
        self.push_back(item);
    }

    #[inline]
    fn seq_from_vec(items: Vec<T>) -> Self {
        VecDeque::from(items)
    }
}

impl_persist_sequence!(impl<T> for VecDeque<T> where T: Persist + Default);

// -----------------------------------------------------------------------------
// LinkedList

impl<T: Persist> Sequence for LinkedList<T> {
    type Item = T;

    #[inline]
    fn seq_len(&self) -> usize {
        self.len()
    }

    #[inline]
    fn seq_iter(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    #[inline]
    fn seq_push(&mut self, item: T) {
        self.push_back(item);
    }
}

impl_persist_sequence!(impl<T> for LinkedList<T> where T: Persist + Default);

// -----------------------------------------------------------------------------
// BTreeSet & BTreeMap

impl<T: Persist + Ord> Sequence for BTreeSet<T> {
    type Item = T;

    #[inline]
    fn seq_len(&self) -> usize {
        self.len()
    }

    #[inline]
    fn seq_iter(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    #[inline]
    fn seq_push(&mut self, item: T) {
        self.insert(item);
    }
}

impl_persist_sequence!(impl<T> for BTreeSet<T> where T: Persist + Ord + Default);

impl<K: Persist + Ord, V: Persist> Associative for BTreeMap<K, V> {
    type Key = K;
    type Value = V;

    #[inline]
    fn map_len(&self) -> usize {
        self.len()
    }

    #[inline]
    fn map_iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }

    #[inline]
    fn map_insert(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

impl_persist_associative!(impl<K, V> for BTreeMap<K, V> where K: Persist + Ord + Default, V: Persist + Default);

// -----------------------------------------------------------------------------
// Hash containers

macro_rules! impl_hash_containers {
    ($map:ident, $set:ident) => {
        impl<T, S> Sequence for $set<T, S>
        where
            T: Persist + Eq + Hash,
            S: BuildHasher + Default,
        {
            type Item = T;

            #[inline]
            fn seq_len(&self) -> usize {
                self.len()
            }

            #[inline]
            fn seq_iter(&self) -> impl Iterator<Item = &T> {
                self.iter()
            }

            #[inline]
            fn seq_reserve(&mut self, additional: usize) {
                self.reserve(additional);
            }

            #[inline]
            fn seq_push(&mut self, item: T) {
                self.insert(item);
            }
        }

        impl_persist_sequence!(
            impl<T, S> for $set<T, S>
            where T: Persist + Eq + Hash + Default, S: BuildHasher + Default
        );

        impl<K, V, S> Associative for $map<K, V, S>
        where
            K: Persist + Eq + Hash,
            V: Persist,
            S: BuildHasher + Default,
        {
            type Key = K;
            type Value = V;

            #[inline]
            fn map_len(&self) -> usize {
                self.len()
            }

            #[inline]
            fn map_iter(&self) -> impl Iterator<Item = (&K, &V)> {
                self.iter()
            }

            #[inline]
            fn map_reserve(&mut self, additional: usize) {
                self.reserve(additional);
            }

            #[inline]
            fn map_insert(&mut self, key: K, value: V) {
                self.insert(key, value);
            }
        }

        impl_persist_associative!(
            impl<K, V, S> for $map<K, V, S>
            where K: Persist + Eq + Hash + Default, V: Persist + Default, S: BuildHasher + Default
        );
    };
}

mod hashbrown_impls {
    use super::*;
    use pr_utils::hash::hashbrown::{HashMap, HashSet};

    impl_hash_containers!(HashMap, HashSet);
}

crate::cfg::std! {
    mod std_impls {
        use super::*;
        use std::collections::{HashMap, HashSet};

        impl_hash_containers!(HashMap, HashSet);
    }
}

// -----------------------------------------------------------------------------
// Box<[T]>

impl<T: Persist + Default> Persist for Box<[T]> {
    const STRATEGY: Strategy = Strategy::ContainerRecursive;
    const MIN_ENCODED_LEN: usize = COUNT_LEN;

    #[inline]
    fn save<W: ByteSink>(&self, ar: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError> {
        ar.write_len(self.len())?;
        T::save_slice(self, ar)
    }

    fn load<R: ByteSource>(&mut self, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError> {
        let mut items = Vec::new();
        load_sequence(&mut items, ar)?;
        *self = items.into_boxed_slice();
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Option

/// A sequence of at most one element.
impl<T: Persist + Default> Persist for Option<T> {
    const STRATEGY: Strategy = Strategy::ContainerRecursive;
    const MIN_ENCODED_LEN: usize = COUNT_LEN;

    #[inline]
    fn save<W: ByteSink>(&self, ar: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError> {
        match self {
            Some(value) => {
                ar.write_len(1)?;
                value.save(ar)
            }
            None => ar.write_len(0),
        }
    }

    fn load<R: ByteSource>(&mut self, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError> {
        match ar.read_len(0)? {
            0 => *self = None,
            1 => self.get_or_insert_with(T::default).load(ar)?,
            len => return Err(ArchiveError::InvalidOptionLen(len)),
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::{ArchiveError, InputArchive, OutputArchive, Persist, Registry};
    use alloc::boxed::Box;
    use alloc::collections::{BTreeMap, BTreeSet, LinkedList, VecDeque};
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use pr_utils::hash::HashMap;

    fn encode<T: Persist>(value: &T) -> Vec<u8> {
        let mut bytes = Vec::new();
        OutputArchive::with_registry(&mut bytes, Registry::empty_ref())
            .save(value)
            .unwrap();
        bytes
    }

    fn decode<T: Persist + Default>(bytes: &[u8]) -> T {
        let mut ar = InputArchive::with_registry(bytes, Registry::empty_ref());
        let value = ar.load_new().unwrap();
        assert_eq!(ar.remaining(), Some(0));
        value
    }

    #[test]
    fn vec_of_floats() {
        let value = vec![1.0_f64; 10];
        let bytes = encode(&value);
        assert_eq!(bytes.len(), 8 + 10 * 8);
        assert_eq!(bytes[..8], 10_u64.to_ne_bytes());
        assert_eq!(decode::<Vec<f64>>(&bytes), value);
    }

    #[test]
    fn empty_container_is_a_zero_count() {
        let bytes = encode(&Vec::<u32>::new());
        assert_eq!(bytes, 0_u64.to_ne_bytes());
        assert!(decode::<Vec<u32>>(&bytes).is_empty());
    }

    #[test]
    fn decoding_replaces_previous_contents() {
        let bytes = encode(&vec![7_u8]);
        let mut target = vec![1_u8, 2, 3];
        let mut ar = InputArchive::with_registry(bytes.as_slice(), Registry::empty_ref());
        ar.load(&mut target).unwrap();
        assert_eq!(target, [7]);
    }

    #[derive(Default)]
    struct WriteCounter(usize);

    impl crate::channel::ByteSink for WriteCounter {
        fn write_bytes(&mut self, _: &[u8]) -> Result<(), crate::ChannelError> {
            self.0 += 1;
            Ok(())
        }
    }

    fn writes<T: Persist>(value: &T) -> usize {
        let mut sink = WriteCounter::default();
        OutputArchive::with_registry(&mut sink, Registry::empty_ref())
            .save(value)
            .unwrap();
        sink.0
    }

    #[test]
    fn contiguous_runs_are_written_in_bulk() {
        assert_eq!(writes(&vec![1.0_f32; 300]), 2);
        assert_eq!(writes(&Vec::<f32>::new()), 2);

        let mut wrapped = VecDeque::with_capacity(4);
        wrapped.extend([3_u16, 4]);
        wrapped.push_front(2);
        assert_eq!(wrapped.as_slices().1.len(), 2);
        assert_eq!(writes(&wrapped), 3);
    }

    #[test]
    fn wrapped_deque_matches_vec() {
        let mut deque = VecDeque::with_capacity(4);
        deque.extend([3_u16, 4]);
        deque.push_front(2);
        deque.push_front(1);

        let bytes = encode(&deque);
        assert_eq!(bytes, encode(&vec![1_u16, 2, 3, 4]));
        assert_eq!(decode::<VecDeque<u16>>(&bytes), deque);
    }

    #[test]
    fn nested_containers() {
        let value: Vec<Vec<String>> = vec![vec![], vec![String::from("a"), String::from("bc")]];
        assert_eq!(decode::<Vec<Vec<String>>>(&encode(&value)), value);

        let list: LinkedList<Option<i64>> = [Some(-1), None, Some(2)].into_iter().collect();
        assert_eq!(decode::<LinkedList<Option<i64>>>(&encode(&list)), list);

        let boxed: Box<[u32]> = vec![5, 6].into_boxed_slice();
        assert_eq!(decode::<Box<[u32]>>(&encode(&boxed)), boxed);
    }

    #[test]
    fn ordered_and_hashed_maps() {
        let set: BTreeSet<u8> = [3, 1, 2].into_iter().collect();
        assert_eq!(decode::<BTreeSet<u8>>(&encode(&set)), set);

        let mut map = BTreeMap::new();
        map.insert(String::from("x"), vec![1_u8]);
        map.insert(String::from("y"), vec![]);
        assert_eq!(decode::<BTreeMap<String, Vec<u8>>>(&encode(&map)), map);

        let hashed: HashMap<u32, bool> = [(1, true), (2, false)].into_iter().collect();
        assert_eq!(decode::<HashMap<u32, bool>>(&encode(&hashed)), hashed);
    }

    #[cfg(feature = "std")]
    #[test]
    fn std_hash_containers() {
        let set: std::collections::HashSet<i16> = [-4, 9].into_iter().collect();
        assert_eq!(decode::<std::collections::HashSet<i16>>(&encode(&set)), set);
    }

    #[test]
    fn option_counts() {
        assert_eq!(encode(&None::<u8>), 0_u64.to_ne_bytes());
        assert_eq!(decode::<Option<u8>>(&encode(&Some(4_u8))), Some(4));

        let bytes = 2_u64.to_ne_bytes();
        let mut ar = InputArchive::with_registry(&bytes[..], Registry::empty_ref());
        assert!(matches!(
            ar.load_new::<Option<u8>>(),
            Err(ArchiveError::InvalidOptionLen(2))
        ));
    }
}
