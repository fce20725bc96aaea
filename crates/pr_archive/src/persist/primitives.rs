use core::marker::PhantomData;

use crate::archive::{InputArchive, OutputArchive};
use crate::channel::{ByteSink, ByteSource};
use crate::{ArchiveError, Persist, Strategy};

// -----------------------------------------------------------------------------
// Numbers

crate::impl_trivial!(u8, u16, u32, u64, u128, usize);
crate::impl_trivial!(i8, i16, i32, i64, i128, isize);
crate::impl_trivial!(f32, f64);

// -----------------------------------------------------------------------------
// bool & char

// Copied by width like trivial types, but not every bit pattern is a
// valid value, so reads are checked.

impl Persist for bool {
    const STRATEGY: Strategy = Strategy::TrivialCopy;
    const MIN_ENCODED_LEN: usize = 1;

    #[inline]
    fn save<W: ByteSink>(&self, ar: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError> {
        ar.write_bytes(&[*self as u8])
    }

    #[inline]
    fn load<R: ByteSource>(&mut self, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError> {
        let mut byte = 0_u8;
        byte.load(ar)?;
        *self = match byte {
            0 => false,
            1 => true,
            _ => return Err(ArchiveError::InvalidBool(byte)),
        };
        Ok(())
    }

    #[inline]
    fn save_slice<W: ByteSink>(
        items: &[Self],
        ar: &mut OutputArchive<'_, W>,
    ) -> Result<(), ArchiveError> {
        ar.write_bytes(bytemuck::cast_slice(items))
    }
}

impl Persist for char {
    const STRATEGY: Strategy = Strategy::TrivialCopy;
    const MIN_ENCODED_LEN: usize = 4;

    #[inline]
    fn save<W: ByteSink>(&self, ar: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError> {
        (*self as u32).save(ar)
    }

    #[inline]
    fn load<R: ByteSource>(&mut self, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError> {
        let mut scalar = 0_u32;
        scalar.load(ar)?;
        *self = char::from_u32(scalar).ok_or(ArchiveError::InvalidChar(scalar))?;
        Ok(())
    }

    #[inline]
    fn save_slice<W: ByteSink>(
        items: &[Self],
        ar: &mut OutputArchive<'_, W>,
    ) -> Result<(), ArchiveError> {
        ar.write_bytes(bytemuck::cast_slice(items))
    }
}

// -----------------------------------------------------------------------------
// Zero-sized

impl Persist for () {
    const STRATEGY: Strategy = Strategy::TrivialCopy;

    #[inline]
    fn save<W: ByteSink>(&self, _: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError> {
        Ok(())
    }

    #[inline]
    fn load<R: ByteSource>(&mut self, _: &mut InputArchive<'_, R>) -> Result<(), ArchiveError> {
        Ok(())
    }
}

impl<T: ?Sized> Persist for PhantomData<T> {
    const STRATEGY: Strategy = Strategy::TrivialCopy;

    #[inline]
    fn save<W: ByteSink>(&self, _: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError> {
        Ok(())
    }

    #[inline]
    fn load<R: ByteSource>(&mut self, _: &mut InputArchive<'_, R>) -> Result<(), ArchiveError> {
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::{ArchiveError, InputArchive, OutputArchive, Registry};
    use alloc::vec::Vec;

    #[test]
    fn floats_keep_their_bits() {
        let values = [0.0_f64, -0.0, f64::INFINITY, f64::from_bits(0x7FF8_0000_0000_0001)];
        let mut bytes = Vec::new();
        {
            let mut ar = OutputArchive::with_registry(&mut bytes, Registry::empty_ref());
            values.iter().for_each(|v| ar.save(v).unwrap());
        }

        let mut ar = InputArchive::with_registry(bytes.as_slice(), Registry::empty_ref());
        for v in values {
            assert_eq!(ar.load_new::<f64>().unwrap().to_bits(), v.to_bits());
        }
    }

    #[test]
    fn bool_and_char_are_validated() {
        let mut ar = InputArchive::with_registry(&[1_u8, 2][..], Registry::empty_ref());
        assert!(ar.load_new::<bool>().unwrap());
        assert!(matches!(ar.load_new::<bool>(), Err(ArchiveError::InvalidBool(2))));

        let surrogate = 0xD800_u32.to_ne_bytes();
        let mut ar = InputArchive::with_registry(&surrogate[..], Registry::empty_ref());
        assert!(matches!(ar.load_new::<char>(), Err(ArchiveError::InvalidChar(0xD800))));
    }

    #[test]
    fn bool_slices_match_single_writes() {
        let flags = [true, false, true];
        let mut bytes = Vec::new();
        OutputArchive::with_registry(&mut bytes, Registry::empty_ref())
            .save(&flags)
            .unwrap();
        assert_eq!(bytes, [1, 0, 1]);
    }

    #[test]
    fn unit_writes_nothing() {
        let mut bytes = Vec::new();
        OutputArchive::with_registry(&mut bytes, Registry::empty_ref())
            .save(&((), core::marker::PhantomData::<u64>))
            .unwrap();
        assert!(bytes.is_empty());
    }
}
