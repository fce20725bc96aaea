use alloc::vec::Vec;
use core::any::type_name;
use core::mem;

use crate::archive::{Config, DynInputArchive, Mode, TypeTrace, fingerprint, prealloc_len};
use crate::channel::{ByteSource, Limited};
use crate::{ArchiveError, Persist, Registry};

// -----------------------------------------------------------------------------
// InputArchive

/// Reads values from a [`ByteSource`].
///
/// Reads must repeat the writer's sequence of types. In [`Mode::Fast`] a
/// diverging reader gets unspecified values, not an error.
pub struct InputArchive<'r, R: ByteSource> {
    source: R,
    registry: &'r Registry,
    config: Config,
    trace: TypeTrace,
}

impl<R: ByteSource> InputArchive<'static, R> {
    /// Creates an archive using the process-wide registry.
    ///
    /// Without the `std` feature the registry is empty; use
    /// [`with_registry`](InputArchive::with_registry) instead.
    #[inline]
    pub fn new(source: R) -> Self {
        Self::with_registry(source, Registry::ambient())
    }
}

impl<'r, R: ByteSource> InputArchive<'r, R> {
    /// Creates an archive bound to an explicit registry.
    #[inline]
    pub fn with_registry(source: R, registry: &'r Registry) -> Self {
        Self {
            source,
            registry,
            config: Config::DEFAULT,
            trace: TypeTrace::default(),
        }
    }

    /// Replaces the configuration.
    #[inline]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    #[inline]
    pub fn source(&self) -> &R {
        &self.source
    }

    #[inline]
    pub fn into_source(self) -> R {
        self.source
    }

    /// Bytes left in the source, if it knows.
    #[inline]
    pub fn remaining(&self) -> Option<usize> {
        self.source.remaining_hint()
    }

    /// Fills `buf` from the source.
    #[inline]
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), ArchiveError> {
        Ok(self.source.read_bytes(buf)?)
    }

    /// Reads `len` raw bytes into a new buffer.
    ///
    /// `len` is checked like a container count of bytes.
    pub fn read_byte_vec(&mut self, len: usize) -> Result<Vec<u8>, ArchiveError> {
        self.check_len(len, 1)?;
        let step = prealloc_len::<u8>(len, self.remaining()).max(1);
        let mut buf = Vec::new();
        while buf.len() < len {
            let start = buf.len();
            buf.resize(start + step.min(len - start), 0);
            self.read_bytes(&mut buf[start..])?;
        }
        Ok(buf)
    }

    /// Reads a container count written by
    /// [`OutputArchive::write_len`](crate::OutputArchive::write_len).
    ///
    /// `min_item_len` is the smallest encoded size of one element; a count
    /// that cannot fit in the source's remaining bytes is rejected before
    /// anything is allocated.
    pub fn read_len(&mut self, min_item_len: usize) -> Result<usize, ArchiveError> {
        let raw = self.read_u64()?;
        let len = usize::try_from(raw).map_err(|_| ArchiveError::LengthOverflow(raw))?;
        self.check_len(len, min_item_len)?;
        Ok(len)
    }

    /// Reads into `value` with the strategy of `T`.
    ///
    /// In [`Mode::Checked`] the record's fingerprint and length are verified.
    pub fn load<T: Persist>(&mut self, value: &mut T) -> Result<(), ArchiveError> {
        self.trace.enter(type_name::<T>());
        let result = match self.config.mode {
            Mode::Fast => value.load(self),
            Mode::Checked => self.load_framed(value),
        };
        self.trace.leave(&result);
        result
    }

    /// Reads a new `T`, starting from `T::default()`.
    #[inline]
    pub fn load_new<T: Persist + Default>(&mut self) -> Result<T, ArchiveError> {
        let mut value = T::default();
        self.load(&mut value)?;
        Ok(value)
    }

    /// Reads into `value` with the codec registered for `T`.
    ///
    /// Fails with [`ArchiveError::Unregistered`] if the registry has none.
    #[inline]
    pub fn load_registered<T: 'static>(&mut self, value: &mut T) -> Result<(), ArchiveError> {
        self.load_registered_all(core::iter::once(value))
    }

    /// Reads into every value with the codec registered for `T`, looked up once.
    ///
    /// Nothing is looked up, and nothing fails, when `values` is empty.
    pub fn load_registered_all<'v, T: 'static>(
        &mut self,
        values: impl IntoIterator<Item = &'v mut T>,
    ) -> Result<(), ArchiveError> {
        let mut values = values.into_iter().peekable();
        if values.peek().is_none() {
            return Ok(());
        }

        let type_name = type_name::<T>();
        let registry = self.registry;
        let Some(codec) = registry.codec::<T>() else {
            return Err(ArchiveError::Unregistered { type_name });
        };
        self.trace.enter(type_name);
        let result = self.with_dyn(|ar| {
            values.try_for_each(|value| (codec.load)(value, &mut *ar))
        });
        self.trace.leave(&result);
        result
    }

    /// Runs `func` on a view of this archive with the source type erased.
    pub fn with_dyn<O>(&mut self, func: impl FnOnce(&mut DynInputArchive<'_, 'r>) -> O) -> O {
        let mut ar = InputArchive {
            source: &mut self.source as &mut dyn ByteSource,
            registry: self.registry,
            config: self.config,
            trace: mem::take(&mut self.trace),
        };
        let out = func(&mut ar);
        self.trace = ar.trace;
        out
    }

    fn check_len(&self, len: usize, min_item_len: usize) -> Result<(), ArchiveError> {
        let limit = self.config.max_len;
        if len > limit {
            return Err(ArchiveError::LengthLimit { len, limit });
        }
        if let Some(remaining) = self.remaining()
            && len.saturating_mul(min_item_len) > remaining
        {
            return Err(ArchiveError::LengthExceedsInput { len, remaining });
        }
        Ok(())
    }

    fn read_u64(&mut self) -> Result<u64, ArchiveError> {
        let mut buf = [0; 8];
        self.read_bytes(&mut buf)?;
        Ok(u64::from_ne_bytes(buf))
    }

    fn load_framed<T: Persist>(&mut self, value: &mut T) -> Result<(), ArchiveError> {
        let expected_fingerprint = fingerprint::<T>();
        let found = self.read_u64()?;
        if found != expected_fingerprint {
            return Err(ArchiveError::TypeMismatch {
                expected: type_name::<T>(),
                expected_fingerprint,
                found,
            });
        }

        let raw = self.read_u64()?;
        let expected = usize::try_from(raw).map_err(|_| ArchiveError::LengthOverflow(raw))?;
        if let Some(remaining) = self.remaining()
            && expected > remaining
        {
            return Err(ArchiveError::LengthExceedsInput {
                len: expected,
                remaining,
            });
        }

        // Nested records erase the source again, so the type stays finite.
        let mut scratch = InputArchive {
            source: Limited::new(&mut self.source as &mut dyn ByteSource, expected),
            registry: self.registry,
            config: self.config,
            trace: mem::take(&mut self.trace),
        };
        let result = value.load(&mut scratch);
        let left = scratch.source.left();
        self.trace = scratch.trace;
        result?;

        if left != 0 {
            return Err(ArchiveError::RecordLength {
                expected,
                consumed: expected - left,
            });
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::InputArchive;
    use crate::{ArchiveError, Config, OutputArchive, Registry};
    use alloc::vec;
    use alloc::vec::Vec;

    fn encode(config: Config, f: impl FnOnce(&mut OutputArchive<'_, &mut Vec<u8>>)) -> Vec<u8> {
        let mut bytes = Vec::new();
        let mut ar = OutputArchive::with_registry(&mut bytes, Registry::empty_ref()).with_config(config);
        f(&mut ar);
        drop(ar);
        bytes
    }

    fn reader(bytes: &[u8], config: Config) -> InputArchive<'static, &[u8]> {
        InputArchive::with_registry(bytes, Registry::empty_ref()).with_config(config)
    }

    #[test]
    fn scalar_round_trip() {
        let bytes = encode(Config::new(), |ar| {
            ar.save(&10_i32).unwrap();
            ar.save(&f32::NAN).unwrap();
        });

        let mut ar = reader(&bytes, Config::new());
        assert_eq!(ar.load_new::<i32>().unwrap(), 10);
        assert_eq!(ar.load_new::<f32>().unwrap().to_bits(), f32::NAN.to_bits());
        assert_eq!(ar.remaining(), Some(0));
    }

    #[test]
    fn short_input_is_a_channel_error() {
        let bytes = [1_u8, 2];
        let err = reader(&bytes, Config::new()).load_new::<u32>().unwrap_err();
        assert!(err.is_unexpected_end());
    }

    #[test]
    fn lengths_are_bounded() {
        let bytes = encode(Config::new(), |ar| ar.write_len(1000).unwrap());

        let err = reader(&bytes, Config::new().with_max_len(10)).read_len(1).unwrap_err();
        assert!(matches!(err, ArchiveError::LengthLimit { len: 1000, limit: 10 }));

        let err = reader(&bytes, Config::new()).read_len(4).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::LengthExceedsInput {
                len: 1000,
                remaining: 0
            }
        ));

        // Zero-sized elements need no input.
        assert_eq!(reader(&bytes, Config::new()).read_len(0).unwrap(), 1000);
    }

    #[test]
    fn overflowing_length() {
        if usize::BITS >= 64 {
            return;
        }
        let bytes = u64::MAX.to_ne_bytes();
        let err = reader(&bytes, Config::new()).read_len(1).unwrap_err();
        assert!(matches!(err, ArchiveError::LengthOverflow(u64::MAX)));
    }

    #[test]
    fn byte_vec() {
        let bytes = vec![5_u8; 300];
        let mut ar = reader(&bytes, Config::new());
        assert_eq!(ar.read_byte_vec(300).unwrap(), bytes);
        assert!(ar.read_byte_vec(1).is_err());
    }

    #[test]
    fn checked_round_trip() {
        let bytes = encode(Config::new().checked(), |ar| {
            ar.save(&3_u16).unwrap();
            ar.save(&vec![1_u8, 2, 3]).unwrap();
        });

        let mut ar = reader(&bytes, Config::new().checked());
        assert_eq!(ar.load_new::<u16>().unwrap(), 3);
        assert_eq!(ar.load_new::<Vec<u8>>().unwrap(), [1, 2, 3]);
        assert_eq!(ar.remaining(), Some(0));
    }

    #[test]
    fn checked_detects_reordering() {
        let bytes = encode(Config::new().checked(), |ar| {
            ar.save(&1_u32).unwrap();
            ar.save(&2.0_f32).unwrap();
        });

        // Fast mode has no way to notice.
        let mut fast = reader(&bytes, Config::new());
        assert!(fast.load_new::<f32>().is_ok());

        let mut ar = reader(&bytes, Config::new().checked());
        let err = ar.load_new::<f32>().unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::TypeMismatch { expected, .. } if expected == "f32"
        ));
    }

    #[test]
    fn checked_detects_short_decode() {
        // A `u32` record read back as a `u16` with the same fingerprint.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&crate::archive::fingerprint::<u16>().to_ne_bytes());
        bytes.extend_from_slice(&4_u64.to_ne_bytes());
        bytes.extend_from_slice(&7_u32.to_ne_bytes());

        let err = reader(&bytes, Config::new().checked()).load_new::<u16>().unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::RecordLength {
                expected: 4,
                consumed: 2
            }
        ));
    }

    #[test]
    fn checked_payload_cannot_overrun() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&crate::archive::fingerprint::<u32>().to_ne_bytes());
        bytes.extend_from_slice(&2_u64.to_ne_bytes());
        bytes.extend_from_slice(&[0; 4]);

        let err = reader(&bytes, Config::new().checked()).load_new::<u32>().unwrap_err();
        assert!(err.is_unexpected_end());
    }

    #[cfg(all(debug_assertions, feature = "debug"))]
    #[test]
    fn failures_keep_type_chain() {
        let bytes = [2_u8];
        let mut ar = reader(&bytes, Config::new());
        assert!(ar.load_new::<bool>().is_err());
        assert_eq!(ar.trace.failure(), Some(&["bool"][..]));
    }
}
