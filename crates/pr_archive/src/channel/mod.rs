//! Byte channels an archive writes to and reads from.
//!
//! An archive needs two primitives only: "write these bytes" and "fill this
//! buffer". [`ByteSink`] and [`ByteSource`] name them; both are
//! dyn-compatible so that registered codecs can work through
//! `&mut dyn ByteSink`.
//!
//! Provided channels:
//!
//! - `Vec<u8>` as a sink, appending.
//! - `&[u8]` as a source, advancing the slice.
//! - [`SliceWriter`], a sink over a fixed buffer.
//! - [`Limited`], a source capped to a number of bytes.
//! - [`IoSink`] and [`IoSource`] over `std::io` (feature `std`).
//! - `&mut S` for any channel `S`.

use alloc::vec::Vec;

use crate::ChannelError;

// -----------------------------------------------------------------------------
// Modules

mod limited;
mod slice;

crate::cfg::std! {
    mod io;
    pub use io::{IoSink, IoSource};
}

// -----------------------------------------------------------------------------
// Exports

pub use limited::Limited;
pub use slice::SliceWriter;

// -----------------------------------------------------------------------------
// ByteSink

/// Destination of an output archive.
pub trait ByteSink {
    /// Writes all of `bytes`, or fails.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ChannelError>;

    /// Pushes buffered bytes to their final destination.
    ///
    /// The default does nothing.
    #[inline]
    fn flush(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// ByteSource

/// Origin of an input archive.
pub trait ByteSource {
    /// Fills `buf` completely, or fails with [`ChannelError::UnexpectedEnd`].
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), ChannelError>;

    /// Number of bytes left, if the source knows it.
    ///
    /// Used to reject container counts that cannot possibly be satisfied.
    #[inline]
    fn remaining_hint(&self) -> Option<usize> {
        None
    }
}

// -----------------------------------------------------------------------------
// Impls

impl ByteSink for Vec<u8> {
    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl ByteSource for &[u8] {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), ChannelError> {
        let Some((head, tail)) = self.split_at_checked(buf.len()) else {
            return Err(ChannelError::UnexpectedEnd {
                needed: buf.len(),
                available: self.len(),
            });
        };
        buf.copy_from_slice(head);
        *self = tail;
        Ok(())
    }

    #[inline]
    fn remaining_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        (**self).write_bytes(bytes)
    }

    #[inline]
    fn flush(&mut self) -> Result<(), ChannelError> {
        (**self).flush()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), ChannelError> {
        (**self).read_bytes(buf)
    }

    #[inline]
    fn remaining_hint(&self) -> Option<usize> {
        (**self).remaining_hint()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ByteSink, ByteSource};
    use crate::ChannelError;
    use alloc::vec::Vec;

    #[test]
    fn vec_appends() {
        let mut sink = Vec::new();
        sink.write_bytes(&[1, 2]).unwrap();
        sink.write_bytes(&[3]).unwrap();
        sink.flush().unwrap();
        assert_eq!(sink, [1, 2, 3]);
    }

    #[test]
    fn slice_advances() {
        let data = [1_u8, 2, 3, 4, 5];
        let mut source = &data[..];
        let mut buf = [0; 2];

        source.read_bytes(&mut buf).unwrap();
        assert_eq!(buf, [1, 2]);
        assert_eq!(source.remaining_hint(), Some(3));

        source.read_bytes(&mut buf).unwrap();
        assert_eq!(buf, [3, 4]);
    }

    #[test]
    fn short_read_is_unexpected_end() {
        let data = [9_u8];
        let mut source = &data[..];
        let mut buf = [0; 4];

        let err = source.read_bytes(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            ChannelError::UnexpectedEnd {
                needed: 4,
                available: 1
            }
        ));
        // A failed read consumes nothing.
        assert_eq!(source, [9]);
    }

    #[test]
    fn dyn_forwarding() {
        let mut sink = Vec::new();
        {
            let mut dyn_sink: &mut dyn ByteSink = &mut sink;
            (&mut dyn_sink).write_bytes(b"ok").unwrap();
        }
        assert_eq!(sink, b"ok");
    }
}
