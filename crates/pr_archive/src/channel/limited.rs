use crate::ChannelError;
use crate::channel::ByteSource;

/// A source that yields at most `limit` bytes of an inner source.
///
/// Checked-mode records are decoded through a `Limited` so that a payload
/// cannot read into the next record.
///
/// # Examples
///
/// ```
/// use pr_archive::channel::{ByteSource, Limited};
///
/// let data = [1_u8, 2, 3, 4];
/// let mut limited = Limited::new(&data[..], 2);
/// let mut buf = [0; 2];
/// limited.read_bytes(&mut buf).unwrap();
/// assert!(limited.read_bytes(&mut buf).is_err());
/// assert_eq!(limited.into_inner(), [3, 4]);
/// ```
#[derive(Debug)]
pub struct Limited<S> {
    inner: S,
    left: usize,
}

impl<S: ByteSource> Limited<S> {
    #[inline]
    pub const fn new(inner: S, limit: usize) -> Self {
        Self { inner, left: limit }
    }

    /// Bytes that may still be read.
    #[inline]
    pub const fn left(&self) -> usize {
        self.left
    }

    #[inline]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ByteSource> ByteSource for Limited<S> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), ChannelError> {
        if buf.len() > self.left {
            return Err(ChannelError::UnexpectedEnd {
                needed: buf.len(),
                available: self.left,
            });
        }
        self.inner.read_bytes(buf)?;
        self.left -= buf.len();
        Ok(())
    }

    fn remaining_hint(&self) -> Option<usize> {
        match self.inner.remaining_hint() {
            Some(n) => Some(n.min(self.left)),
            None => Some(self.left),
        }
    }
}
