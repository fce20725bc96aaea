use crate::ChannelError;
use crate::channel::ByteSink;

/// A sink writing into a caller-provided buffer.
///
/// A write that does not fit fails with [`ChannelError::ShortWrite`] and
/// leaves the buffer untouched.
///
/// # Examples
///
/// ```
/// use pr_archive::OutputArchive;
/// use pr_archive::channel::SliceWriter;
///
/// let mut buf = [0_u8; 6];
/// let mut writer = SliceWriter::new(&mut buf);
/// let mut ar = OutputArchive::new(&mut writer);
/// ar.save(&0x0102_0304_u32).unwrap();
/// assert!(ar.save(&0_u32).is_err());
/// drop(ar);
///
/// assert_eq!(writer.written(), 4);
/// ```
#[derive(Debug)]
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceWriter<'a> {
    /// Creates a writer starting at the front of `buf`.
    #[inline]
    pub const fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes written so far.
    #[inline]
    pub const fn written(&self) -> usize {
        self.pos
    }

    /// Number of bytes still free.
    #[inline]
    pub const fn capacity_left(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// The written prefix of the buffer.
    #[inline]
    pub fn as_written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }
}

impl ByteSink for SliceWriter<'_> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        let end = self.pos + bytes.len();
        let Some(dst) = self.buf.get_mut(self.pos..end) else {
            return Err(ChannelError::ShortWrite {
                requested: bytes.len(),
                written: 0,
            });
        };
        dst.copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }
}
