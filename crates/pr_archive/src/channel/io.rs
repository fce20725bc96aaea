use std::io::{ErrorKind, Read, Write};

use crate::ChannelError;
use crate::channel::{ByteSink, ByteSource};

// -----------------------------------------------------------------------------
// IoSink

/// A sink over any [`Write`].
///
/// Writes are forwarded as they come; wrap the writer in a
/// [`BufWriter`](std::io::BufWriter) for small-write workloads.
#[derive(Debug)]
pub struct IoSink<W: Write>(pub W);

impl<W: Write> IoSink<W> {
    #[inline]
    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W: Write> ByteSink for IoSink<W> {
    fn write_bytes(&mut self, mut bytes: &[u8]) -> Result<(), ChannelError> {
        let requested = bytes.len();
        while !bytes.is_empty() {
            match self.0.write(bytes) {
                Ok(0) => {
                    return Err(ChannelError::ShortWrite {
                        requested,
                        written: requested - bytes.len(),
                    });
                }
                Ok(n) => bytes = &bytes[n..],
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ChannelError> {
        Ok(self.0.flush()?)
    }
}

// -----------------------------------------------------------------------------
// IoSource

/// A source over any [`Read`].
#[derive(Debug)]
pub struct IoSource<R: Read>(pub R);

impl<R: Read> IoSource<R> {
    #[inline]
    pub fn into_inner(self) -> R {
        self.0
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), ChannelError> {
        let needed = buf.len();
        let mut filled = 0;
        while filled < needed {
            match self.0.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(ChannelError::UnexpectedEnd {
                        needed,
                        available: filled,
                    });
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests
