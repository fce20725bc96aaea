use alloc::string::String;

use super::COUNT_LEN;
use crate::archive::{InputArchive, OutputArchive};
use crate::channel::{ByteSink, ByteSource};
use crate::{ArchiveError, Persist, Strategy};

/// `[byte count: u64][UTF-8 bytes]`, written and read in bulk.
impl Persist for String {
    const STRATEGY: Strategy = Strategy::ContainerRecursive;
    const MIN_ENCODED_LEN: usize = COUNT_LEN;

    #[inline]
    fn save<W: ByteSink>(&self, ar: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError> {
        ar.write_len(self.len())?;
        ar.write_bytes(self.as_bytes())
    }

    fn load<R: ByteSource>(&mut self, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError> {
        let len = ar.read_len(1)?;
        let bytes = ar.read_byte_vec(len)?;
        *self = String::from_utf8(bytes).map_err(|_| ArchiveError::InvalidUtf8)?;
        Ok(())
    }
}
