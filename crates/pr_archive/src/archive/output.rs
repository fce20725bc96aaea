use alloc::vec::Vec;
use core::any::type_name;
use core::mem;

use crate::archive::{Config, DynOutputArchive, Mode, TypeTrace, fingerprint};
use crate::channel::ByteSink;
use crate::{ArchiveError, Persist, Registry};

// -----------------------------------------------------------------------------
// OutputArchive

/// Writes values to a [`ByteSink`].
///
/// The sink is flushed when the archive is dropped; a failure there is
/// logged. Call [`flush`](Self::flush) to observe it instead.
///
/// Pass `&mut sink` to keep access to the sink after the archive is gone.
pub struct OutputArchive<'r, W: ByteSink> {
    sink: W,
    registry: &'r Registry,
    config: Config,
    flush_on_drop: bool,
    trace: TypeTrace,
}

impl<W: ByteSink> OutputArchive<'static, W> {
    /// Creates an archive using the process-wide registry.
    ///
    /// Without the `std` feature the registry is empty; use
    /// [`with_registry`](OutputArchive::with_registry) instead.
    #[inline]
    pub fn new(sink: W) -> Self {
        Self::with_registry(sink, Registry::ambient())
    }
}

impl<'r, W: ByteSink> OutputArchive<'r, W> {
    /// Creates an archive bound to an explicit registry.
    #[inline]
    pub fn with_registry(sink: W, registry: &'r Registry) -> Self {
        Self {
            sink,
            registry,
            config: Config::DEFAULT,
            flush_on_drop: true,
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
    pub fn sink(&self) -> &W {
        &self.sink
    }

    #[inline]
    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Appends raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ArchiveError> {
        Ok(self.sink.write_bytes(bytes)?)
    }

    /// Writes a container count as a native-order `u64`.
    #[inline]
    pub fn write_len(&mut self, len: usize) -> Result<(), ArchiveError> {
        self.write_bytes(&(len as u64).to_ne_bytes())
    }

    /// Writes `value` with the strategy of `T`.
    ///
    /// In [`Mode::Checked`] the bytes are framed with the fingerprint of `T`
    /// and their length.
    pub fn save<T: Persist>(&mut self, value: &T) -> Result<(), ArchiveError> {
        self.trace.enter(type_name::<T>());
        let result = match self.config.mode {
            Mode::Fast => value.save(self),
            Mode::Checked => self.save_framed(value),
        };
        self.trace.leave(&result);
        result
    }

    /// Writes `value` with the codec registered for `T`.
    ///
    /// Fails with [`ArchiveError::Unregistered`] if the registry has none.
    #[inline]
    pub fn save_registered<T: 'static>(&mut self, value: &T) -> Result<(), ArchiveError> {
        self.save_registered_all(core::iter::once(value))
    }

    /// Writes every value with the codec registered for `T`, looked up once.
    ///
    /// Nothing is looked up, and nothing fails, when `values` is empty.
    pub fn save_registered_all<'v, T: 'static>(
        &mut self,
        values: impl IntoIterator<Item = &'v T>,
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
            values.try_for_each(|value| (codec.save)(value, &mut *ar))
        });
        self.trace.leave(&result);
        result
    }

    /// Flushes the sink.
    #[inline]
    pub fn flush(&mut self) -> Result<(), ArchiveError> {
        Ok(self.sink.flush()?)
    }

    /// Runs `func` on a view of this archive with the sink type erased.
    pub fn with_dyn<O>(&mut self, func: impl FnOnce(&mut DynOutputArchive<'_, 'r>) -> O) -> O {
        let mut ar = OutputArchive {
            sink: &mut self.sink as &mut dyn ByteSink,
            registry: self.registry,
            config: self.config,
            flush_on_drop: false,
            trace: mem::take(&mut self.trace),
        };
        let out = func(&mut ar);
        self.trace = mem::take(&mut ar.trace);
        out
    }

    fn save_framed<T: Persist>(&mut self, value: &T) -> Result<(), ArchiveError> {
        let mut payload = Vec::new();
        {
            let mut scratch = OutputArchive {
                sink: &mut payload,
                registry: self.registry,
                config: self.config,
                flush_on_drop: false,
                trace: mem::take(&mut self.trace),
            };
            let result = value.save(&mut scratch);
            self.trace = mem::take(&mut scratch.trace);
            result?;
        }
        self.write_bytes(&fingerprint::<T>().to_ne_bytes())?;
        self.write_len(payload.len())?;
        self.write_bytes(&payload)
    }
}

impl<W: ByteSink> Drop for OutputArchive<'_, W> {
    fn drop(&mut self) {
        if self.flush_on_drop
            && let Err(e) = self.sink.flush()
        {
            log::error!("flushing an output archive on drop failed: {e}");
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
