use thiserror::Error;

// -----------------------------------------------------------------------------
// ChannelError

/// Failure of the byte channel under an archive.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChannelError {
    /// The source ran out before a read was satisfied.
    #[error("unexpected end of input: needed {needed} bytes, {available} available")]
    UnexpectedEnd { needed: usize, available: usize },

    /// The sink accepted fewer bytes than requested.
    #[error("short write: {written} of {requested} bytes accepted")]
    ShortWrite { requested: usize, written: usize },

    /// The underlying reader or writer failed.
    #[cfg(feature = "std")]
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

// -----------------------------------------------------------------------------
// ArchiveError

/// Error returned by every fallible archive operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArchiveError {
    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("container length {0} does not fit in usize")]
    LengthOverflow(u64),

    #[error("container length {len} exceeds the configured limit {limit}")]
    LengthLimit { len: usize, limit: usize },

    #[error("container length {len} needs more than the {remaining} bytes left in the input")]
    LengthExceedsInput { len: usize, remaining: usize },

    #[error("decoded string is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid bool byte {0:#04x}")]
    InvalidBool(u8),

    #[error("invalid char scalar {0:#x}")]
    InvalidChar(u32),

    #[error("invalid variant index {index} for `{type_name}`")]
    InvalidVariant {
        type_name: &'static str,
        index: u32,
    },

    #[error("option encoded with length {0}, expected 0 or 1")]
    InvalidOptionLen(usize),

    #[error("no external codec registered for `{type_name}`")]
    Unregistered { type_name: &'static str },

    #[error("type mismatch: expected `{expected}` ({expected_fingerprint:#018x}), found {found:#018x}")]
    TypeMismatch {
        expected: &'static str,
        expected_fingerprint: u64,
        found: u64,
    },

    #[error("record declared {expected} bytes but {consumed} were consumed")]
    RecordLength { expected: usize, consumed: usize },
}

impl ArchiveError {
    /// Returns `true` if the error came from the byte channel.
    #[inline]
    pub fn is_channel(&self) -> bool {
        matches!(self, Self::Channel(_))
    }

    /// Returns `true` for a read that ran past the end of the input.
    #[inline]
    pub fn is_unexpected_end(&self) -> bool {
        matches!(self, Self::Channel(ChannelError::UnexpectedEnd { .. }))
    }
}

// -----------------------------------------------------------------------------
// RegistryError

/// Error returned while building or installing a [`Registry`](crate::Registry).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("`{type_name}` already has an external codec")]
    Duplicate { type_name: &'static str },

    #[error("the global registry is already initialized")]
    AlreadyInstalled,
}

// -----------------------------------------------------------------------------
// Tests
