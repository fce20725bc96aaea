/// Whether archive-level `save` calls are framed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Raw bytes only.
    #[default]
    Fast,
    /// Each archive-level `save` writes `[fingerprint: u64][length: u64][payload]`
    /// and each `load` verifies both.
    Checked,
}

/// Runtime settings of an archive.
///
/// A reader must use the same [`Mode`] as the writer.
///
/// # Examples
///
/// ```
/// use pr_archive::{Config, Mode};
///
/// const STRICT: Config = Config::new().checked().with_max_len(1 << 20);
/// assert_eq!(STRICT.mode, Mode::Checked);
/// assert_eq!(STRICT.max_len, 1 << 20);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    pub mode: Mode,
    /// Largest container count accepted on decode.
    pub max_len: usize,
}

impl Config {
    /// Fast mode, counts up to `u32::MAX`.
    pub const DEFAULT: Self = Self {
        mode: Mode::Fast,
        max_len: u32::MAX as usize,
    };

    #[inline]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    #[inline]
    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Shorthand for `with_mode(Mode::Checked)`.
    #[inline]
    pub const fn checked(self) -> Self {
        self.with_mode(Mode::Checked)
    }

    #[inline]
    pub const fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    #[inline]
    pub const fn is_checked(&self) -> bool {
        matches!(self.mode, Mode::Checked)
    }
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}
