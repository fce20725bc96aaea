//! Output and input archives.
//!
//! An archive binds one byte channel, a [`Registry`](crate::Registry) for
//! externally registered types and a [`Config`]. It is used through
//! `&mut self` only and is never shared between threads.
//!
//! ```
//! use pr_archive::{InputArchive, OutputArchive};
//!
//! let mut bytes = Vec::new();
//! {
//!     let mut out = OutputArchive::new(&mut bytes);
//!     out.save(&10_i32).unwrap();
//!     out.save(&vec![1.0_f64; 10]).unwrap();
//! }
//!
//! let mut input = InputArchive::new(bytes.as_slice());
//! assert_eq!(input.load_new::<i32>().unwrap(), 10);
//! assert_eq!(input.load_new::<Vec<f64>>().unwrap(), vec![1.0; 10]);
//! assert_eq!(input.remaining(), Some(0));
//! ```

// -----------------------------------------------------------------------------
// Modules

mod checked;
mod config;
mod input;
mod output;
mod trace;

// -----------------------------------------------------------------------------
// Exports

pub use checked::fingerprint;
pub use config::{Config, Mode};
pub use input::InputArchive;
pub use output::OutputArchive;

pub(crate) use trace::TypeTrace;

use crate::channel::{ByteSink, ByteSource};

/// An output archive over a type-erased sink.
///
/// Registered codecs receive this type, so one function serves every sink.
pub type DynOutputArchive<'a, 'r> = OutputArchive<'r, &'a mut dyn ByteSink>;

/// An input archive over a type-erased source.
pub type DynInputArchive<'a, 'r> = InputArchive<'r, &'a mut dyn ByteSource>;

/// Upper bound, in bytes, of a single up-front allocation made while
/// decoding from a source of unknown size.
pub(crate) const PREALLOC_LIMIT: usize = 64 * 1024;

/// Number of elements worth reserving before decoding `len` values of `T`.
///
/// The reservation never exceeds the larger of the source's remaining bytes
/// and [`PREALLOC_LIMIT`]. A count is only bounded by the minimal encoded
/// size of its elements, which can be zero, so it says nothing about memory.
#[inline]
pub(crate) fn prealloc_len<T>(len: usize, remaining: Option<usize>) -> usize {
    let budget = remaining.map_or(PREALLOC_LIMIT, |left| left.max(PREALLOC_LIMIT));
    len.min(budget / size_of::<T>().max(1))
}

// -----------------------------------------------------------------------------
// Tests
