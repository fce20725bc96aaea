//! A native-layout binary archive.
//!
//! Values are written to a byte stream exactly as the machine holds them
//! (native width, native byte order, no type tags) and read back by a
//! reader that repeats the same sequence of types. The only structural
//! markers in the stream are container counts.
//!
//! Every archivable type implements [`Persist`], and its
//! [`STRATEGY`](Persist::STRATEGY) names one of four ways to encode it:
//!
//! | strategy                                   | bytes                                      |
//! |--------------------------------------------|--------------------------------------------|
//! | [`MemberDefined`](Strategy::MemberDefined) | whatever the type's own `save` writes      |
//! | [`ExternallyRegistered`](Strategy::ExternallyRegistered) | written by a function found in a [`Registry`] |
//! | [`TrivialCopy`](Strategy::TrivialCopy)     | the value's memory, copied in one call     |
//! | [`ContainerRecursive`](Strategy::ContainerRecursive) | `[count: u64][elements...]`        |
//!
//! When a type could use several, the first one in that table wins.
//!
//! # Example
//!
//! ```
//! use pr_archive::{InputArchive, OutputArchive, Persist};
//!
//! #[derive(Persist, Default, Debug, PartialEq)]
//! struct Sample {
//!     i: i32,
//!     j: i32,
//!     k: Vec<i32>,
//! }
//!
//! let mut bytes = Vec::new();
//! OutputArchive::new(&mut bytes)
//!     .save(&Sample { i: 3, j: 7, k: vec![1, 2, 3] })
//!     .unwrap();
//!
//! let mut input = InputArchive::new(bytes.as_slice());
//! let sample: Sample = input.load_new().unwrap();
//! assert_eq!(sample, Sample { i: 3, j: 7, k: vec![1, 2, 3] });
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Compilation config

/// Some macros used for compilation control.
pub mod cfg {
    pr_cfg::define_alias! {
        #[cfg(feature = "std")] => std,
        #[cfg(feature = "auto_register")] => auto_register,
        #[cfg(all(debug_assertions, feature = "debug"))] => debug,
    }
}

// -----------------------------------------------------------------------------
// Extern Self

// The derive names this crate through `Manifest`, which yields `::pr_archive`
// both for dependents and for this crate's own tests.
extern crate self as pr_archive;

// -----------------------------------------------------------------------------
// no_std support

crate::cfg::std! {
    extern crate std;
}

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;

pub mod archive;
pub mod channel;
pub mod classify;
pub mod container;
pub mod persist;
pub mod registry;

// -----------------------------------------------------------------------------
// Top-Level exports

pub mod __macro_exports;

pub use archive::{Config, InputArchive, Mode, OutputArchive};
pub use classify::{Strategy, StrategySet};
pub use error::{ArchiveError, ChannelError, RegistryError};
pub use persist::{Persist, Trivial};
pub use registry::{Registered, Registry, RegistryBuilder};

pub use pr_archive_derive as derive;
pub use pr_archive_derive::Persist;
