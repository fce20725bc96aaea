//! Codecs for types this crate cannot implement [`Persist`](crate::Persist) on.
//!
//! A foreign type gets a pair of free functions, stored by [`TypeId`] in a
//! [`Registry`]. Archives look them up when they meet a
//! [`Registered<T>`] value or a `#[persist(external)]` type.
//!
//! ## Menu
//!
//! - [`RegistryBuilder`]: collects codecs, rejects a second codec for a type.
//! - [`Registry`]: the immutable result; [`Registry::global`] is the one
//!   archives use by default.
//! - [`register_external!`](crate::register_external): static registration,
//!   collected by [`RegistryBuilder::auto_register`] and by the first use of
//!   the global registry.
//! - [`Registered<T>`]: a wrapper routing `T` through the registry.
//!
//! ## auto_register
//!
//! Static registration relies on the [`inventory`] crate, which supports
//! the major platforms. Where it does not, `auto_register` finds nothing and
//! returns `Ok(false)`.
//!
//! [`inventory`]: https://docs.rs/inventory

use alloc::boxed::Box;
use core::any::{Any, TypeId, type_name};
use core::fmt;

use pr_utils::TypeIdMap;

use crate::archive::{DynInputArchive, DynOutputArchive};
use crate::{ArchiveError, RegistryError};

// -----------------------------------------------------------------------------
// Modules

mod auto;
mod registered;

// -----------------------------------------------------------------------------
// Exports

pub use registered::Registered;

crate::cfg::auto_register! {
    #[doc(hidden)]
    pub use auto::ExternalRegistration;
}

// -----------------------------------------------------------------------------
// ExternalCodec

/// Writes a `T` through a type-erased archive.
pub type SaveFn<T> = fn(&T, &mut DynOutputArchive<'_, '_>) -> Result<(), ArchiveError>;

/// Reads into a `T` through a type-erased archive.
pub type LoadFn<T> = fn(&mut T, &mut DynInputArchive<'_, '_>) -> Result<(), ArchiveError>;

/// The save and load functions registered for `T`.
pub struct ExternalCodec<T> {
    pub save: SaveFn<T>,
    pub load: LoadFn<T>,
}

impl<T> Clone for ExternalCodec<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ExternalCodec<T> {}

impl<T> fmt::Debug for ExternalCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalCodec")
            .field("type", &type_name::<T>())
            .finish_non_exhaustive()
    }
}

struct RegistryEntry {
    type_name: &'static str,
    // Always an `ExternalCodec<T>` for the `T` of its key.
    codec: Box<dyn Any + Send + Sync>,
}

// -----------------------------------------------------------------------------
// Registry

/// Immutable map from types to their external codecs.
///
/// # Examples
///
/// ```
/// use pr_archive::archive::{DynInputArchive, DynOutputArchive};
/// use pr_archive::{ArchiveError, InputArchive, OutputArchive, Registered, RegistryBuilder};
///
/// // Stands in for a type from another crate.
/// #[derive(Default, Debug, PartialEq)]
/// struct Rgb(u8, u8, u8);
///
/// fn save_rgb(c: &Rgb, ar: &mut DynOutputArchive<'_, '_>) -> Result<(), ArchiveError> {
///     ar.write_bytes(&[c.0, c.1, c.2])
/// }
///
/// fn load_rgb(c: &mut Rgb, ar: &mut DynInputArchive<'_, '_>) -> Result<(), ArchiveError> {
///     let mut raw = [0; 3];
///     ar.read_bytes(&mut raw)?;
///     *c = Rgb(raw[0], raw[1], raw[2]);
///     Ok(())
/// }
///
/// let mut builder = RegistryBuilder::new();
/// builder.register::<Rgb>(save_rgb, load_rgb).unwrap();
/// let registry = builder.build();
///
/// let colors = vec![Registered(Rgb(1, 2, 3)), Registered(Rgb(4, 5, 6))];
/// let mut bytes = Vec::new();
/// OutputArchive::with_registry(&mut bytes, &registry).save(&colors).unwrap();
/// assert_eq!(bytes.len(), 8 + 2 * 3);
///
/// let back: Vec<Registered<Rgb>> = InputArchive::with_registry(bytes.as_slice(), &registry)
///     .load_new()
///     .unwrap();
/// assert_eq!(back, colors);
/// ```
pub struct Registry {
    entries: TypeIdMap<RegistryEntry>,
}

impl Registry {
    /// A registry without codecs.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            entries: TypeIdMap::new(),
        }
    }

    /// A shared empty registry.
    #[inline]
    pub fn empty_ref() -> &'static Registry {
        static EMPTY: Registry = Registry::empty();
        &EMPTY
    }

    /// The codec registered for `T`.
    #[inline]
    pub fn codec<T: 'static>(&self) -> Option<&ExternalCodec<T>> {
        self.entries.get_type::<T>()?.codec.downcast_ref()
    }

    #[inline]
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_type::<T>()
    }

    #[inline]
    pub fn contains_id(&self, type_id: TypeId) -> bool {
        self.entries.contains(&type_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the registered types, in arbitrary order.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.values().map(|entry| entry.type_name)
    }

    /// Registry bound by `OutputArchive::new` and `InputArchive::new`.
    #[inline]
    pub(crate) fn ambient() -> &'static Registry {
        crate::cfg::std! {
            if {
                Self::global()
            } else {
                Self::empty_ref()
            }
        }
    }
}

crate::cfg::std! {
    use std::sync::OnceLock;

    static GLOBAL: OnceLock<Registry> = OnceLock::new();

    impl Registry {
        /// The process-wide registry.
        ///
        /// Unless [`RegistryBuilder::install`] ran first, the first call
        /// builds it from every [`register_external!`](crate::register_external)
        /// in the program.
        ///
        /// # Panics
        ///
        /// If two static registrations name the same type.
        pub fn global() -> &'static Registry {
            GLOBAL.get_or_init(|| {
                let mut builder = RegistryBuilder::new();
                if let Err(e) = builder.auto_register() {
                    panic!("static external registration failed: {e}");
                }
                log::debug!("global registry ready with {} external codecs", builder.len());
                builder.build()
            })
        }
    }
}

impl Default for Registry {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.type_names()).finish()
    }
}

// -----------------------------------------------------------------------------
// RegistryBuilder

/// Collects external codecs into a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    entries: TypeIdMap<RegistryEntry>,
    auto_registered: bool,
}

impl RegistryBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the codec of `T`.
    ///
    /// A type has at most one codec; a second registration fails with
    /// [`RegistryError::Duplicate`] and leaves the first in place.
    pub fn register<T: 'static>(
        &mut self,
        save: SaveFn<T>,
        load: LoadFn<T>,
    ) -> Result<&mut Self, RegistryError> {
        let type_name = type_name::<T>();
        let inserted = self.entries.try_insert(TypeId::of::<T>(), || RegistryEntry {
            type_name,
            codec: Box::new(ExternalCodec { save, load }),
        });

        if !inserted {
            log::warn!("rejected a second external codec for `{type_name}`");
            return Err(RegistryError::Duplicate { type_name });
        }
        Ok(self)
    }

    /// Adds every codec declared with [`register_external!`](crate::register_external).
    ///
    /// Returns `Ok(true)` if static registration works on this platform,
    /// `Ok(false)` if it does not or the `auto_register` feature is off.
    /// Calling it again does nothing.
    pub fn auto_register(&mut self) -> Result<bool, RegistryError> {
        crate::cfg::auto_register! {
            if {
                if self.auto_registered {
                    return Ok(true);
                }
                for registration in inventory::iter::<ExternalRegistration> {
                    (registration.0)(self)?;
                }
                Ok(self.auto_registered)
            } else {
                Ok(false)
            }
        }
    }

    #[inline]
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_type::<T>()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn build(self) -> Registry {
        Registry {
            entries: self.entries,
        }
    }

    /// Makes the built registry the process-wide one.
    ///
    /// Fails with [`RegistryError::AlreadyInstalled`] once
    /// [`Registry::global`] has been used, including by an archive created
    /// with `new`. Static registrations are only included if
    /// [`auto_register`](Self::auto_register) was called.
    #[cfg(feature = "std")]
    pub fn install(self) -> Result<&'static Registry, RegistryError> {
        let mut pending = Some(self.build());
        let installed = GLOBAL.get_or_init(|| pending.take().unwrap_or_default());
        match pending {
            None => Ok(installed),
            Some(_) => Err(RegistryError::AlreadyInstalled),
        }
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.entries.values().map(|entry| entry.type_name))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
