crate::cfg::auto_register! {
    use crate::{RegistryBuilder, RegistryError};

    /// One static registration, submitted by [`register_external!`](crate::register_external).
    #[doc(hidden)]
    pub struct ExternalRegistration(pub fn(&mut RegistryBuilder) -> Result<(), RegistryError>);

    inventory::collect!(ExternalRegistration);

    // Seen by `auto_register` only where static registration works.
    inventory::submit! {
        ExternalRegistration(|builder| {
            builder.auto_registered = true;
            Ok(())
        })
    }
}

/// Registers an external codec for a type at link time.
///
/// The codec is added to [`Registry::global`](crate::Registry::global) on
/// its first use and to any builder calling
/// [`auto_register`](crate::RegistryBuilder::auto_register). Registering
/// the same type twice makes the global registry panic on first use.
///
/// Without the `auto_register` feature this expands to nothing; register
/// through a [`RegistryBuilder`](crate::RegistryBuilder) instead.
///
/// # Examples
///
/// ```
/// use pr_archive::archive::{DynInputArchive, DynOutputArchive};
/// use pr_archive::{ArchiveError, Registry, register_external};
///
/// #[derive(Default)]
/// struct Handle(u64);
///
/// fn save_handle(h: &Handle, ar: &mut DynOutputArchive<'_, '_>) -> Result<(), ArchiveError> {
///     ar.save(&h.0)
/// }
///
/// fn load_handle(h: &mut Handle, ar: &mut DynInputArchive<'_, '_>) -> Result<(), ArchiveError> {
///     ar.load(&mut h.0)
/// }
///
/// register_external!(Handle, save_handle, load_handle);
///
/// assert!(Registry::global().contains::<Handle>());
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! register_external {
    ($ty:ty, $save:expr, $load:expr $(,)?) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::__macro_exports::ExternalRegistration(|builder| {
                builder.register::<$ty>($save, $load).map(|_| ())
            })
        }
    };
}

/// Registers an external codec for a type at link time.
///
/// The `auto_register` feature is off: this expands to nothing.
#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! register_external {
    ($ty:ty, $save:expr, $load:expr $(,)?) => {};
}
