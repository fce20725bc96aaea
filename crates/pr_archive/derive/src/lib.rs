//! `#[derive(Persist)]`, re-exported by `pr_archive`.
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static PERSIST_ATTRIBUTE_NAME: &str = "persist";

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod expand;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Persist Derivation
///
/// `#[derive(Persist)]` implements `pr_archive::Persist` for structs (named,
/// tuple and unit) and enums.
///
/// ## Default: field by field
///
/// Without type-level attributes the type is Member-Defined: `save` writes
/// each field in declaration order and `load` reads them back in place.
///
/// ```rust, ignore
/// #[derive(Persist, Default)]
/// struct Header {
///     width: u32,
///     height: u32,
///     #[persist(skip)]
///     cache: Vec<u8>,
/// }
/// ```
///
/// `#[persist(skip)]` leaves a field out of the stream; `load` resets it to
/// its `Default`.
///
/// Enum values are written as a `u32` variant index followed by the
/// variant's fields. Loading builds the variant from `Default` fields, so
/// every field type of an enum must implement `Default`. An unknown index
/// fails with `ArchiveError::InvalidVariant`.
///
/// Generic parameters get `Persist` bounds on the field types that use them.
///
/// ## Own functions
///
/// ```rust, ignore
/// #[derive(Persist, Default)]
/// #[persist(save = save_header, load = load_header)]
/// struct Header { /* ... */ }
///
/// fn save_header<W: ByteSink>(h: &Header, ar: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError>;
/// fn load_header<R: ByteSource>(h: &mut Header, ar: &mut InputArchive<'_, R>) -> Result<(), ArchiveError>;
/// ```
///
/// Still Member-Defined; both functions must be given.
///
/// ## External
///
/// `#[persist(external)]` routes the type through the codec registered for
/// it in the archive's `Registry`.
///
/// ## Trivial
///
/// `#[persist(trivial)]` copies the value's memory. The type must implement
/// `bytemuck::Pod`; the derive also implements `pr_archive::Trivial`.
///
/// ```rust, ignore
/// #[derive(Persist, Clone, Copy, Default, bytemuck::Pod, bytemuck::Zeroable)]
/// #[persist(trivial)]
/// #[repr(C)]
/// struct Point { x: f32, y: f32, z: f32 }
/// ```
///
/// ## Several strategies
///
/// Attributes may be combined; the strategy used is the first of
/// Member-Defined (own functions), Externally-Registered, Trivial-Copy.
/// `Persist::STRATEGY` reports it.
///
/// These attributes can only be applied at the type level, except `skip`.
#[proc_macro_derive(Persist, attributes(persist))]
pub fn derive_persist(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match expand::derive_persist(&ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}
