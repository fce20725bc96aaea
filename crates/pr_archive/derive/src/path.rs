//! Paths into `pr_archive` used by generated code.

use proc_macro2::TokenStream;
use quote::quote;

/// Get the correct access path to the `pr_archive` crate.
///
/// 1. For crates that depend on `pr_archive`, `::pr_archive` is returned.
/// 2. For crates that depend on `packrat`, `::packrat::archive` is returned.
/// 3. For crates that depend on `pr_core`, `::pr_core::archive` is returned.
/// 4. For crates that depend on `pr`, `::pr::archive` is returned.
/// 5. Otherwise `::pr_archive`, which `pr_archive` itself provides through
///    `extern crate self`.
///
/// Reads the caller's `Cargo.toml`; call it once per derive.
pub(crate) fn pr_archive() -> syn::Path {
    pr_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("pr_archive"))
}

#[inline]
pub(crate) fn persist_(krate: &syn::Path) -> TokenStream {
    quote! { #krate::Persist }
}

#[inline]
pub(crate) fn strategy_(krate: &syn::Path) -> TokenStream {
    quote! { #krate::Strategy }
}

#[inline]
pub(crate) fn strategy_set_(krate: &syn::Path) -> TokenStream {
    quote! { #krate::StrategySet }
}

#[inline]
pub(crate) fn archive_error_(krate: &syn::Path) -> TokenStream {
    quote! { #krate::ArchiveError }
}

#[inline]
pub(crate) fn output_archive_(krate: &syn::Path) -> TokenStream {
    quote! { #krate::OutputArchive }
}

#[inline]
pub(crate) fn input_archive_(krate: &syn::Path) -> TokenStream {
    quote! { #krate::InputArchive }
}

#[inline]
pub(crate) fn byte_sink_(krate: &syn::Path) -> TokenStream {
    quote! { #krate::channel::ByteSink }
}

#[inline]
pub(crate) fn byte_source_(krate: &syn::Path) -> TokenStream {
    quote! { #krate::channel::ByteSource }
}

#[inline]
pub(crate) fn persist_mod_(krate: &syn::Path) -> TokenStream {
    quote! { #krate::persist }
}

#[inline]
pub(crate) fn macro_exports_(krate: &syn::Path) -> TokenStream {
    quote! { #krate::__macro_exports }
}
