//! Compile-time configuration helpers shared by the workspace crates.
//!
//! - [`define_alias!`]: bind a `#[cfg(...)]` predicate to a macro name, so that
//!   a crate can write `crate::cfg::std! { ... }` instead of repeating the predicate.
//! - [`switch!`]: expand the first branch whose condition holds.
//!
//! Every alias accepts three forms:
//!
//! ```ignore
//! crate::cfg::std! { extern crate std; }          // keep or drop the tokens
//! crate::cfg::std! { if { a() } else { b() } }    // pick a branch
//! let on: bool = crate::cfg::std!();              // query as a `bool`
//! ```
#![no_std]

// -----------------------------------------------------------------------------
// Alias targets

/// Target of an alias whose predicate is active.
#[doc(hidden)]
#[macro_export]
macro_rules! enabled {
    () => { true };
    (if { $($p:tt)* } else { $($n:tt)* }) => { $($p)* };
    ($($p:tt)*) => { $($p)* };
}

/// Target of an alias whose predicate is inactive.
#[doc(hidden)]
#[macro_export]
macro_rules! disabled {
    () => { false };
    (if { $($p:tt)* } else { $($n:tt)* }) => { $($n)* };
    ($($p:tt)*) => {};
}

// -----------------------------------------------------------------------------
// define_alias

/// Define one macro per `#[cfg(...)] => name` pair.
///
/// The generated macros are re-exports of [`enabled!`] or [`disabled!`],
/// chosen by the predicate, so they must be placed inside a module (usually
/// `pub mod cfg`) of the crate whose features they describe.
///
/// # Example
///
/// ```
/// pub mod cfg {
///     pr_cfg::define_alias! {
///         #[cfg(debug_assertions)] => debug,
///         #[cfg(any())] => never,
///     }
/// }
///
/// assert_eq!(cfg::debug!(), cfg!(debug_assertions));
/// assert!(!cfg::never!());
///
/// let mode = cfg::never! { if { "on" } else { "off" } };
/// assert_eq!(mode, "off");
/// ```
#[macro_export]
macro_rules! define_alias {
    () => {};
    (
        #[cfg($meta:meta)] => $alias:ident
        $(, $($rest:tt)*)?
    ) => {
        $crate::switch! {
            #[cfg($meta)] => {
                #[doc = concat!("Keeps its input: `#[cfg(", stringify!($meta), ")]` is active.")]
                #[doc(inline)]
                pub use $crate::enabled as $alias;
            }
            _ => {
                #[doc = concat!("Drops its input: `#[cfg(", stringify!($meta), ")]` is inactive.")]
                #[doc(inline)]
                pub use $crate::disabled as $alias;
            }
        }
        $($crate::define_alias! { $($rest)* })?
    };
}

// -----------------------------------------------------------------------------
// switch

/// Expand the first branch whose condition holds.
///
/// A condition is either a `#[cfg(...)]` predicate or the path of an alias
/// produced by [`define_alias!`]. `_` always holds.
///
/// # Example
///
/// ```
/// pr_cfg::switch! {
///     #[cfg(target_pointer_width = "64")] => { const WIDTH: usize = 8; }
///     #[cfg(target_pointer_width = "32")] => { const WIDTH: usize = 4; }
///     _ => { const WIDTH: usize = core::mem::size_of::<usize>(); }
/// }
///
/// assert_eq!(WIDTH, core::mem::size_of::<usize>());
/// ```
///
/// `#[cfg]` branches expand to items or statements; alias branches can
/// also be used in expression position.
#[macro_export]
macro_rules! switch {
    () => {};
    ({ $($tt:tt)* }) => {{
        $crate::switch! { $($tt)* }
    }};
    (_ => { $($output:tt)* }) => {
        $($output)*
    };
    (
        #[cfg($cfg:meta)] => $output:tt
        $($rest:tt)*
    ) => {
        #[cfg($cfg)]
        $crate::switch! { _ => $output }
        #[cfg(not($cfg))]
        $crate::switch! { $($rest)* }
    };
    (
        $cond:path => $output:tt
        $($rest:tt)*
    ) => {
        $cond! {
            if {
                $crate::switch! { _ => $output }
            } else {
                $crate::switch! { $($rest)* }
            }
        }
    };
}
