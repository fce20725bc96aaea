//! Items used by the expansion of this crate's macros and derives.
//! Not public API.
#![doc(hidden)]

pub use alloc::vec::Vec;

pub use bytemuck;

crate::cfg::auto_register! {
    pub use inventory;
    pub use crate::registry::ExternalRegistration;
}
