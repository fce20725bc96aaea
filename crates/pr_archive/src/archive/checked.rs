use core::any::type_name;

use pr_utils::hash::hash_one;

/// Identity of `T` written in front of every Checked-mode record.
///
/// Derived from the type name and size with a fixed-seed hash, so it is
/// stable across runs of the same build. It is not stable across
/// compiler versions.
///
/// # Examples
///
/// ```
/// use pr_archive::archive::fingerprint;
///
/// assert_eq!(fingerprint::<u32>(), fingerprint::<u32>());
/// assert_ne!(fingerprint::<u32>(), fingerprint::<i32>());
/// ```
#[inline]
pub fn fingerprint<T>() -> u64 {
    hash_one(&(type_name::<T>(), size_of::<T>()))
}
